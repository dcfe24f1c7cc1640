pub mod app_config;
pub mod booking_store;
pub mod database;
pub mod flight_repo;

pub use booking_store::PostgresBookingStore;
pub use database::DbClient;
pub use flight_repo::PostgresFlightRepository;
