pub mod booking;
pub mod country;
pub mod error;
pub mod flight;
pub mod payment;
pub mod reference;
pub mod repository;

pub use error::BookingError;
