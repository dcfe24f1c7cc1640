pub mod committer;
pub mod gateway;
pub mod memory;
pub mod quote;

pub use committer::BookingCommitter;
pub use gateway::{MockPaymentGateway, StripeGateway};
pub use memory::MemoryStore;
pub use quote::{FareQuote, FareQuoteCalculator};
