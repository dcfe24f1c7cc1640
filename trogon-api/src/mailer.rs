use async_trait::async_trait;
use tracing::info;

use trogon_core::error::BookingError;

/// What the ticketing/email component needs after a successful commit.
#[derive(Debug, Clone)]
pub struct TicketDelivery {
    pub reference: String,
    pub contact_email: String,
    pub passenger_names: Vec<String>,
}

/// Out-of-band ticket delivery. The commit path hands the booking off on a
/// spawned task and never blocks on or retries the delivery.
#[async_trait]
pub trait TicketMailer: Send + Sync {
    async fn send_confirmation(&self, delivery: &TicketDelivery) -> Result<(), BookingError>;
}

/// Logs the hand-off instead of calling a mail provider.
pub struct LogMailer;

#[async_trait]
impl TicketMailer for LogMailer {
    async fn send_confirmation(&self, delivery: &TicketDelivery) -> Result<(), BookingError> {
        info!(
            reference = %delivery.reference,
            email = %delivery.contact_email,
            passengers = delivery.passenger_names.len(),
            "handing booking confirmation to ticket delivery"
        );
        Ok(())
    }
}
