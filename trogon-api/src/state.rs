use std::sync::Arc;

use trogon_booking::{BookingCommitter, FareQuoteCalculator};
use trogon_core::payment::PaymentGateway;

use crate::mailer::TicketMailer;

#[derive(Clone)]
pub struct AppState {
    pub quotes: Arc<FareQuoteCalculator>,
    pub committer: Arc<BookingCommitter>,
    pub payments: Arc<dyn PaymentGateway>,
    pub mailer: Arc<dyn TicketMailer>,
}
