use std::sync::Arc;

use tracing::{info, warn};

use trogon_core::booking::{CommitOutcome, CommitRequest};
use trogon_core::error::BookingError;
use trogon_core::payment::{self, PaymentGateway};
use trogon_core::repository::BookingStore;

/// Drives the reservation commit protocol as a strictly ordered pipeline:
/// validate, check the payment authorization, then hand the lock/persist/
/// commit transaction to the store. Each stage's failure short-circuits;
/// nothing before the store call touches the database.
pub struct BookingCommitter {
    store: Arc<dyn BookingStore>,
    gateway: Arc<dyn PaymentGateway>,
}

impl BookingCommitter {
    pub fn new(store: Arc<dyn BookingStore>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { store, gateway }
    }

    pub async fn commit(&self, request: &CommitRequest) -> Result<CommitOutcome, BookingError> {
        validate(request)?;

        // Pre-transaction and safe to repeat: the provider is the source of
        // truth for settlement.
        let authorization = self
            .gateway
            .fetch_authorization(&request.payment_intent_id)
            .await?;
        if !authorization.status.is_settled() {
            return Err(BookingError::PaymentNotSettled {
                status: authorization.status.as_str().to_string(),
            });
        }
        if request.total_price_amount != authorization.amount {
            warn!(
                intent = %request.payment_intent_id,
                client_total = request.total_price_amount,
                authorized = authorization.amount,
                "client total disagrees with authorization, using authorized amount"
            );
        }

        // Idempotent replay: a second commit against an already-consumed
        // authorization returns the original booking, never a duplicate.
        if let Some(existing) = self
            .store
            .find_by_payment_intent(&request.payment_intent_id)
            .await?
        {
            info!(
                intent = %request.payment_intent_id,
                reference = %existing.reference,
                "payment authorization already consumed, replaying original booking"
            );
            return Ok(CommitOutcome {
                booking_id: existing.id,
                reference: existing.reference,
                passenger_count: existing.passenger_count,
                replayed: true,
            });
        }

        let outcome = self
            .store
            .commit_booking(request, authorization.amount, &authorization.currency)
            .await?;
        info!(
            booking = %outcome.booking_id,
            reference = %outcome.reference,
            passengers = outcome.passenger_count,
            "booking committed"
        );
        Ok(outcome)
    }
}

/// Field-level validation. Runs before any I/O; violations never open a
/// transaction.
fn validate(request: &CommitRequest) -> Result<(), BookingError> {
    if !payment::is_valid_intent_id(&request.payment_intent_id) {
        return Err(BookingError::Validation(
            "paymentIntentId is not a valid payment intent identifier".to_string(),
        ));
    }
    if request.passengers.is_empty() {
        return Err(BookingError::Validation(
            "at least one passenger is required".to_string(),
        ));
    }
    for (index, passenger) in request.passengers.iter().enumerate() {
        if passenger.first_name.trim().is_empty() {
            return Err(BookingError::Validation(format!(
                "passenger {index}: first name is required"
            )));
        }
        if passenger.last_name.trim().is_empty() {
            return Err(BookingError::Validation(format!(
                "passenger {index}: last name is required"
            )));
        }
    }
    if !request.contact.email.contains('@') {
        return Err(BookingError::Validation(
            "contact email is invalid".to_string(),
        ));
    }
    if request.return_flight_id == Some(request.flight_id) {
        return Err(BookingError::Validation(
            "return flight must differ from the outbound flight".to_string(),
        ));
    }
    Ok(())
}
