use async_trait::async_trait;
use uuid::Uuid;

use crate::booking::{Booking, CommitOutcome, CommitRequest};
use crate::error::BookingError;
use crate::flight::Flight;

/// Read access to the flight availability store.
#[async_trait]
pub trait FlightRepository: Send + Sync {
    /// Fetch every flight in `ids` in a single read. Ids that do not resolve
    /// are simply absent from the result; callers decide whether that is an
    /// error.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Flight>, BookingError>;
}

/// Durable booking persistence. `commit_booking` is the only mutation this
/// core performs against shared state.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Look up the booking already funded by a payment authorization, if any.
    async fn find_by_payment_intent(
        &self,
        intent_id: &str,
    ) -> Result<Option<Booking>, BookingError>;

    /// Atomically lock the referenced flight rows, re-verify inventory,
    /// persist the booking with all its passengers, and decrement seat
    /// counts, or persist nothing. `total_amount`/`currency` come from the
    /// settled payment authorization, never from the client.
    ///
    /// A concurrent commit racing on the same authorization yields the
    /// winner's booking with `replayed = true` rather than a duplicate.
    async fn commit_booking(
        &self,
        request: &CommitRequest,
        total_amount: i32,
        currency: &str,
    ) -> Result<CommitOutcome, BookingError>;
}
