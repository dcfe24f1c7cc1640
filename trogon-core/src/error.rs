use uuid::Uuid;

/// Failure taxonomy for the reservation commit protocol.
///
/// `Validation`, `NotFound` and the advisory `InsufficientInventory` are
/// raised before any row is touched; `Database` errors encountered
/// mid-transaction trigger an explicit rollback in the store layer.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("insufficient seats on flight {flight_id}: requested {requested}, available {available}")]
    InsufficientInventory {
        flight_id: Uuid,
        requested: i32,
        available: i32,
    },

    #[error("payment is not settled: status is {status}")]
    PaymentNotSettled { status: String },

    #[error("payment provider error: {0}")]
    PaymentProvider(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl BookingError {
    /// Machine-readable code surfaced in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::Validation(_) => "VALIDATION_ERROR",
            BookingError::NotFound(_) => "NOT_FOUND",
            BookingError::InsufficientInventory { .. } => "INSUFFICIENT_INVENTORY",
            BookingError::PaymentNotSettled { .. } => "PAYMENT_NOT_SETTLED",
            BookingError::PaymentProvider(_) => "PAYMENT_PROVIDER_ERROR",
            BookingError::Database(_) => "DATABASE_ERROR",
            BookingError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
