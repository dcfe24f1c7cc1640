use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BookingError;

/// Provider-side identifier shape (`pi_…` for Stripe-style intents).
pub const INTENT_ID_PREFIX: &str = "pi_";

pub fn is_valid_intent_id(id: &str) -> bool {
    id.len() > INTENT_ID_PREFIX.len() && id.starts_with(INTENT_ID_PREFIX)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    RequiresPaymentMethod,
    RequiresAction,
    Processing,
    Succeeded,
    Canceled,
    Failed,
}

impl PaymentStatus {
    /// Only a settled payment may fund a booking commit.
    pub fn is_settled(&self) -> bool {
        matches!(self, PaymentStatus::Succeeded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::RequiresPaymentMethod => "requires_payment_method",
            PaymentStatus::RequiresAction => "requires_action",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::Canceled => "canceled",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn from_provider(value: &str) -> Self {
        match value {
            "requires_payment_method" => PaymentStatus::RequiresPaymentMethod,
            "requires_action" | "requires_confirmation" => PaymentStatus::RequiresAction,
            "processing" => PaymentStatus::Processing,
            "succeeded" => PaymentStatus::Succeeded,
            "canceled" => PaymentStatus::Canceled,
            _ => PaymentStatus::Failed,
        }
    }
}

/// The provider's record of an attempted charge. Referenced by an opaque
/// identifier; this system only reads it and creates new ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAuthorization {
    pub id: String,
    pub amount: i32,
    pub currency: String,
    pub status: PaymentStatus,
    pub client_secret: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Server-side authorization request. The amount is always the authoritative
/// quote total; a client-supplied amount never reaches this type.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub amount: i32,
    pub currency: String,
    pub passenger_count: i32,
    pub flight_ids: Vec<Uuid>,
    pub receipt_email: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open an authorization for the exact amount in `request` and return the
    /// provider identifier plus client secret.
    async fn create_authorization(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<PaymentAuthorization, BookingError>;

    /// Retrieve an authorization's current settlement status by identifier.
    async fn fetch_authorization(
        &self,
        intent_id: &str,
    ) -> Result<PaymentAuthorization, BookingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_succeeded_counts_as_settled() {
        assert!(PaymentStatus::Succeeded.is_settled());
        assert!(!PaymentStatus::Processing.is_settled());
        assert!(!PaymentStatus::RequiresAction.is_settled());
        assert!(!PaymentStatus::Failed.is_settled());
    }

    #[test]
    fn provider_status_strings_map_onto_the_enum() {
        assert_eq!(
            PaymentStatus::from_provider("succeeded"),
            PaymentStatus::Succeeded
        );
        assert_eq!(
            PaymentStatus::from_provider("requires_confirmation"),
            PaymentStatus::RequiresAction
        );
        assert_eq!(
            PaymentStatus::from_provider("something_new"),
            PaymentStatus::Failed
        );
    }

    #[test]
    fn intent_id_shape() {
        assert!(is_valid_intent_id("pi_3OqJ8aFz"));
        assert!(!is_valid_intent_id("pi_"));
        assert!(!is_valid_intent_id("ch_3OqJ8aFz"));
        assert!(!is_valid_intent_id(""));
    }
}
