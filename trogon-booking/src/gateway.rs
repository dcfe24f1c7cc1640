use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use trogon_core::error::BookingError;
use trogon_core::payment::{
    AuthorizationRequest, PaymentAuthorization, PaymentGateway, PaymentStatus,
};

pub const STRIPE_API_BASE: &str = "https://api.stripe.com";

/// Stripe-backed payment authorization issuer. Amounts are always the
/// server-derived quote total; provider failures are surfaced verbatim as
/// `PaymentProvider` without leaking the secret key.
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    base_url: String,
}

impl StripeGateway {
    pub fn new(secret_key: impl Into<String>, timeout: Duration) -> Result<Self, BookingError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BookingError::Internal(e.to_string()))?;
        Ok(Self {
            client,
            secret_key: secret_key.into(),
            base_url: STRIPE_API_BASE.to_string(),
        })
    }

    /// Point the gateway at a different host (test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn parse_intent(response: reqwest::Response) -> Result<StripeIntent, BookingError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(String::from))
                .unwrap_or_else(|| format!("provider returned HTTP {status}"));
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(BookingError::NotFound(message));
            }
            return Err(BookingError::PaymentProvider(message));
        }
        response
            .json::<StripeIntent>()
            .await
            .map_err(|e| BookingError::PaymentProvider(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct StripeIntent {
    id: String,
    amount: i64,
    currency: String,
    status: String,
    client_secret: Option<String>,
}

impl StripeIntent {
    fn into_authorization(self) -> Result<PaymentAuthorization, BookingError> {
        let amount = i32::try_from(self.amount).map_err(|_| {
            BookingError::PaymentProvider(format!(
                "authorization {} carries an out-of-range amount: {}",
                self.id, self.amount
            ))
        })?;
        Ok(PaymentAuthorization {
            id: self.id,
            amount,
            currency: self.currency,
            status: PaymentStatus::from_provider(&self.status),
            client_secret: self.client_secret,
            created_at: Utc::now(),
        })
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_authorization(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<PaymentAuthorization, BookingError> {
        let flight_ids = request
            .flight_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let params = [
            ("amount", request.amount.to_string()),
            ("currency", request.currency.clone()),
            ("receipt_email", request.receipt_email.clone()),
            ("metadata[flight_ids]", flight_ids),
            (
                "metadata[passenger_count]",
                request.passenger_count.to_string(),
            ),
        ];

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.base_url))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&params)
            .send()
            .await
            .map_err(|e| BookingError::PaymentProvider(e.to_string()))?;

        Self::parse_intent(response).await?.into_authorization()
    }

    async fn fetch_authorization(
        &self,
        intent_id: &str,
    ) -> Result<PaymentAuthorization, BookingError> {
        let response = self
            .client
            .get(format!("{}/v1/payment_intents/{intent_id}", self.base_url))
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await
            .map_err(|e| BookingError::PaymentProvider(e.to_string()))?;

        Self::parse_intent(response).await?.into_authorization()
    }
}

/// In-process gateway for local runs and tests. Created intents are held in
/// memory; fetching one simulates the customer having completed the payment
/// interaction out of band, so it comes back `Succeeded` unless the gateway
/// was built with a fixed outcome.
pub struct MockPaymentGateway {
    created: Mutex<HashMap<String, PaymentAuthorization>>,
    fixed_outcome: Option<(i32, PaymentStatus)>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self {
            created: Mutex::new(HashMap::new()),
            fixed_outcome: None,
        }
    }

    /// Every fetch reports a settled authorization for `amount`, regardless
    /// of id.
    pub fn settled(amount: i32) -> Self {
        Self::with_status(amount, PaymentStatus::Succeeded)
    }

    /// Every fetch reports `status` for `amount`, regardless of id.
    pub fn with_status(amount: i32, status: PaymentStatus) -> Self {
        Self {
            created: Mutex::new(HashMap::new()),
            fixed_outcome: Some((amount, status)),
        }
    }
}

impl Default for MockPaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_authorization(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<PaymentAuthorization, BookingError> {
        let id = format!("pi_mock_{}", Uuid::new_v4().simple());
        let authorization = PaymentAuthorization {
            id: id.clone(),
            amount: request.amount,
            currency: request.currency.clone(),
            status: PaymentStatus::RequiresPaymentMethod,
            client_secret: Some(format!("{id}_secret_{}", Uuid::new_v4().simple())),
            created_at: Utc::now(),
        };
        self.created.lock().await.insert(id, authorization.clone());
        Ok(authorization)
    }

    async fn fetch_authorization(
        &self,
        intent_id: &str,
    ) -> Result<PaymentAuthorization, BookingError> {
        if let Some((amount, status)) = &self.fixed_outcome {
            return Ok(PaymentAuthorization {
                id: intent_id.to_string(),
                amount: *amount,
                currency: "usd".to_string(),
                status: status.clone(),
                client_secret: None,
                created_at: Utc::now(),
            });
        }

        let created = self.created.lock().await;
        let stored = created.get(intent_id).ok_or_else(|| {
            BookingError::PaymentProvider(format!("no such payment_intent: {intent_id}"))
        })?;
        Ok(PaymentAuthorization {
            status: PaymentStatus::Succeeded,
            client_secret: None,
            ..stored.clone()
        })
    }
}
