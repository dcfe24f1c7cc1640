use axum::{
    extract::{Json, State},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use trogon_core::error::BookingError;
use trogon_core::payment::AuthorizationRequest;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentRequest {
    pub flight_id: Uuid,
    #[serde(default)]
    pub return_flight_id: Option<Uuid>,
    pub passenger_count: i32,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentResponse {
    pub client_secret: String,
    pub amount: i32,
    pub currency: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/payments/create-intent", post(create_intent))
}

/// Quote + authorize: price the requested seats from stored fares and open a
/// payment authorization for exactly that amount. Read-only against the
/// flight store, safe to call repeatedly while a user hesitates at checkout.
async fn create_intent(
    State(state): State<AppState>,
    Json(req): Json<CreateIntentRequest>,
) -> Result<Json<CreateIntentResponse>, ApiError> {
    if !req.email.contains('@') {
        return Err(BookingError::Validation("email is invalid".to_string()).into());
    }

    let quote = state
        .quotes
        .quote(req.flight_id, req.return_flight_id, req.passenger_count)
        .await?;

    let authorization = state
        .payments
        .create_authorization(&AuthorizationRequest {
            amount: quote.amount,
            currency: quote.currency.clone(),
            passenger_count: quote.passenger_count,
            flight_ids: quote.flight_ids.clone(),
            receipt_email: req.email.clone(),
        })
        .await?;

    let client_secret = authorization.client_secret.ok_or_else(|| {
        BookingError::PaymentProvider("authorization is missing a client secret".to_string())
    })?;

    Ok(Json(CreateIntentResponse {
        client_secret,
        amount: authorization.amount,
        currency: authorization.currency,
    }))
}
