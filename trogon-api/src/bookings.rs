use axum::{
    extract::{Json, State},
    routing::post,
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use trogon_core::booking::{CommitRequest, ContactInfo, PassengerDetails, PassengerType};

use crate::error::ApiError;
use crate::mailer::TicketDelivery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitBookingRequest {
    pub payment_intent_id: String,
    pub flight_id: Uuid,
    #[serde(default)]
    pub return_flight_id: Option<Uuid>,
    pub passengers: Vec<PassengerPayload>,
    pub contact_info: ContactPayload,
    /// Client echo of the quoted total. Compared against the authorization
    /// amount server-side, never stored.
    pub total_price: i32,
    #[serde(default)]
    pub departure_date: Option<NaiveDate>,
    #[serde(default)]
    pub return_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerPayload {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub passenger_type: PassengerType,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPayload {
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitBookingResponse {
    pub success: bool,
    pub booking_id: Uuid,
    pub booking_reference: String,
    pub passenger_count: i32,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/bookings", post(commit_booking))
}

async fn commit_booking(
    State(state): State<AppState>,
    Json(req): Json<CommitBookingRequest>,
) -> Result<Json<CommitBookingResponse>, ApiError> {
    let request = to_domain(req);
    let passenger_names = request
        .passengers
        .iter()
        .map(|p| format!("{} {}", p.first_name, p.last_name))
        .collect::<Vec<_>>();
    let contact_email = request.contact.email.clone();

    let outcome = state.committer.commit(&request).await?;

    // Ticket delivery is out of band; a replayed commit already sent one.
    if !outcome.replayed {
        let mailer = state.mailer.clone();
        let delivery = TicketDelivery {
            reference: outcome.reference.clone(),
            contact_email,
            passenger_names,
        };
        tokio::spawn(async move {
            if let Err(err) = mailer.send_confirmation(&delivery).await {
                warn!(
                    error = %err,
                    reference = %delivery.reference,
                    "ticket delivery hand-off failed"
                );
            }
        });
    }

    Ok(Json(CommitBookingResponse {
        success: true,
        booking_id: outcome.booking_id,
        booking_reference: outcome.reference,
        passenger_count: outcome.passenger_count,
    }))
}

fn to_domain(req: CommitBookingRequest) -> CommitRequest {
    CommitRequest {
        payment_intent_id: req.payment_intent_id,
        flight_id: req.flight_id,
        return_flight_id: req.return_flight_id,
        passengers: req
            .passengers
            .into_iter()
            .map(|p| PassengerDetails {
                first_name: p.first_name,
                last_name: p.last_name,
                date_of_birth: p.date_of_birth,
                passenger_type: p.passenger_type,
                country: p.country,
                email: p.email,
                phone: p.phone,
            })
            .collect(),
        contact: ContactInfo {
            email: req.contact_info.email,
            phone: req.contact_info.phone,
        },
        total_price_amount: req.total_price,
        departure_date: req.departure_date,
        return_date: req.return_date,
    }
}
