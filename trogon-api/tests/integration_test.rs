use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use trogon_api::mailer::LogMailer;
use trogon_api::{app, AppState};
use trogon_booking::{BookingCommitter, FareQuoteCalculator, MemoryStore, MockPaymentGateway};
use trogon_core::flight::{Flight, TravelMode};
use trogon_core::payment::{PaymentGateway, PaymentStatus};

fn flight(price_amount: i32, seats_available: i32) -> Flight {
    let departure = Utc::now() + Duration::days(10);
    Flight {
        id: Uuid::new_v4(),
        flight_number: "TR310".to_string(),
        mode: TravelMode::Plane,
        origin: "PAP".to_string(),
        destination: "SDQ".to_string(),
        scheduled_departure: departure,
        scheduled_arrival: departure + Duration::minutes(55),
        price_amount,
        price_currency: "usd".to_string(),
        seats_available,
    }
}

async fn app_with(
    flights: Vec<Flight>,
    gateway: MockPaymentGateway,
) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    for f in flights {
        store.insert_flight(f).await;
    }
    let payments: Arc<dyn PaymentGateway> = Arc::new(gateway);
    let state = AppState {
        quotes: Arc::new(FareQuoteCalculator::new(store.clone())),
        committer: Arc::new(BookingCommitter::new(store.clone(), payments.clone())),
        payments,
        mailer: Arc::new(LogMailer),
    };
    (app(state), store)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read_json(response).await
}

async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    read_json(response).await
}

async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn passenger(first: &str, last: &str) -> Value {
    json!({
        "firstName": first,
        "lastName": last,
        "type": "adult",
        "country": "HT",
    })
}

fn commit_body(flight_id: Uuid, intent_id: &str, passengers: Vec<Value>, total: i32) -> Value {
    json!({
        "paymentIntentId": intent_id,
        "flightId": flight_id,
        "passengers": passengers,
        "contactInfo": { "email": "traveler@example.com", "phone": "+509 1234 5678" },
        "totalPrice": total,
    })
}

/// The mock gateway embeds the intent id in the client secret the same way
/// the real provider does: `pi_…_secret_…`.
fn intent_id_of(client_secret: &str) -> String {
    client_secret
        .split("_secret")
        .next()
        .expect("client secret carries the intent id")
        .to_string()
}

#[tokio::test]
async fn health_reports_ok() {
    let (router, _) = app_with(vec![], MockPaymentGateway::new()).await;
    let (status, body) = get(&router, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
}

#[tokio::test]
async fn quote_and_authorize_returns_priced_client_secret() {
    let outbound = flight(12_500, 8);
    let outbound_id = outbound.id;
    let (router, _) = app_with(vec![outbound], MockPaymentGateway::new()).await;

    let (status, body) = post_json(
        &router,
        "/api/payments/create-intent",
        json!({
            "flightId": outbound_id,
            "passengerCount": 2,
            "email": "traveler@example.com",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["amount"], 25_000);
    assert_eq!(body["currency"], "usd");
    assert!(body["clientSecret"].as_str().unwrap().starts_with("pi_"));
}

#[tokio::test]
async fn quote_for_unknown_flight_is_404() {
    let (router, _) = app_with(vec![], MockPaymentGateway::new()).await;
    let (status, body) = post_json(
        &router,
        "/api/payments/create-intent",
        json!({
            "flightId": Uuid::new_v4(),
            "passengerCount": 1,
            "email": "traveler@example.com",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn quote_beyond_remaining_seats_is_409() {
    let outbound = flight(12_500, 1);
    let outbound_id = outbound.id;
    let (router, _) = app_with(vec![outbound], MockPaymentGateway::new()).await;
    let (status, body) = post_json(
        &router,
        "/api/payments/create-intent",
        json!({
            "flightId": outbound_id,
            "passengerCount": 3,
            "email": "traveler@example.com",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "INSUFFICIENT_INVENTORY");
}

#[tokio::test]
async fn quote_with_bad_email_is_400() {
    let outbound = flight(12_500, 5);
    let outbound_id = outbound.id;
    let (router, _) = app_with(vec![outbound], MockPaymentGateway::new()).await;
    let (status, body) = post_json(
        &router,
        "/api/payments/create-intent",
        json!({
            "flightId": outbound_id,
            "passengerCount": 1,
            "email": "not-an-address",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn full_quote_then_commit_flow_books_two_passengers() {
    let outbound = flight(12_500, 5);
    let outbound_id = outbound.id;
    let (router, store) = app_with(vec![outbound], MockPaymentGateway::new()).await;

    let (status, quote) = post_json(
        &router,
        "/api/payments/create-intent",
        json!({
            "flightId": outbound_id,
            "passengerCount": 2,
            "email": "traveler@example.com",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let intent_id = intent_id_of(quote["clientSecret"].as_str().unwrap());

    let (status, body) = post_json(
        &router,
        "/api/bookings",
        commit_body(
            outbound_id,
            &intent_id,
            vec![passenger("Marie", "Joseph"), passenger("Jean", "Joseph")],
            quote["amount"].as_i64().unwrap() as i32,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["passengerCount"], 2);
    assert!(body["bookingReference"].as_str().unwrap().starts_with("TRG-"));

    assert_eq!(store.seats_available(outbound_id).await, Some(3));
    assert_eq!(store.booking_rows().await, 1);
    assert_eq!(store.passenger_rows().await, 2);
}

#[tokio::test]
async fn commit_with_unsettled_payment_is_402_and_writes_nothing() {
    let outbound = flight(12_500, 5);
    let outbound_id = outbound.id;
    let (router, store) = app_with(
        vec![outbound],
        MockPaymentGateway::with_status(12_500, PaymentStatus::Processing),
    )
    .await;

    let (status, body) = post_json(
        &router,
        "/api/bookings",
        commit_body(
            outbound_id,
            "pi_unsettled_123",
            vec![passenger("Marie", "Joseph")],
            12_500,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["error"], "PAYMENT_NOT_SETTLED");
    assert_eq!(store.booking_rows().await, 0);
    assert_eq!(store.passenger_rows().await, 0);
    assert_eq!(store.seats_available(outbound_id).await, Some(5));
}

#[tokio::test]
async fn commit_with_blank_last_name_is_400() {
    let outbound = flight(12_500, 5);
    let outbound_id = outbound.id;
    let (router, store) = app_with(vec![outbound], MockPaymentGateway::settled(12_500)).await;

    let (status, body) = post_json(
        &router,
        "/api/bookings",
        commit_body(
            outbound_id,
            "pi_blank_name",
            vec![passenger("Marie", "")],
            12_500,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(store.booking_rows().await, 0);
}

#[tokio::test]
async fn duplicate_commit_replays_the_original_booking() {
    let outbound = flight(12_500, 5);
    let outbound_id = outbound.id;
    let (router, store) = app_with(vec![outbound], MockPaymentGateway::settled(12_500)).await;

    let body = commit_body(
        outbound_id,
        "pi_duplicate_submit",
        vec![passenger("Marie", "Joseph")],
        12_500,
    );

    let (status, first) = post_json(&router, "/api/bookings", body.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, second) = post_json(&router, "/api/bookings", body).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(second["bookingReference"], first["bookingReference"]);
    assert_eq!(store.booking_rows().await, 1);
    assert_eq!(store.seats_available(outbound_id).await, Some(4));
}
