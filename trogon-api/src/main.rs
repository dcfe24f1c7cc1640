use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trogon_api::mailer::LogMailer;
use trogon_api::{app, AppState};
use trogon_booking::{BookingCommitter, FareQuoteCalculator, MockPaymentGateway, StripeGateway};
use trogon_core::payment::PaymentGateway;
use trogon_core::repository::{BookingStore, FlightRepository};
use trogon_store::{DbClient, PostgresBookingStore, PostgresFlightRepository};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trogon_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = trogon_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Trogon booking API on port {}", config.server.port);

    // The one pool this process ever builds; everything borrows it from here.
    let db = DbClient::new(&config.database)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let flights: Arc<dyn FlightRepository> =
        Arc::new(PostgresFlightRepository::new(db.pool.clone()));
    let store: Arc<dyn BookingStore> = Arc::new(PostgresBookingStore::new(db.pool.clone()));

    let payments: Arc<dyn PaymentGateway> = match &config.payment.stripe_secret_key {
        Some(secret_key) => Arc::new(
            StripeGateway::new(
                secret_key.clone(),
                Duration::from_secs(config.payment.provider_timeout_seconds),
            )
            .expect("Failed to build payment client"),
        ),
        None => {
            tracing::warn!("No Stripe secret key configured, using the mock payment gateway");
            Arc::new(MockPaymentGateway::new())
        }
    };

    let state = AppState {
        quotes: Arc::new(FareQuoteCalculator::new(flights)),
        committer: Arc::new(BookingCommitter::new(store, payments.clone())),
        payments,
        mailer: Arc::new(LogMailer),
    };

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
