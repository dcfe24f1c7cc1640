use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use trogon_core::error::BookingError;
use trogon_core::flight::{Flight, TravelMode};
use trogon_core::repository::FlightRepository;

pub struct PostgresFlightRepository {
    pool: PgPool,
}

impl PostgresFlightRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FlightRepository for PostgresFlightRepository {
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Flight>, BookingError> {
        let rows = sqlx::query(
            r#"
            SELECT id, flight_number, mode, origin, destination,
                   scheduled_departure, scheduled_arrival,
                   price_amount, price_currency, seats_available
            FROM flights
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(flight_from_row).collect()
    }
}

pub(crate) fn flight_from_row(row: PgRow) -> Result<Flight, BookingError> {
    let mode: String = row.try_get("mode")?;
    Ok(Flight {
        id: row.try_get("id")?,
        flight_number: row.try_get("flight_number")?,
        mode: TravelMode::parse(&mode)
            .ok_or_else(|| BookingError::Internal(format!("unknown travel mode: {mode}")))?,
        origin: row.try_get("origin")?,
        destination: row.try_get("destination")?,
        scheduled_departure: row.try_get("scheduled_departure")?,
        scheduled_arrival: row.try_get("scheduled_arrival")?,
        price_amount: row.try_get("price_amount")?,
        price_currency: row.try_get("price_currency")?,
        seats_available: row.try_get("seats_available")?,
    })
}
