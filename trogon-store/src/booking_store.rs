use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::warn;
use uuid::Uuid;

use trogon_core::booking::{Booking, BookingStatus, CommitOutcome, CommitRequest};
use trogon_core::country;
use trogon_core::error::BookingError;
use trogon_core::reference;
use trogon_core::repository::BookingStore;

const REFERENCE_ATTEMPTS: usize = 5;
const PAYMENT_INTENT_UNIQUE: &str = "bookings_payment_intent_id_key";

/// Transactional booking persistence over Postgres. Seat rows are only ever
/// mutated here, inside an open row-locked transaction.
pub struct PostgresBookingStore {
    pool: PgPool,
}

impl PostgresBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for PostgresBookingStore {
    async fn find_by_payment_intent(
        &self,
        intent_id: &str,
    ) -> Result<Option<Booking>, BookingError> {
        let row = sqlx::query(
            r#"
            SELECT id, reference, payment_intent_id, flight_id, return_flight_id,
                   total_price_amount, total_price_currency, contact_email, contact_phone,
                   status, passenger_count, departure_date, return_date, created_at
            FROM bookings
            WHERE payment_intent_id = $1
            "#,
        )
        .bind(intent_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(booking_from_row).transpose()
    }

    async fn commit_booking(
        &self,
        request: &CommitRequest,
        total_amount: i32,
        currency: &str,
    ) -> Result<CommitOutcome, BookingError> {
        let mut tx = self.pool.begin().await?;

        match commit_in_tx(&mut tx, request, total_amount, currency).await {
            Ok(outcome) => {
                tx.commit().await?;
                Ok(outcome)
            }
            Err(err) => {
                // A rollback failure is recorded but never masks the error
                // that aborted the commit.
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "rollback failed after aborted booking commit");
                }

                // A concurrent commit may have consumed the same authorization
                // in the window between the committer's replay check and our
                // insert. The unique constraint is the arbiter; the loser
                // replays the winner's booking.
                if let BookingError::Database(db_err) = &err {
                    if is_unique_violation(db_err, PAYMENT_INTENT_UNIQUE) {
                        if let Some(existing) = self
                            .find_by_payment_intent(&request.payment_intent_id)
                            .await?
                        {
                            return Ok(CommitOutcome {
                                booking_id: existing.id,
                                reference: existing.reference,
                                passenger_count: existing.passenger_count,
                                replayed: true,
                            });
                        }
                    }
                }

                Err(err)
            }
        }
    }
}

async fn commit_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    request: &CommitRequest,
    total_amount: i32,
    currency: &str,
) -> Result<CommitOutcome, BookingError> {
    let passenger_count = request.passengers.len() as i32;

    // Lock in sorted id order so commits on overlapping flight sets always
    // serialize the same way instead of deadlocking.
    let mut flight_ids = request.flight_ids();
    flight_ids.sort();

    let mut availability = Vec::with_capacity(flight_ids.len());
    for flight_id in &flight_ids {
        let row = sqlx::query("SELECT seats_available FROM flights WHERE id = $1 FOR UPDATE")
            .bind(flight_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("flight {flight_id}")))?;
        availability.push((*flight_id, row.try_get::<i32, _>("seats_available")?));
    }

    // Replay check under the row locks, before the inventory check: a
    // duplicate of the commit that consumed the last seats must replay the
    // winner's booking, not report the flight sold out.
    let existing = sqlx::query(
        "SELECT id, reference, passenger_count FROM bookings WHERE payment_intent_id = $1",
    )
    .bind(&request.payment_intent_id)
    .fetch_optional(&mut **tx)
    .await?;
    if let Some(row) = existing {
        return Ok(CommitOutcome {
            booking_id: row.try_get("id")?,
            reference: row.try_get("reference")?,
            passenger_count: row.try_get("passenger_count")?,
            replayed: true,
        });
    }

    // The authoritative check: the re-read happened under the row lock, so
    // no concurrent commit can consume these seats before we do.
    for (flight_id, available) in &availability {
        if *available < passenger_count {
            return Err(BookingError::InsufficientInventory {
                flight_id: *flight_id,
                requested: passenger_count,
                available: *available,
            });
        }
    }

    let booking_reference = unused_reference(tx).await?;
    let booking_id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO bookings (id, reference, payment_intent_id, flight_id, return_flight_id,
                              total_price_amount, total_price_currency, contact_email,
                              contact_phone, status, passenger_count, departure_date,
                              return_date, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(booking_id)
    .bind(&booking_reference)
    .bind(&request.payment_intent_id)
    .bind(request.flight_id)
    .bind(request.return_flight_id)
    .bind(total_amount)
    .bind(currency)
    .bind(&request.contact.email)
    .bind(&request.contact.phone)
    .bind(BookingStatus::Confirmed.as_str())
    .bind(passenger_count)
    .bind(request.departure_date)
    .bind(request.return_date)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;

    // Any single passenger insert failing aborts the whole transaction; a
    // partial passenger list is never committed.
    for passenger in &request.passengers {
        let resolved_country = passenger
            .country
            .as_deref()
            .map(|code| country::resolve(code).unwrap_or(code).to_string());

        sqlx::query(
            r#"
            INSERT INTO passengers (id, booking_id, first_name, last_name, date_of_birth,
                                    passenger_type, country, email, phone, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(booking_id)
        .bind(&passenger.first_name)
        .bind(&passenger.last_name)
        .bind(passenger.date_of_birth)
        .bind(passenger.passenger_type.as_str())
        .bind(resolved_country)
        .bind(&passenger.email)
        .bind(&passenger.phone)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?;
    }

    for flight_id in &flight_ids {
        sqlx::query("UPDATE flights SET seats_available = seats_available - $1 WHERE id = $2")
            .bind(passenger_count)
            .bind(flight_id)
            .execute(&mut **tx)
            .await?;
    }

    Ok(CommitOutcome {
        booking_id,
        reference: booking_reference,
        passenger_count,
        replayed: false,
    })
}

/// Generate a reference the bookings table does not contain yet, bounded to a
/// handful of attempts. The uniqueness constraint remains the backstop for
/// generations that race past this check.
async fn unused_reference(tx: &mut Transaction<'_, Postgres>) -> Result<String, BookingError> {
    for _ in 0..REFERENCE_ATTEMPTS {
        let candidate = reference::generate();
        let taken = sqlx::query("SELECT 1 FROM bookings WHERE reference = $1")
            .bind(&candidate)
            .fetch_optional(&mut **tx)
            .await?;
        if taken.is_none() {
            return Ok(candidate);
        }
    }
    Err(BookingError::Internal(
        "could not allocate an unused booking reference".to_string(),
    ))
}

fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.constraint() == Some(constraint))
}

fn booking_from_row(row: PgRow) -> Result<Booking, BookingError> {
    let status: String = row.try_get("status")?;
    Ok(Booking {
        id: row.try_get("id")?,
        reference: row.try_get("reference")?,
        payment_intent_id: row.try_get("payment_intent_id")?,
        flight_id: row.try_get("flight_id")?,
        return_flight_id: row.try_get("return_flight_id")?,
        total_price_amount: row.try_get("total_price_amount")?,
        total_price_currency: row.try_get("total_price_currency")?,
        contact_email: row.try_get("contact_email")?,
        contact_phone: row.try_get("contact_phone")?,
        status: BookingStatus::parse(&status)
            .ok_or_else(|| BookingError::Internal(format!("unknown booking status: {status}")))?,
        passenger_count: row.try_get("passenger_count")?,
        departure_date: row.try_get("departure_date")?,
        return_date: row.try_get("return_date")?,
        created_at: row.try_get("created_at")?,
    })
}
