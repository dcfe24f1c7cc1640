use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use trogon_core::booking::{
    Booking, BookingStatus, CommitOutcome, CommitRequest, Passenger,
};
use trogon_core::country;
use trogon_core::error::BookingError;
use trogon_core::flight::Flight;
use trogon_core::reference;
use trogon_core::repository::{BookingStore, FlightRepository};

const REFERENCE_ATTEMPTS: usize = 5;

/// In-memory flight and booking store. Backs local development runs and the
/// committer's tests; the single mutex plays the role the row locks play in
/// Postgres, so commits against overlapping flights serialize here too.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    flights: HashMap<Uuid, Flight>,
    bookings: Vec<Booking>,
    passengers: Vec<Passenger>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    pub async fn insert_flight(&self, flight: Flight) {
        self.inner.lock().await.flights.insert(flight.id, flight);
    }

    pub async fn seats_available(&self, flight_id: Uuid) -> Option<i32> {
        self.inner
            .lock()
            .await
            .flights
            .get(&flight_id)
            .map(|f| f.seats_available)
    }

    pub async fn booking_rows(&self) -> usize {
        self.inner.lock().await.bookings.len()
    }

    pub async fn passenger_rows(&self) -> usize {
        self.inner.lock().await.passengers.len()
    }

    pub async fn passengers_of(&self, booking_id: Uuid) -> Vec<Passenger> {
        self.inner
            .lock()
            .await
            .passengers
            .iter()
            .filter(|p| p.booking_id == booking_id)
            .cloned()
            .collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FlightRepository for MemoryStore {
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Flight>, BookingError> {
        let inner = self.inner.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.flights.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn find_by_payment_intent(
        &self,
        intent_id: &str,
    ) -> Result<Option<Booking>, BookingError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .bookings
            .iter()
            .find(|b| b.payment_intent_id == intent_id)
            .cloned())
    }

    async fn commit_booking(
        &self,
        request: &CommitRequest,
        total_amount: i32,
        currency: &str,
    ) -> Result<CommitOutcome, BookingError> {
        let passenger_count = request.passengers.len() as i32;
        let flight_ids = request.flight_ids();

        let mut inner = self.inner.lock().await;

        let mut availability = Vec::with_capacity(flight_ids.len());
        for flight_id in &flight_ids {
            let flight = inner
                .flights
                .get(flight_id)
                .ok_or_else(|| BookingError::NotFound(format!("flight {flight_id}")))?;
            availability.push((*flight_id, flight.seats_available));
        }

        // One authorization funds at most one booking. The replay check runs
        // before the inventory check: a duplicate of the commit that consumed
        // the last seats must replay, not report the flight sold out.
        if let Some(existing) = inner
            .bookings
            .iter()
            .find(|b| b.payment_intent_id == request.payment_intent_id)
        {
            return Ok(CommitOutcome {
                booking_id: existing.id,
                reference: existing.reference.clone(),
                passenger_count: existing.passenger_count,
                replayed: true,
            });
        }

        // Authoritative inventory check: nothing below mutates until every
        // referenced flight has passed it.
        for (flight_id, available) in &availability {
            if *available < passenger_count {
                return Err(BookingError::InsufficientInventory {
                    flight_id: *flight_id,
                    requested: passenger_count,
                    available: *available,
                });
            }
        }

        let mut booking_reference = reference::generate();
        let mut attempts = 1;
        while inner.bookings.iter().any(|b| b.reference == booking_reference) {
            if attempts >= REFERENCE_ATTEMPTS {
                return Err(BookingError::Internal(
                    "could not allocate an unused booking reference".to_string(),
                ));
            }
            booking_reference = reference::generate();
            attempts += 1;
        }

        let booking_id = Uuid::new_v4();
        let booking = Booking {
            id: booking_id,
            reference: booking_reference.clone(),
            payment_intent_id: request.payment_intent_id.clone(),
            flight_id: request.flight_id,
            return_flight_id: request.return_flight_id,
            total_price_amount: total_amount,
            total_price_currency: currency.to_string(),
            contact_email: request.contact.email.clone(),
            contact_phone: request.contact.phone.clone(),
            status: BookingStatus::Confirmed,
            passenger_count,
            departure_date: request.departure_date,
            return_date: request.return_date,
            created_at: Utc::now(),
        };

        let passengers: Vec<Passenger> = request
            .passengers
            .iter()
            .map(|p| Passenger {
                id: Uuid::new_v4(),
                booking_id,
                first_name: p.first_name.clone(),
                last_name: p.last_name.clone(),
                date_of_birth: p.date_of_birth,
                passenger_type: p.passenger_type,
                country: p
                    .country
                    .as_deref()
                    .map(|code| country::resolve(code).unwrap_or(code).to_string()),
                email: p.email.clone(),
                phone: p.phone.clone(),
            })
            .collect();

        inner.bookings.push(booking);
        inner.passengers.extend(passengers);
        for flight_id in &flight_ids {
            if let Some(flight) = inner.flights.get_mut(flight_id) {
                flight.seats_available -= passenger_count;
            }
        }

        Ok(CommitOutcome {
            booking_id,
            reference: booking_reference,
            passenger_count,
            replayed: false,
        })
    }
}
