use std::sync::Arc;

use uuid::Uuid;

use trogon_core::error::BookingError;
use trogon_core::repository::FlightRepository;

/// An authoritative fare quote: total in minor units for the exact flights
/// and passenger count supplied.
#[derive(Debug, Clone)]
pub struct FareQuote {
    pub amount: i32,
    pub currency: String,
    pub flight_ids: Vec<Uuid>,
    pub passenger_count: i32,
}

/// Computes quote totals from stored per-seat prices. Read-only: a user may
/// abandon checkout and re-quote any number of times without side effects.
pub struct FareQuoteCalculator {
    flights: Arc<dyn FlightRepository>,
}

impl FareQuoteCalculator {
    pub fn new(flights: Arc<dyn FlightRepository>) -> Self {
        Self { flights }
    }

    /// Price `passenger_count` seats on the outbound flight plus the optional
    /// return flight.
    ///
    /// The inventory check here is advisory only: it gives fast feedback at
    /// checkout but reserves nothing. The authoritative check happens under
    /// row lock at commit time.
    pub async fn quote(
        &self,
        flight_id: Uuid,
        return_flight_id: Option<Uuid>,
        passenger_count: i32,
    ) -> Result<FareQuote, BookingError> {
        if passenger_count < 1 {
            return Err(BookingError::Validation(
                "passengerCount must be at least 1".to_string(),
            ));
        }
        if return_flight_id == Some(flight_id) {
            return Err(BookingError::Validation(
                "return flight must differ from the outbound flight".to_string(),
            ));
        }

        let mut flight_ids = vec![flight_id];
        if let Some(return_id) = return_flight_id {
            flight_ids.push(return_id);
        }

        let flights = self.flights.find_by_ids(&flight_ids).await?;

        let mut amount: i32 = 0;
        let mut currency: Option<String> = None;
        for id in &flight_ids {
            let flight = flights
                .iter()
                .find(|f| f.id == *id)
                .ok_or_else(|| BookingError::NotFound(format!("flight {id}")))?;

            if flight.seats_available < passenger_count {
                return Err(BookingError::InsufficientInventory {
                    flight_id: flight.id,
                    requested: passenger_count,
                    available: flight.seats_available,
                });
            }

            match &currency {
                None => currency = Some(flight.price_currency.clone()),
                Some(existing) if *existing != flight.price_currency => {
                    return Err(BookingError::Validation(
                        "outbound and return flights are priced in different currencies"
                            .to_string(),
                    ));
                }
                Some(_) => {}
            }

            let leg = flight
                .price_amount
                .checked_mul(passenger_count)
                .ok_or_else(|| BookingError::Internal("fare total overflow".to_string()))?;
            amount = amount
                .checked_add(leg)
                .ok_or_else(|| BookingError::Internal("fare total overflow".to_string()))?;
        }

        Ok(FareQuote {
            amount,
            // passenger_count >= 1 guarantees at least one leg was priced
            currency: currency.unwrap_or_else(|| "usd".to_string()),
            flight_ids,
            passenger_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use chrono::{Duration, Utc};
    use trogon_core::flight::{Flight, TravelMode};

    fn flight(price_amount: i32, seats_available: i32) -> Flight {
        let departure = Utc::now() + Duration::days(7);
        Flight {
            id: Uuid::new_v4(),
            flight_number: "TR101".to_string(),
            mode: TravelMode::Plane,
            origin: "PAP".to_string(),
            destination: "CAP".to_string(),
            scheduled_departure: departure,
            scheduled_arrival: departure + Duration::minutes(35),
            price_amount,
            price_currency: "usd".to_string(),
            seats_available,
        }
    }

    async fn calculator_with(flights: Vec<Flight>) -> (FareQuoteCalculator, Vec<Uuid>) {
        let store = Arc::new(MemoryStore::new());
        let mut ids = Vec::new();
        for f in flights {
            ids.push(f.id);
            store.insert_flight(f).await;
        }
        (FareQuoteCalculator::new(store), ids)
    }

    #[tokio::test]
    async fn one_way_total_is_price_times_count() {
        let (calc, ids) = calculator_with(vec![flight(12_500, 10)]).await;
        let quote = calc.quote(ids[0], None, 3).await.unwrap();
        assert_eq!(quote.amount, 37_500);
        assert_eq!(quote.currency, "usd");
        assert_eq!(quote.flight_ids, ids);
    }

    #[tokio::test]
    async fn round_trip_sums_both_legs() {
        let (calc, ids) = calculator_with(vec![flight(12_500, 10), flight(9_900, 10)]).await;
        let quote = calc.quote(ids[0], Some(ids[1]), 2).await.unwrap();
        assert_eq!(quote.amount, 2 * 12_500 + 2 * 9_900);
    }

    #[tokio::test]
    async fn unknown_flight_is_not_found() {
        let (calc, _) = calculator_with(vec![]).await;
        let err = calc.quote(Uuid::new_v4(), None, 1).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound(_)));
    }

    #[tokio::test]
    async fn advisory_inventory_check_rejects_oversized_parties() {
        let (calc, ids) = calculator_with(vec![flight(12_500, 2)]).await;
        let err = calc.quote(ids[0], None, 3).await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::InsufficientInventory { available: 2, requested: 3, .. }
        ));
    }

    #[tokio::test]
    async fn zero_passengers_is_a_validation_error() {
        let (calc, ids) = calculator_with(vec![flight(12_500, 5)]).await;
        let err = calc.quote(ids[0], None, 0).await.unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
    }

    #[tokio::test]
    async fn same_flight_both_ways_is_rejected() {
        let (calc, ids) = calculator_with(vec![flight(12_500, 5)]).await;
        let err = calc.quote(ids[0], Some(ids[0]), 1).await.unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
    }
}
