use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassengerType {
    Adult,
    Child,
    Infant,
}

impl PassengerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassengerType::Adult => "adult",
            PassengerType::Child => "child",
            PassengerType::Infant => "infant",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "adult" => Some(PassengerType::Adult),
            "child" => Some(PassengerType::Child),
            "infant" => Some(PassengerType::Infant),
            _ => None,
        }
    }
}

/// `Confirmed` is the only status the commit protocol ever writes. Downstream
/// cancellation flows, if any, own everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Confirmed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "CONFIRMED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "CONFIRMED" => Some(BookingStatus::Confirmed),
            _ => None,
        }
    }
}

/// A durably committed booking. Created exactly once per successful commit
/// and never mutated afterward by this core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub reference: String,
    /// Provider identifier of the settled payment authorization. Unique: one
    /// authorization buys at most one booking.
    pub payment_intent_id: String,
    pub flight_id: Uuid,
    pub return_flight_id: Option<Uuid>,
    pub total_price_amount: i32,
    pub total_price_currency: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub status: BookingStatus,
    pub passenger_count: i32,
    pub departure_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// A passenger belongs to exactly one booking and is created in the same
/// transaction as it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passenger {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub passenger_type: PassengerType,
    pub country: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: String,
    pub phone: Option<String>,
}

/// Passenger details as submitted at commit time, before a booking id exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassengerDetails {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub passenger_type: PassengerType,
    pub country: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Everything a commit call carries. `total_price_amount` is the client's
/// echo of the quote and is only ever compared against the authorization
/// amount, never stored.
#[derive(Debug, Clone)]
pub struct CommitRequest {
    pub payment_intent_id: String,
    pub flight_id: Uuid,
    pub return_flight_id: Option<Uuid>,
    pub passengers: Vec<PassengerDetails>,
    pub contact: ContactInfo,
    pub total_price_amount: i32,
    pub departure_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
}

impl CommitRequest {
    /// Referenced flight ids, outbound first, without duplicates.
    pub fn flight_ids(&self) -> Vec<Uuid> {
        let mut ids = vec![self.flight_id];
        if let Some(return_id) = self.return_flight_id {
            if return_id != self.flight_id {
                ids.push(return_id);
            }
        }
        ids
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommitOutcome {
    pub booking_id: Uuid,
    pub reference: String,
    pub passenger_count: i32,
    /// True when the payment authorization had already been consumed and the
    /// original booking was returned instead of a duplicate.
    pub replayed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passenger_type_storage_form() {
        assert_eq!(PassengerType::parse("adult"), Some(PassengerType::Adult));
        assert_eq!(PassengerType::parse("infant"), Some(PassengerType::Infant));
        assert_eq!(PassengerType::parse("senior"), None);
        assert_eq!(PassengerType::Child.as_str(), "child");
    }

    #[test]
    fn flight_ids_deduplicates_return_leg() {
        let outbound = Uuid::new_v4();
        let request = CommitRequest {
            payment_intent_id: "pi_test".to_string(),
            flight_id: outbound,
            return_flight_id: Some(outbound),
            passengers: vec![],
            contact: ContactInfo {
                email: "x@example.com".to_string(),
                phone: None,
            },
            total_price_amount: 0,
            departure_date: None,
            return_date: None,
        };
        assert_eq!(request.flight_ids(), vec![outbound]);
    }
}
