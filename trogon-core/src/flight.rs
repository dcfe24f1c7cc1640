use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Plane,
    Helicopter,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Plane => "plane",
            TravelMode::Helicopter => "helicopter",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "plane" => Some(TravelMode::Plane),
            "helicopter" => Some(TravelMode::Helicopter),
            _ => None,
        }
    }
}

/// A scheduled flight. `seats_available` is the remaining bookable capacity;
/// it only decreases inside a committed booking transaction and never goes
/// negative (the row carries a CHECK constraint as backstop).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    pub id: Uuid,
    pub flight_number: String,
    pub mode: TravelMode,
    pub origin: String,
    pub destination: String,
    pub scheduled_departure: DateTime<Utc>,
    pub scheduled_arrival: DateTime<Utc>,
    /// Per-seat price in minor units of `price_currency`.
    pub price_amount: i32,
    pub price_currency: String,
    pub seats_available: i32,
}
