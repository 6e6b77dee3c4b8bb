use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::trips::domain::Trip;

#[derive(Serialize)]
pub struct ResourceCollection<T: Serialize> {
    pub items: Vec<T>,
}

/// A trip along with whether it is active today.
#[derive(Serialize)]
pub struct TripRep {
    #[serde(flatten)]
    pub trip: Trip,
    pub is_active: bool,
}

impl TripRep {
    pub fn new(trip: Trip, today: NaiveDate) -> Self {
        Self {
            is_active: trip.is_active_on(today),
            trip,
        }
    }
}

#[derive(Serialize)]
pub struct DailyDifference {
    pub trip_id: Uuid,
    pub date: NaiveDate,
    pub difference: Decimal,
}
