use chrono::NaiveDate;
use rust_decimal::Decimal;
use semval::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::currency::REPORTING_CURRENCY;

/// A trip with a daily budget.
///
/// The daily budget is always expressed in the reporting currency, even for
/// international trips whose expenses are made in another currency.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Trip {
    id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
    is_international: bool,
    daily_budget: Decimal,
    currency: String,
}

impl Trip {
    /// Rebuild a trip from previously persisted values.
    ///
    /// No validation is performed. New trips should be created through
    /// [`NewTrip::validated_from`].
    pub(crate) fn from_parts(
        id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        is_international: bool,
        daily_budget: Decimal,
        currency: String,
    ) -> Self {
        Self {
            id,
            start_date,
            end_date,
            is_international,
            daily_budget,
            currency,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn is_international(&self) -> bool {
        self.is_international
    }

    pub fn daily_budget(&self) -> Decimal {
        self.daily_budget
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Determine if the trip is active on a given date.
    ///
    /// A trip is active on every day between its start and end dates,
    /// including both ends.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// The number of calendar days covered by the trip, counting both the
    /// start and end date.
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

/// Data for a new trip provided by a user.
#[derive(Clone, Debug)]
pub struct NewTripData {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_international: bool,
    pub daily_budget: Decimal,
    /// Currency expenses on the trip are made in. Defaults to the reporting
    /// currency.
    pub currency: Option<String>,
}

/// A trip that passed validation but has not been persisted yet.
#[derive(Debug)]
pub struct NewTrip(Trip);

impl NewTrip {
    pub fn trip(&self) -> &Trip {
        &self.0
    }

    pub fn into_trip(self) -> Trip {
        self.0
    }
}

#[derive(Debug, Eq, PartialEq)]
pub enum TripInvalidity {
    /// The start date falls after the end date.
    Range {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },

    /// The daily budget is negative.
    NegativeBudget(Decimal),

    /// The currency is not a three letter code.
    Currency(String),
}

impl Validate for NewTrip {
    type Invalidity = TripInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        let trip = &self.0;

        ValidationContext::new()
            .invalidate_if(
                trip.start_date > trip.end_date,
                TripInvalidity::Range {
                    start_date: trip.start_date,
                    end_date: trip.end_date,
                },
            )
            .invalidate_if(
                trip.daily_budget < Decimal::ZERO,
                TripInvalidity::NegativeBudget(trip.daily_budget),
            )
            .invalidate_if(
                !is_currency_code(&trip.currency),
                TripInvalidity::Currency(trip.currency.clone()),
            )
            .into()
    }
}

fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase())
}

impl ValidatedFrom<NewTripData> for NewTrip {
    fn validated_from(from: NewTripData) -> ValidatedResult<Self> {
        let into = NewTrip(Trip {
            id: Uuid::new_v4(),
            start_date: from.start_date,
            end_date: from.end_date,
            is_international: from.is_international,
            daily_budget: from.daily_budget,
            currency: from
                .currency
                .map(|code| code.trim().to_uppercase())
                .unwrap_or_else(|| REPORTING_CURRENCY.to_owned()),
        });

        match into.validate() {
            Ok(()) => Ok(into),
            Err(context) => Err((into, context)),
        }
    }
}
