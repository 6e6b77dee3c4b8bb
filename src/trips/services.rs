use chrono::NaiveDate;
use rust_decimal::Decimal;
use semval::ValidatedFrom;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    clock::DynClock,
    repos::{DynTripRepo, TripLookupError},
};

use super::domain::{NewTrip, NewTripData, Trip, TripInvalidity};

#[derive(Debug, Error)]
pub enum CreateTripError {
    #[error("trip starts on {start_date} but ends on {end_date}")]
    InvalidTripRange {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },

    #[error("daily budget may not be negative: {0}")]
    InvalidBudget(Decimal),

    #[error("not a three letter currency code: {0:?}")]
    InvalidCurrency(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<TripInvalidity> for CreateTripError {
    fn from(invalidity: TripInvalidity) -> Self {
        match invalidity {
            TripInvalidity::Range {
                start_date,
                end_date,
            } => Self::InvalidTripRange {
                start_date,
                end_date,
            },
            TripInvalidity::NegativeBudget(budget) => Self::InvalidBudget(budget),
            TripInvalidity::Currency(code) => Self::InvalidCurrency(code),
        }
    }
}

/// A service object for creating and listing trips.
#[derive(Clone)]
pub struct TripService {
    clock: DynClock,
    trip_repo: DynTripRepo,
}

impl TripService {
    pub fn new(clock: DynClock, trip_repo: DynTripRepo) -> Self {
        Self { clock, trip_repo }
    }

    /// Create and persist a new trip.
    ///
    /// If the data breaks more than one rule, the date range is reported
    /// before the budget.
    pub async fn create_trip(&self, data: NewTripData) -> Result<Trip, CreateTripError> {
        let new_trip = NewTrip::validated_from(data).map_err(|(_, context)| {
            debug!(?context, "New trip failed validation.");

            context
                .into_iter()
                .next()
                .map(CreateTripError::from)
                .unwrap_or_else(|| anyhow::anyhow!("validation failed without a reason").into())
        })?;

        self.trip_repo.save(new_trip.trip()).await?;

        let trip = new_trip.into_trip();
        info!(trip_id = %trip.id(), "Created trip.");

        Ok(trip)
    }

    pub async fn get_trip_by_id(&self, trip_id: Uuid) -> Result<Trip, TripLookupError> {
        self.trip_repo.get_by_id(trip_id).await
    }

    /// List every trip in the order provided by the store.
    pub async fn get_all_trips(&self) -> anyhow::Result<Vec<Trip>> {
        self.trip_repo.get_all().await
    }

    /// List the trips that are active today, keeping the store's order.
    pub async fn get_active_trips(&self) -> anyhow::Result<Vec<Trip>> {
        let today = self.clock.today();

        Ok(self
            .trip_repo
            .get_all()
            .await?
            .into_iter()
            .filter(|trip| trip.is_active_on(today))
            .collect())
    }
}
