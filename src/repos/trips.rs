use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, trace};
use uuid::Uuid;

use crate::{database::PostgresConnection, models::TripModel, trips::domain::Trip};

#[derive(Debug, Error)]
pub enum TripLookupError {
    #[error("trip not found: {0}")]
    NotFound(Uuid),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DynTripRepo = Arc<dyn TripRepo + Send + Sync>;

#[async_trait]
pub trait TripRepo {
    /// Persist a new trip.
    async fn save(&self, trip: &Trip) -> anyhow::Result<()>;

    /// Get a single trip by its ID.
    ///
    /// # Returns
    ///
    /// The trip, or [`TripLookupError::NotFound`] if no trip has the given ID.
    async fn get_by_id(&self, trip_id: Uuid) -> Result<Trip, TripLookupError>;

    /// List every trip, most recent start date first.
    async fn get_all(&self) -> anyhow::Result<Vec<Trip>>;
}

#[async_trait]
impl TripRepo for PostgresConnection {
    async fn save(&self, trip: &Trip) -> anyhow::Result<()> {
        let model = TripModel::from(trip);

        sqlx::query(
            r#"
            INSERT INTO trip (id, start_date, end_date, is_international, daily_budget, currency)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(model.id)
        .bind(model.start_date)
        .bind(model.end_date)
        .bind(model.is_international)
        .bind(model.daily_budget)
        .bind(&model.currency)
        .execute(&**self)
        .await?;

        info!(trip_id = %model.id, "Persisted new trip.");

        Ok(())
    }

    async fn get_by_id(&self, trip_id: Uuid) -> Result<Trip, TripLookupError> {
        trace!(%trip_id, "Querying for trip by ID.");

        let model = sqlx::query_as::<_, TripModel>(
            r#"
            SELECT id, start_date, end_date, is_international, daily_budget, currency
            FROM trip
            WHERE id = $1
            "#,
        )
        .bind(trip_id)
        .fetch_optional(&**self)
        .await
        .map_err(anyhow::Error::from)?;

        match model {
            Some(model) => Ok(model.into()),
            None => {
                debug!(%trip_id, "Trip does not exist.");

                Err(TripLookupError::NotFound(trip_id))
            }
        }
    }

    async fn get_all(&self) -> anyhow::Result<Vec<Trip>> {
        let models = sqlx::query_as::<_, TripModel>(
            r#"
            SELECT id, start_date, end_date, is_international, daily_budget, currency
            FROM trip
            ORDER BY start_date DESC
            "#,
        )
        .fetch_all(&**self)
        .await?;

        Ok(models.into_iter().map(Trip::from).collect())
    }
}
