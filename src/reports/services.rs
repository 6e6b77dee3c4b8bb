use anyhow::anyhow;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::trace;
use uuid::Uuid;

use crate::{
    clock::DynClock,
    expenses::domain::{total_converted, Expense},
    repos::{DynExpenseRepo, DynTripRepo, TripLookupError},
    trips::domain::Trip,
};

use super::domain::{
    average_per_day, breakdown_by, DailyReport, DashboardStats, TripSummary, TypeReport,
};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("trip not found: {0}")]
    TripNotFound(Uuid),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<TripLookupError> for ReportError {
    fn from(error: TripLookupError) -> Self {
        match error {
            TripLookupError::NotFound(trip_id) => Self::TripNotFound(trip_id),
            TripLookupError::Other(other) => Self::Other(other),
        }
    }
}

/// A service object for read-only views over persisted expenses.
///
/// Every amount it reports is a converted amount, so it never needs a
/// currency converter.
#[derive(Clone)]
pub struct ReportService {
    clock: DynClock,
    expense_repo: DynExpenseRepo,
    trip_repo: DynTripRepo,
}

impl ReportService {
    pub fn new(clock: DynClock, expense_repo: DynExpenseRepo, trip_repo: DynTripRepo) -> Self {
        Self {
            clock,
            expense_repo,
            trip_repo,
        }
    }

    /// Break a trip's expenses down by date and payment method.
    ///
    /// The trip itself is not looked up. An unknown trip ID produces an empty
    /// report, so callers that need to tell the two apart must check the trip
    /// separately.
    pub async fn generate_daily_expense_report(&self, trip_id: Uuid) -> anyhow::Result<DailyReport> {
        trace!(%trip_id, "Generating daily expense report.");

        let expenses = self.expense_repo.get_by_trip_id(trip_id).await?;

        breakdown_by(&expenses, Expense::expense_date)
    }

    /// Break a trip's expenses down by expense type and payment method.
    ///
    /// Like the daily report, this does not check that the trip exists.
    pub async fn generate_expense_type_report(&self, trip_id: Uuid) -> anyhow::Result<TypeReport> {
        trace!(%trip_id, "Generating expense type report.");

        let expenses = self.expense_repo.get_by_trip_id(trip_id).await?;

        breakdown_by(&expenses, Expense::expense_type)
    }

    pub async fn get_trip_summary(&self, trip_id: Uuid) -> Result<TripSummary, ReportError> {
        let trip = self.trip_repo.get_by_id(trip_id).await?;
        let total_expenses = self.total_expenses(&trip).await?;

        Ok(TripSummary::new(
            trip.daily_budget(),
            trip.days(),
            total_expenses,
        )?)
    }

    async fn total_expenses(&self, trip: &Trip) -> anyhow::Result<Decimal> {
        let expenses = self.expense_repo.get_by_trip_id(trip.id()).await?;

        total_converted(&expenses)
    }

    /// Aggregate spending across every trip.
    pub async fn dashboard_stats(&self) -> anyhow::Result<DashboardStats> {
        let today = self.clock.today();
        let trips = self.trip_repo.get_all().await?;

        let mut total_expenses = Decimal::ZERO;
        let mut total_days: i64 = 0;
        for trip in &trips {
            total_expenses = total_expenses
                .checked_add(self.total_expenses(trip).await?)
                .ok_or_else(|| anyhow!("dashboard expense total overflowed"))?;
            total_days = total_days.saturating_add(trip.days());
        }

        Ok(DashboardStats {
            total_trips: trips.len(),
            active_trips: trips.iter().filter(|trip| trip.is_active_on(today)).count(),
            total_expenses,
            average_daily_expense: average_per_day(total_expenses, total_days),
        })
    }
}
