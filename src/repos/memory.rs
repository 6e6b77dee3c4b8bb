use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{expenses::domain::Expense, trips::domain::Trip};

use super::{ExpenseRepo, TripLookupError, TripRepo};

/// A store that keeps trips and expenses in memory.
///
/// Writes are visible to reads as soon as `save` returns. Nothing is kept
/// once the store is dropped.
#[derive(Default)]
pub struct MemoryStore {
    trips: RwLock<HashMap<Uuid, Trip>>,
    expenses: RwLock<Vec<Expense>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of expenses saved so far.
    pub async fn expense_count(&self) -> usize {
        self.expenses.read().await.len()
    }
}

#[async_trait]
impl TripRepo for MemoryStore {
    async fn save(&self, trip: &Trip) -> anyhow::Result<()> {
        self.trips.write().await.insert(trip.id(), trip.clone());

        Ok(())
    }

    async fn get_by_id(&self, trip_id: Uuid) -> Result<Trip, TripLookupError> {
        self.trips
            .read()
            .await
            .get(&trip_id)
            .cloned()
            .ok_or(TripLookupError::NotFound(trip_id))
    }

    async fn get_all(&self) -> anyhow::Result<Vec<Trip>> {
        let mut trips = self.trips.read().await.values().cloned().collect::<Vec<_>>();
        trips.sort_by(|a, b| b.start_date().cmp(&a.start_date()));

        Ok(trips)
    }
}

#[async_trait]
impl ExpenseRepo for MemoryStore {
    async fn save(&self, expense: &Expense) -> anyhow::Result<()> {
        self.expenses.write().await.push(expense.clone());

        Ok(())
    }

    async fn get_by_trip_id(&self, trip_id: Uuid) -> anyhow::Result<Vec<Expense>> {
        Ok(self
            .expenses
            .read()
            .await
            .iter()
            .filter(|expense| expense.trip_id() == trip_id)
            .cloned()
            .collect())
    }

    async fn get_by_trip_and_date(
        &self,
        trip_id: Uuid,
        expense_date: NaiveDate,
    ) -> anyhow::Result<Vec<Expense>> {
        Ok(self
            .expenses
            .read()
            .await
            .iter()
            .filter(|expense| {
                expense.trip_id() == trip_id && expense.expense_date() == expense_date
            })
            .cloned()
            .collect())
    }
}
