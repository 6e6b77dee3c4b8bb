use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{info, trace};
use uuid::Uuid;

use crate::{database::PostgresConnection, expenses::domain::Expense, models::ExpenseModel};

pub type DynExpenseRepo = Arc<dyn ExpenseRepo + Send + Sync>;

#[async_trait]
pub trait ExpenseRepo {
    /// Persist a new expense. Once this returns, the expense must be visible
    /// to subsequent reads.
    async fn save(&self, expense: &Expense) -> anyhow::Result<()>;

    /// List every expense attached to a trip.
    async fn get_by_trip_id(&self, trip_id: Uuid) -> anyhow::Result<Vec<Expense>>;

    /// List the expenses attached to a trip that were made on a specific
    /// date.
    async fn get_by_trip_and_date(
        &self,
        trip_id: Uuid,
        expense_date: NaiveDate,
    ) -> anyhow::Result<Vec<Expense>>;
}

fn into_domain(models: Vec<ExpenseModel>) -> anyhow::Result<Vec<Expense>> {
    models.into_iter().map(Expense::try_from).collect()
}

#[async_trait]
impl ExpenseRepo for PostgresConnection {
    async fn save(&self, expense: &Expense) -> anyhow::Result<()> {
        let model = ExpenseModel::from(expense);

        sqlx::query(
            r#"
            INSERT INTO expense (
                id, trip_id, expense_date, original_amount, currency,
                converted_amount, payment_method, expense_type
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(model.id)
        .bind(model.trip_id)
        .bind(model.expense_date)
        .bind(model.original_amount)
        .bind(&model.currency)
        .bind(model.converted_amount)
        .bind(&model.payment_method)
        .bind(&model.expense_type)
        .execute(&**self)
        .await?;

        info!(expense_id = %model.id, trip_id = %model.trip_id, "Persisted new expense.");

        Ok(())
    }

    async fn get_by_trip_id(&self, trip_id: Uuid) -> anyhow::Result<Vec<Expense>> {
        trace!(%trip_id, "Querying for trip expenses.");

        let models = sqlx::query_as::<_, ExpenseModel>(
            r#"
            SELECT id, trip_id, expense_date, original_amount, currency,
                converted_amount, payment_method, expense_type
            FROM expense
            WHERE trip_id = $1
            ORDER BY expense_date, created_at
            "#,
        )
        .bind(trip_id)
        .fetch_all(&**self)
        .await?;

        into_domain(models)
    }

    async fn get_by_trip_and_date(
        &self,
        trip_id: Uuid,
        expense_date: NaiveDate,
    ) -> anyhow::Result<Vec<Expense>> {
        trace!(%trip_id, %expense_date, "Querying for trip expenses on date.");

        let models = sqlx::query_as::<_, ExpenseModel>(
            r#"
            SELECT id, trip_id, expense_date, original_amount, currency,
                converted_amount, payment_method, expense_type
            FROM expense
            WHERE trip_id = $1 AND expense_date = $2
            ORDER BY created_at
            "#,
        )
        .bind(trip_id)
        .bind(expense_date)
        .fetch_all(&**self)
        .await?;

        into_domain(models)
    }
}
