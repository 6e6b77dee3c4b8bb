//! Row layouts for the Postgres tables backing the stores.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    expenses::domain::{Expense, ExpenseType, PaymentMethod},
    trips::domain::Trip,
};

#[derive(Clone, Debug, FromRow)]
pub struct TripModel {
    pub id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_international: bool,
    pub daily_budget: Decimal,
    pub currency: String,
}

impl From<&Trip> for TripModel {
    fn from(trip: &Trip) -> Self {
        Self {
            id: trip.id(),
            start_date: trip.start_date(),
            end_date: trip.end_date(),
            is_international: trip.is_international(),
            daily_budget: trip.daily_budget(),
            currency: trip.currency().to_owned(),
        }
    }
}

impl From<TripModel> for Trip {
    fn from(model: TripModel) -> Self {
        Trip::from_parts(
            model.id,
            model.start_date,
            model.end_date,
            model.is_international,
            model.daily_budget,
            model.currency,
        )
    }
}

#[derive(Clone, Debug, FromRow)]
pub struct ExpenseModel {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub expense_date: NaiveDate,
    pub original_amount: Decimal,
    pub currency: String,
    pub converted_amount: Decimal,
    /// One of the [`PaymentMethod`] labels.
    pub payment_method: String,
    /// One of the [`ExpenseType`] labels.
    pub expense_type: String,
}

impl From<&Expense> for ExpenseModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id(),
            trip_id: expense.trip_id(),
            expense_date: expense.expense_date(),
            original_amount: expense.original_amount(),
            currency: expense.currency().to_owned(),
            converted_amount: expense.converted_amount(),
            payment_method: expense.payment_method().label().to_owned(),
            expense_type: expense.expense_type().label().to_owned(),
        }
    }
}

impl TryFrom<ExpenseModel> for Expense {
    type Error = anyhow::Error;

    fn try_from(model: ExpenseModel) -> Result<Self, Self::Error> {
        Ok(Expense::from_parts(
            model.id,
            model.trip_id,
            model.expense_date,
            model.original_amount,
            model.currency,
            model.converted_amount,
            model.payment_method.parse::<PaymentMethod>()?,
            model.expense_type.parse::<ExpenseType>()?,
        ))
    }
}
