use std::{fmt, str::FromStr};

use anyhow::anyhow;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::trips::domain::Trip;

/// How an expense was paid for.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum PaymentMethod {
    Cash,
    Card,
}

/// What an expense was spent on.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum ExpenseType {
    Transportation,
    Accommodation,
    Food,
    Entertainment,
    Shopping,
    Other,
}

#[derive(Debug, Eq, Error, PartialEq)]
#[error("unrecognized {kind}: {value:?}")]
pub struct UnknownLabel {
    kind: &'static str,
    value: String,
}

impl PaymentMethod {
    /// The canonical label used when persisting or displaying the method.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Card => "Card",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownLabel;

    /// Parse a payment method from its label, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cash" => Ok(Self::Cash),
            "card" => Ok(Self::Card),
            _ => Err(UnknownLabel {
                kind: "payment method",
                value: s.to_owned(),
            }),
        }
    }
}

impl ExpenseType {
    pub const ALL: [ExpenseType; 6] = [
        Self::Transportation,
        Self::Accommodation,
        Self::Food,
        Self::Entertainment,
        Self::Shopping,
        Self::Other,
    ];

    /// The canonical label used when persisting or displaying the type.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Transportation => "Transportation",
            Self::Accommodation => "Accommodation",
            Self::Food => "Food",
            Self::Entertainment => "Entertainment",
            Self::Shopping => "Shopping",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for ExpenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExpenseType {
    type Err = UnknownLabel;

    /// Parse an expense type from its label, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|expense_type| expense_type.label().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| UnknownLabel {
                kind: "expense type",
                value: s.to_owned(),
            })
    }
}

/// Data for a new expense provided by a user.
#[derive(Clone, Debug)]
pub struct NewExpenseData {
    pub trip_id: Uuid,
    pub expense_date: NaiveDate,
    /// The amount spent, in the trip's currency.
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub expense_type: ExpenseType,
}

/// An expense whose amount has not been converted to the reporting currency
/// yet.
///
/// The only way to obtain an [`Expense`] from a draft is to supply the
/// converted amount, which consumes the draft.
#[derive(Debug, PartialEq)]
pub struct ExpenseDraft {
    id: Uuid,
    trip_id: Uuid,
    expense_date: NaiveDate,
    original_amount: Decimal,
    currency: String,
    payment_method: PaymentMethod,
    expense_type: ExpenseType,
}

impl ExpenseDraft {
    /// Start a new expense against a trip. The original amount is taken to be
    /// in the trip's currency.
    pub fn new(trip: &Trip, data: NewExpenseData) -> Self {
        Self {
            id: Uuid::new_v4(),
            trip_id: data.trip_id,
            expense_date: data.expense_date,
            original_amount: data.amount,
            currency: trip.currency().to_owned(),
            payment_method: data.payment_method,
            expense_type: data.expense_type,
        }
    }

    pub fn original_amount(&self) -> Decimal {
        self.original_amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Finish the expense with its value in the reporting currency.
    pub fn convert(self, converted_amount: Decimal) -> Expense {
        Expense {
            id: self.id,
            trip_id: self.trip_id,
            expense_date: self.expense_date,
            original_amount: self.original_amount,
            currency: self.currency,
            converted_amount,
            payment_method: self.payment_method,
            expense_type: self.expense_type,
        }
    }
}

/// An expense made during a trip.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Expense {
    id: Uuid,
    trip_id: Uuid,
    expense_date: NaiveDate,
    original_amount: Decimal,
    currency: String,
    converted_amount: Decimal,
    payment_method: PaymentMethod,
    expense_type: ExpenseType,
}

impl Expense {
    /// Rebuild an expense from previously persisted values.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: Uuid,
        trip_id: Uuid,
        expense_date: NaiveDate,
        original_amount: Decimal,
        currency: String,
        converted_amount: Decimal,
        payment_method: PaymentMethod,
        expense_type: ExpenseType,
    ) -> Self {
        Self {
            id,
            trip_id,
            expense_date,
            original_amount,
            currency,
            converted_amount,
            payment_method,
            expense_type,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn trip_id(&self) -> Uuid {
        self.trip_id
    }

    pub fn expense_date(&self) -> NaiveDate {
        self.expense_date
    }

    pub fn original_amount(&self) -> Decimal {
        self.original_amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// The expense's value in the reporting currency.
    pub fn converted_amount(&self) -> Decimal {
        self.converted_amount
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn expense_type(&self) -> ExpenseType {
        self.expense_type
    }
}

/// Add up the converted amounts of a set of expenses.
///
/// Fails instead of overflowing.
pub fn total_converted(expenses: &[Expense]) -> anyhow::Result<Decimal> {
    expenses.iter().try_fold(Decimal::ZERO, |total, expense| {
        total
            .checked_add(expense.converted_amount())
            .ok_or_else(|| anyhow!("total of converted amounts overflowed"))
    })
}
