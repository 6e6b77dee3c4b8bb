use std::collections::BTreeMap;

use anyhow::anyhow;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::expenses::domain::{Expense, ExpenseType, PaymentMethod};

/// Converted amounts split by how they were paid.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PaymentBreakdown {
    pub cash: Decimal,
    pub card: Decimal,
    pub total: Decimal,
}

impl PaymentBreakdown {
    /// Add an expense's converted amount to its payment bucket and the total.
    ///
    /// The breakdown is left untouched if either sum would overflow.
    pub fn add(&mut self, expense: &Expense) -> anyhow::Result<()> {
        let amount = expense.converted_amount();
        let overflow = || anyhow!("payment breakdown overflowed");

        let total = self.total.checked_add(amount).ok_or_else(overflow)?;
        let bucket = match expense.payment_method() {
            PaymentMethod::Cash => &mut self.cash,
            PaymentMethod::Card => &mut self.card,
        };
        *bucket = bucket.checked_add(amount).ok_or_else(overflow)?;
        self.total = total;

        Ok(())
    }
}

pub type DailyReport = BTreeMap<NaiveDate, PaymentBreakdown>;

pub type TypeReport = BTreeMap<ExpenseType, PaymentBreakdown>;

/// Group expenses by a key, keeping only the keys that occur.
pub fn breakdown_by<K, F>(
    expenses: &[Expense],
    key: F,
) -> anyhow::Result<BTreeMap<K, PaymentBreakdown>>
where
    K: Ord,
    F: Fn(&Expense) -> K,
{
    let mut report = BTreeMap::new();

    for expense in expenses {
        report
            .entry(key(expense))
            .or_insert_with(PaymentBreakdown::default)
            .add(expense)?;
    }

    Ok(report)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TripSummary {
    pub total_expenses: Decimal,
    pub total_budget: Decimal,
    pub remaining_budget: Decimal,
    pub trip_days: i64,
    pub average_daily_expense: Decimal,
}

impl TripSummary {
    /// Summarize a trip's spending against its whole-trip budget.
    pub fn new(
        daily_budget: Decimal,
        trip_days: i64,
        total_expenses: Decimal,
    ) -> anyhow::Result<Self> {
        let total_budget = daily_budget
            .checked_mul(Decimal::from(trip_days))
            .ok_or_else(|| anyhow!("total budget overflowed"))?;
        let remaining_budget = total_budget
            .checked_sub(total_expenses)
            .ok_or_else(|| anyhow!("remaining budget overflowed"))?;

        Ok(Self {
            total_expenses,
            total_budget,
            remaining_budget,
            trip_days,
            average_daily_expense: average_per_day(total_expenses, trip_days),
        })
    }
}

/// Totals across every trip.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_trips: usize,
    pub active_trips: usize,
    pub total_expenses: Decimal,
    pub average_daily_expense: Decimal,
}

/// Average an amount over a number of days, or zero without any days.
pub(crate) fn average_per_day(total: Decimal, days: i64) -> Decimal {
    if days <= 0 {
        Decimal::ZERO
    } else {
        total / Decimal::from(days)
    }
}

#[cfg(test)]
mod test {
    use uuid::Uuid;

    use super::*;
    use crate::test_support::{date, dec};

    fn expense(day: u32, amount: i64, payment_method: PaymentMethod) -> Expense {
        Expense::from_parts(
            Uuid::new_v4(),
            Uuid::nil(),
            date(2025, 6, day),
            dec(amount),
            "COP".to_owned(),
            dec(amount),
            payment_method,
            ExpenseType::Food,
        )
    }

    #[test]
    fn breakdown_splits_by_payment_method() {
        let expenses = vec![
            expense(1, 100, PaymentMethod::Cash),
            expense(1, 250, PaymentMethod::Card),
            expense(3, 40, PaymentMethod::Cash),
        ];

        let report = breakdown_by(&expenses, Expense::expense_date).unwrap();

        assert_eq!(2, report.len());
        assert_eq!(
            PaymentBreakdown {
                cash: dec(100),
                card: dec(250),
                total: dec(350),
            },
            report[&date(2025, 6, 1)]
        );
        assert!(!report.contains_key(&date(2025, 6, 2)));
    }

    #[test]
    fn breakdown_empty() {
        let report = breakdown_by(&[], Expense::expense_date).unwrap();

        assert!(report.is_empty());
    }

    #[test]
    fn summary_arithmetic() {
        let summary = TripSummary::new(dec(500000), 10, dec(1500000)).unwrap();

        assert_eq!(dec(5000000), summary.total_budget);
        assert_eq!(dec(3500000), summary.remaining_budget);
        assert_eq!(dec(150000), summary.average_daily_expense);
    }

    #[test]
    fn summary_without_days() {
        let summary = TripSummary::new(dec(500000), 0, dec(1500000)).unwrap();

        assert_eq!(Decimal::ZERO, summary.average_daily_expense);
        assert_eq!(dec(-1500000), summary.remaining_budget);
    }

    #[test]
    fn breakdown_overflow() {
        let expenses = vec![
            Expense::from_parts(
                Uuid::new_v4(),
                Uuid::nil(),
                date(2025, 6, 1),
                Decimal::MAX,
                "COP".to_owned(),
                Decimal::MAX,
                PaymentMethod::Card,
                ExpenseType::Food,
            ),
            expense(1, 1, PaymentMethod::Card),
        ];

        assert!(breakdown_by(&expenses, Expense::expense_date).is_err());
    }

    #[test]
    fn summary_budget_overflow() {
        assert!(TripSummary::new(Decimal::MAX, 10, Decimal::ZERO).is_err());
    }

    #[test]
    fn summary_remaining_overflow() {
        assert!(TripSummary::new(dec(1), 1, Decimal::MIN).is_err());
    }
}
