//! Fixtures shared by the unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    clock::{DynClock, FixedClock},
    currency::{ConversionError, CurrencyConverter},
    trips::domain::Trip,
};

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn dec(value: i64) -> Decimal {
    Decimal::from(value)
}

pub fn clock_at(today: NaiveDate) -> DynClock {
    Arc::new(FixedClock(today))
}

pub fn trip(
    start_date: NaiveDate,
    end_date: NaiveDate,
    is_international: bool,
    daily_budget: i64,
    currency: &str,
) -> Trip {
    Trip::from_parts(
        Uuid::new_v4(),
        start_date,
        end_date,
        is_international,
        dec(daily_budget),
        currency.to_owned(),
    )
}

/// A single call made to a [`RecordingConverter`].
#[derive(Clone, Debug, PartialEq)]
pub struct ConversionCall {
    pub amount: Decimal,
    pub from: String,
    pub to: String,
}

/// A converter that records its calls and answers with a fixed result.
pub struct RecordingConverter {
    result: Result<Decimal, String>,
    calls: Mutex<Vec<ConversionCall>>,
}

impl RecordingConverter {
    pub fn returning(value: Decimal) -> Self {
        Self {
            result: Ok(value),
            calls: Mutex::new(vec![]),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            result: Err(reason.to_owned()),
            calls: Mutex::new(vec![]),
        }
    }

    pub fn calls(&self) -> Vec<ConversionCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CurrencyConverter for RecordingConverter {
    async fn convert(
        &self,
        amount: Decimal,
        from_currency: &str,
        to_currency: &str,
    ) -> Result<Decimal, ConversionError> {
        self.calls.lock().unwrap().push(ConversionCall {
            amount,
            from: from_currency.to_owned(),
            to: to_currency.to_owned(),
        });

        self.result
            .clone()
            .map_err(ConversionError::Unavailable)
    }
}
