use std::sync::Arc;

use chrono::{Local, NaiveDate};

pub type DynClock = Arc<dyn Clock + Send + Sync>;

/// A source for the current calendar date.
///
/// Whether a trip is active depends on the date it is evaluated on, so every
/// engine that checks activity asks its clock instead of reading the system
/// time directly.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// A clock backed by the local system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock that always reports the same date.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
