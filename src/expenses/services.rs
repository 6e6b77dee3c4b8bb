use anyhow::anyhow;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    clock::DynClock,
    currency::{ConversionError, DynCurrencyConverter, REPORTING_CURRENCY},
    repos::{DynExpenseRepo, DynTripRepo, TripLookupError},
    trips::domain::Trip,
};

use super::domain::{total_converted, Expense, ExpenseDraft, NewExpenseData};

#[derive(Debug, Error)]
pub enum ExpenseError {
    #[error("trip not found: {0}")]
    TripNotFound(Uuid),

    /// The trip's date window does not include today.
    #[error("trip {0} is not active")]
    InactiveTrip(Uuid),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<TripLookupError> for ExpenseError {
    fn from(error: TripLookupError) -> Self {
        match error {
            TripLookupError::NotFound(trip_id) => Self::TripNotFound(trip_id),
            TripLookupError::Other(other) => Self::Other(other),
        }
    }
}

/// A service object for registering expenses against trip budgets.
///
/// Registration saves the expense and then reads the day's expenses back to
/// compute the remaining budget. The two steps are not atomic: if another
/// registration for the same trip and day lands in between, the returned
/// difference includes it.
#[derive(Clone)]
pub struct ExpenseService {
    clock: DynClock,
    currency_converter: DynCurrencyConverter,
    expense_repo: DynExpenseRepo,
    trip_repo: DynTripRepo,
}

impl ExpenseService {
    pub fn new(
        clock: DynClock,
        currency_converter: DynCurrencyConverter,
        expense_repo: DynExpenseRepo,
        trip_repo: DynTripRepo,
    ) -> Self {
        Self {
            clock,
            currency_converter,
            expense_repo,
            trip_repo,
        }
    }

    /// Look up a trip that must be active today.
    async fn get_active_trip(&self, trip_id: Uuid) -> Result<Trip, ExpenseError> {
        let trip = self.trip_repo.get_by_id(trip_id).await?;

        let today = self.clock.today();
        if !trip.is_active_on(today) {
            debug!(%trip_id, %today, "Trip is not active.");

            return Err(ExpenseError::InactiveTrip(trip_id));
        }

        Ok(trip)
    }

    /// Register a new expense against an active trip.
    ///
    /// Expenses on international trips are converted from the trip's currency
    /// into the reporting currency. Expenses on domestic trips are stored
    /// with their original amount.
    ///
    /// # Returns
    ///
    /// The trip's daily budget minus everything spent on the expense's date,
    /// including the new expense. A negative value means the day is over
    /// budget.
    pub async fn register_expense(&self, data: NewExpenseData) -> Result<Decimal, ExpenseError> {
        let trip = self.get_active_trip(data.trip_id).await?;

        let draft = ExpenseDraft::new(&trip, data);
        let converted_amount = if trip.is_international() {
            self.currency_converter
                .convert(draft.original_amount(), draft.currency(), REPORTING_CURRENCY)
                .await?
        } else {
            draft.original_amount()
        };
        let expense = draft.convert(converted_amount);

        self.expense_repo.save(&expense).await?;
        info!(
            expense_id = %expense.id(),
            trip_id = %expense.trip_id(),
            %converted_amount,
            "Registered expense."
        );

        self.calculate_daily_difference(expense.trip_id(), expense.expense_date())
            .await
    }

    /// Compute what is left of an active trip's budget for a single day.
    ///
    /// Stored amounts are already in the reporting currency, so no conversion
    /// happens here.
    pub async fn calculate_daily_difference(
        &self,
        trip_id: Uuid,
        date: NaiveDate,
    ) -> Result<Decimal, ExpenseError> {
        let trip = self.get_active_trip(trip_id).await?;

        let expenses = self.expense_repo.get_by_trip_and_date(trip_id, date).await?;
        let spent = total_converted(&expenses)?;

        trip.daily_budget()
            .checked_sub(spent)
            .ok_or_else(|| anyhow!("daily difference overflowed").into())
    }

    pub async fn get_expenses_by_trip_id(&self, trip_id: Uuid) -> anyhow::Result<Vec<Expense>> {
        self.expense_repo.get_by_trip_id(trip_id).await
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::{
        expenses::domain::{ExpenseType, PaymentMethod},
        repos::{ExpenseRepo, MemoryStore, TripRepo},
        test_support::{clock_at, date, dec, trip, ConversionCall, RecordingConverter},
    };

    struct Fixture {
        store: Arc<MemoryStore>,
        converter: Arc<RecordingConverter>,
        service: ExpenseService,
    }

    async fn fixture(trip: &Trip, today: NaiveDate, converter: RecordingConverter) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        TripRepo::save(&*store, trip).await.unwrap();

        let converter = Arc::new(converter);
        let service = ExpenseService::new(
            clock_at(today),
            converter.clone(),
            store.clone(),
            store.clone(),
        );

        Fixture {
            store,
            converter,
            service,
        }
    }

    fn expense_data(
        trip: &Trip,
        expense_date: NaiveDate,
        amount: i64,
        payment_method: PaymentMethod,
        expense_type: ExpenseType,
    ) -> NewExpenseData {
        NewExpenseData {
            trip_id: trip.id(),
            expense_date,
            amount: dec(amount),
            payment_method,
            expense_type,
        }
    }

    fn domestic_trip() -> Trip {
        trip(date(2025, 6, 1), date(2025, 6, 10), false, 500000, "COP")
    }

    fn international_trip() -> Trip {
        trip(date(2025, 7, 1), date(2025, 7, 10), true, 200, "USD")
    }

    #[tokio::test]
    async fn domestic_expenses_reduce_daily_budget() {
        let trip = domestic_trip();
        let f = fixture(&trip, date(2025, 6, 5), RecordingConverter::returning(dec(1))).await;

        let first = f
            .service
            .register_expense(expense_data(
                &trip,
                date(2025, 6, 5),
                350000,
                PaymentMethod::Card,
                ExpenseType::Transportation,
            ))
            .await
            .expect("expense should register");
        let second = f
            .service
            .register_expense(expense_data(
                &trip,
                date(2025, 6, 5),
                100000,
                PaymentMethod::Cash,
                ExpenseType::Food,
            ))
            .await
            .expect("expense should register");

        assert_eq!(dec(150000), first);
        assert_eq!(dec(50000), second);

        let expenses = f.service.get_expenses_by_trip_id(trip.id()).await.unwrap();
        assert_eq!(2, expenses.len());
        assert_eq!(dec(350000), expenses[0].converted_amount());
        assert_eq!(dec(350000), expenses[0].original_amount());
        assert!(f.converter.calls().is_empty());
    }

    #[tokio::test]
    async fn international_expense_is_converted_once() {
        let trip = international_trip();
        let f = fixture(
            &trip,
            date(2025, 7, 5),
            RecordingConverter::returning(dec(200000)),
        )
        .await;

        f.service
            .register_expense(expense_data(
                &trip,
                date(2025, 7, 5),
                50,
                PaymentMethod::Card,
                ExpenseType::Food,
            ))
            .await
            .expect("expense should register");

        let expenses = f.store.get_by_trip_id(trip.id()).await.unwrap();
        assert_eq!(1, expenses.len());
        assert_eq!(dec(200000), expenses[0].converted_amount());
        assert_eq!(dec(50), expenses[0].original_amount());
        assert_eq!("USD", expenses[0].currency());
        assert_eq!(
            vec![ConversionCall {
                amount: dec(50),
                from: "USD".to_owned(),
                to: "COP".to_owned(),
            }],
            f.converter.calls()
        );
    }

    #[tokio::test]
    async fn international_daily_budget_is_in_reporting_currency() {
        let trip = trip(date(2025, 5, 30), date(2025, 6, 10), true, 500000, "USD");
        let f = fixture(
            &trip,
            date(2025, 6, 5),
            RecordingConverter::returning(dec(200000)),
        )
        .await;

        let difference = f
            .service
            .register_expense(expense_data(
                &trip,
                date(2025, 6, 5),
                50,
                PaymentMethod::Card,
                ExpenseType::Transportation,
            ))
            .await
            .expect("expense should register");

        assert_eq!(dec(300000), difference);
    }

    #[tokio::test]
    async fn small_international_budget_goes_negative() {
        let trip = international_trip();
        let f = fixture(
            &trip,
            date(2025, 7, 5),
            RecordingConverter::returning(dec(200000)),
        )
        .await;

        let difference = f
            .service
            .register_expense(expense_data(
                &trip,
                date(2025, 7, 5),
                50,
                PaymentMethod::Card,
                ExpenseType::Other,
            ))
            .await
            .expect("expense should register");

        assert_eq!(dec(200 - 200000), difference);
    }

    #[tokio::test]
    async fn inactive_trip_is_rejected() {
        let trip = domestic_trip();
        let f = fixture(&trip, date(2025, 6, 11), RecordingConverter::returning(dec(1))).await;

        let error = f
            .service
            .register_expense(expense_data(
                &trip,
                date(2025, 6, 5),
                350000,
                PaymentMethod::Card,
                ExpenseType::Transportation,
            ))
            .await
            .expect_err("trip is inactive");

        assert!(matches!(error, ExpenseError::InactiveTrip(id) if id == trip.id()));
        assert_eq!(0, f.store.expense_count().await);
    }

    #[tokio::test]
    async fn missing_trip_is_rejected() {
        let trip = domestic_trip();
        let f = fixture(&trip, date(2025, 6, 5), RecordingConverter::returning(dec(1))).await;
        let missing_id = Uuid::new_v4();

        let error = f
            .service
            .register_expense(NewExpenseData {
                trip_id: missing_id,
                expense_date: date(2025, 6, 5),
                amount: dec(10),
                payment_method: PaymentMethod::Cash,
                expense_type: ExpenseType::Food,
            })
            .await
            .expect_err("trip is missing");

        assert!(matches!(error, ExpenseError::TripNotFound(id) if id == missing_id));
        assert_eq!(0, f.store.expense_count().await);
    }

    #[tokio::test]
    async fn conversion_failure_propagates() {
        let trip = international_trip();
        let f = fixture(
            &trip,
            date(2025, 7, 5),
            RecordingConverter::failing("rate source is down"),
        )
        .await;

        let error = f
            .service
            .register_expense(expense_data(
                &trip,
                date(2025, 7, 5),
                50,
                PaymentMethod::Card,
                ExpenseType::Food,
            ))
            .await
            .expect_err("conversion fails");

        assert!(matches!(
            error,
            ExpenseError::Conversion(ConversionError::Unavailable(_))
        ));
        assert_eq!(0, f.store.expense_count().await);
    }

    #[tokio::test]
    async fn daily_difference_only_counts_that_day() {
        let trip = domestic_trip();
        let f = fixture(&trip, date(2025, 6, 5), RecordingConverter::returning(dec(1))).await;

        for (day, amount) in [(4, 100000), (5, 120000), (5, 30000), (6, 400000)] {
            f.service
                .register_expense(expense_data(
                    &trip,
                    date(2025, 6, day),
                    amount,
                    PaymentMethod::Cash,
                    ExpenseType::Food,
                ))
                .await
                .unwrap();
        }

        let difference = f
            .service
            .calculate_daily_difference(trip.id(), date(2025, 6, 5))
            .await
            .unwrap();
        let untouched = f
            .service
            .calculate_daily_difference(trip.id(), date(2025, 6, 9))
            .await
            .unwrap();

        assert_eq!(dec(350000), difference);
        assert_eq!(dec(500000), untouched);
    }

    #[tokio::test]
    async fn daily_difference_overflow_is_an_error() {
        let trip = domestic_trip();
        let f = fixture(&trip, date(2025, 6, 5), RecordingConverter::returning(dec(1))).await;
        let huge = NewExpenseData {
            amount: Decimal::MAX,
            ..expense_data(
                &trip,
                date(2025, 6, 5),
                0,
                PaymentMethod::Card,
                ExpenseType::Accommodation,
            )
        };

        f.service
            .register_expense(huge)
            .await
            .expect("a single large expense fits");
        let error = f
            .service
            .register_expense(expense_data(
                &trip,
                date(2025, 6, 5),
                1,
                PaymentMethod::Cash,
                ExpenseType::Food,
            ))
            .await
            .expect_err("day total overflows");

        assert!(matches!(error, ExpenseError::Other(_)));
    }

    #[tokio::test]
    async fn daily_difference_requires_active_trip() {
        let trip = domestic_trip();
        let f = fixture(&trip, date(2025, 5, 31), RecordingConverter::returning(dec(1))).await;

        let error = f
            .service
            .calculate_daily_difference(trip.id(), date(2025, 6, 5))
            .await
            .expect_err("trip has not started");

        assert!(matches!(error, ExpenseError::InactiveTrip(_)));
    }

    /// An expense store where another writer registers an expense for the
    /// same trip and day right after every save.
    struct InterleavingStore {
        inner: Arc<MemoryStore>,
        concurrent: Expense,
    }

    #[async_trait]
    impl ExpenseRepo for InterleavingStore {
        async fn save(&self, expense: &Expense) -> anyhow::Result<()> {
            ExpenseRepo::save(&*self.inner, expense).await?;
            ExpenseRepo::save(&*self.inner, &self.concurrent).await
        }

        async fn get_by_trip_id(&self, trip_id: Uuid) -> anyhow::Result<Vec<Expense>> {
            self.inner.get_by_trip_id(trip_id).await
        }

        async fn get_by_trip_and_date(
            &self,
            trip_id: Uuid,
            expense_date: NaiveDate,
        ) -> anyhow::Result<Vec<Expense>> {
            self.inner.get_by_trip_and_date(trip_id, expense_date).await
        }
    }

    #[tokio::test]
    async fn daily_difference_sees_interleaved_writes() {
        let trip = domestic_trip();
        let store = Arc::new(MemoryStore::new());
        TripRepo::save(&*store, &trip).await.unwrap();

        let concurrent = ExpenseDraft::new(
            &trip,
            expense_data(
                &trip,
                date(2025, 6, 5),
                100000,
                PaymentMethod::Cash,
                ExpenseType::Food,
            ),
        )
        .convert(dec(100000));
        let service = ExpenseService::new(
            clock_at(date(2025, 6, 5)),
            Arc::new(RecordingConverter::returning(dec(1))),
            Arc::new(InterleavingStore {
                inner: store.clone(),
                concurrent,
            }),
            store.clone(),
        );

        let difference = service
            .register_expense(expense_data(
                &trip,
                date(2025, 6, 5),
                350000,
                PaymentMethod::Card,
                ExpenseType::Transportation,
            ))
            .await
            .unwrap();

        // The other writer's expense is included in the result.
        assert_eq!(dec(50000), difference);
    }
}
