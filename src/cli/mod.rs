use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::{
    clock::{DynClock, SystemClock},
    currency::{DynCurrencyConverter, ExchangeRateConverter, UnconfiguredConverter},
    database::{ConnectionOptions, PostgresConnection},
    expenses::{
        domain::{ExpenseType, NewExpenseData, PaymentMethod},
        services::ExpenseService,
    },
    reports::services::ReportService,
    trips::{domain::NewTripData, services::TripService},
};

use self::reps::{DailyDifference, ResourceCollection, TripRep};

mod migrate;
mod reps;

#[derive(Parser)]
#[clap(name = "travel-expenses", about = "Track travel expenses against daily budgets.")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    #[clap(flatten)]
    database: DatabaseOpts,

    /// DSN to tell Sentry where to send events.
    ///
    /// If provided, errors will be sent to Sentry.
    #[clap(long = "sentry-dsn", env = "SENTRY_DSN")]
    sentry_dsn: Option<String>,
}

#[derive(Args)]
struct DatabaseOpts {
    /// The number of connections to use for the database pool.
    #[clap(long = "database-pool-size", default_value = "16")]
    database_pool_size: u32,

    /// The number of seconds before a database connection times out.
    #[clap(long = "database-timeout", default_value = "5")]
    database_timeout: u8,

    /// Connection string for the application database.
    #[clap(long = "database-url", env = "DATABASE_URL")]
    database_url: String,
}

impl From<DatabaseOpts> for ConnectionOptions {
    fn from(opts: DatabaseOpts) -> Self {
        Self {
            pool_size: opts.database_pool_size,
            timeout_seconds: opts.database_timeout,
            url: opts.database_url,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations and exit.
    Migrate,
    Trips(TripsOpts),
    Expenses(ExpensesOpts),
    Reports(ReportsOpts),
}

#[derive(Args)]
struct TripsOpts {
    #[clap(subcommand)]
    command: TripCommands,
}

#[derive(Subcommand)]
enum TripCommands {
    /// Create a new trip.
    Create {
        #[clap(long = "start-date")]
        start_date: NaiveDate,

        #[clap(long = "end-date")]
        end_date: NaiveDate,

        #[clap(long = "international")]
        is_international: bool,

        /// Daily budget in the reporting currency.
        #[clap(long = "daily-budget")]
        daily_budget: Decimal,

        /// Currency expenses are made in. Defaults to the reporting currency.
        #[clap(long)]
        currency: Option<String>,
    },

    /// List trips, most recent first.
    List {
        /// Only list trips that are active today.
        #[clap(long)]
        active: bool,
    },

    Show {
        trip_id: Uuid,
    },
}

#[derive(Args)]
struct ExpensesOpts {
    /// Base URL of the exchange rate source.
    ///
    /// Rates for a currency are read from `<base><code>.json`. Without it,
    /// expenses can only be registered on domestic trips.
    #[clap(long = "exchange-rates-url", env = "EXCHANGE_RATES_URL")]
    exchange_rates_url: Option<String>,

    #[clap(subcommand)]
    command: ExpenseCommands,
}

#[derive(Subcommand)]
enum ExpenseCommands {
    /// Register an expense and print what is left of that day's budget.
    Register {
        #[clap(long = "trip-id")]
        trip_id: Uuid,

        #[clap(long)]
        date: NaiveDate,

        /// Amount in the trip's currency.
        #[clap(long)]
        amount: Decimal,

        /// CASH or CARD.
        #[clap(long = "payment-method")]
        payment_method: PaymentMethod,

        #[clap(long = "type")]
        expense_type: ExpenseType,
    },

    List {
        #[clap(long = "trip-id")]
        trip_id: Uuid,
    },

    DailyDifference {
        #[clap(long = "trip-id")]
        trip_id: Uuid,

        #[clap(long)]
        date: NaiveDate,
    },
}

#[derive(Args)]
struct ReportsOpts {
    #[clap(subcommand)]
    command: ReportCommands,
}

#[derive(Subcommand)]
enum ReportCommands {
    /// Spending per day, split by payment method.
    Daily { trip_id: Uuid },

    /// Spending per expense type, split by payment method.
    Types { trip_id: Uuid },

    Summary { trip_id: Uuid },

    /// Totals across every trip.
    Dashboard,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}

async fn run_trips(clock: DynClock, db: PostgresConnection, opts: TripsOpts) -> anyhow::Result<()> {
    let trip_service = TripService::new(clock.clone(), Arc::new(db));

    match opts.command {
        TripCommands::Create {
            start_date,
            end_date,
            is_international,
            daily_budget,
            currency,
        } => {
            let trip = trip_service
                .create_trip(NewTripData {
                    start_date,
                    end_date,
                    is_international,
                    daily_budget,
                    currency,
                })
                .await?;

            print_json(&TripRep::new(trip, clock.today()))
        }
        TripCommands::List { active } => {
            let trips = if active {
                trip_service.get_active_trips().await?
            } else {
                trip_service.get_all_trips().await?
            };

            let today = clock.today();
            print_json(&ResourceCollection {
                items: trips
                    .into_iter()
                    .map(|trip| TripRep::new(trip, today))
                    .collect(),
            })
        }
        TripCommands::Show { trip_id } => {
            let trip = trip_service.get_trip_by_id(trip_id).await?;

            print_json(&TripRep::new(trip, clock.today()))
        }
    }
}

async fn run_expenses(
    clock: DynClock,
    db: PostgresConnection,
    opts: ExpensesOpts,
) -> anyhow::Result<()> {
    let converter: DynCurrencyConverter = match opts.exchange_rates_url {
        Some(url) => Arc::new(ExchangeRateConverter::new(url)?),
        None => Arc::new(UnconfiguredConverter),
    };
    let expense_service = ExpenseService::new(
        clock,
        converter,
        Arc::new(db.clone()),
        Arc::new(db),
    );

    match opts.command {
        ExpenseCommands::Register {
            trip_id,
            date,
            amount,
            payment_method,
            expense_type,
        } => {
            let difference = expense_service
                .register_expense(NewExpenseData {
                    trip_id,
                    expense_date: date,
                    amount,
                    payment_method,
                    expense_type,
                })
                .await?;

            print_json(&DailyDifference {
                trip_id,
                date,
                difference,
            })
        }
        ExpenseCommands::List { trip_id } => {
            let expenses = expense_service.get_expenses_by_trip_id(trip_id).await?;

            print_json(&ResourceCollection { items: expenses })
        }
        ExpenseCommands::DailyDifference { trip_id, date } => {
            let difference = expense_service
                .calculate_daily_difference(trip_id, date)
                .await?;

            print_json(&DailyDifference {
                trip_id,
                date,
                difference,
            })
        }
    }
}

async fn run_reports(
    clock: DynClock,
    db: PostgresConnection,
    opts: ReportsOpts,
) -> anyhow::Result<()> {
    let report_service = ReportService::new(clock, Arc::new(db.clone()), Arc::new(db));

    match opts.command {
        ReportCommands::Daily { trip_id } => {
            print_json(&report_service.generate_daily_expense_report(trip_id).await?)
        }
        ReportCommands::Types { trip_id } => {
            print_json(&report_service.generate_expense_type_report(trip_id).await?)
        }
        ReportCommands::Summary { trip_id } => {
            print_json(&report_service.get_trip_summary(trip_id).await?)
        }
        ReportCommands::Dashboard => print_json(&report_service.dashboard_stats().await?),
    }
}

pub async fn run_with_sys_args() -> anyhow::Result<()> {
    use tracing_subscriber::prelude::*;

    let cli = Cli::parse();

    let sentry_config = cli.sentry_dsn.map(|dsn| {
        debug!("Enabled sentry.");

        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let sentry_tracing_layer = if sentry_config.is_some() {
        Some(sentry_tracing::layer())
    } else {
        None
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_default_env());

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(sentry_tracing_layer)
        .init();

    let db = PostgresConnection::connect(&cli.database.into()).await?;
    migrate::run_migrations(&db).await?;

    let clock: DynClock = Arc::new(SystemClock);

    match cli.command {
        Commands::Migrate => Ok(()),
        Commands::Trips(opts) => run_trips(clock, db, opts).await,
        Commands::Expenses(opts) => run_expenses(clock, db, opts).await,
        Commands::Reports(opts) => run_reports(clock, db, opts).await,
    }
}
