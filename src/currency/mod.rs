//! Conversion of expense amounts into the reporting currency.

mod exchange_rates;

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

pub use self::exchange_rates::ExchangeRateConverter;

/// The currency every converted amount and every daily budget is expressed in.
pub const REPORTING_CURRENCY: &str = "COP";

#[derive(Debug, Error)]
pub enum ConversionError {
    /// The exchange rate source could not provide rates.
    #[error("exchange rates unavailable: {0}")]
    Unavailable(String),

    #[error("failed to reach exchange rate source: {0}")]
    Transport(#[from] reqwest::Error),

    /// The source has no rate for the requested currency pair.
    #[error("no exchange rate from {from} to {to}")]
    RateNotFound { from: String, to: String },

    #[error("invalid exchange rate payload: {0}")]
    InvalidPayload(String),
}

pub type DynCurrencyConverter = Arc<dyn CurrencyConverter + Send + Sync>;

#[async_trait]
pub trait CurrencyConverter {
    /// Convert an amount between two currencies.
    ///
    /// # Arguments
    ///
    /// * `amount` - The amount to convert, expressed in `from_currency`.
    /// * `from_currency` - Code of the currency the amount is expressed in.
    /// * `to_currency` - Code of the currency to convert into.
    ///
    /// # Returns
    ///
    /// The amount expressed in `to_currency`.
    async fn convert(
        &self,
        amount: Decimal,
        from_currency: &str,
        to_currency: &str,
    ) -> Result<Decimal, ConversionError>;
}

/// A converter for setups without an exchange rate source.
///
/// Every conversion fails, so only domestic trips can take expenses.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnconfiguredConverter;

#[async_trait]
impl CurrencyConverter for UnconfiguredConverter {
    async fn convert(
        &self,
        _amount: Decimal,
        from_currency: &str,
        to_currency: &str,
    ) -> Result<Decimal, ConversionError> {
        Err(ConversionError::Unavailable(format!(
            "no exchange rate source configured to convert {} to {}",
            from_currency, to_currency
        )))
    }
}
