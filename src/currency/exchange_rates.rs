use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use tracing::{debug, trace};

use super::{ConversionError, CurrencyConverter};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Rates published by the exchange rate source, keyed by the lowercase base
/// currency and then by the lowercase quote currency.
///
/// The source also publishes metadata (such as a `date` field) next to the
/// base currency, so unrecognized values are ignored.
type RatesPayload = HashMap<String, serde_json::Value>;

/// A converter that fetches rates from a static JSON exchange rate source.
///
/// For a base currency such as `USD`, the source is expected to serve
/// `{base_url}usd.json` with a body shaped like `{"usd": {"cop": 4000.5}}`.
pub struct ExchangeRateConverter {
    base_url: String,
    client: Client,
}

impl ExchangeRateConverter {
    /// Create a new converter.
    ///
    /// # Arguments
    ///
    /// * `base_url` - URL prefix of the exchange rate source. The lowercase
    ///   base currency code followed by `.json` is appended to it.
    pub fn new(base_url: String) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self::with_client(base_url, client))
    }

    /// Create a converter that sends its requests through an existing client.
    pub fn with_client(base_url: String, client: Client) -> Self {
        Self { base_url, client }
    }

    fn rates_url(&self, from_currency: &str) -> String {
        format!("{}{}.json", self.base_url, from_currency.to_lowercase())
    }
}

/// Find the rate for a currency pair in a payload from the rate source.
fn find_rate(
    payload: &RatesPayload,
    from_currency: &str,
    to_currency: &str,
) -> Result<Decimal, ConversionError> {
    let not_found = || ConversionError::RateNotFound {
        from: from_currency.to_owned(),
        to: to_currency.to_owned(),
    };

    let rate = payload
        .get(&from_currency.to_lowercase())
        .and_then(|rates| rates.get(to_currency.to_lowercase()))
        .ok_or_else(not_found)?;

    serde_json::from_value::<Decimal>(rate.clone()).map_err(|error| {
        ConversionError::InvalidPayload(format!("malformed rate {}: {}", rate, error))
    })
}

#[async_trait]
impl CurrencyConverter for ExchangeRateConverter {
    async fn convert(
        &self,
        amount: Decimal,
        from_currency: &str,
        to_currency: &str,
    ) -> Result<Decimal, ConversionError> {
        let url = self.rates_url(from_currency);
        trace!(%url, "Fetching exchange rates.");

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            debug!(%url, %status, "Exchange rate source returned an error.");

            return Err(ConversionError::Unavailable(format!(
                "error fetching exchange rates: {}",
                status
            )));
        }

        let payload = response.json::<RatesPayload>().await?;
        let rate = find_rate(&payload, from_currency, to_currency)?;
        let converted = amount.checked_mul(rate).ok_or_else(|| {
            ConversionError::InvalidPayload(format!("rate {} overflows amount {}", rate, amount))
        })?;

        debug!(from = from_currency, to = to_currency, %rate, "Converted amount.");

        Ok(converted)
    }
}
