//! Frankfurter adapter (secondary currency source, ECB reference rates).
//!
//! Keyless. Rates are published once per business day so the timestamp is the
//! start of the reported date.

use super::util::{build_client, endpoint, get_json};
use crate::core::config::{HttpConfig, ProviderConfig};
use crate::core::currency::CurrencyRateProvider;
use crate::core::models::{CurrencyRate, start_of_day};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub(crate) struct FrankfurterResponse {
    base: Option<String>,
    date: String,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

pub(crate) fn normalize(
    response: &FrankfurterResponse,
    base: &str,
    targets: &[String],
) -> Result<Vec<CurrencyRate>> {
    if let Some(code) = &response.base
        && !code.eq_ignore_ascii_case(base)
    {
        return Err(anyhow!("Frankfurter returned base {} for {}", code, base));
    }
    let date = NaiveDate::parse_from_str(&response.date, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}' in Frankfurter response", response.date))?;
    let timestamp = start_of_day(date);

    targets
        .iter()
        .map(|target| {
            let rate = response
                .rates
                .get(target)
                .ok_or_else(|| anyhow!("No rate data found for currency pair: {}/{}", base, target))?;
            CurrencyRate::new(base, target, *rate, timestamp)
        })
        .collect()
}

pub struct FrankfurterProvider {
    base_url: String,
    client: Client,
}

impl FrankfurterProvider {
    pub fn new(config: &ProviderConfig, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url.clone(),
            client: build_client(http)?,
        })
    }
}

#[async_trait]
impl CurrencyRateProvider for FrankfurterProvider {
    fn name(&self) -> &str {
        "frankfurter"
    }

    async fn get_rate(&self, base: &str, target: &str) -> Result<CurrencyRate> {
        let mut rates = self.get_rates(base, &[target.to_string()]).await?;
        rates
            .pop()
            .ok_or_else(|| anyhow!("No rate data found for currency pair: {}/{}", base, target))
    }

    #[instrument(name = "FrankfurterFetch", skip(self))]
    async fn get_rates(&self, base: &str, targets: &[String]) -> Result<Vec<CurrencyRate>> {
        let to = targets.join(",");
        let url = endpoint(&self.base_url, "/latest", &[("from", base), ("to", &to)])?;
        let response: FrankfurterResponse =
            get_json(&self.client, url, &format!("currency pair: {base}/{to}")).await?;
        normalize(&response, base, targets)
    }
}
