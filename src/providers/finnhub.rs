//! Finnhub `/quote` adapter (secondary stock quote source).
//!
//! Finnhub answers unknown symbols with an all-zero quote and `null` change
//! fields rather than an error status. Volume is not part of this endpoint.

use super::util::{build_client, endpoint, get_json};
use crate::core::config::{HttpConfig, ProviderConfig};
use crate::core::models::Quote;
use crate::core::quote::QuoteProvider;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub(crate) struct FinnhubQuote {
    /// Current price
    c: Option<f64>,
    /// Change
    d: Option<f64>,
    /// Percent change
    dp: Option<f64>,
    h: Option<f64>,
    l: Option<f64>,
    o: Option<f64>,
    /// Previous close
    pc: Option<f64>,
    /// Unix timestamp
    t: Option<i64>,
}

/// Finnhub reports missing values as 0.
fn non_zero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

pub(crate) fn normalize(raw: FinnhubQuote, symbol: &str) -> Result<Quote> {
    let price = non_zero(raw.c).ok_or_else(|| anyhow!("No quote data found for symbol: {}", symbol))?;
    let change = raw
        .d
        .ok_or_else(|| anyhow!("Missing change in Finnhub quote for {}", symbol))?;
    let change_percent = raw
        .dp
        .ok_or_else(|| anyhow!("Missing percent change in Finnhub quote for {}", symbol))?;
    let timestamp = raw
        .t
        .filter(|t| *t > 0)
        .and_then(|t| Utc.timestamp_opt(t, 0).single())
        .ok_or_else(|| anyhow!("Missing timestamp in Finnhub quote for {}", symbol))?;

    Ok(Quote {
        symbol: symbol.to_string(),
        price,
        change,
        change_percent,
        volume: None,
        high: non_zero(raw.h),
        low: non_zero(raw.l),
        open: non_zero(raw.o),
        previous_close: non_zero(raw.pc),
        timestamp,
    })
}

pub struct FinnhubProvider {
    base_url: String,
    api_key: String,
    client: Client,
}

impl FinnhubProvider {
    pub fn new(config: &ProviderConfig, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url.clone(),
            api_key: config.key().to_string(),
            client: build_client(http)?,
        })
    }
}

#[async_trait]
impl QuoteProvider for FinnhubProvider {
    fn name(&self) -> &str {
        "finnhub"
    }

    #[instrument(name = "FinnhubQuoteFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        let url = endpoint(
            &self.base_url,
            "/quote",
            &[("symbol", symbol), ("token", &self.api_key)],
        )?;
        let raw: FinnhubQuote = get_json(&self.client, url, &format!("symbol: {symbol}")).await?;
        normalize(raw, symbol)
    }
}
