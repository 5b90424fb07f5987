//! Alpha Vantage `GLOBAL_QUOTE` adapter (primary stock quote source).
//!
//! Numbers arrive as strings under numbered keys (`"05. price"`). When the
//! free-tier limit is hit the service answers 200 with a `Note` or
//! `Information` message instead of a quote.

use super::util::{build_client, endpoint, get_json, parse_number};
use crate::core::config::{HttpConfig, ProviderConfig};
use crate::core::models::{Quote, start_of_day};
use crate::core::quote::QuoteProvider;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub(crate) struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    quote: Option<GlobalQuote>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "01. symbol")]
    symbol: Option<String>,
    #[serde(rename = "02. open")]
    open: Option<String>,
    #[serde(rename = "03. high")]
    high: Option<String>,
    #[serde(rename = "04. low")]
    low: Option<String>,
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "06. volume")]
    volume: Option<String>,
    #[serde(rename = "07. latest trading day")]
    latest_trading_day: Option<String>,
    #[serde(rename = "08. previous close")]
    previous_close: Option<String>,
    #[serde(rename = "09. change")]
    change: Option<String>,
    #[serde(rename = "10. change percent")]
    change_percent: Option<String>,
}

fn required<'a>(field: &'a Option<String>, name: &str) -> Result<&'a str> {
    field
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| anyhow!("Missing field '{}' in Alpha Vantage quote", name))
}

fn optional_number(field: &Option<String>, name: &str) -> Result<Option<f64>> {
    field
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .map(|v| parse_number(v, name))
        .transpose()
}

/// Normalizes a decoded `GLOBAL_QUOTE` payload.
pub(crate) fn normalize(response: GlobalQuoteResponse, symbol: &str) -> Result<Quote> {
    if let Some(message) = response
        .note
        .or(response.information)
        .or(response.error_message)
    {
        return Err(anyhow!("Alpha Vantage rejected request for {}: {}", symbol, message));
    }

    let raw = response
        .quote
        .ok_or_else(|| anyhow!("No quote data found for symbol: {}", symbol))?;
    if raw.price.is_none() && raw.symbol.is_none() {
        // Unknown tickers come back as an empty "Global Quote" object
        return Err(anyhow!("No quote data found for symbol: {}", symbol));
    }

    let day = required(&raw.latest_trading_day, "07. latest trading day")?;
    let date = NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid trading day '{day}' for symbol: {symbol}"))?;

    let volume = optional_number(&raw.volume, "06. volume")?
        .filter(|v| *v >= 0.0)
        .map(|v| v as u64);

    Ok(Quote {
        symbol: required(&raw.symbol, "01. symbol")?.trim().to_string(),
        price: parse_number(required(&raw.price, "05. price")?, "05. price")?,
        change: parse_number(required(&raw.change, "09. change")?, "09. change")?,
        change_percent: parse_number(
            required(&raw.change_percent, "10. change percent")?,
            "10. change percent",
        )?,
        volume,
        high: optional_number(&raw.high, "03. high")?,
        low: optional_number(&raw.low, "04. low")?,
        open: optional_number(&raw.open, "02. open")?,
        previous_close: optional_number(&raw.previous_close, "08. previous close")?,
        timestamp: start_of_day(date),
    })
}

pub struct AlphaVantageProvider {
    base_url: String,
    api_key: String,
    client: Client,
}

impl AlphaVantageProvider {
    pub fn new(config: &ProviderConfig, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url.clone(),
            api_key: config.key().to_string(),
            client: build_client(http)?,
        })
    }
}

#[async_trait]
impl QuoteProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        "alpha_vantage"
    }

    #[instrument(name = "AlphaVantageQuoteFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        let url = endpoint(
            &self.base_url,
            "/query",
            &[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol),
                ("apikey", &self.api_key),
            ],
        )?;
        let response: GlobalQuoteResponse =
            get_json(&self.client, url, &format!("symbol: {symbol}")).await?;
        normalize(response, symbol)
    }
}
