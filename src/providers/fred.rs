//! FRED (Federal Reserve Economic Data) series observations adapter.

use super::util::{build_client, endpoint, get_json, parse_number};
use crate::core::config::{HttpConfig, ProviderConfig};
use crate::core::indicator::{IndicatorProvider, IndicatorSeries};
use crate::core::models::{EconomicIndicator, start_of_day};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

/// FRED uses "." for observations that have no value yet.
const MISSING_VALUE: &str = ".";

#[derive(Debug, Deserialize)]
pub(crate) struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

impl Observation {
    fn value(&self, series_id: &str) -> Result<f64> {
        if self.value.trim() == MISSING_VALUE {
            return Err(anyhow!(
                "No value for {} on {} in FRED response",
                series_id,
                self.date
            ));
        }
        parse_number(&self.value, series_id)
    }
}

/// Observations arrive newest first. The second one, when present and
/// valued, becomes `previous`.
pub(crate) fn normalize(
    response: &ObservationsResponse,
    series: &IndicatorSeries,
) -> Result<EconomicIndicator> {
    let mut observations = response.observations.iter();
    let latest = observations
        .next()
        .ok_or_else(|| anyhow!("No observations found for series: {}", series.series_id))?;

    let value = latest.value(series.series_id)?;
    let date = NaiveDate::parse_from_str(&latest.date, "%Y-%m-%d").with_context(|| {
        format!(
            "Invalid date '{}' for {} in FRED response",
            latest.date, series.series_id
        )
    })?;
    let previous = observations
        .next()
        .and_then(|o| o.value(series.series_id).ok());

    Ok(EconomicIndicator {
        name: series.name.to_string(),
        series_id: series.series_id.to_string(),
        value,
        previous,
        change: previous.map(|p| value - p),
        unit: series.unit.to_string(),
        date,
        timestamp: start_of_day(date),
    })
}

pub struct FredProvider {
    base_url: String,
    api_key: String,
    client: Client,
}

impl FredProvider {
    pub fn new(config: &ProviderConfig, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url.clone(),
            api_key: config.key().to_string(),
            client: build_client(http)?,
        })
    }
}

#[async_trait]
impl IndicatorProvider for FredProvider {
    fn name(&self) -> &str {
        "fred"
    }

    #[instrument(name = "FredFetch", skip(self, series), fields(series_id = series.series_id))]
    async fn fetch_indicator(&self, series: &IndicatorSeries) -> Result<EconomicIndicator> {
        let url = endpoint(
            &self.base_url,
            "/fred/series/observations",
            &[
                ("series_id", series.series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("sort_order", "desc"),
                ("limit", "2"),
            ],
        )?;
        let response: ObservationsResponse = get_json(
            &self.client,
            url,
            &format!("series: {}", series.series_id),
        )
        .await?;
        normalize(&response, series)
    }
}
