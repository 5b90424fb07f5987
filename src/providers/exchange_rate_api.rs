//! ExchangeRate-API v6 adapter (primary currency source).
//!
//! One `latest/{BASE}` call returns every conversion rate for the base, so
//! batch lookups cost a single request.

use super::util::{build_client, endpoint, get_json};
use crate::core::config::{HttpConfig, ProviderConfig};
use crate::core::currency::CurrencyRateProvider;
use crate::core::models::CurrencyRate;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub(crate) struct LatestResponse {
    result: String,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    base_code: Option<String>,
    time_last_update_unix: Option<i64>,
    #[serde(default)]
    conversion_rates: HashMap<String, f64>,
}

pub(crate) fn normalize(
    response: &LatestResponse,
    base: &str,
    targets: &[String],
) -> Result<Vec<CurrencyRate>> {
    if response.result != "success" {
        return Err(anyhow!(
            "ExchangeRate-API error for {}: {}",
            base,
            response.error_type.as_deref().unwrap_or("unknown")
        ));
    }
    if let Some(code) = &response.base_code
        && !code.eq_ignore_ascii_case(base)
    {
        return Err(anyhow!("ExchangeRate-API returned base {} for {}", code, base));
    }

    let timestamp = response
        .time_last_update_unix
        .and_then(|t| Utc.timestamp_opt(t, 0).single())
        .ok_or_else(|| anyhow!("Missing update time in ExchangeRate-API response for {}", base))?;

    targets
        .iter()
        .map(|target| {
            let rate = response
                .conversion_rates
                .get(target)
                .ok_or_else(|| anyhow!("No rate data found for currency pair: {}/{}", base, target))?;
            CurrencyRate::new(base, target, *rate, timestamp)
        })
        .collect()
}

pub struct ExchangeRateApiProvider {
    base_url: String,
    api_key: String,
    client: Client,
}

impl ExchangeRateApiProvider {
    pub fn new(config: &ProviderConfig, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url.clone(),
            api_key: config.key().to_string(),
            client: build_client(http)?,
        })
    }

    async fn latest(&self, base: &str) -> Result<LatestResponse> {
        let url = endpoint(
            &self.base_url,
            &format!("/v6/{}/latest/{}", self.api_key, base),
            &[],
        )?;
        get_json(&self.client, url, &format!("currency base: {base}")).await
    }
}

#[async_trait]
impl CurrencyRateProvider for ExchangeRateApiProvider {
    fn name(&self) -> &str {
        "exchange_rate_api"
    }

    #[instrument(name = "ExchangeRateApiFetch", skip(self))]
    async fn get_rate(&self, base: &str, target: &str) -> Result<CurrencyRate> {
        let response = self.latest(base).await?;
        let mut rates = normalize(&response, base, &[target.to_string()])?;
        rates
            .pop()
            .ok_or_else(|| anyhow!("No rate data found for currency pair: {}/{}", base, target))
    }

    #[instrument(name = "ExchangeRateApiBatchFetch", skip(self))]
    async fn get_rates(&self, base: &str, targets: &[String]) -> Result<Vec<CurrencyRate>> {
        let response = self.latest(base).await?;
        normalize(&response, base, targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const USD_LATEST: &str = r#"{
        "result": "success",
        "base_code": "USD",
        "time_last_update_unix": 1709856001,
        "conversion_rates": {
            "USD": 1,
            "EUR": 0.9152,
            "GBP": 0.7812,
            "JPY": 147.95
        }
    }"#;

    async fn create_mock_server(base: &str, status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v6/test-key/latest/{base}")))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn provider(base_url: &str) -> ExchangeRateApiProvider {
        let mut config = ProviderConfig::new(base_url);
        config.api_key = Some("test-key".to_string());
        ExchangeRateApiProvider::new(&config, &HttpConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_successful_rate_fetch() {
        let mock_server = create_mock_server("USD", 200, USD_LATEST).await;

        let rate = provider(&mock_server.uri())
            .get_rate("USD", "EUR")
            .await
            .expect("Failed to get rate");

        assert_eq!(rate.base, "USD");
        assert_eq!(rate.target, "EUR");
        assert_eq!(rate.rate, 0.9152);
        assert_eq!(rate.timestamp.timestamp(), 1709856001);
    }

    #[tokio::test]
    async fn test_batch_uses_single_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v6/test-key/latest/USD"))
            .respond_with(ResponseTemplate::new(200).set_body_string(USD_LATEST))
            .expect(1)
            .mount(&mock_server)
            .await;

        let targets = vec!["EUR".to_string(), "GBP".to_string(), "JPY".to_string()];
        let rates = provider(&mock_server.uri())
            .get_rates("USD", &targets)
            .await
            .unwrap();

        let codes: Vec<&str> = rates.iter().map(|r| r.target.as_str()).collect();
        assert_eq!(codes, vec!["EUR", "GBP", "JPY"]);
        assert_eq!(rates[2].rate, 147.95);
    }

    #[tokio::test]
    async fn test_missing_target_fails_whole_batch() {
        let mock_server = create_mock_server("USD", 200, USD_LATEST).await;

        let targets = vec!["EUR".to_string(), "XYZ".to_string()];
        let err = provider(&mock_server.uri())
            .get_rates("USD", &targets)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "No rate data found for currency pair: USD/XYZ"
        );
    }

    #[tokio::test]
    async fn test_error_result_is_failure() {
        let body = r#"{"result": "error", "error-type": "invalid-key"}"#;
        let mock_server = create_mock_server("USD", 200, body).await;

        let err = provider(&mock_server.uri())
            .get_rate("USD", "EUR")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "ExchangeRate-API error for USD: invalid-key");
    }

    #[test]
    fn test_non_positive_rate_is_rejected() {
        let body = USD_LATEST.replace("0.9152", "0");
        let response: LatestResponse = serde_json::from_str(&body).unwrap();
        assert!(normalize(&response, "USD", &["EUR".to_string()]).is_err());
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let response: LatestResponse = serde_json::from_str(USD_LATEST).unwrap();
        let targets = vec!["EUR".to_string(), "GBP".to_string()];
        let first = normalize(&response, "USD", &targets).unwrap();
        let second = normalize(&response, "USD", &targets).unwrap();
        assert_eq!(first, second);
    }
}
