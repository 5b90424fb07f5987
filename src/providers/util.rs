use crate::core::config::HttpConfig;
use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

/// Builds the HTTP client an adapter uses for all of its calls.
pub fn build_client(http: &HttpConfig) -> Result<Client> {
    Client::builder()
        .user_agent(http.user_agent.as_str())
        .timeout(http.timeout())
        .build()
        .context("Failed to build HTTP client")
}

/// Joins `base_url` and `path` and appends query parameters.
pub fn endpoint(base_url: &str, path: &str, params: &[(&str, &str)]) -> Result<Url> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), path);
    let parsed = if params.is_empty() {
        Url::parse(&url)
    } else {
        Url::parse_with_params(&url, params)
    };
    parsed.with_context(|| format!("Invalid URL: {url}"))
}

/// Performs a GET and decodes the JSON body.
///
/// Transport failures, non-2xx statuses and undecodable bodies are all
/// reported as errors naming `what` was requested.
pub async fn get_json<T: DeserializeOwned>(client: &Client, url: Url, what: &str) -> Result<T> {
    // URLs carry API keys, so only `what` is logged
    debug!("Requesting {}", what);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| anyhow!("Request error: {} for {}", e.without_url(), what))?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("HTTP error: {} for {}", status, what));
    }

    let text = response
        .text()
        .await
        .with_context(|| format!("Failed to get response text for {what}"))?;

    if text.trim().is_empty() {
        return Err(anyhow!("Received empty response for {}", what));
    }

    serde_json::from_str(&text).map_err(|e| {
        error!(error = %e, "Failed to parse response for {}", what);
        anyhow!("Failed to parse JSON response for {}: {}", what, e)
    })
}

/// Parses a numeric field that providers send as a string.
pub fn parse_number(raw: &str, field: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .trim_end_matches('%')
        .parse()
        .with_context(|| format!("Invalid number in {field}: '{raw}'"))?;
    if !value.is_finite() {
        return Err(anyhow!("Non-finite number in {}: '{}'", field, raw));
    }
    Ok(value)
}
