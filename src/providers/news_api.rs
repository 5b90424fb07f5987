//! NewsAPI `/v2/everything` adapter (primary news source).

use super::util::{build_client, endpoint, get_json};
use crate::core::config::{HttpConfig, ProviderConfig};
use crate::core::models::{NewsArticle, NewsQuery};
use crate::core::news::{NewsProvider, tag_sentiment};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Title NewsAPI substitutes for articles withdrawn by the publisher.
const REMOVED_MARKER: &str = "[Removed]";

#[derive(Debug, Deserialize)]
pub(crate) struct EverythingResponse {
    status: String,
    code: Option<String>,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    source: Option<RawSource>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    name: Option<String>,
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow!("Missing field '{}' in NewsAPI article", field))
}

fn normalize_article(raw: RawArticle) -> Result<NewsArticle> {
    let title = required(raw.title, "title")?;
    let description = raw.description.map(|d| d.trim().to_string()).unwrap_or_default();
    let published = required(raw.published_at, "publishedAt")?;
    let published_at = DateTime::parse_from_rfc3339(&published)
        .with_context(|| format!("Invalid publishedAt '{published}' in NewsAPI article"))?
        .with_timezone(&Utc);

    Ok(NewsArticle {
        sentiment: Some(tag_sentiment(&title, &description)),
        url: required(raw.url, "url")?,
        source: required(raw.source.and_then(|s| s.name), "source.name")?,
        image_url: raw.url_to_image.filter(|u| !u.trim().is_empty()),
        title,
        description,
        published_at,
    })
}

pub(crate) fn normalize(response: EverythingResponse) -> Result<Vec<NewsArticle>> {
    if response.status != "ok" {
        return Err(anyhow!(
            "NewsAPI error {}: {}",
            response.code.as_deref().unwrap_or("unknown"),
            response.message.as_deref().unwrap_or("no message")
        ));
    }

    response
        .articles
        .into_iter()
        .filter(|a| a.title.as_deref() != Some(REMOVED_MARKER))
        .map(normalize_article)
        .collect()
}

pub struct NewsApiProvider {
    base_url: String,
    api_key: String,
    client: Client,
}

impl NewsApiProvider {
    pub fn new(config: &ProviderConfig, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url.clone(),
            api_key: config.key().to_string(),
            client: build_client(http)?,
        })
    }
}

#[async_trait]
impl NewsProvider for NewsApiProvider {
    fn name(&self) -> &str {
        "news_api"
    }

    #[instrument(name = "NewsApiFetch", skip(self), fields(query = %query.query))]
    async fn fetch_news(&self, query: &NewsQuery) -> Result<Vec<NewsArticle>> {
        let page_size = query.page_size.to_string();
        let url = endpoint(
            &self.base_url,
            "/v2/everything",
            &[
                ("q", query.query.as_str()),
                ("pageSize", page_size.as_str()),
                ("language", "en"),
                ("sortBy", "publishedAt"),
                ("apiKey", self.api_key.as_str()),
            ],
        )?;
        let response: EverythingResponse =
            get_json(&self.client, url, &format!("news query: {}", query.query)).await?;
        let articles = normalize(response)?;
        debug!("NewsAPI returned {} articles", articles.len());
        Ok(articles)
    }
}
