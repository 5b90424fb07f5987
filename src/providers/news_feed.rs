//! Adapter for the site's news aggregation endpoint (`/api/news`), which
//! merges RSS feeds server side and returns feed-shaped items.

use super::util::{build_client, endpoint, get_json};
use crate::core::config::{HttpConfig, ProviderConfig};
use crate::core::models::{NewsArticle, NewsQuery};
use crate::core::news::{NewsProvider, tag_sentiment};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub(crate) struct FeedResponse {
    #[serde(alias = "items")]
    articles: Vec<FeedItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedItem {
    title: Option<String>,
    description: Option<String>,
    content_snippet: Option<String>,
    summary: Option<String>,
    link: Option<String>,
    url: Option<String>,
    source: Option<String>,
    iso_date: Option<String>,
    pub_date: Option<String>,
    published_at: Option<String>,
    image: Option<String>,
    image_url: Option<String>,
    enclosure: Option<Enclosure>,
}

/// RSS `<enclosure>` as re-emitted by feed-to-JSON converters.
#[derive(Debug, Deserialize)]
struct Enclosure {
    url: Option<String>,
}

/// First value that is present and not blank.
fn first_of<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|v| !v.trim().is_empty())
}

/// RSS feeds use RFC 2822 dates; some aggregators re-emit RFC 3339.
fn parse_feed_date(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| anyhow!("Invalid pubDate '{}' in news feed item", raw))
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow!("Missing field '{}' in news feed item", field))
}

pub(crate) fn normalize(response: FeedResponse) -> Result<Vec<NewsArticle>> {
    response
        .articles
        .into_iter()
        .map(|item| {
            let title = required(item.title, "title")?;
            let description = first_of([item.description, item.content_snippet, item.summary])
                .map(|d| d.trim().to_string())
                .unwrap_or_default();
            // isoDate is the converter's normalized copy of pubDate
            let published = first_of([item.iso_date, item.pub_date, item.published_at]);
            let published_at = parse_feed_date(&required(published, "pubDate")?)?;
            let image_url = first_of([
                item.image,
                item.image_url,
                item.enclosure.and_then(|e| e.url),
            ]);
            Ok(NewsArticle {
                sentiment: Some(tag_sentiment(&title, &description)),
                url: required(first_of([item.link, item.url]), "link")?,
                source: required(item.source, "source")?,
                image_url: image_url.map(|u| u.trim().to_string()),
                title,
                description,
                published_at,
            })
        })
        .collect()
}

pub struct NewsFeedProvider {
    base_url: String,
    client: Client,
}

impl NewsFeedProvider {
    pub fn new(config: &ProviderConfig, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url.clone(),
            client: build_client(http)?,
        })
    }
}

#[async_trait]
impl NewsProvider for NewsFeedProvider {
    fn name(&self) -> &str {
        "news_feed"
    }

    #[instrument(name = "NewsFeedFetch", skip(self), fields(query = %query.query))]
    async fn fetch_news(&self, query: &NewsQuery) -> Result<Vec<NewsArticle>> {
        let limit = query.page_size.to_string();
        let mut params = vec![("q", query.query.as_str()), ("limit", limit.as_str())];
        if let Some(category) = &query.category {
            params.push(("category", category.slug()));
        }
        let url = endpoint(&self.base_url, "/api/news", &params)?;
        let response: FeedResponse =
            get_json(&self.client, url, &format!("news feed: {}", query.query)).await?;

        let mut articles = normalize(response)?;
        articles.truncate(query.page_size);
        Ok(articles)
    }
}
