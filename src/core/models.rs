//! Normalized market data records returned by the aggregation services

use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Tolerance used when checking `change == price - previous_close`.
pub const CHANGE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: Option<u64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub open: Option<f64>,
    pub previous_close: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl Quote {
    /// Whether `change` agrees with `price - previous_close`. Quotes without a
    /// previous close are trivially consistent.
    pub fn is_consistent(&self) -> bool {
        match self.previous_close {
            Some(prev) => {
                let scale = self.price.abs().max(1.0);
                (self.price - prev - self.change).abs() <= CHANGE_TOLERANCE * scale
            }
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketIndex {
    pub name: String,
    pub symbol: String,
    pub value: f64,
    pub change: f64,
    pub change_percent: f64,
    pub timestamp: DateTime<Utc>,
}

impl MarketIndex {
    pub fn from_quote(name: &str, quote: &Quote) -> Self {
        Self {
            name: name.to_string(),
            symbol: quote.symbol.clone(),
            value: quote.price,
            change: quote.change,
            change_percent: quote.change_percent,
            timestamp: quote.timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRate {
    pub base: String,
    pub target: String,
    pub rate: f64,
    pub timestamp: DateTime<Utc>,
}

impl CurrencyRate {
    /// Builds a rate, rejecting non-positive or non-finite values.
    pub fn new(base: &str, target: &str, rate: f64, timestamp: DateTime<Utc>) -> Result<Self> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(anyhow!("Invalid rate {} for {}/{}", rate, base, target));
        }
        Ok(Self {
            base: base.to_string(),
            target: target.to_string(),
            rate,
            timestamp,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub description: String,
    pub url: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub image_url: Option<String>,
    pub sentiment: Option<Sentiment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsCategory {
    Markets,
    Economy,
    Business,
    Technology,
    Crypto,
    PersonalFinance,
}

impl NewsCategory {
    pub const ALL: [NewsCategory; 6] = [
        NewsCategory::Markets,
        NewsCategory::Economy,
        NewsCategory::Business,
        NewsCategory::Technology,
        NewsCategory::Crypto,
        NewsCategory::PersonalFinance,
    ];

    /// Slug understood by the news feed endpoint and used in cache keys.
    pub fn slug(&self) -> &'static str {
        match self {
            NewsCategory::Markets => "markets",
            NewsCategory::Economy => "economy",
            NewsCategory::Business => "business",
            NewsCategory::Technology => "technology",
            NewsCategory::Crypto => "crypto",
            NewsCategory::PersonalFinance => "personal-finance",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NewsCategory::Markets => "Markets",
            NewsCategory::Economy => "Economy",
            NewsCategory::Business => "Business",
            NewsCategory::Technology => "Technology",
            NewsCategory::Crypto => "Crypto",
            NewsCategory::PersonalFinance => "Personal Finance",
        }
    }

    /// Full-text search query for keyword based news providers.
    pub fn search_query(&self) -> &'static str {
        match self {
            NewsCategory::Markets => "stock market OR wall street OR S&P 500",
            NewsCategory::Economy => "economy OR inflation OR federal reserve",
            NewsCategory::Business => "business earnings OR corporate",
            NewsCategory::Technology => "technology stocks OR fintech",
            NewsCategory::Crypto => "cryptocurrency OR bitcoin",
            NewsCategory::PersonalFinance => "personal finance OR mortgage rates OR retirement",
        }
    }
}

impl Display for NewsCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for NewsCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "markets" | "market" | "stocks" => Ok(NewsCategory::Markets),
            "economy" | "economic" => Ok(NewsCategory::Economy),
            "business" => Ok(NewsCategory::Business),
            "technology" | "tech" => Ok(NewsCategory::Technology),
            "crypto" | "cryptocurrency" => Ok(NewsCategory::Crypto),
            "personal-finance" | "personal" => Ok(NewsCategory::PersonalFinance),
            _ => Err(anyhow!("Invalid news category: {}", s)),
        }
    }
}

/// Selection of articles requested from a news provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsQuery {
    pub query: String,
    pub category: Option<NewsCategory>,
    pub page_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicIndicator {
    pub name: String,
    pub series_id: String,
    pub value: f64,
    pub previous: Option<f64>,
    pub change: Option<f64>,
    pub unit: String,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
}

/// Midnight UTC of a calendar date, used for providers that only report dates.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or_default()
}
