//! Counting in-memory providers for service tests.

use super::{ServiceContext, Ttls};
use crate::core::indicator::{IndicatorProvider, IndicatorSeries};
use crate::core::models::{
    CurrencyRate, EconomicIndicator, NewsArticle, NewsQuery, Quote, Sentiment, start_of_day,
};
use crate::core::{CurrencyRateProvider, NewsProvider, QuoteProvider};
use crate::store::ResponseCache;
use crate::synthetic::SyntheticData;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn context() -> Arc<ServiceContext> {
    Arc::new(ServiceContext::new(
        ResponseCache::new(),
        SyntheticData::seeded(1),
        Ttls::default(),
    ))
}

pub fn coalescing_context() -> Arc<ServiceContext> {
    Arc::new(
        ServiceContext::new(ResponseCache::new(), SyntheticData::seeded(1), Ttls::default())
            .with_coalescing(),
    )
}

pub fn fixed_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 8, 21, 0, 0).unwrap()
}

pub fn quote(symbol: &str, price: f64, previous_close: f64) -> Quote {
    let change = price - previous_close;
    Quote {
        symbol: symbol.to_string(),
        price,
        change,
        change_percent: change / previous_close * 100.0,
        volume: Some(1_000),
        high: None,
        low: None,
        open: None,
        previous_close: Some(previous_close),
        timestamp: fixed_time(),
    }
}

pub fn article(title: &str) -> NewsArticle {
    NewsArticle {
        title: title.to_string(),
        description: String::new(),
        url: format!("https://example.com/{}", title.len()),
        source: "Reuters".to_string(),
        published_at: fixed_time(),
        image_url: None,
        sentiment: Some(Sentiment::Neutral),
    }
}

pub struct MockQuoteProvider {
    name: &'static str,
    prices: HashMap<String, f64>,
    delay: Duration,
    calls: AtomicUsize,
}

impl MockQuoteProvider {
    /// Answers for the listed symbols and fails for everything else.
    pub fn new(name: &'static str, prices: &[(&str, f64)]) -> Arc<Self> {
        Arc::new(Self {
            name,
            prices: prices.iter().map(|(s, p)| (s.to_string(), *p)).collect(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Self::new(name, &[])
    }

    pub fn slow(name: &'static str, prices: &[(&str, f64)], delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            name,
            prices: prices.iter().map(|(s, p)| (s.to_string(), *p)).collect(),
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteProvider for MockQuoteProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let price = self
            .prices
            .get(symbol)
            .ok_or_else(|| anyhow!("{} has no quote for {}", self.name, symbol))?;
        Ok(quote(symbol, *price, price - 1.0))
    }
}

pub struct MockCurrencyProvider {
    name: &'static str,
    rates: HashMap<String, f64>,
    calls: AtomicUsize,
}

impl MockCurrencyProvider {
    /// Rates by target currency, whatever the base.
    pub fn new(name: &'static str, rates: &[(&str, f64)]) -> Arc<Self> {
        Arc::new(Self {
            name,
            rates: rates.iter().map(|(c, r)| (c.to_string(), *r)).collect(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Self::new(name, &[])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, base: &str, target: &str) -> Result<CurrencyRate> {
        let rate = self
            .rates
            .get(target)
            .ok_or_else(|| anyhow!("{} has no rate for {}/{}", self.name, base, target))?;
        CurrencyRate::new(base, target, *rate, fixed_time())
    }
}

#[async_trait]
impl CurrencyRateProvider for MockCurrencyProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn get_rate(&self, base: &str, target: &str) -> Result<CurrencyRate> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.lookup(base, target)
    }

    async fn get_rates(&self, base: &str, targets: &[String]) -> Result<Vec<CurrencyRate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        targets.iter().map(|t| self.lookup(base, t)).collect()
    }
}

pub struct MockNewsProvider {
    name: &'static str,
    articles: Option<Vec<NewsArticle>>,
    calls: AtomicUsize,
    last_query: std::sync::Mutex<Option<NewsQuery>>,
}

impl MockNewsProvider {
    pub fn new(name: &'static str, titles: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            name,
            articles: Some(titles.iter().map(|t| article(t)).collect()),
            calls: AtomicUsize::new(0),
            last_query: std::sync::Mutex::new(None),
        })
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            articles: None,
            calls: AtomicUsize::new(0),
            last_query: std::sync::Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<NewsQuery> {
        self.last_query.lock().unwrap().clone()
    }
}

#[async_trait]
impl NewsProvider for MockNewsProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn fetch_news(&self, query: &NewsQuery) -> Result<Vec<NewsArticle>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());
        self.articles
            .clone()
            .ok_or_else(|| anyhow!("{} is down", self.name))
    }
}

pub struct MockIndicatorProvider {
    values: HashMap<String, f64>,
    calls: AtomicUsize,
}

impl MockIndicatorProvider {
    /// Values by series id; other series fail.
    pub fn new(values: &[(&str, f64)]) -> Arc<Self> {
        Arc::new(Self {
            values: values.iter().map(|(s, v)| (s.to_string(), *v)).collect(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IndicatorProvider for MockIndicatorProvider {
    fn name(&self) -> &str {
        "mock_indicators"
    }

    async fn fetch_indicator(&self, series: &IndicatorSeries) -> Result<EconomicIndicator> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let value = self
            .values
            .get(series.series_id)
            .ok_or_else(|| anyhow!("no data for {}", series.series_id))?;
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        Ok(EconomicIndicator {
            name: series.name.to_string(),
            series_id: series.series_id.to_string(),
            value: *value,
            previous: None,
            change: None,
            unit: series.unit.to_string(),
            date,
            timestamp: start_of_day(date),
        })
    }
}
