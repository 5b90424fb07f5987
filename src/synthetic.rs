//! Placeholder market data used when no provider can be reached.
//!
//! Every generator starts from a fixed baseline and applies bounded random
//! jitter. The random source is injectable so tests can pin the output.

use crate::core::indicator::IndicatorSeries;
use crate::core::models::{
    CurrencyRate, EconomicIndicator, MarketIndex, NewsArticle, Quote, start_of_day,
};
use crate::core::news::tag_sentiment;
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::sync::Mutex;

/// Maximum relative deviation of a synthetic quote price from its baseline.
pub const QUOTE_JITTER: f64 = 0.02;
/// Maximum relative deviation of a synthetic index value from its baseline.
pub const INDEX_JITTER: f64 = 0.02;
/// Maximum relative deviation of a synthetic rate from the table cross rate.
pub const RATE_JITTER: f64 = 0.05;
/// Maximum relative deviation of a synthetic indicator from its baseline.
pub const INDICATOR_JITTER: f64 = 0.01;
/// Synthetic articles are published within this many hours of generation.
pub const NEWS_WINDOW_HOURS: i64 = 24;

pub const DEFAULT_QUOTE_BASELINE: f64 = 100.0;

const QUOTE_BASELINES: [(&str, f64); 10] = [
    ("AAPL", 175.0),
    ("MSFT", 410.0),
    ("GOOGL", 140.0),
    ("AMZN", 175.0),
    ("NVDA", 850.0),
    ("META", 480.0),
    ("TSLA", 200.0),
    ("JPM", 190.0),
    ("V", 275.0),
    ("SPY", 510.0),
];

/// Units of each currency per US dollar.
const USD_RATES: [(&str, f64); 10] = [
    ("USD", 1.0),
    ("EUR", 0.92),
    ("GBP", 0.79),
    ("JPY", 150.0),
    ("CAD", 1.36),
    ("AUD", 1.53),
    ("CHF", 0.88),
    ("CNY", 7.19),
    ("INR", 83.0),
    ("MXN", 17.1),
];

const NEWS_SOURCES: [&str; 5] = [
    "Reuters",
    "Bloomberg",
    "MarketWatch",
    "CNBC",
    "Financial Times",
];

const HEADLINES: [(&str, &str); 8] = [
    (
        "{topic}: investors weigh latest economic data",
        "Traders assess fresh figures on growth and employment.",
    ),
    (
        "{topic} in focus as earnings season continues",
        "Quarterly results from large companies set the tone for the week.",
    ),
    (
        "Analysts share outlook on {topic}",
        "Strategists outline expectations for the months ahead.",
    ),
    (
        "{topic}: central bank commentary shapes expectations",
        "Policy makers signal their view on interest rates.",
    ),
    (
        "What the latest moves mean for {topic}",
        "A look at the forces driving recent price action.",
    ),
    (
        "{topic} update: volumes steady ahead of key reports",
        "Market participants wait for scheduled data releases.",
    ),
    (
        "Global view on {topic} as currencies shift",
        "Exchange rate movements ripple through international markets.",
    ),
    (
        "{topic}: sector rotation continues",
        "Investors rebalance between growth and value names.",
    ),
];

/// A tracked market index and the level it is generated around.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexSpec {
    pub name: &'static str,
    pub symbol: &'static str,
    pub baseline: f64,
}

pub const MARKET_INDICES: [IndexSpec; 4] = [
    IndexSpec {
        name: "S&P 500",
        symbol: "^GSPC",
        baseline: 5000.0,
    },
    IndexSpec {
        name: "NASDAQ",
        symbol: "^IXIC",
        baseline: 16000.0,
    },
    IndexSpec {
        name: "Dow Jones",
        symbol: "^DJI",
        baseline: 38000.0,
    },
    IndexSpec {
        name: "Russell 2000",
        symbol: "^RUT",
        baseline: 2000.0,
    },
];

/// Baseline price for `symbol`, falling back to [`DEFAULT_QUOTE_BASELINE`].
pub fn quote_baseline(symbol: &str) -> f64 {
    QUOTE_BASELINES
        .iter()
        .find(|(s, _)| *s == symbol)
        .map_or(DEFAULT_QUOTE_BASELINE, |(_, b)| *b)
}

fn usd_rate(code: &str) -> f64 {
    USD_RATES
        .iter()
        .find(|(c, _)| *c == code)
        .map_or(1.0, |(_, r)| *r)
}

/// Table cross rate `base -> target` before jitter.
pub fn baseline_rate(base: &str, target: &str) -> f64 {
    usd_rate(target) / usd_rate(base)
}

pub struct SyntheticData {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl SyntheticData {
    pub fn new() -> Self {
        Self::with_rng(Box::new(StdRng::from_entropy()))
    }

    pub fn with_rng(rng: Box<dyn RngCore + Send>) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(Box::new(StdRng::seed_from_u64(seed)))
    }

    /// Uniform factor in `[-bound, bound]`.
    fn jitter(&self, bound: f64) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_range(-bound..=bound)
    }

    fn pick(&self, len: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_range(0..len)
    }

    fn quote_around(&self, symbol: &str, baseline: f64, bound: f64) -> Quote {
        let price = baseline * (1.0 + self.jitter(bound));
        let open = baseline * (1.0 + self.jitter(bound / 2.0));
        let change = price - baseline;
        let volume = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            rng.gen_range(1_000_000..50_000_000u64)
        };
        Quote {
            symbol: symbol.to_string(),
            price,
            change,
            change_percent: change / baseline * 100.0,
            volume: Some(volume),
            high: Some(price.max(open).max(baseline)),
            low: Some(price.min(open).min(baseline)),
            open: Some(open),
            previous_close: Some(baseline),
            timestamp: Utc::now(),
        }
    }

    /// Quote within [`QUOTE_JITTER`] of the symbol's baseline, which is
    /// reported as the previous close.
    pub fn quote(&self, symbol: &str) -> Quote {
        self.quote_around(symbol, quote_baseline(symbol), QUOTE_JITTER)
    }

    pub fn market_index(&self, index: &IndexSpec) -> MarketIndex {
        let quote = self.quote_around(index.symbol, index.baseline, INDEX_JITTER);
        MarketIndex::from_quote(index.name, &quote)
    }

    pub fn market_indices(&self) -> Vec<MarketIndex> {
        MARKET_INDICES
            .iter()
            .map(|index| self.market_index(index))
            .collect()
    }

    pub fn rate(&self, base: &str, target: &str) -> CurrencyRate {
        let rate = if base == target {
            1.0
        } else {
            baseline_rate(base, target) * (1.0 + self.jitter(RATE_JITTER))
        };
        CurrencyRate {
            base: base.to_string(),
            target: target.to_string(),
            rate,
            timestamp: Utc::now(),
        }
    }

    /// `count` articles about `topic`, newest first.
    pub fn news(&self, topic: &str, count: usize) -> Vec<NewsArticle> {
        let now = Utc::now();
        let window_minutes = NEWS_WINDOW_HOURS * 60;
        let mut articles: Vec<NewsArticle> = (0..count)
            .map(|i| {
                let (template, description) = HEADLINES[(self.pick(HEADLINES.len()) + i) % HEADLINES.len()];
                let title = template.replace("{topic}", topic);
                let age = self.pick(window_minutes as usize) as i64;
                NewsArticle {
                    sentiment: Some(tag_sentiment(&title, description)),
                    description: description.to_string(),
                    url: format!("https://news.example.com/articles/{}", i + 1),
                    source: NEWS_SOURCES[self.pick(NEWS_SOURCES.len())].to_string(),
                    published_at: now - Duration::minutes(age),
                    image_url: None,
                    title,
                }
            })
            .collect();
        articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        articles
    }

    pub fn indicator(&self, series: &IndicatorSeries) -> EconomicIndicator {
        let value = series.baseline * (1.0 + self.jitter(INDICATOR_JITTER));
        let date = Utc::now().date_naive();
        EconomicIndicator {
            name: series.name.to_string(),
            series_id: series.series_id.to_string(),
            value,
            previous: Some(series.baseline),
            change: Some(value - series.baseline),
            unit: series.unit.to_string(),
            date,
            timestamp: start_of_day(date),
        }
    }
}

impl Default for SyntheticData {
    fn default() -> Self {
        Self::new()
    }
}
