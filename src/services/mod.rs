//! Aggregation services: cache, provider chain, synthetic fallback.

pub mod coalesce;
pub mod currency;
pub mod economy;
pub mod news;
pub mod stocks;

#[cfg(test)]
pub(crate) mod testing;

use crate::core::config::{AppConfig, CacheConfig, ProviderMode};
use crate::core::{CurrencyRateProvider, IndicatorProvider, NewsProvider, QuoteProvider};
use crate::providers::{
    AlphaVantageProvider, ExchangeRateApiProvider, FinnhubProvider, FrankfurterProvider,
    FredProvider, NewsApiProvider, NewsFeedProvider,
};
use crate::store::ResponseCache;
use crate::synthetic::SyntheticData;
use anyhow::Result;
use coalesce::Coalescer;
use serde::{Serialize, de::DeserializeOwned};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub use currency::CurrencyService;
pub use economy::EconomicService;
pub use news::NewsService;
pub use stocks::StockService;

/// Result of running a provider chain for one cache key.
pub enum Outcome<T> {
    /// Everything came from a provider.
    Fresh(T),
    /// Some parts had to be generated synthetically.
    Degraded(T),
    /// No provider produced data.
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ttls {
    pub quote: Duration,
    pub currency: Duration,
    pub news: Duration,
    pub indicator: Duration,
    pub synthetic: Duration,
}

impl From<&CacheConfig> for Ttls {
    fn from(config: &CacheConfig) -> Self {
        Self {
            quote: Duration::from_secs(config.quote_ttl_secs),
            currency: Duration::from_secs(config.currency_ttl_secs),
            news: Duration::from_secs(config.news_ttl_secs),
            indicator: Duration::from_secs(config.indicator_ttl_secs),
            synthetic: Duration::from_secs(config.synthetic_ttl_secs),
        }
    }
}

impl Default for Ttls {
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}

/// State shared by every service.
pub struct ServiceContext {
    pub cache: ResponseCache,
    pub synthetic: SyntheticData,
    pub ttls: Ttls,
    coalescer: Option<Coalescer>,
}

impl ServiceContext {
    pub fn new(cache: ResponseCache, synthetic: SyntheticData, ttls: Ttls) -> Self {
        Self {
            cache,
            synthetic,
            ttls,
            coalescer: None,
        }
    }

    /// Shares one provider chain run between concurrent callers of a key.
    pub fn with_coalescing(mut self) -> Self {
        self.coalescer = Some(Coalescer::new());
        self
    }

    /// Serves `key` from the cache, or runs `fetch` and caches what it
    /// returns. When `fetch` comes back empty handed the value is built by
    /// `synthesize` and cached with the synthetic TTL.
    pub(crate) async fn resolve<T, F, Fut, S>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
        synthesize: S,
    ) -> T
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
        F: Fn() -> Fut,
        Fut: Future<Output = Outcome<T>>,
        S: Fn() -> T,
    {
        if let Some(hit) = self.cache.get_as::<T>(key).await {
            debug!(key, "Cache hit");
            return hit;
        }
        debug!(key, "Cache miss");

        if let Some(coalescer) = &self.coalescer {
            let shared = coalescer
                .run(key, || self.load(key, ttl, &fetch, &synthesize))
                .await;
            match shared {
                Some(value) => return value,
                None => warn!(key, "In-flight load produced an unexpected type"),
            }
        }
        self.load(key, ttl, &fetch, &synthesize).await
    }

    async fn load<T, F, Fut, S>(&self, key: &str, ttl: Duration, fetch: &F, synthesize: &S) -> T
    where
        T: Serialize,
        F: Fn() -> Fut,
        Fut: Future<Output = Outcome<T>>,
        S: Fn() -> T,
    {
        let (value, ttl) = match fetch().await {
            Outcome::Fresh(value) => (value, ttl),
            Outcome::Degraded(value) => {
                info!(key, "Serving partially synthetic data");
                (value, self.ttls.synthetic)
            }
            Outcome::Unavailable => {
                info!(key, "No provider data available, serving synthetic data");
                (synthesize(), self.ttls.synthetic)
            }
        };
        self.cache.set_as(key, &value, ttl).await;
        value
    }
}

/// Entry point for display code: all four services over one shared cache.
pub struct DataServices {
    pub stocks: StockService,
    pub currency: CurrencyService,
    pub news: NewsService,
    pub economy: EconomicService,
}

fn is_real(name: &str, mode: ProviderMode) -> bool {
    debug!(provider = name, ?mode, "Resolved provider mode");
    mode == ProviderMode::Real
}

impl DataServices {
    pub fn new(context: Arc<ServiceContext>, chains: ProviderChains) -> Self {
        Self {
            stocks: StockService::new(chains.quotes, Arc::clone(&context)),
            currency: CurrencyService::new(chains.currency, Arc::clone(&context)),
            news: NewsService::new(chains.news, Arc::clone(&context)),
            economy: EconomicService::new(chains.indicators, context),
        }
    }

    /// Builds the provider chains allowed by the configured modes, primary
    /// first. Providers resolved to synthetic mode are left out entirely.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let providers = &config.providers;
        let http = &config.http;
        let mut chains = ProviderChains::default();

        if is_real("alpha_vantage", config.mode_for(&providers.alpha_vantage, true)) {
            chains.quotes.push(Arc::new(AlphaVantageProvider::new(&providers.alpha_vantage, http)?));
        }
        if is_real("finnhub", config.mode_for(&providers.finnhub, true)) {
            chains.quotes.push(Arc::new(FinnhubProvider::new(&providers.finnhub, http)?));
        }
        if is_real("exchange_rate_api", config.mode_for(&providers.exchange_rate_api, true)) {
            chains.currency.push(Arc::new(ExchangeRateApiProvider::new(
                &providers.exchange_rate_api,
                http,
            )?));
        }
        if is_real("frankfurter", config.mode_for(&providers.frankfurter, false)) {
            chains.currency.push(Arc::new(FrankfurterProvider::new(&providers.frankfurter, http)?));
        }
        if is_real("news_api", config.mode_for(&providers.news_api, true)) {
            chains.news.push(Arc::new(NewsApiProvider::new(&providers.news_api, http)?));
        }
        if is_real("news_feed", config.mode_for(&providers.news_feed, false)) {
            chains.news.push(Arc::new(NewsFeedProvider::new(&providers.news_feed, http)?));
        }
        if is_real("fred", config.mode_for(&providers.fred, true)) {
            chains.indicators.push(Arc::new(FredProvider::new(&providers.fred, http)?));
        }

        if config.demo {
            info!("Demo mode: all data is synthetic");
        }
        debug!(
            quotes = chains.quotes.len(),
            currency = chains.currency.len(),
            news = chains.news.len(),
            indicators = chains.indicators.len(),
            "Built provider chains"
        );

        let mut context = ServiceContext::new(
            ResponseCache::new(),
            SyntheticData::new(),
            Ttls::from(&config.cache),
        );
        if config.coalesce_requests {
            context = context.with_coalescing();
        }
        Ok(Self::new(Arc::new(context), chains))
    }
}

/// Ordered provider lists, primary first.
#[derive(Default)]
pub struct ProviderChains {
    pub quotes: Vec<Arc<dyn QuoteProvider>>,
    pub currency: Vec<Arc<dyn CurrencyRateProvider>>,
    pub news: Vec<Arc<dyn NewsProvider>>,
    pub indicators: Vec<Arc<dyn IndicatorProvider>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ProviderConfig;

    #[test]
    fn test_from_config_builds_only_real_providers() {
        let mut config = AppConfig::default();
        config.providers.alpha_vantage.api_key = Some("av-key".to_string());
        config.providers.news_feed.mode = Some(ProviderMode::Synthetic);
        config.providers.fred = ProviderConfig::new("http://localhost:1");

        let services = DataServices::from_config(&config).unwrap();

        assert_eq!(services.stocks.provider_names(), vec!["alpha_vantage"]);
        assert_eq!(services.currency.provider_names(), vec!["frankfurter"]);
        assert!(services.news.provider_names().is_empty());
        assert!(services.economy.provider_names().is_empty());
    }

    #[test]
    fn test_demo_mode_builds_empty_chains() {
        let mut config = AppConfig {
            demo: true,
            ..AppConfig::default()
        };
        config.providers.alpha_vantage.api_key = Some("av-key".to_string());

        let services = DataServices::from_config(&config).unwrap();

        assert!(services.stocks.provider_names().is_empty());
        assert!(services.currency.provider_names().is_empty());
        assert!(services.news.provider_names().is_empty());
        assert!(services.economy.provider_names().is_empty());
    }

    #[test]
    fn test_placeholder_keys_build_empty_chains() {
        let mut config = AppConfig::default();
        for provider in [
            &mut config.providers.alpha_vantage,
            &mut config.providers.finnhub,
            &mut config.providers.exchange_rate_api,
            &mut config.providers.news_api,
            &mut config.providers.fred,
        ] {
            provider.api_key = Some("demo".to_string());
        }
        config.providers.frankfurter.mode = Some(ProviderMode::Synthetic);
        config.providers.news_feed.mode = Some(ProviderMode::Synthetic);

        let services = DataServices::from_config(&config).unwrap();

        assert!(services.stocks.provider_names().is_empty());
        assert!(services.currency.provider_names().is_empty());
        assert!(services.news.provider_names().is_empty());
        assert!(services.economy.provider_names().is_empty());
    }

    #[tokio::test]
    async fn test_placeholder_keys_serve_synthetic_indices() {
        let mut config = AppConfig::default();
        config.providers.alpha_vantage.api_key = Some("demo".to_string());
        config.providers.finnhub.api_key = Some("Demo".to_string());

        let services = DataServices::from_config(&config).unwrap();
        let indices = services.stocks.get_market_indices().await;

        let names: Vec<&str> = indices.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["S&P 500", "NASDAQ", "Dow Jones", "Russell 2000"]);
    }

    #[test]
    fn test_ttls_from_config() {
        let ttls = Ttls::from(&CacheConfig {
            quote_ttl_secs: 30,
            ..CacheConfig::default()
        });
        assert_eq!(ttls.quote, Duration::from_secs(30));
        assert_eq!(ttls.synthetic, Duration::from_secs(60));
    }
}
