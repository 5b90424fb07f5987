//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod currency;
pub mod indicator;
pub mod log;
pub mod models;
pub mod news;
pub mod quote;

// Re-export main types for cleaner imports
pub use currency::CurrencyRateProvider;
pub use indicator::{IndicatorProvider, IndicatorSeries, TRACKED_SERIES};
pub use models::{
    CurrencyRate, EconomicIndicator, MarketIndex, NewsArticle, NewsCategory, NewsQuery, Quote,
    Sentiment,
};
pub use news::NewsProvider;
pub use quote::QuoteProvider;
