pub mod alpha_vantage;
pub mod exchange_rate_api;
pub mod finnhub;
pub mod frankfurter;
pub mod fred;
pub mod news_api;
pub mod news_feed;
pub mod util;

pub use alpha_vantage::AlphaVantageProvider;
pub use exchange_rate_api::ExchangeRateApiProvider;
pub use finnhub::FinnhubProvider;
pub use frankfurter::FrankfurterProvider;
pub use fred::FredProvider;
pub use news_api::NewsApiProvider;
pub use news_feed::NewsFeedProvider;
