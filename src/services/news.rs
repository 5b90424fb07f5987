use super::{Outcome, ServiceContext};
use crate::core::models::{NewsArticle, NewsCategory, NewsQuery};
use crate::core::news::NewsProvider;
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

pub struct NewsService {
    providers: Vec<Arc<dyn NewsProvider>>,
    context: Arc<ServiceContext>,
}

impl NewsService {
    pub fn new(providers: Vec<Arc<dyn NewsProvider>>, context: Arc<ServiceContext>) -> Self {
        Self { providers, context }
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Runs `query` through the cache and provider chain. A provider that
    /// answers with no articles counts as a failure.
    async fn fetch(&self, key: &str, query: NewsQuery, topic: &str) -> Vec<NewsArticle> {
        self.context
            .resolve(
                key,
                self.context.ttls.news,
                || async {
                    for provider in &self.providers {
                        match provider.fetch_news(&query).await {
                            Ok(mut articles) if !articles.is_empty() => {
                                articles.truncate(query.page_size);
                                debug!(
                                    provider = provider.name(),
                                    count = articles.len(),
                                    "Fetched news"
                                );
                                return Outcome::Fresh(articles);
                            }
                            Ok(_) => warn!(
                                provider = provider.name(),
                                query = %query.query,
                                "News provider returned no articles"
                            ),
                            Err(e) => warn!(
                                provider = provider.name(),
                                query = %query.query,
                                error = %e,
                                "News provider failed"
                            ),
                        }
                    }
                    Outcome::Unavailable
                },
                || self.context.synthetic.news(topic, query.page_size),
            )
            .await
    }

    /// Articles matching `query`. `page_size` is clamped to `1..=100`.
    pub async fn get_financial_news(&self, query: &str, page_size: usize) -> Vec<NewsArticle> {
        let query = query.trim();
        if query.is_empty() {
            warn!("Rejecting blank news query");
            return Vec::new();
        }
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let key = format!("news:q:{}:{page_size}", query.to_lowercase());
        let request = NewsQuery {
            query: query.to_string(),
            category: None,
            page_size,
        };
        self.fetch(&key, request, query).await
    }

    pub async fn get_market_news(&self) -> Vec<NewsArticle> {
        self.get_category_news(NewsCategory::Markets).await
    }

    pub async fn get_category_news(&self, category: NewsCategory) -> Vec<NewsArticle> {
        let key = format!("news:category:{}", category.slug());
        let request = NewsQuery {
            query: category.search_query().to_string(),
            category: Some(category),
            page_size: DEFAULT_PAGE_SIZE,
        };
        self.fetch(&key, request, category.label()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{MockNewsProvider, context};

    fn service(providers: &[Arc<MockNewsProvider>]) -> NewsService {
        let chain = providers
            .iter()
            .map(|p| Arc::clone(p) as Arc<dyn NewsProvider>)
            .collect();
        NewsService::new(chain, context())
    }

    #[tokio::test]
    async fn test_primary_news_is_cached() {
        let primary = MockNewsProvider::new("primary", &["Stocks rally", "Bonds slip"]);
        let secondary = MockNewsProvider::new("secondary", &["Other"]);
        let news = service(&[primary.clone(), secondary.clone()]);

        let articles = news.get_financial_news("stocks", 5).await;
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Stocks rally");

        let again = news.get_financial_news(" stocks ", 5).await;
        assert_eq!(again, articles);
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn test_query_case_shares_cache_entry() {
        let primary = MockNewsProvider::new("primary", &["Stocks rally"]);
        let news = service(&[primary.clone()]);

        let articles = news.get_financial_news("Stocks", 5).await;
        let again = news.get_financial_news("STOCKS", 5).await;

        assert_eq!(again, articles);
        assert_eq!(primary.calls(), 1);
    }

    #[tokio::test]
    async fn test_falls_back_to_secondary() {
        let primary = MockNewsProvider::failing("primary");
        let secondary = MockNewsProvider::new("secondary", &["Fed holds rates"]);
        let news = service(&[primary.clone(), secondary.clone()]);

        let articles = news.get_category_news(NewsCategory::Economy).await;

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Fed holds rates");
        let query = secondary.last_query().unwrap();
        assert_eq!(query.category, Some(NewsCategory::Economy));
        assert_eq!(query.page_size, DEFAULT_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_empty_answer_moves_to_next_provider() {
        let primary = MockNewsProvider::new("primary", &[]);
        let secondary = MockNewsProvider::new("secondary", &["Crypto slides"]);
        let news = service(&[primary.clone(), secondary.clone()]);

        let articles = news.get_category_news(NewsCategory::Crypto).await;

        assert_eq!(articles[0].title, "Crypto slides");
        assert_eq!(primary.calls(), 1);
    }

    #[tokio::test]
    async fn test_total_outage_serves_synthetic_news() {
        let news = service(&[MockNewsProvider::failing("primary")]);

        let articles = news.get_financial_news("inflation", 3).await;

        assert_eq!(articles.len(), 3);
        for article in &articles {
            assert!(article.title.contains("inflation"));
            assert!(!article.url.is_empty());
        }
    }

    #[tokio::test]
    async fn test_page_size_is_clamped() {
        let primary = MockNewsProvider::new("primary", &["A", "B", "C"]);
        let news = service(&[primary.clone()]);

        let articles = news.get_financial_news("markets", 0).await;
        assert_eq!(articles.len(), 1);
        assert_eq!(primary.last_query().unwrap().page_size, 1);

        news.get_financial_news("markets", 500).await;
        assert_eq!(primary.last_query().unwrap().page_size, MAX_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected() {
        let primary = MockNewsProvider::new("primary", &["A"]);
        let news = service(&[primary.clone()]);

        assert!(news.get_financial_news("   ", 10).await.is_empty());
        assert_eq!(primary.calls(), 0);
    }

    #[tokio::test]
    async fn test_market_news_uses_markets_category() {
        let primary = MockNewsProvider::new("primary", &["Dow climbs"]);
        let news = service(&[primary.clone()]);

        news.get_market_news().await;
        news.get_category_news(NewsCategory::Markets).await;

        assert_eq!(primary.calls(), 1);
        assert_eq!(
            primary.last_query().unwrap().query,
            NewsCategory::Markets.search_query()
        );
    }
}
