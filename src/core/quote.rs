//! Stock quote provider abstraction

use super::models::Quote;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &str;

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote>;
}
