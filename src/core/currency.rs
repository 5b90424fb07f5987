//! Currency conversion abstractions

use super::models::CurrencyRate;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &str;

    async fn get_rate(&self, base: &str, target: &str) -> Result<CurrencyRate>;

    /// Rates from `base` to every target. Fails if any target is missing.
    async fn get_rates(&self, base: &str, targets: &[String]) -> Result<Vec<CurrencyRate>> {
        let mut rates = Vec::with_capacity(targets.len());
        for target in targets {
            rates.push(self.get_rate(base, target).await?);
        }
        Ok(rates)
    }
}
