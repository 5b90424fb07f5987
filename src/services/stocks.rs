use super::{Outcome, ServiceContext};
use crate::core::models::{MarketIndex, Quote};
use crate::core::quote::QuoteProvider;
use crate::synthetic::MARKET_INDICES;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

const INDICES_KEY: &str = "indices";

/// Trimmed, upper-cased ticker, or `None` for blank or whitespace-containing
/// input.
pub fn normalize_symbol(symbol: &str) -> Option<String> {
    let symbol = symbol.trim();
    if symbol.is_empty() || symbol.chars().any(char::is_whitespace) {
        return None;
    }
    Some(symbol.to_uppercase())
}

/// Stock quotes and the headline market indices.
pub struct StockService {
    providers: Vec<Arc<dyn QuoteProvider>>,
    context: Arc<ServiceContext>,
}

impl StockService {
    pub fn new(providers: Vec<Arc<dyn QuoteProvider>>, context: Arc<ServiceContext>) -> Self {
        Self { providers, context }
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// First successful quote from the provider chain.
    async fn fetch_quote(&self, symbol: &str) -> Option<Quote> {
        for provider in &self.providers {
            match provider.fetch_quote(symbol).await {
                Ok(quote) => {
                    debug!(provider = provider.name(), symbol, "Fetched quote");
                    return Some(quote);
                }
                Err(e) => warn!(provider = provider.name(), symbol, error = %e, "Quote provider failed"),
            }
        }
        None
    }

    pub async fn get_stock_quote(&self, symbol: &str) -> Option<Quote> {
        let Some(symbol) = normalize_symbol(symbol) else {
            warn!(symbol, "Rejecting invalid stock symbol");
            return None;
        };
        let key = format!("quote:{symbol}");
        let quote = self
            .context
            .resolve(
                &key,
                self.context.ttls.quote,
                || async {
                    match self.fetch_quote(&symbol).await {
                        Some(quote) => Outcome::Fresh(quote),
                        None => Outcome::Unavailable,
                    }
                },
                || self.context.synthetic.quote(&symbol),
            )
            .await;
        Some(quote)
    }

    /// Quotes for every valid symbol, in request order. Each symbol goes
    /// through [`StockService::get_stock_quote`] on its own.
    pub async fn get_batch_quotes(&self, symbols: &[String]) -> Vec<Quote> {
        join_all(symbols.iter().map(|symbol| self.get_stock_quote(symbol)))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    /// S&P 500, NASDAQ, Dow Jones and Russell 2000. An index no provider can
    /// quote is filled in synthetically.
    pub async fn get_market_indices(&self) -> Vec<MarketIndex> {
        self.context
            .resolve(
                INDICES_KEY,
                self.context.ttls.quote,
                || async {
                    if self.providers.is_empty() {
                        return Outcome::Unavailable;
                    }
                    let quotes =
                        join_all(MARKET_INDICES.iter().map(|index| self.fetch_quote(index.symbol)))
                            .await;
                    let missing = quotes.iter().filter(|q| q.is_none()).count();
                    if missing == MARKET_INDICES.len() {
                        return Outcome::Unavailable;
                    }

                    let indices: Vec<MarketIndex> = MARKET_INDICES
                        .iter()
                        .zip(quotes)
                        .map(|(index, quote)| match quote {
                            Some(quote) => MarketIndex::from_quote(index.name, &quote),
                            None => self.context.synthetic.market_index(index),
                        })
                        .collect();
                    if missing > 0 {
                        Outcome::Degraded(indices)
                    } else {
                        Outcome::Fresh(indices)
                    }
                },
                || self.context.synthetic.market_indices(),
            )
            .await
    }
}
