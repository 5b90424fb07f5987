use super::{Outcome, ServiceContext};
use crate::core::currency::CurrencyRateProvider;
use crate::core::models::CurrencyRate;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

/// Upper-cased three letter code, or `None` when the input is not one.
pub fn normalize_currency(code: &str) -> Option<String> {
    let code = code.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(code.to_ascii_uppercase())
    } else {
        None
    }
}

fn identity(code: &str) -> CurrencyRate {
    CurrencyRate {
        base: code.to_string(),
        target: code.to_string(),
        rate: 1.0,
        timestamp: Utc::now(),
    }
}

pub struct CurrencyService {
    providers: Vec<Arc<dyn CurrencyRateProvider>>,
    context: Arc<ServiceContext>,
}

impl CurrencyService {
    pub fn new(
        providers: Vec<Arc<dyn CurrencyRateProvider>>,
        context: Arc<ServiceContext>,
    ) -> Self {
        Self { providers, context }
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub async fn get_exchange_rate(&self, base: &str, target: &str) -> Option<CurrencyRate> {
        let (Some(base), Some(target)) = (normalize_currency(base), normalize_currency(target))
        else {
            warn!("Rejecting invalid currency pair: {}/{}", base, target);
            return None;
        };
        if base == target {
            return Some(identity(&base));
        }

        let key = format!("rate:{base}:{target}");
        let rate = self
            .context
            .resolve(
                &key,
                self.context.ttls.currency,
                || async {
                    for provider in &self.providers {
                        match provider.get_rate(&base, &target).await {
                            Ok(rate) => {
                                debug!(provider = provider.name(), "Fetched rate for {}/{}", base, target);
                                return Outcome::Fresh(rate);
                            }
                            Err(e) => warn!(
                                provider = provider.name(),
                                error = %e,
                                "Currency provider failed for {}/{}",
                                base,
                                target
                            ),
                        }
                    }
                    Outcome::Unavailable
                },
                || self.context.synthetic.rate(&base, &target),
            )
            .await;
        Some(rate)
    }

    /// Rates from `base` to each valid target, in request order. Invalid
    /// targets are skipped; an invalid base yields nothing.
    pub async fn get_multiple_currencies(
        &self,
        base: &str,
        targets: &[String],
    ) -> Vec<CurrencyRate> {
        let Some(base) = normalize_currency(base) else {
            warn!("Rejecting invalid base currency: {}", base);
            return Vec::new();
        };
        let targets: Vec<String> = targets
            .iter()
            .filter_map(|t| {
                let code = normalize_currency(t);
                if code.is_none() {
                    warn!("Skipping invalid target currency: {}", t);
                }
                code
            })
            .collect();
        if targets.is_empty() {
            return Vec::new();
        }

        // Providers are only asked for real conversions
        let foreign: Vec<String> = targets.iter().filter(|t| **t != base).cloned().collect();
        if foreign.is_empty() {
            return targets.iter().map(|t| identity(t)).collect();
        }

        let key = format!("rates:{}:{}", base, targets.join(","));
        self.context
            .resolve(
                &key,
                self.context.ttls.currency,
                || async {
                    for provider in &self.providers {
                        match provider.get_rates(&base, &foreign).await {
                            Ok(rates) => {
                                debug!(provider = provider.name(), count = rates.len(), "Fetched rates for {}", base);
                                let mut fetched = rates.into_iter();
                                let all = targets
                                    .iter()
                                    .map(|t| {
                                        if *t == base {
                                            Some(identity(t))
                                        } else {
                                            fetched.next()
                                        }
                                    })
                                    .collect::<Option<Vec<_>>>();
                                match all {
                                    Some(all) => return Outcome::Fresh(all),
                                    None => warn!(
                                        provider = provider.name(),
                                        "Currency provider returned too few rates for {}",
                                        base
                                    ),
                                }
                            }
                            Err(e) => warn!(
                                provider = provider.name(),
                                error = %e,
                                "Currency provider failed for {}",
                                base
                            ),
                        }
                    }
                    Outcome::Unavailable
                },
                || {
                    targets
                        .iter()
                        .map(|t| self.context.synthetic.rate(&base, t))
                        .collect()
                },
            )
            .await
    }
}
