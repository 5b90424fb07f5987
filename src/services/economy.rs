use super::{Outcome, ServiceContext};
use crate::core::indicator::{IndicatorProvider, IndicatorSeries, TRACKED_SERIES};
use crate::core::models::EconomicIndicator;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

const INDICATORS_KEY: &str = "indicators";

/// Headline economic indicators. A series no provider can supply is
/// generated around its baseline.
pub struct EconomicService {
    providers: Vec<Arc<dyn IndicatorProvider>>,
    context: Arc<ServiceContext>,
}

impl EconomicService {
    pub fn new(providers: Vec<Arc<dyn IndicatorProvider>>, context: Arc<ServiceContext>) -> Self {
        Self { providers, context }
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    async fn fetch_series(&self, series: &IndicatorSeries) -> Option<EconomicIndicator> {
        for provider in &self.providers {
            match provider.fetch_indicator(series).await {
                Ok(indicator) => {
                    debug!(provider = provider.name(), series = series.series_id, "Fetched indicator");
                    return Some(indicator);
                }
                Err(e) => warn!(
                    provider = provider.name(),
                    series = series.series_id,
                    error = %e,
                    "Indicator provider failed"
                ),
            }
        }
        None
    }

    pub async fn get_economic_indicators(&self) -> Vec<EconomicIndicator> {
        self.context
            .resolve(
                INDICATORS_KEY,
                self.context.ttls.indicator,
                || async {
                    if self.providers.is_empty() {
                        return Outcome::Unavailable;
                    }
                    let fetched = join_all(TRACKED_SERIES.iter().map(|s| self.fetch_series(s))).await;
                    let missing = fetched.iter().filter(|i| i.is_none()).count();
                    if missing == TRACKED_SERIES.len() {
                        return Outcome::Unavailable;
                    }

                    let indicators: Vec<EconomicIndicator> = TRACKED_SERIES
                        .iter()
                        .zip(fetched)
                        .map(|(series, indicator)| {
                            indicator.unwrap_or_else(|| self.context.synthetic.indicator(series))
                        })
                        .collect();
                    if missing > 0 {
                        Outcome::Degraded(indicators)
                    } else {
                        Outcome::Fresh(indicators)
                    }
                },
                || {
                    TRACKED_SERIES
                        .iter()
                        .map(|series| self.context.synthetic.indicator(series))
                        .collect()
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{MockIndicatorProvider, context};
    use crate::synthetic::INDICATOR_JITTER;
    use std::time::Duration;

    fn service(provider: Option<Arc<MockIndicatorProvider>>) -> EconomicService {
        let chain = provider
            .into_iter()
            .map(|p| p as Arc<dyn IndicatorProvider>)
            .collect();
        EconomicService::new(chain, context())
    }

    #[tokio::test]
    async fn test_all_series_fetched_and_cached() {
        let provider = MockIndicatorProvider::new(&[
            ("FEDFUNDS", 5.33),
            ("DGS10", 4.09),
            ("UNRATE", 3.9),
            ("CPIAUCSL", 311.05),
        ]);
        let economy = service(Some(provider.clone()));

        let indicators = economy.get_economic_indicators().await;
        let ids: Vec<&str> = indicators.iter().map(|i| i.series_id.as_str()).collect();
        assert_eq!(ids, vec!["FEDFUNDS", "DGS10", "UNRATE", "CPIAUCSL"]);
        assert_eq!(indicators[1].value, 4.09);
        assert_eq!(provider.calls(), 4);

        economy.get_economic_indicators().await;
        assert_eq!(provider.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_outage_is_filled_and_cached_briefly() {
        let provider = MockIndicatorProvider::new(&[("FEDFUNDS", 5.33)]);
        let economy = service(Some(provider.clone()));

        let indicators = economy.get_economic_indicators().await;
        assert_eq!(indicators.len(), 4);
        assert_eq!(indicators[0].value, 5.33);
        let unrate = &indicators[2];
        assert!((unrate.value - 3.9).abs() <= 3.9 * INDICATOR_JITTER + 1e-9);
        assert_eq!(provider.calls(), 4);

        tokio::time::advance(Duration::from_secs(60)).await;
        economy.get_economic_indicators().await;
        assert_eq!(provider.calls(), 8);
    }

    #[tokio::test]
    async fn test_demo_mode_indicators() {
        let economy = service(None);

        let indicators = economy.get_economic_indicators().await;

        assert_eq!(indicators.len(), TRACKED_SERIES.len());
        for (indicator, series) in indicators.iter().zip(TRACKED_SERIES.iter()) {
            assert_eq!(indicator.name, series.name);
            assert!(indicator.change.is_some());
        }
    }
}
