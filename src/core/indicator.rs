//! Economic indicator provider abstraction

use super::models::EconomicIndicator;
use anyhow::Result;
use async_trait::async_trait;

/// A tracked economic data series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSeries {
    pub series_id: &'static str,
    pub name: &'static str,
    pub unit: &'static str,
    /// Typical level, used when no provider can be reached.
    pub baseline: f64,
}

pub const TRACKED_SERIES: [IndicatorSeries; 4] = [
    IndicatorSeries {
        series_id: "FEDFUNDS",
        name: "Federal Funds Rate",
        unit: "%",
        baseline: 5.33,
    },
    IndicatorSeries {
        series_id: "DGS10",
        name: "10-Year Treasury Yield",
        unit: "%",
        baseline: 4.25,
    },
    IndicatorSeries {
        series_id: "UNRATE",
        name: "Unemployment Rate",
        unit: "%",
        baseline: 3.9,
    },
    IndicatorSeries {
        series_id: "CPIAUCSL",
        name: "Consumer Price Index",
        unit: "index",
        baseline: 310.0,
    },
];

#[async_trait]
pub trait IndicatorProvider: Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &str;

    async fn fetch_indicator(&self, series: &IndicatorSeries) -> Result<EconomicIndicator>;
}
