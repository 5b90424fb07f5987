use super::{currency, market, news, ui};
use crate::services::DataServices;
use anyhow::{Context, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::info;

pub const DEFAULT_INTERVAL_SECS: u64 = 300;

const DASHBOARD_BASE: &str = "USD";
const DASHBOARD_TARGETS: [&str; 3] = ["EUR", "GBP", "JPY"];
const DASHBOARD_HEADLINES: usize = 5;

async fn render_dashboard(services: &DataServices) -> String {
    let targets: Vec<String> = DASHBOARD_TARGETS.iter().map(|t| t.to_string()).collect();
    let (indices, rates, mut articles) = tokio::join!(
        services.stocks.get_market_indices(),
        services.currency.get_multiple_currencies(DASHBOARD_BASE, &targets),
        services.news.get_market_news(),
    );
    articles.truncate(DASHBOARD_HEADLINES);

    format!(
        "{}\n\n{}\n\n{}\n\n{}\n\n{}\n\n{}\n\n{}",
        ui::style_text("Market Indices", ui::StyleType::Title),
        market::render_indices(&indices),
        ui::style_text("Exchange Rates", ui::StyleType::Title),
        currency::render_rates(&rates),
        ui::style_text("Market News", ui::StyleType::Title),
        news::render_news(&articles),
        ui::style_text(
            &format!("Updated {} UTC. Press Ctrl-C to stop.", chrono::Utc::now().format("%H:%M:%S")),
            ui::StyleType::Subtle
        ),
    )
}

/// Redraws the dashboard every `every` until `shutdown` resolves. Returns the
/// number of refreshes.
pub async fn watch_until<F>(services: &DataServices, every: Duration, shutdown: F) -> Result<usize>
where
    F: Future<Output = Result<()>>,
{
    let term = console::Term::stdout();
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut refreshes = 0;
    loop {
        tokio::select! {
            result = &mut shutdown => {
                result?;
                info!(refreshes, "Stopping dashboard");
                return Ok(refreshes);
            }
            _ = ticker.tick() => {
                // A refresh can wait on provider timeouts, so keep listening for shutdown
                let dashboard = tokio::select! {
                    result = &mut shutdown => {
                        result?;
                        info!(refreshes, "Stopping dashboard mid-refresh");
                        return Ok(refreshes);
                    }
                    dashboard = render_dashboard(services) => dashboard,
                };
                if term.is_term() {
                    term.clear_screen().context("Failed to clear terminal")?;
                }
                println!("{dashboard}");
                refreshes += 1;
            }
        }
    }
}

/// Dashboard refreshed on a fixed cadence until Ctrl-C.
pub async fn run(services: &DataServices, every: Duration) -> Result<()> {
    let shutdown = async {
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl-C")
    };
    watch_until(services, every, shutdown).await?;
    Ok(())
}
