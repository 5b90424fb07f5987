use super::ui;
use crate::core::models::CurrencyRate;
use crate::services::CurrencyService;
use anyhow::{Result, anyhow, bail};
use comfy_table::Cell;

pub fn render_rates(rates: &[CurrencyRate]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Pair"),
        ui::header_cell("Rate"),
        ui::header_cell("Inverse"),
        ui::header_cell("As of (UTC)"),
    ]);

    for rate in rates {
        table.add_row(vec![
            Cell::new(format!("{}/{}", rate.base, rate.target)),
            ui::number_cell(rate.rate, 4),
            ui::number_cell(1.0 / rate.rate, 4),
            Cell::new(rate.timestamp.format("%Y-%m-%d %H:%M").to_string()),
        ]);
    }
    table.to_string()
}

pub async fn run_rate(currency: &CurrencyService, base: &str, target: &str) -> Result<()> {
    let spinner = ui::new_spinner("Fetching exchange rate");
    let rate = currency.get_exchange_rate(base, target).await;
    spinner.finish_and_clear();

    let rate = rate.ok_or_else(|| anyhow!("Invalid currency pair: {}/{}", base, target))?;
    println!("{}", render_rates(&[rate]));
    Ok(())
}

pub async fn run_rates(currency: &CurrencyService, base: &str, targets: &[String]) -> Result<()> {
    let spinner = ui::new_spinner("Fetching exchange rates");
    let rates = currency.get_multiple_currencies(base, targets).await;
    spinner.finish_and_clear();

    if rates.is_empty() {
        bail!("No valid currency codes given for base {}", base);
    }
    println!("{}", render_rates(&rates));
    Ok(())
}
