use super::ui;
use crate::core::models::{MarketIndex, Quote};
use crate::services::StockService;
use anyhow::{Result, bail};
use comfy_table::Cell;

pub fn render_quotes(quotes: &[Quote]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Symbol"),
        ui::header_cell("Price"),
        ui::header_cell("Change"),
        ui::header_cell("Change (%)"),
        ui::header_cell("Open"),
        ui::header_cell("High"),
        ui::header_cell("Low"),
        ui::header_cell("Volume"),
    ]);

    for quote in quotes {
        table.add_row(vec![
            Cell::new(&quote.symbol),
            ui::number_cell(quote.price, 2),
            ui::signed_cell(quote.change),
            ui::change_cell(quote.change_percent),
            ui::format_optional_cell(quote.open, |v| format!("{v:.2}")),
            ui::format_optional_cell(quote.high, |v| format!("{v:.2}")),
            ui::format_optional_cell(quote.low, |v| format!("{v:.2}")),
            ui::format_optional_cell(quote.volume, |v| v.to_string()),
        ]);
    }
    table.to_string()
}

pub fn render_indices(indices: &[MarketIndex]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Index"),
        ui::header_cell("Value"),
        ui::header_cell("Change"),
        ui::header_cell("Change (%)"),
    ]);

    for index in indices {
        table.add_row(vec![
            Cell::new(&index.name),
            ui::number_cell(index.value, 2),
            ui::signed_cell(index.change),
            ui::change_cell(index.change_percent),
        ]);
    }
    table.to_string()
}

pub async fn run_quotes(stocks: &StockService, symbols: &[String]) -> Result<()> {
    let spinner = ui::new_spinner("Fetching quotes");
    let quotes = stocks.get_batch_quotes(symbols).await;
    spinner.finish_and_clear();

    if quotes.is_empty() {
        bail!("No valid symbols given");
    }
    println!("{}", render_quotes(&quotes));
    Ok(())
}

pub async fn run_indices(stocks: &StockService) -> Result<()> {
    let spinner = ui::new_spinner("Fetching market indices");
    let indices = stocks.get_market_indices().await;
    spinner.finish_and_clear();

    println!(
        "{}\n\n{}",
        ui::style_text("Market Indices", ui::StyleType::Title),
        render_indices(&indices)
    );
    Ok(())
}
