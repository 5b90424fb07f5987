use super::ui;
use crate::core::models::EconomicIndicator;
use crate::services::EconomicService;
use anyhow::Result;
use comfy_table::Cell;

pub fn render_indicators(indicators: &[EconomicIndicator]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Indicator"),
        ui::header_cell("Series"),
        ui::header_cell("Value"),
        ui::header_cell("Previous"),
        ui::header_cell("Change"),
        ui::header_cell("Date"),
    ]);

    for indicator in indicators {
        let unit = if indicator.unit == "%" { "%" } else { "" };
        table.add_row(vec![
            Cell::new(&indicator.name),
            Cell::new(&indicator.series_id),
            Cell::new(format!("{:.2}{unit}", indicator.value)),
            ui::format_optional_cell(indicator.previous, |v| format!("{v:.2}{unit}")),
            ui::format_optional_cell(indicator.change, |v| format!("{v:+.2}")),
            Cell::new(indicator.date.format("%Y-%m-%d").to_string()),
        ]);
    }
    table.to_string()
}

pub async fn run(economy: &EconomicService) -> Result<()> {
    let spinner = ui::new_spinner("Fetching economic indicators");
    let indicators = economy.get_economic_indicators().await;
    spinner.finish_and_clear();

    println!(
        "{}\n\n{}",
        ui::style_text("Economic Indicators", ui::StyleType::Title),
        render_indicators(&indicators)
    );
    Ok(())
}
