use super::ui;
use crate::core::models::NewsArticle;
use anyhow::{Result, bail};
use comfy_table::Cell;
use std::future::Future;

/// Headlines with source, age and sentiment. Descriptions are left out to
/// keep rows on one line.
pub fn render_news(articles: &[NewsArticle]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Published (UTC)"),
        ui::header_cell("Source"),
        ui::header_cell("Headline"),
        ui::header_cell("Sentiment"),
    ]);

    for article in articles {
        table.add_row(vec![
            Cell::new(article.published_at.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(&article.source),
            Cell::new(format!(
                "{}\n{}",
                article.title,
                ui::style_text(&article.url, ui::StyleType::Subtle)
            )),
            ui::sentiment_cell(article.sentiment),
        ]);
    }
    table.to_string()
}

/// Awaits `fetch` behind a spinner and prints the articles under `title`.
pub async fn run<F>(title: &str, fetch: F) -> Result<()>
where
    F: Future<Output = Vec<NewsArticle>>,
{
    let spinner = ui::new_spinner("Fetching news");
    let articles = fetch.await;
    spinner.finish_and_clear();

    if articles.is_empty() {
        bail!("No news available for {}", title);
    }
    println!(
        "{}\n\n{}",
        ui::style_text(title, ui::StyleType::Title),
        render_news(&articles)
    );
    Ok(())
}
