pub mod cli;
pub mod core;
pub mod providers;
pub mod services;
pub mod store;
pub mod synthetic;

use crate::core::config::AppConfig;
use crate::core::models::NewsCategory;
use anyhow::Result;
use services::DataServices;
use std::time::Duration;
use tracing::{debug, info};

pub enum AppCommand {
    Quote(String),
    Quotes(Vec<String>),
    Indices,
    Rate { base: String, target: String },
    Rates { base: String, targets: Vec<String> },
    News { query: String, page_size: usize },
    MarketNews,
    CategoryNews(NewsCategory),
    Indicators,
    Watch { every: Duration },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("finfeed starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(
        demo = config.demo,
        coalesce_requests = config.coalesce_requests,
        "Loaded config"
    );

    let services = DataServices::from_config(&config)?;

    match command {
        AppCommand::Quote(symbol) => cli::market::run_quotes(&services.stocks, &[symbol]).await,
        AppCommand::Quotes(symbols) => cli::market::run_quotes(&services.stocks, &symbols).await,
        AppCommand::Indices => cli::market::run_indices(&services.stocks).await,
        AppCommand::Rate { base, target } => {
            cli::currency::run_rate(&services.currency, &base, &target).await
        }
        AppCommand::Rates { base, targets } => {
            cli::currency::run_rates(&services.currency, &base, &targets).await
        }
        AppCommand::News { query, page_size } => {
            cli::news::run(
                &format!("News: {query}"),
                services.news.get_financial_news(&query, page_size),
            )
            .await
        }
        AppCommand::MarketNews => {
            cli::news::run("Market News", services.news.get_market_news()).await
        }
        AppCommand::CategoryNews(category) => {
            cli::news::run(
                &format!("{} News", category.label()),
                services.news.get_category_news(category),
            )
            .await
        }
        AppCommand::Indicators => cli::economy::run(&services.economy).await,
        AppCommand::Watch { every } => cli::watch::run(&services, every).await,
    }
}
