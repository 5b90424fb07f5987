use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use finfeed::cli::watch::DEFAULT_INTERVAL_SECS;
use finfeed::core::log::init_logging;
use finfeed::core::models::NewsCategory;
use finfeed::services::news::DEFAULT_PAGE_SIZE;
use std::time::Duration;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for finfeed::AppCommand {
    fn from(cmd: Commands) -> finfeed::AppCommand {
        match cmd {
            Commands::Quote { symbol } => finfeed::AppCommand::Quote(symbol),
            Commands::Quotes { symbols } => finfeed::AppCommand::Quotes(symbols),
            Commands::Indices => finfeed::AppCommand::Indices,
            Commands::Rate { base, target } => finfeed::AppCommand::Rate { base, target },
            Commands::Rates { base, targets } => finfeed::AppCommand::Rates { base, targets },
            Commands::News { query, page_size } => finfeed::AppCommand::News { query, page_size },
            Commands::MarketNews => finfeed::AppCommand::MarketNews,
            Commands::CategoryNews { category } => finfeed::AppCommand::CategoryNews(category),
            Commands::Indicators => finfeed::AppCommand::Indicators,
            Commands::Watch { interval_secs } => finfeed::AppCommand::Watch {
                every: Duration::from_secs(interval_secs),
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display a stock quote
    Quote { symbol: String },
    /// Display quotes for several symbols
    Quotes {
        #[arg(required = true)]
        symbols: Vec<String>,
    },
    /// Display the major market indices
    Indices,
    /// Display an exchange rate
    Rate { base: String, target: String },
    /// Display exchange rates from one base currency
    Rates {
        base: String,
        #[arg(required = true)]
        targets: Vec<String>,
    },
    /// Search financial news
    News {
        /// Search terms
        #[arg(short, long, default_value = "finance")]
        query: String,
        /// Number of articles (1-100)
        #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },
    /// Display market news
    MarketNews,
    /// Display news for a category (markets, economy, business, technology, crypto, personal-finance)
    CategoryNews { category: NewsCategory },
    /// Display economic indicators
    Indicators,
    /// Refresh a market dashboard until Ctrl-C
    Watch {
        /// Seconds between refreshes
        #[arg(short, long, default_value_t = DEFAULT_INTERVAL_SECS, value_parser = clap::value_parser!(u64).range(1..))]
        interval_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => finfeed::cli::setup::setup(),
        Some(cmd) => finfeed::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
