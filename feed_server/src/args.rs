//! Command-line arguments for the feed server.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;
use feed_common::Category;
use feed_common::subscription::SubscriptionRequest;
use std::path::PathBuf;
use strum::IntoEnumIterator;

use crate::gateway::DEFAULT_API_BASE;

/// Seconds between two fetches of the same category (one day).
pub const DEFAULT_INTERVAL_SECS: u64 = 86_400;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Directory holding one data file per category.
    #[clap(long, default_value = ".")]
    pub data_dir: PathBuf,

    /// Token for the fundamentals API.
    #[clap(long, env = "PROFIT_API_TOKEN", hide_env_values = true, default_value = "")]
    pub token: String,

    /// Base URL of the fundamentals API.
    #[clap(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Seconds between fetches of the same category.
    #[clap(long, default_value_t = DEFAULT_INTERVAL_SECS)]
    pub interval_secs: u64,

    /// Forex peer symbol to fetch.
    #[clap(long)]
    pub forex_symbol: Option<String>,

    /// Equity peer symbol to fetch.
    #[clap(long)]
    pub equity_symbol: Option<String>,

    /// Commodity peer symbol to fetch.
    #[clap(long)]
    pub commodity_symbol: Option<String>,

    /// Categories to serve (repeatable). All categories when omitted.
    #[clap(long = "category", value_enum)]
    pub categories: Vec<Category>,

    /// Subscribe NAME to CATEGORY, e.g. `--subscribe ana=forex` (repeatable).
    #[clap(long = "subscribe")]
    pub subscriptions: Vec<SubscriptionRequest>,

    /// File with one NAME=CATEGORY subscription per line.
    #[clap(long)]
    pub subscribers_file: Option<PathBuf>,

    /// Do not fetch from the API; only watch the data files.
    #[clap(long)]
    pub no_fetch: bool,

    /// Load the existing data files as the starting state.
    #[clap(long)]
    pub restore: bool,
}

impl Args {
    /// Categories to run, in declaration order and without repeats.
    pub fn active_categories(&self) -> Vec<Category> {
        Category::iter()
            .filter(|c| self.categories.is_empty() || self.categories.contains(c))
            .collect()
    }

    /// Configured peer symbol for `category`, or its default.
    pub fn symbol_for(&self, category: Category) -> String {
        let configured = match category {
            Category::Commodity => &self.commodity_symbol,
            Category::Forex => &self.forex_symbol,
            Category::Equity => &self.equity_symbol,
        };
        configured
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(category.default_symbol())
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_serve_every_category() {
        let args = Args::parse_from(["feed_server"]);
        assert_eq!(args.active_categories().len(), 3);
        assert_eq!(args.interval_secs, DEFAULT_INTERVAL_SECS);
        assert_eq!(args.symbol_for(Category::Forex), "EURUSD");
    }

    #[test]
    fn parses_categories_symbols_and_subscriptions() {
        let args = Args::parse_from([
            "feed_server",
            "--category",
            "equity",
            "--category",
            "forex",
            "--category",
            "forex",
            "--equity-symbol",
            "AAPL",
            "--subscribe",
            "ana=forex",
            "--subscribe",
            "luis=stocks",
        ]);
        assert_eq!(args.active_categories(), vec![Category::Forex, Category::Equity]);
        assert_eq!(args.symbol_for(Category::Equity), "AAPL");
        assert_eq!(args.subscriptions.len(), 2);
        assert_eq!(args.subscriptions[1].category, Category::Equity);
    }

    #[test]
    fn rejects_bad_subscription() {
        assert!(Args::try_parse_from(["feed_server", "--subscribe", "ana"]).is_err());
    }
}
