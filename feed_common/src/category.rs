//! Asset categories and the per-category constants used across the system.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum_macros::{Display, EnumIter, EnumString};

/// Closed set of asset categories. One `Subject` exists per category.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    ValueEnum,
    Display,
    EnumString,
    EnumIter,
    Hash,
    Eq,
    PartialEq,
)]
#[clap(rename_all = "lower")]
#[strum(ascii_case_insensitive)]
pub enum Category {
    /// Raw materials (oil, metals, grains).
    #[strum(to_string = "commodity", serialize = "commodities", serialize = "materials")]
    Commodity,
    /// Currency pairs.
    #[strum(to_string = "forex", serialize = "fx")]
    Forex,
    /// Listed stocks.
    #[strum(to_string = "equity", serialize = "equities", serialize = "stocks")]
    Equity,
}

impl Category {
    /// Heading used when rendering an observer's values.
    pub fn title(&self) -> &'static str {
        match self {
            Category::Commodity => "Commodities",
            Category::Forex => "Forex",
            Category::Equity => "Equities",
        }
    }

    /// Path segment of the fundamentals API for this category.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Category::Commodity => "commodities",
            Category::Forex => "forex",
            Category::Equity => "stocks",
        }
    }

    /// Peer symbol fetched when none is configured.
    pub fn default_symbol(&self) -> &'static str {
        match self {
            Category::Commodity => "LCO",
            Category::Forex => "EURUSD",
            Category::Equity => "TSLA",
        }
    }

    /// File name the category's subject persists to inside the data directory.
    pub fn data_file(&self) -> &'static str {
        match self {
            Category::Commodity => "materials_data.json",
            Category::Forex => "forex_data.json",
            Category::Equity => "stocks_data.json",
        }
    }

    /// Delay before the first fetch, so the three feeds do not hit the API at once.
    pub fn initial_delay(&self) -> Duration {
        match self {
            Category::Forex => Duration::from_secs(0),
            Category::Equity => Duration::from_secs(5),
            Category::Commodity => Duration::from_secs(10),
        }
    }
}
