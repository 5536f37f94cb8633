//! Quote value held by observers.
//!
//! A `Value` is built fresh on every decode and never mutated afterwards; the
//! fields are private so the only way to change what an observer shows is to
//! decode a new payload.
use std::fmt;

use serde::Serialize;

use crate::category::Category;

/// One asset's quote: category, display name, last price and daily change in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Value {
    category: Category,
    name: String,
    price: f64,
    change_pct: f64,
}

impl Value {
    /// Create a new value.
    pub fn new(category: Category, name: impl Into<String>, price: f64, change_pct: f64) -> Self {
        Self {
            category,
            name: name.into(),
            price,
            change_pct,
        }
    }

    /// Asset category.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Display name (symbol or pair).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last traded price.
    pub fn price(&self) -> f64 {
        self.price
    }

    /// Daily change in percent.
    pub fn change_pct(&self) -> f64 {
        self.change_pct
    }

    /// `true` when `price` differs from the stored price.
    pub fn price_differs(&self, price: f64) -> bool {
        self.price != price
    }

    /// `true` when `change_pct` differs from the stored daily change.
    pub fn change_differs(&self, change_pct: f64) -> bool {
        self.change_pct != change_pct
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name: {} | Price: {} | Change 1D: {}%",
            self.name, self.price, self.change_pct
        )
    }
}
