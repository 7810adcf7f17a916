//! Stock status derived from the `stock` attribute.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Products with at most this many units left are "low stock".
pub const LOW_STOCK_THRESHOLD: f64 = 10.0;

/// Derived stock classification. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    #[default]
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    /// Classify a decoded stock value.
    ///
    /// Absent or unparseable stock defaults to [`StockStatus::InStock`].
    #[must_use]
    pub fn classify(stock: Option<f64>) -> Self {
        match stock {
            None => Self::InStock,
            Some(units) if units <= 0.0 => Self::OutOfStock,
            Some(units) if units <= LOW_STOCK_THRESHOLD => Self::LowStock,
            Some(_) => Self::InStock,
        }
    }

    /// Wire key (`"in_stock"`, ...).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InStock => "in_stock",
            Self::LowStock => "low_stock",
            Self::OutOfStock => "out_of_stock",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StockStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_stock" => Ok(Self::InStock),
            "low_stock" => Ok(Self::LowStock),
            "out_of_stock" => Ok(Self::OutOfStock),
            _ => Err(format!("invalid stock status: {s}")),
        }
    }
}
