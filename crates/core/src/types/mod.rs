//! Core types for the Multiverse catalog.
//!
//! This module provides type-safe wrappers for catalog identities, prices,
//! business universes, and derived stock status.

pub mod id;
pub mod price;
pub mod shop_type;
pub mod stock;

pub use id::*;
pub use price::Price;
pub use shop_type::ShopType;
pub use stock::{LOW_STOCK_THRESHOLD, StockStatus};
