//! Multiverse Core - polymorphic product-attribute engine.
//!
//! This crate holds everything the Multiverse catalog knows about products
//! whose attributes depend on the business universe of their shop:
//! - `api` - JSON HTTP service exposing the catalog
//! - `cli` - Command-line tools for migrations, seeding and validation
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP. Records come in by value and derived views
//! (validated payloads, filtered lists, statistics) go out.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, shop types and stock status
//! - [`attributes`] - Attribute values and the lenient/strict payload codec
//! - [`schema`] - Compiled-in attribute schema per shop type
//! - [`validate`] - Write-path attribute validation and normalization
//! - [`universes`] - Per-universe records, predicates and statistics
//! - [`filter`] - Two-stage predicate filter engine
//! - [`stats`] - Statistics aggregator
//! - [`catalog`] - Catalog records and the product write path

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod attributes;
pub mod catalog;
pub mod error;
pub mod filter;
pub mod schema;
pub mod stats;
pub mod types;
pub mod universes;
pub mod validate;

pub use attributes::{AttributeMap, AttributePayload, AttributeValue};
pub use catalog::{
    Category, NewCategory, NewProduct, NewShop, ProductListing, ProductPatch, ProductRecord,
    ProductView, Shop, ValidatedProduct,
};
pub use error::CatalogError;
pub use filter::{FilterQuery, ProductFilter, Range, StructuredFilter};
pub use schema::{AttributeSchema, FieldKind, FieldRule, schema_for};
pub use stats::{StatsReport, UniverseSummary, aggregate, universe_overview};
pub use types::*;
pub use universes::{ProductAttributes, TypedPredicates, UniverseStats};
pub use validate::{ValidationMode, validate, validate_json, validate_raw};
