//! Statistics aggregator.
//!
//! [`aggregate`] folds a product set once, left to right, into a universal
//! rollup plus the type-specific rollup of the shop's universe. Frequency
//! ties resolve to the value seen first.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::catalog::{ProductRecord, Shop};
use crate::schema::STOCK_FIELD;
use crate::types::{ShopId, ShopType, StockStatus};
use crate::universes::{UniverseFold, UniverseStats};

/// Number of categories listed in [`StatsReport::top_categories`].
pub const TOP_CATEGORIES: usize = 5;

/// Round to two decimals.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part` as a percentage of `whole`, 0 when `whole` is 0.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round2(part as f64 * 100.0 / whole as f64)
}

/// Running arithmetic mean.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    pub fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// The mean rounded to two decimals, 0 when nothing was added.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn value(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        round2(self.sum / self.count as f64)
    }
}

/// Frequency counter that remembers first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    counts: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl Tally {
    pub fn add(&mut self, value: &str) {
        if let Some(&slot) = self.index.get(value) {
            if let Some(entry) = self.counts.get_mut(slot) {
                entry.1 += 1;
            }
            return;
        }
        self.index.insert(value.to_string(), self.counts.len());
        self.counts.push((value.to_string(), 1));
    }

    /// The most frequent value; the first one seen wins a tie.
    #[must_use]
    pub fn most_common(&self) -> Option<&str> {
        let mut best: Option<&(String, usize)> = None;
        for entry in &self.counts {
            if best.is_none_or(|(_, count)| entry.1 > *count) {
                best = Some(entry);
            }
        }
        best.map(|(value, _)| value.as_str())
    }

    /// Number of distinct values.
    #[must_use]
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// The `n` most frequent values, stable on first-seen order.
    #[must_use]
    pub fn top(&self, n: usize) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .counts
            .iter()
            .map(|(value, count)| (value.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Rollup of one shop's (possibly filtered) products.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub shop_type: ShopType,
    pub count: usize,
    pub average_price: Decimal,
    pub in_stock_count: usize,
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
    pub price_range: PriceRange,
    pub top_categories: Vec<CategoryCount>,
    /// Type-specific rollup; absent for unrecognized shop types.
    pub universe: Option<UniverseStats>,
}

/// Aggregate a product set of a shop of type `shop_type`.
///
/// Every product counts in the universal rollup, with an unreadable stock
/// classified as in stock. Products with a malformed payload are left out of
/// the type-specific rollup.
#[must_use]
pub fn aggregate(products: &[ProductRecord], shop_type: ShopType) -> StatsReport {
    let mut total = Decimal::ZERO;
    let mut range: Option<PriceRange> = None;
    let (mut in_stock_count, mut low_stock_count, mut out_of_stock_count) = (0, 0, 0);
    let mut categories = Tally::default();
    let mut fold = UniverseFold::for_type(shop_type);

    for product in products {
        let price = product.price.amount();
        total += price;
        range = Some(match range {
            None => PriceRange {
                min: price,
                max: price,
            },
            Some(r) => PriceRange {
                min: r.min.min(price),
                max: r.max.max(price),
            },
        });
        categories.add(&product.category_name);

        let payload = product.payload();
        match StockStatus::classify(payload.map().number(STOCK_FIELD)) {
            StockStatus::InStock => in_stock_count += 1,
            StockStatus::LowStock => low_stock_count += 1,
            StockStatus::OutOfStock => out_of_stock_count += 1,
        }

        if let Some(fold) = fold.as_mut()
            && !payload.is_malformed()
        {
            fold.add(payload.map());
        }
    }

    StatsReport {
        shop_type,
        count: products.len(),
        average_price: average(total, products.len()),
        in_stock_count,
        low_stock_count,
        out_of_stock_count,
        price_range: range.unwrap_or_default(),
        top_categories: categories
            .top(TOP_CATEGORIES)
            .into_iter()
            .map(|(name, count)| CategoryCount {
                name: name.to_string(),
                count,
            })
            .collect(),
        universe: fold.map(UniverseFold::finish),
    }
}

fn average(total: Decimal, count: usize) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    (total / Decimal::from(count)).round_dp(2)
}

/// Cross-universe summary for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UniverseSummary {
    pub shop_type: ShopType,
    pub label: &'static str,
    pub shop_count: usize,
    pub product_count: usize,
    pub average_price: Decimal,
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
}

/// One summary per recognized shop type, in declaration order.
#[must_use]
pub fn universe_overview(shops: &[Shop], products: &[ProductRecord]) -> Vec<UniverseSummary> {
    ShopType::ALL
        .into_iter()
        .map(|shop_type| {
            let shop_ids: HashSet<ShopId> = shops
                .iter()
                .filter(|shop| shop.shop_type == shop_type)
                .map(|shop| shop.id)
                .collect();
            let owned: Vec<ProductRecord> = products
                .iter()
                .filter(|product| shop_ids.contains(&product.shop_id))
                .cloned()
                .collect();
            let report = aggregate(&owned, ShopType::Unrecognized);

            UniverseSummary {
                shop_type,
                label: shop_type.label(),
                shop_count: shop_ids.len(),
                product_count: report.count,
                average_price: report.average_price,
                low_stock_count: report.low_stock_count,
                out_of_stock_count: report.out_of_stock_count,
            }
        })
        .collect()
}
