//! Monthly sales against per-TSE unit targets.
//!
//! Every line of the sales register is one unit sold. Lines are split into
//! product categories by item name, then rolled up per dealer and per TSE.

use crate::schema::{SalesCategory, SalesLine};
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Tally repeats the column header inside long registers.
const REPEATED_HEADER: &str = "Item Name";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealerSales {
    pub dealer_code: String,
    pub dealer_name: String,
    pub tse: String,
    pub units: u32,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TseAttainment {
    pub tse: String,
    pub target: u32,
    pub achieved: u32,
    /// Negative once the target is exceeded.
    pub balance: i64,
    pub balance_pct: f64,
}

impl TseAttainment {
    pub fn new(tse: impl Into<String>, target: u32, achieved: u32) -> Self {
        let balance = i64::from(target) - i64::from(achieved);
        let balance_pct = if target == 0 {
            0.0
        } else {
            balance as f64 / f64::from(target) * 100.0
        };
        Self {
            tse: tse.into(),
            target,
            achieved,
            balance,
            balance_pct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySales {
    pub category: SalesCategory,
    /// Ordered by TSE, then by sales value, largest first.
    pub dealers: Vec<DealerSales>,
    /// One row per TSE that has a target or any sales, by TSE name.
    pub attainment: Vec<TseAttainment>,
}

impl CategorySales {
    pub fn total_units(&self) -> u32 {
        self.dealers.iter().map(|d| d.units).sum()
    }

    pub fn total_value(&self) -> f64 {
        self.dealers.iter().map(|d| d.value).sum()
    }
}

/// `None` for repeated header lines, which carry no sale.
pub fn categorize(item_name: &str) -> Option<SalesCategory> {
    if item_name.contains("SMART") {
        Some(SalesCategory::SmartPhones)
    } else if item_name.contains("ACCESSORIES") || item_name.contains("Buds") {
        Some(SalesCategory::Accessories)
    } else if item_name.contains(REPEATED_HEADER) {
        None
    } else {
        Some(SalesCategory::Others)
    }
}

/// Rolls sales lines up into one [`CategorySales`] per category, in
/// [`SalesCategory::ALL`] order. A category with no target map gets a target
/// of zero for every TSE.
pub fn summarize_sales(
    lines: &[SalesLine],
    code_to_tse: &BTreeMap<String, String>,
    targets: &BTreeMap<SalesCategory, BTreeMap<String, u32>>,
) -> Vec<CategorySales> {
    let mut per_category: BTreeMap<SalesCategory, BTreeMap<&str, DealerSales>> = BTreeMap::new();

    for line in lines {
        let Some(category) = categorize(&line.item_name) else {
            continue;
        };
        let dealer = per_category
            .entry(category)
            .or_default()
            .entry(line.dealer_code.as_str())
            .or_insert_with(|| DealerSales {
                dealer_code: line.dealer_code.clone(),
                dealer_name: line.dealer_name.clone(),
                tse: code_to_tse.get(&line.dealer_code).cloned().unwrap_or_default(),
                units: 0,
                value: 0.0,
            });
        dealer.units += 1;
        dealer.value += line.value;
    }

    let no_targets = BTreeMap::new();
    SalesCategory::ALL
        .iter()
        .map(|category| {
            let mut dealers: Vec<DealerSales> = per_category
                .remove(category)
                .map(|m| m.into_values().collect())
                .unwrap_or_default();
            dealers.sort_by(|a, b| {
                a.tse.cmp(&b.tse).then_with(|| {
                    b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal)
                })
            });

            let category_targets = targets.get(category).unwrap_or(&no_targets);
            let attainment = attainment(&dealers, category_targets);

            debug!(
                "{}: {} dealers, {} TSE rows",
                category.label(),
                dealers.len(),
                attainment.len()
            );
            CategorySales {
                category: *category,
                dealers,
                attainment,
            }
        })
        .collect()
}

fn attainment(dealers: &[DealerSales], targets: &BTreeMap<String, u32>) -> Vec<TseAttainment> {
    let mut achieved: BTreeMap<&str, u32> = targets.keys().map(|tse| (tse.as_str(), 0)).collect();
    for dealer in dealers.iter().filter(|d| !d.tse.is_empty()) {
        *achieved.entry(dealer.tse.as_str()).or_insert(0) += dealer.units;
    }

    achieved
        .into_iter()
        .map(|(tse, units)| TseAttainment::new(tse, targets.get(tse).copied().unwrap_or(0), units))
        .collect()
}
