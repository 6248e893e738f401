use crate::schema::{DealerModelKey, DealerModelSales, ModelCounts, RefillRequirement, ZsoFlag};
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

/// Refill needed for every RA dealer × tracked model, keyed on dealer code.
///
/// The stocking norm is `multiplier * quota` units per model; an unseen
/// dealer/model pair holds no stock. When `models` is empty every model in
/// the current stock is tracked.
pub fn ra_refill(
    quotas: &BTreeMap<String, u32>,
    models: &[String],
    counts: &ModelCounts,
    multiplier: u32,
) -> Vec<RefillRequirement> {
    let tracked: BTreeSet<&str> = if models.is_empty() {
        counts.keys().map(|k| k.model.as_str()).collect()
    } else {
        models.iter().map(String::as_str).collect()
    };

    let mut requirements = Vec::with_capacity(quotas.len() * tracked.len());
    for (dealer_code, quota) in quotas {
        let norm = quota.saturating_mul(multiplier);
        for model in &tracked {
            let current_units = counts
                .get(&DealerModelKey::new(dealer_code.as_str(), *model))
                .copied()
                .unwrap_or(0);
            requirements.push(RefillRequirement {
                dealer_code: dealer_code.clone(),
                model: model.to_string(),
                quota: *quota,
                current_units,
                required_refill: norm.saturating_sub(current_units),
            });
        }
    }

    debug!(
        "Computed {} refill requirements for {} RA dealers",
        requirements.len(),
        quotas.len()
    );
    requirements
}

/// Dealer/model pairs that sold during the lookback window but hold no stock
/// now. Pairs that never sold are never evaluated.
pub fn zero_stock_outs(
    sales: &BTreeMap<DealerModelKey, DealerModelSales>,
    counts: &ModelCounts,
) -> Vec<ZsoFlag> {
    sales
        .iter()
        .filter(|(_, sold)| sold.units > 0)
        .filter(|(key, _)| counts.get(*key).copied().unwrap_or(0) == 0)
        .map(|(key, sold)| ZsoFlag {
            dealer: key.dealer.clone(),
            model: key.model.clone(),
            recent_sales: sold.units,
        })
        .collect()
}
