use crate::schema::{DealerModelKey, InventoryLine, InventoryRecord, ModelCounts};
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};

/// Which dealer identifier a model count is keyed on. RA norms join on the
/// dealer code; ZSO joins against sales exports that only carry names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealerKeyField {
    Code,
    Name,
}

pub struct InventoryAggregator<'a> {
    prices: &'a BTreeMap<String, f64>,
    code_to_tse: &'a BTreeMap<String, String>,
}

impl<'a> InventoryAggregator<'a> {
    pub fn new(
        prices: &'a BTreeMap<String, f64>,
        code_to_tse: &'a BTreeMap<String, String>,
    ) -> Self {
        Self {
            prices,
            code_to_tse,
        }
    }

    /// Stock value per dealer code. A unit whose material code has no price
    /// adds nothing to the total but the dealer is still reported.
    pub fn cost_by_dealer(&self, lines: &[InventoryLine]) -> BTreeMap<String, InventoryRecord> {
        let mut records: BTreeMap<String, InventoryRecord> = BTreeMap::new();
        let mut unpriced: BTreeSet<&str> = BTreeSet::new();

        for line in lines {
            let record = records
                .entry(line.dealer_code.clone())
                .or_insert_with(|| InventoryRecord {
                    dealer_code: line.dealer_code.clone(),
                    dealer_name: line.dealer_name.clone(),
                    tse: self
                        .code_to_tse
                        .get(&line.dealer_code)
                        .cloned()
                        .unwrap_or_default(),
                    total_inventory_cost: 0.0,
                    total_credit_due: 0.0,
                });

            match self.prices.get(&line.material_code) {
                Some(price) => record.total_inventory_cost += price,
                None => {
                    unpriced.insert(&line.material_code);
                }
            }
        }

        if !unpriced.is_empty() {
            warn!(
                "{} material codes have no price and were valued at 0: {:?}",
                unpriced.len(),
                unpriced
            );
        }
        debug!("Valued stock for {} dealers", records.len());
        records
    }
}

/// Units per dealer × model. Independent of pricing: rows are grouped on the
/// model name, not the material code.
pub fn model_counts(lines: &[InventoryLine], key: DealerKeyField) -> ModelCounts {
    let mut counts = ModelCounts::new();
    for line in lines {
        if line.model_name.is_empty() {
            continue;
        }
        let dealer = match key {
            DealerKeyField::Code => &line.dealer_code,
            DealerKeyField::Name => &line.dealer_name,
        };
        if dealer.is_empty() {
            continue;
        }
        *counts
            .entry(DealerModelKey::new(dealer.as_str(), line.model_name.as_str()))
            .or_insert(0) += 1;
    }
    counts
}

/// Attaches credit to each inventory record. Inventory drives the row set:
/// dealers with credit but no stock are not reported, and dealers with no
/// credit entry carry zero.
pub fn join_credit(
    records: BTreeMap<String, InventoryRecord>,
    credit_by_code: &BTreeMap<String, f64>,
) -> Vec<InventoryRecord> {
    records
        .into_values()
        .map(|mut record| {
            record.total_credit_due = credit_by_code
                .get(&record.dealer_code)
                .copied()
                .unwrap_or(0.0);
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(material: &str, dealer: &str, model: &str) -> InventoryLine {
        InventoryLine {
            material_code: material.to_string(),
            dealer_code: dealer.to_string(),
            dealer_name: format!("{} Mobiles", dealer),
            model_name: model.to_string(),
            color: "Blue".to_string(),
            sku_spec: "8+128".to_string(),
            product_type: "mobile phone".to_string(),
        }
    }

    fn prices() -> BTreeMap<String, f64> {
        [("M1".to_string(), 200.0)].into_iter().collect()
    }

    #[test]
    fn test_missing_price_contributes_zero() {
        let prices = prices();
        let tse = BTreeMap::new();
        let lines = vec![unit("M1", "D1", "C63"), unit("M1", "D1", "C63"), unit("M2", "D1", "C61")];

        let records = InventoryAggregator::new(&prices, &tse).cost_by_dealer(&lines);
        assert_eq!(records["D1"].total_inventory_cost, 400.0);
    }

    #[test]
    fn test_dealer_with_only_unpriced_stock_is_kept() {
        let prices = prices();
        let tse = [("D2".to_string(), "Meena".to_string())].into_iter().collect();
        let records =
            InventoryAggregator::new(&prices, &tse).cost_by_dealer(&[unit("M9", "D2", "C61")]);
        assert_eq!(records["D2"].total_inventory_cost, 0.0);
        assert_eq!(records["D2"].tse, "Meena");
    }

    #[test]
    fn test_model_counts_by_code_and_name() {
        let lines = vec![unit("M1", "D1", "C63"), unit("M3", "D1", "C63"), unit("M2", "D1", "C61")];

        let by_code = model_counts(&lines, DealerKeyField::Code);
        assert_eq!(by_code[&DealerModelKey::new("D1", "C63")], 2);
        assert_eq!(by_code[&DealerModelKey::new("D1", "C61")], 1);

        let by_name = model_counts(&lines, DealerKeyField::Name);
        assert_eq!(by_name[&DealerModelKey::new("D1 Mobiles", "C63")], 2);
    }

    #[test]
    fn test_join_is_driven_by_inventory() {
        let prices = prices();
        let tse = BTreeMap::new();
        let records = InventoryAggregator::new(&prices, &tse)
            .cost_by_dealer(&[unit("M1", "D1", "C63"), unit("M1", "D2", "C63")]);
        let credit: BTreeMap<String, f64> = [("D1".to_string(), 500.0), ("D9".to_string(), 75.0)]
            .into_iter()
            .collect();

        let joined = join_credit(records, &credit);
        assert_eq!(joined.len(), 2);

        let d1 = joined.iter().find(|r| r.dealer_code == "D1").unwrap();
        assert_eq!(d1.shortfall(), -300.0);
        assert!(d1.is_red_flag());

        let d2 = joined.iter().find(|r| r.dealer_code == "D2").unwrap();
        assert_eq!(d2.total_credit_due, 0.0);
        assert_eq!(d2.shortfall(), 200.0);
        assert!(joined.iter().all(|r| r.dealer_code != "D9"));
    }
}
