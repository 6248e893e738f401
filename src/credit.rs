use crate::schema::{AgeBucket, Bill, RetailerCreditSummary};
use log::debug;
use std::collections::BTreeMap;

/// Grouping key for retailers that have no TSE in the metadata.
pub const TSE_MISSING: &str = "TSE_MISSING";

/// Folds bills into one aging summary per retailer.
pub struct CreditAggregator<'a> {
    name_to_tse: &'a BTreeMap<String, String>,
    name_to_code: &'a BTreeMap<String, String>,
}

impl<'a> CreditAggregator<'a> {
    pub fn new(
        name_to_tse: &'a BTreeMap<String, String>,
        name_to_code: &'a BTreeMap<String, String>,
    ) -> Self {
        Self {
            name_to_tse,
            name_to_code,
        }
    }

    /// One summary per distinct retailer name, in name order. The aggregator
    /// assumes bills are already clean; parsing drops bad rows upstream.
    pub fn aggregate(&self, bills: &[Bill]) -> Vec<RetailerCreditSummary> {
        let mut by_retailer: BTreeMap<&str, RetailerCreditSummary> = BTreeMap::new();

        for bill in bills {
            let name = bill.retailer_name.as_str();
            let summary = by_retailer.entry(name).or_insert_with(|| RetailerCreditSummary {
                retailer_code: self.lookup(self.name_to_code, name),
                retailer_name: name.to_string(),
                buckets: Default::default(),
                tse: self.lookup(self.name_to_tse, name),
            });
            summary
                .buckets
                .add(AgeBucket::for_age(bill.age_days), bill.pending_amount);
        }

        debug!(
            "Aggregated {} bills into {} retailer summaries",
            bills.len(),
            by_retailer.len()
        );
        by_retailer.into_values().collect()
    }

    fn lookup(&self, map: &BTreeMap<String, String>, name: &str) -> String {
        map.get(name).cloned().unwrap_or_default()
    }
}

pub fn aggregate_credit(
    bills: &[Bill],
    name_to_tse: &BTreeMap<String, String>,
    name_to_code: &BTreeMap<String, String>,
) -> Vec<RetailerCreditSummary> {
    CreditAggregator::new(name_to_tse, name_to_code).aggregate(bills)
}

/// Splits summaries by TSE. Retailers without one land under [`TSE_MISSING`].
pub fn group_by_tse(
    summaries: Vec<RetailerCreditSummary>,
) -> BTreeMap<String, Vec<RetailerCreditSummary>> {
    let mut groups: BTreeMap<String, Vec<RetailerCreditSummary>> = BTreeMap::new();
    for summary in summaries {
        let key = if summary.has_tse() {
            summary.tse.clone()
        } else {
            TSE_MISSING.to_string()
        };
        groups.entry(key).or_default().push(summary);
    }
    groups
}
