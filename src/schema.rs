use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One open invoice line from the billing ledger.
///
/// Dates are carried through as they appear in the ledger; only the age in
/// days takes part in aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub date: String,
    pub reference: String,
    pub retailer_name: String,
    pub pending_amount: f64,
    pub due_date: String,
    pub age_days: u32,
}

/// Age ranges used for credit aging. Together they cover every non-negative
/// age exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeBucket {
    Days0To7,
    Days8To14,
    Days15To20,
    Days21To30,
    Over30,
}

impl AgeBucket {
    pub const ALL: [AgeBucket; 5] = [
        AgeBucket::Days0To7,
        AgeBucket::Days8To14,
        AgeBucket::Days15To20,
        AgeBucket::Days21To30,
        AgeBucket::Over30,
    ];

    pub fn for_age(age_days: u32) -> Self {
        match age_days {
            0..=7 => AgeBucket::Days0To7,
            8..=14 => AgeBucket::Days8To14,
            15..=20 => AgeBucket::Days15To20,
            21..=30 => AgeBucket::Days21To30,
            _ => AgeBucket::Over30,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeBucket::Days0To7 => "0-7 Days",
            AgeBucket::Days8To14 => "8-14 Days",
            AgeBucket::Days15To20 => "15-20 Days",
            AgeBucket::Days21To30 => "21-30 Days",
            AgeBucket::Over30 => "31+ Days",
        }
    }
}

/// Pending amounts split by [`AgeBucket`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgingBuckets {
    pub days_0_7: f64,
    pub days_8_14: f64,
    pub days_15_20: f64,
    pub days_21_30: f64,
    pub over_30: f64,
}

impl AgingBuckets {
    pub fn add(&mut self, bucket: AgeBucket, amount: f64) {
        *self.slot_mut(bucket) += amount;
    }

    pub fn get(&self, bucket: AgeBucket) -> f64 {
        match bucket {
            AgeBucket::Days0To7 => self.days_0_7,
            AgeBucket::Days8To14 => self.days_8_14,
            AgeBucket::Days15To20 => self.days_15_20,
            AgeBucket::Days21To30 => self.days_21_30,
            AgeBucket::Over30 => self.over_30,
        }
    }

    /// Total credit is defined as the sum of the buckets.
    pub fn total(&self) -> f64 {
        AgeBucket::ALL.iter().map(|b| self.get(*b)).sum()
    }

    fn slot_mut(&mut self, bucket: AgeBucket) -> &mut f64 {
        match bucket {
            AgeBucket::Days0To7 => &mut self.days_0_7,
            AgeBucket::Days8To14 => &mut self.days_8_14,
            AgeBucket::Days15To20 => &mut self.days_15_20,
            AgeBucket::Days21To30 => &mut self.days_21_30,
            AgeBucket::Over30 => &mut self.over_30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetailerCreditSummary {
    /// Empty when the retailer name has no code in the metadata.
    pub retailer_code: String,
    pub retailer_name: String,
    pub buckets: AgingBuckets,
    /// Empty when no TSE is assigned.
    pub tse: String,
}

impl RetailerCreditSummary {
    pub fn total_credit(&self) -> f64 {
        self.buckets.total()
    }

    pub fn has_tse(&self) -> bool {
        !self.tse.is_empty()
    }
}

/// One physical unit in a dealer's stock snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLine {
    pub material_code: String,
    pub dealer_code: String,
    pub dealer_name: String,
    /// Model (SPU) name with the brand prefix removed.
    pub model_name: String,
    pub color: String,
    pub sku_spec: String,
    pub product_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub dealer_code: String,
    pub dealer_name: String,
    pub tse: String,
    pub total_inventory_cost: f64,
    pub total_credit_due: f64,
}

impl InventoryRecord {
    /// Negative when the dealer owes more than its stock is worth.
    pub fn shortfall(&self) -> f64 {
        self.total_inventory_cost - self.total_credit_due
    }

    pub fn is_red_flag(&self) -> bool {
        self.shortfall() < 0.0
    }
}

/// Composite dealer × model key. The dealer side is a code or a name
/// depending on the report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DealerModelKey {
    pub dealer: String,
    pub model: String,
}

impl DealerModelKey {
    pub fn new(dealer: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            dealer: dealer.into(),
            model: model.into(),
        }
    }
}

pub type ModelCounts = BTreeMap<DealerModelKey, u32>;

/// Units sold by one dealer in one period window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealerUnits {
    pub dealer_code: String,
    pub dealer_name: String,
    pub units: u32,
}

/// Per-dealer unit counts for one period and one channel, keyed by dealer code.
pub type PeriodCounts = BTreeMap<String, DealerUnits>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthRecord {
    pub dealer_code: String,
    pub dealer_name: String,
    pub mtd_sell_out: u32,
    pub lmtd_sell_out: u32,
    pub sell_out_growth_pct: f64,
    pub mtd_sell_through: u32,
    pub lmtd_sell_through: u32,
    pub sell_through_growth_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefillRequirement {
    pub dealer_code: String,
    pub model: String,
    pub quota: u32,
    pub current_units: u32,
    pub required_refill: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZsoFlag {
    pub dealer: String,
    pub model: String,
    pub recent_sales: u32,
}

/// Units of one model sold by one dealer during the lookback window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealerModelSales {
    pub dealer_code: String,
    pub dealer_name: String,
    pub model: String,
    pub units: u32,
}

/// One invoice line from the monthly Tally sales register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesLine {
    pub dealer_code: String,
    pub dealer_name: String,
    pub item_name: String,
    pub value: f64,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SalesCategory {
    SmartPhones,
    Accessories,
    Others,
}

impl SalesCategory {
    pub const ALL: [SalesCategory; 3] = [
        SalesCategory::SmartPhones,
        SalesCategory::Accessories,
        SalesCategory::Others,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SalesCategory::SmartPhones => "SMART PHONES",
            SalesCategory::Accessories => "ACCESSORIES",
            SalesCategory::Others => "OTHERS",
        }
    }
}
