use crate::error::{ReportError, Result};
use crate::schema::SalesCategory;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum SortDirection {
    #[schemars(description = "Smallest first. Surfaces declining dealers at the top.")]
    Ascending,
    #[schemars(description = "Largest first. Surfaces growth leaders at the top.")]
    Descending,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct InputFiles {
    #[schemars(description = "Retailer metadata sheet: dealer code, name, TSE, type and RA count.")]
    pub retailer_metadata: PathBuf,
    #[schemars(description = "Product price list (Material Code, NLC).")]
    pub price_list: PathBuf,
    #[schemars(description = "Billing ledger exported from Tally.")]
    pub bills: PathBuf,
    #[schemars(description = "Today's dealer stock snapshot from the DMS portal.")]
    pub dealer_inventory: PathBuf,
    pub mtd_sell_out: PathBuf,
    pub lmtd_sell_out: PathBuf,
    pub mtd_sell_through: PathBuf,
    pub lmtd_sell_through: PathBuf,
    #[schemars(description = "Sell-out activations over the ZSO lookback window.")]
    pub lookback_sell_out: PathBuf,
    #[schemars(description = "Monthly sales register exported from Tally.")]
    pub sales_register: PathBuf,
}

impl InputFiles {
    pub fn under(data_dir: &Path) -> Self {
        let common = data_dir.join("common");
        let growth = data_dir.join("growth_report");
        Self {
            retailer_metadata: common.join("Retailer Metadata.csv"),
            price_list: common.join("ProductPriceList.csv"),
            bills: data_dir.join("credit_report").join("Bills.csv"),
            dealer_inventory: data_dir.join("cogs_report").join("DealerInventory.csv"),
            mtd_sell_out: growth.join("MTD-SO.csv"),
            lmtd_sell_out: growth.join("LMTD-SO.csv"),
            mtd_sell_through: growth.join("MTD-ST.csv"),
            lmtd_sell_through: growth.join("LMTD-ST.csv"),
            lookback_sell_out: growth.join("L2M-SO.csv"),
            sales_register: data_dir.join("sales_report").join("Sales.csv"),
        }
    }
}

impl Default for InputFiles {
    fn default() -> Self {
        Self::under(Path::new("../data"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BillColumns {
    #[schemars(description = "0-based header row index. Tally ledgers carry a preamble.")]
    pub header_row: usize,
    pub date: String,
    pub reference: String,
    pub retailer_name: String,
    pub pending_amount: String,
    pub due_date: String,
    pub age_days: String,
}

impl Default for BillColumns {
    fn default() -> Self {
        Self {
            header_row: 0,
            date: "Date".to_string(),
            reference: "Ref. No.".to_string(),
            retailer_name: "Party's Name".to_string(),
            pending_amount: "Pending Amount".to_string(),
            due_date: "Due on".to_string(),
            age_days: "Overdue by days".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SalesTargetSettings {
    #[schemars(description = "0-based index of the header row in the sales register.")]
    pub header_row: usize,
    pub dealer_code_column: String,
    pub dealer_name_column: String,
    pub amount_column: String,
    pub item_name_column: String,
    #[schemars(description = "Monthly unit targets per TSE, per product category.")]
    pub targets: BTreeMap<SalesCategory, BTreeMap<String, u32>>,
}

impl Default for SalesTargetSettings {
    fn default() -> Self {
        let smart_phones: BTreeMap<String, u32> = [
            ("Krishna Murthy".to_string(), 2490),
            ("SATHISH".to_string(), 1900),
            ("HARISH".to_string(), 600),
        ]
        .into_iter()
        .collect();
        let accessories: BTreeMap<String, u32> = [
            ("Krishna Murthy".to_string(), 1000),
            ("SATHISH".to_string(), 800),
            ("HARISH".to_string(), 600),
        ]
        .into_iter()
        .collect();

        let mut targets = BTreeMap::new();
        targets.insert(SalesCategory::Others, smart_phones.clone());
        targets.insert(SalesCategory::SmartPhones, smart_phones);
        targets.insert(SalesCategory::Accessories, accessories);

        Self {
            header_row: 9,
            dealer_code_column: "Retailer Code".to_string(),
            dealer_name_column: "Party Name".to_string(),
            amount_column: "Amount ".to_string(),
            item_name_column: "Item Name".to_string(),
            targets,
        }
    }
}

/// Everything a report run needs besides its input data.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ReportConfig {
    pub inputs: InputFiles,

    #[schemars(description = "Directory that receives the date-stamped report folders.")]
    pub output_dir: PathBuf,

    #[schemars(description = "Per-model stock norm of an RA dealer as a multiple of its RA count.")]
    pub refill_multiplier: u32,

    #[schemars(description = "Metadata 'Type' value that marks a Retailer Agreement dealer.")]
    pub ra_type_sentinel: String,

    #[schemars(description = "Models tracked by the RA norms report.")]
    pub ra_models: Vec<String>,

    #[schemars(description = "Models the zero-stock-out report tracks. Empty means all.")]
    pub zso_models: Vec<String>,

    #[schemars(description = "Brand prefix removed from SPU names before matching models.")]
    pub model_name_strip: String,

    #[schemars(description = "Substring of 'Product Type' that selects handsets.")]
    pub mobile_product_marker: String,

    pub growth_sort: SortDirection,

    #[schemars(description = "Metadata header with the dealer name used in the billing ledger.")]
    pub credit_dealer_name_header: String,

    #[schemars(description = "Metadata header with the dealer name used in DMS sales exports.")]
    pub zso_dealer_name_header: String,

    pub bill_columns: BillColumns,

    pub sales_target: SalesTargetSettings,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let models = |names: &[&str]| names.iter().map(|m| m.to_string()).collect::<Vec<_>>();
        Self {
            inputs: InputFiles::default(),
            output_dir: PathBuf::from("."),
            refill_multiplier: 3,
            ra_type_sentinel: "RA".to_string(),
            ra_models: models(&[
                "C61", "C63", "C63 5G", "C65 5G", "13 5G", "13+ 5G", "13 Pro+ 5G", "13 Pro 5G",
                "GT 6T", "GT6",
            ]),
            zso_models: models(&[
                "C61", "C63", "C63 5G", "C65 5G", "13 5G", "13+ 5G", "13 Pro 5G", "13 Pro+ 5G",
                "GT 6T", "GT6", "P1 5G", "P1 Pro", "P2 Pro",
            ]),
            model_name_strip: "realme".to_string(),
            mobile_product_marker: "mobile".to_string(),
            growth_sort: SortDirection::Descending,
            credit_dealer_name_header: "Tally Name(Dealer Name)".to_string(),
            zso_dealer_name_header: "Dealer Name".to_string(),
            bill_columns: BillColumns::default(),
            sales_target: SalesTargetSettings::default(),
        }
    }
}

impl ReportConfig {
    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            inputs: InputFiles::under(data_dir.as_ref()),
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ReportConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.refill_multiplier == 0 {
            return Err(ReportError::InvalidConfig(
                "refill_multiplier must be at least 1".to_string(),
            ));
        }
        if self.ra_type_sentinel.trim().is_empty() {
            return Err(ReportError::InvalidConfig(
                "ra_type_sentinel must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ReportConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
