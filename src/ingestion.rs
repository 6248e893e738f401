//! Typed records from raw sheets.
//!
//! A missing column fails the whole source. A row whose numeric field does
//! not parse is dropped with a warning and the rest of the sheet is kept.

use crate::config::{BillColumns, SalesTargetSettings};
use crate::error::Result;
use crate::mapping::{DEALER_CODE, DEALER_NAME};
use crate::schema::{
    Bill, DealerModelKey, DealerModelSales, DealerUnits, InventoryLine, PeriodCounts, SalesLine,
};
use crate::sheet::Sheet;
use crate::utils::{
    normalize_model_name, parse_amount, parse_count, parse_timestamp, within_month_to_date,
};
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};

pub const MATERIAL_CODE: &str = "Material Code";
pub const SPU_NAME: &str = "SPU Name";
pub const COLOR: &str = "Color";
pub const SKU_SPEC: &str = "SKU Spec";
pub const PRODUCT_TYPE: &str = "Product Type";
pub const NET_LANDING_COST: &str = "NLC";
pub const RETAILER_CODE: &str = "Retailer Code";
pub const TOTAL_CREDIT: &str = "Total Credit";
pub const TOTAL_LABEL: &str = "Total";

const SELL_DEALER_CODE: [&str; 2] = ["Dealer Code", "toDealerCode"];
const SELL_DEALER_NAME: [&str; 2] = ["Dealer Name", "toDealerName"];
const SELL_ACTIVATED_AT: [&str; 2] = ["Activate Time", "activateTime"];

pub fn read_bills(sheet: &Sheet, columns: &BillColumns) -> Result<Vec<Bill>> {
    let date_idx = sheet.column(&columns.date)?;
    let reference_idx = sheet.column(&columns.reference)?;
    let name_idx = sheet.column(&columns.retailer_name)?;
    let amount_idx = sheet.column(&columns.pending_amount)?;
    let due_idx = sheet.column(&columns.due_date)?;
    let age_idx = sheet.column(&columns.age_days)?;

    let mut bills = Vec::new();
    for row in sheet.rows() {
        let retailer_name = row.get(name_idx).trim();
        if retailer_name.is_empty() {
            continue;
        }

        let Some(pending_amount) = parse_amount(row.get(amount_idx)) else {
            warn!(
                "Dropping bill for '{}' at line {}: unparseable pending amount '{}'",
                retailer_name,
                row.line,
                row.get(amount_idx)
            );
            continue;
        };
        let Some(age_days) = parse_count(row.get(age_idx)) else {
            warn!(
                "Dropping bill for '{}' at line {}: unparseable age '{}'",
                retailer_name,
                row.line,
                row.get(age_idx)
            );
            continue;
        };

        bills.push(Bill {
            date: row.get(date_idx).trim().to_string(),
            reference: row.get(reference_idx).trim().to_string(),
            retailer_name: retailer_name.to_string(),
            pending_amount,
            due_date: row.get(due_idx).trim().to_string(),
            age_days,
        });
    }

    info!("Loaded {} bills from {}", bills.len(), sheet.name());
    Ok(bills)
}

pub fn read_inventory(sheet: &Sheet, brand: &str) -> Result<Vec<InventoryLine>> {
    let material_idx = sheet.column(MATERIAL_CODE)?;
    let code_idx = sheet.column(DEALER_CODE)?;
    let name_idx = sheet.column(DEALER_NAME)?;
    let spu_idx = sheet.column(SPU_NAME)?;
    let color_idx = sheet.column(COLOR)?;
    let spec_idx = sheet.column(SKU_SPEC)?;
    let type_idx = sheet.column(PRODUCT_TYPE)?;

    let lines: Vec<InventoryLine> = sheet
        .rows()
        .filter(|row| !row.get(code_idx).trim().is_empty())
        .map(|row| InventoryLine {
            material_code: row.get(material_idx).trim().to_string(),
            dealer_code: row.get(code_idx).trim().to_string(),
            dealer_name: row.get(name_idx).trim().to_string(),
            model_name: normalize_model_name(row.get(spu_idx), brand),
            color: row.get(color_idx).trim().to_string(),
            sku_spec: row.get(spec_idx).trim().to_string(),
            product_type: row.get(type_idx).trim().to_string(),
        })
        .collect();

    info!("Loaded {} inventory units from {}", lines.len(), sheet.name());
    Ok(lines)
}

/// Net landing cost per material code.
pub fn read_price_table(sheet: &Sheet) -> Result<BTreeMap<String, f64>> {
    let code_idx = sheet.column(MATERIAL_CODE)?;
    let price_idx = sheet.column(NET_LANDING_COST)?;

    let mut prices = BTreeMap::new();
    for row in sheet.rows() {
        let code = row.get(code_idx).trim();
        if code.is_empty() {
            continue;
        }
        match parse_amount(row.get(price_idx)) {
            Some(price) => {
                prices.insert(code.to_string(), price);
            }
            None => warn!(
                "Dropping price for material {} at line {}: unparseable NLC '{}'",
                code,
                row.line,
                row.get(price_idx)
            ),
        }
    }

    debug!("Loaded {} prices from {}", prices.len(), sheet.name());
    Ok(prices)
}

/// Counts activations per dealer, keeping only those that fall inside the
/// month-to-date window ending at `as_of`.
pub fn read_period_counts(sheet: &Sheet, as_of: NaiveDate) -> Result<PeriodCounts> {
    let code_idx = sheet.column_any(&SELL_DEALER_CODE)?;
    let name_idx = sheet.column_any(&SELL_DEALER_NAME)?;
    let time_idx = sheet.column_any(&SELL_ACTIVATED_AT)?;

    let mut counts = PeriodCounts::new();
    for row in sheet.rows() {
        let code = row.get(code_idx).trim();
        if code.is_empty() {
            continue;
        }
        let Some(activated) = parse_timestamp(row.get(time_idx)) else {
            warn!(
                "Dropping activation for dealer {} at line {}: unparseable time '{}'",
                code,
                row.line,
                row.get(time_idx)
            );
            continue;
        };
        if !within_month_to_date(activated, as_of) {
            continue;
        }

        counts
            .entry(code.to_string())
            .or_insert_with(|| DealerUnits {
                dealer_code: code.to_string(),
                dealer_name: row.get(name_idx).trim().to_string(),
                units: 0,
            })
            .units += 1;
    }

    info!(
        "Counted activations for {} dealers from {}",
        counts.len(),
        sheet.name()
    );
    Ok(counts)
}

/// Handset sales per (dealer name, model) over the lookback export. An empty
/// `models` set keeps every model.
pub fn read_dealer_model_sales(
    sheet: &Sheet,
    brand: &str,
    mobile_marker: &str,
    models: &BTreeSet<String>,
) -> Result<BTreeMap<DealerModelKey, DealerModelSales>> {
    let spu_idx = sheet.column(SPU_NAME)?;
    let code_idx = sheet.column(DEALER_CODE)?;
    let name_idx = sheet.column(DEALER_NAME)?;
    let type_idx = sheet.column(PRODUCT_TYPE)?;

    let mut sales: BTreeMap<DealerModelKey, DealerModelSales> = BTreeMap::new();
    for row in sheet.rows() {
        let model = normalize_model_name(row.get(spu_idx), brand);
        let code = row.get(code_idx).trim();
        let name = row.get(name_idx).trim();

        if model.is_empty()
            || code.is_empty()
            || name.is_empty()
            || !row.get(type_idx).contains(mobile_marker)
        {
            continue;
        }
        if !models.is_empty() && !models.contains(&model) {
            continue;
        }

        sales
            .entry(DealerModelKey::new(name, model.clone()))
            .or_insert_with(|| DealerModelSales {
                dealer_code: code.to_string(),
                dealer_name: name.to_string(),
                model,
                units: 0,
            })
            .units += 1;
    }

    info!(
        "Loaded {} dealer/model sales pairs from {}",
        sales.len(),
        sheet.name()
    );
    Ok(sales)
}

/// Sums "Total Credit" per retailer code across previously written credit
/// report sheets. Summary rows carry no retailer code and are skipped.
pub fn read_credit_by_code<'a, I>(sheets: I) -> Result<BTreeMap<String, f64>>
where
    I: IntoIterator<Item = &'a Sheet>,
{
    let mut credit = BTreeMap::new();
    for sheet in sheets {
        let code_idx = sheet.column(RETAILER_CODE)?;
        let total_idx = sheet.column(TOTAL_CREDIT)?;

        for row in sheet.rows() {
            let code = row.get(code_idx).trim();
            if code.is_empty() || code == TOTAL_LABEL {
                continue;
            }
            match parse_amount(row.get(total_idx)) {
                Some(amount) => *credit.entry(code.to_string()).or_insert(0.0) += amount,
                None => warn!(
                    "Dropping credit for retailer {} in {} line {}: unparseable total '{}'",
                    code,
                    sheet.name(),
                    row.line,
                    row.get(total_idx)
                ),
            }
        }
    }
    Ok(credit)
}

pub fn read_sales_lines(sheet: &Sheet, settings: &SalesTargetSettings) -> Result<Vec<SalesLine>> {
    let code_idx = sheet.column(&settings.dealer_code_column)?;
    let name_idx = sheet.column(&settings.dealer_name_column)?;
    let amount_idx = sheet.column(&settings.amount_column)?;
    let item_idx = sheet.column(&settings.item_name_column)?;

    let mut lines = Vec::new();
    for row in sheet.rows() {
        let code = row.get(code_idx).trim();
        if code.is_empty() {
            continue;
        }
        if repeats_header(code, row.get(item_idx), settings) {
            debug!("Skipping repeated header at line {} of {}", row.line, sheet.name());
            continue;
        }
        let Some(value) = parse_amount(row.get(amount_idx)) else {
            warn!(
                "Dropping sales line for {} at line {}: unparseable amount '{}'",
                code,
                row.line,
                row.get(amount_idx)
            );
            continue;
        };
        lines.push(SalesLine {
            dealer_code: code.to_string(),
            dealer_name: row.get(name_idx).trim().to_string(),
            item_name: row.get(item_idx).trim().to_string(),
            value,
        });
    }

    info!("Loaded {} sales lines from {}", lines.len(), sheet.name());
    Ok(lines)
}

/// Tally repeats the column header row inside long registers.
fn repeats_header(code: &str, item_name: &str, settings: &SalesTargetSettings) -> bool {
    code == settings.dealer_code_column.trim()
        && item_name.trim() == settings.item_name_column.trim()
}
