use super::{file_stem, ReportContext, ReportGenerator, ReportKind, ReportOutput};
use crate::credit::{aggregate_credit, group_by_tse};
use crate::error::Result;
use crate::ingestion::{
    read_bills, read_inventory, read_price_table, RETAILER_CODE, TOTAL_CREDIT, TOTAL_LABEL,
};
use crate::inventory::InventoryAggregator;
use crate::mapping::EntityMappings;
use crate::schema::{AgeBucket, RetailerCreditSummary};
use crate::utils::format_amount;
use log::{info, warn};
use std::cmp::Ordering;

pub const INVENTORY_COST: &str = "Total Inventory Cost";
pub const SHORTFALL: &str = "Inventory Shortfall";

/// Credit aging per retailer, one file per TSE, with each retailer's stock
/// value set against what it owes.
pub struct CreditReport<'a> {
    context: ReportContext<'a>,
}

/// A credit summary joined with the retailer's stock value.
struct CreditRow {
    summary: RetailerCreditSummary,
    inventory_cost: f64,
}

impl CreditRow {
    fn shortfall(&self) -> f64 {
        self.inventory_cost - self.summary.total_credit()
    }
}

impl<'a> CreditReport<'a> {
    pub fn new(context: ReportContext<'a>) -> Self {
        Self { context }
    }

    fn headers() -> Vec<&'static str> {
        let mut headers = vec![RETAILER_CODE, "Retailer Name"];
        headers.extend(AgeBucket::ALL.iter().map(|b| b.label()));
        headers.extend([TOTAL_CREDIT, INVENTORY_COST, SHORTFALL, "TSE"]);
        headers
    }

    fn render(rows: &[CreditRow]) -> Vec<Vec<String>> {
        let mut totals = [0.0f64; 8];
        let mut rendered = Vec::with_capacity(rows.len() + 1);

        for row in rows {
            let mut amounts: Vec<f64> = AgeBucket::ALL
                .iter()
                .map(|b| row.summary.buckets.get(*b))
                .collect();
            amounts.extend([row.summary.total_credit(), row.inventory_cost, row.shortfall()]);
            for (total, amount) in totals.iter_mut().zip(&amounts) {
                *total += amount;
            }

            let mut cells = vec![
                row.summary.retailer_code.clone(),
                row.summary.retailer_name.clone(),
            ];
            cells.extend(amounts.into_iter().map(format_amount));
            cells.push(row.summary.tse.clone());
            rendered.push(cells);
        }

        let mut total_row = vec![TOTAL_LABEL.to_string(), String::new()];
        total_row.extend(totals.into_iter().map(format_amount));
        total_row.push(String::new());
        rendered.push(total_row);
        rendered
    }
}

impl ReportGenerator for CreditReport<'_> {
    fn kind(&self) -> ReportKind {
        ReportKind::Credit
    }

    fn generate(&self) -> Result<ReportOutput> {
        let config = self.context.config();

        let metadata = self.context.load(&config.inputs.retailer_metadata)?;
        let mappings = EntityMappings::build(&metadata, &config.credit_dealer_name_header)?;

        let bills_sheet = self
            .context
            .load_with_header(&config.inputs.bills, config.bill_columns.header_row)?;
        let bills = read_bills(&bills_sheet, &config.bill_columns)?;

        let inventory = read_inventory(
            &self.context.load(&config.inputs.dealer_inventory)?,
            &config.model_name_strip,
        )?;
        let prices = read_price_table(&self.context.load(&config.inputs.price_list)?)?;
        let inventory_cost = InventoryAggregator::new(&prices, &mappings.code_to_tse)
            .cost_by_dealer(&inventory);

        let summaries = aggregate_credit(&bills, &mappings.name_to_tse, &mappings.name_to_code);
        info!("Computed credit for {} retailers", summaries.len());

        let mut writer = self.context.writer(self.kind());
        for (tse, group) in group_by_tse(summaries) {
            let mut rows: Vec<CreditRow> = group
                .into_iter()
                .map(|summary| {
                    let inventory_cost = match inventory_cost.get(&summary.retailer_code) {
                        Some(record) => record.total_inventory_cost,
                        None => {
                            warn!(
                                "No inventory cost for retailer '{}' ({}), using 0",
                                summary.retailer_name, summary.retailer_code
                            );
                            0.0
                        }
                    };
                    CreditRow {
                        summary,
                        inventory_cost,
                    }
                })
                .collect();
            rows.sort_by(|a, b| {
                a.shortfall()
                    .partial_cmp(&b.shortfall())
                    .unwrap_or(Ordering::Equal)
            });

            let file_name = format!("{}_credit_report.csv", file_stem(&tse));
            writer.write(&file_name, &Self::headers(), Self::render(&rows))?;
        }

        Ok(writer.finish())
    }
}
