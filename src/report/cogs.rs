use super::credit::{INVENTORY_COST, SHORTFALL};
use super::{ReportContext, ReportGenerator, ReportKind, ReportOutput};
use crate::error::Result;
use crate::ingestion::{read_credit_by_code, read_inventory, read_price_table};
use crate::inventory::{join_credit, InventoryAggregator};
use crate::mapping::{MappingBuilder, DEALER_CODE, DEALER_NAME};
use crate::schema::InventoryRecord;
use crate::sheet::Sheet;
use crate::utils::{dated_output_dir, format_amount};
use log::{info, warn};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Stock value per dealer against the credit in today's credit reports.
pub struct InventoryCostReport<'a> {
    context: ReportContext<'a>,
}

impl<'a> InventoryCostReport<'a> {
    pub fn new(context: ReportContext<'a>) -> Self {
        Self { context }
    }

    /// Credit per retailer code from every credit report written today.
    /// Without that directory every dealer's credit is zero.
    fn todays_credit(&self) -> Result<BTreeMap<String, f64>> {
        let config = self.context.config();
        let dir = dated_output_dir(
            &config.output_dir,
            ReportKind::Credit.output_prefix(),
            self.context.as_of(),
        );
        if !dir.is_dir() {
            warn!(
                "Credit reports directory {} not found, treating all credit as 0",
                dir.display()
            );
            return Ok(BTreeMap::new());
        }

        let sheets = csv_files(&dir)?
            .iter()
            .map(|path| self.context.load(path))
            .collect::<Result<Vec<Sheet>>>()?;
        let credit = read_credit_by_code(&sheets)?;
        info!(
            "Read credit for {} retailers from {} credit reports",
            credit.len(),
            sheets.len()
        );
        Ok(credit)
    }

    fn sort(records: &mut [InventoryRecord]) {
        records.sort_by(|a, b| {
            a.tse.cmp(&b.tse).then_with(|| {
                a.shortfall()
                    .partial_cmp(&b.shortfall())
                    .unwrap_or(Ordering::Equal)
            })
        });
    }

    fn render(records: &[InventoryRecord]) -> Vec<Vec<String>> {
        records
            .iter()
            .map(|r| {
                vec![
                    r.dealer_code.clone(),
                    r.dealer_name.clone(),
                    r.tse.clone(),
                    format_amount(r.total_inventory_cost),
                    format_amount(r.total_credit_due),
                    format_amount(r.shortfall()),
                ]
            })
            .collect()
    }
}

impl ReportGenerator for InventoryCostReport<'_> {
    fn kind(&self) -> ReportKind {
        ReportKind::Cogs
    }

    fn generate(&self) -> Result<ReportOutput> {
        let config = self.context.config();

        let metadata = self.context.load(&config.inputs.retailer_metadata)?;
        let code_to_tse = MappingBuilder::new(&metadata).code_to_tse()?;
        let inventory = read_inventory(
            &self.context.load(&config.inputs.dealer_inventory)?,
            &config.model_name_strip,
        )?;
        let prices = read_price_table(&self.context.load(&config.inputs.price_list)?)?;
        let credit = self.todays_credit()?;

        let costs = InventoryAggregator::new(&prices, &code_to_tse).cost_by_dealer(&inventory);
        let mut records = join_credit(costs, &credit);
        Self::sort(&mut records);

        let red_flags = records.iter().filter(|r| r.is_red_flag()).count();
        info!(
            "{} of {} dealers owe more than their stock is worth",
            red_flags,
            records.len()
        );

        let mut writer = self.context.writer(self.kind());
        writer.write(
            "inventory_cost_report.csv",
            &[
                DEALER_CODE,
                DEALER_NAME,
                "TSE",
                INVENTORY_COST,
                "Total Credit Due",
                SHORTFALL,
            ],
            Self::render(&records),
        )?;
        Ok(writer.finish())
    }
}

fn csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "csv") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, tse: &str, cost: f64, credit: f64) -> InventoryRecord {
        InventoryRecord {
            dealer_code: code.to_string(),
            dealer_name: String::new(),
            tse: tse.to_string(),
            total_inventory_cost: cost,
            total_credit_due: credit,
        }
    }

    #[test]
    fn test_sorted_by_tse_then_shortfall() {
        let mut records = vec![
            record("D1", "Ravi", 100.0, 0.0),
            record("D2", "Meena", 100.0, 0.0),
            record("D3", "Ravi", 100.0, 400.0),
            record("D4", "", 10.0, 0.0),
        ];
        InventoryCostReport::sort(&mut records);
        let order: Vec<&str> = records.iter().map(|r| r.dealer_code.as_str()).collect();
        assert_eq!(order, vec!["D4", "D2", "D3", "D1"]);
    }

    #[test]
    fn test_render_shortfall_column() {
        let rendered = InventoryCostReport::render(&[record("D3", "Ravi", 100.0, 400.0)]);
        assert_eq!(rendered[0][5], "-300.00");
    }
}
