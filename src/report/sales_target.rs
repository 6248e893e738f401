use super::{file_stem, ReportContext, ReportGenerator, ReportKind, ReportOutput};
use crate::error::Result;
use crate::ingestion::{read_sales_lines, TOTAL_LABEL};
use crate::mapping::{MappingBuilder, DEALER_CODE, DEALER_NAME};
use crate::sales_target::{summarize_sales, CategorySales};
use crate::utils::format_amount;

const TARGET_HEADERS: [&str; 5] = ["TSE", "Target", "Achieved", "Balance", "Balance %"];
const SALES_HEADERS: [&str; 5] = [
    DEALER_CODE,
    DEALER_NAME,
    "Sell Out",
    "Total Sales Value",
    "TSE",
];

/// Units sold this month per category, per dealer and against TSE targets.
pub struct SalesTargetReport<'a> {
    context: ReportContext<'a>,
}

impl<'a> SalesTargetReport<'a> {
    pub fn new(context: ReportContext<'a>) -> Self {
        Self { context }
    }

    fn render_targets(summary: &CategorySales) -> Vec<Vec<String>> {
        summary
            .attainment
            .iter()
            .map(|a| {
                vec![
                    a.tse.clone(),
                    a.target.to_string(),
                    a.achieved.to_string(),
                    a.balance.to_string(),
                    format_amount(a.balance_pct),
                ]
            })
            .collect()
    }

    fn render_sales(summary: &CategorySales) -> Vec<Vec<String>> {
        let mut rows: Vec<Vec<String>> = summary
            .dealers
            .iter()
            .map(|d| {
                vec![
                    d.dealer_code.clone(),
                    d.dealer_name.clone(),
                    d.units.to_string(),
                    format_amount(d.value),
                    d.tse.clone(),
                ]
            })
            .collect();
        rows.push(vec![
            TOTAL_LABEL.to_string(),
            String::new(),
            summary.total_units().to_string(),
            format_amount(summary.total_value()),
            String::new(),
        ]);
        rows
    }
}

impl ReportGenerator for SalesTargetReport<'_> {
    fn kind(&self) -> ReportKind {
        ReportKind::SalesTarget
    }

    fn generate(&self) -> Result<ReportOutput> {
        let config = self.context.config();
        let settings = &config.sales_target;

        let metadata = self.context.load(&config.inputs.retailer_metadata)?;
        let code_to_tse = MappingBuilder::new(&metadata).code_to_tse()?;
        let register = self
            .context
            .load_with_header(&config.inputs.sales_register, settings.header_row)?;
        let lines = read_sales_lines(&register, settings)?;

        let summaries = summarize_sales(&lines, &code_to_tse, &settings.targets);

        let mut writer = self.context.writer(self.kind());
        for summary in &summaries {
            let stem = file_stem(summary.category.label()).to_lowercase();
            writer.write(
                &format!("{}_targets.csv", stem),
                &TARGET_HEADERS,
                Self::render_targets(summary),
            )?;
            writer.write(
                &format!("{}_sales.csv", stem),
                &SALES_HEADERS,
                Self::render_sales(summary),
            )?;
        }
        Ok(writer.finish())
    }
}
