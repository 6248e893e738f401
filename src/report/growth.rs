use super::{ReportContext, ReportGenerator, ReportKind, ReportOutput};
use crate::error::Result;
use crate::growth::{build_growth_report, GrowthInputs};
use crate::ingestion::read_period_counts;
use crate::mapping::{MappingBuilder, DEALER_CODE, DEALER_NAME};
use crate::schema::{GrowthRecord, PeriodCounts};
use crate::utils::format_amount;
use std::collections::BTreeMap;
use std::path::Path;

const HEADERS: [&str; 9] = [
    "TSE",
    DEALER_CODE,
    DEALER_NAME,
    "MTD SO",
    "LMTD SO",
    "Growth SO %",
    "MTD ST",
    "LMTD ST",
    "Growth ST %",
];

/// Month-to-date against last-month-to-date sell-out and sell-through.
pub struct GrowthReport<'a> {
    context: ReportContext<'a>,
}

impl<'a> GrowthReport<'a> {
    pub fn new(context: ReportContext<'a>) -> Self {
        Self { context }
    }

    fn counts(&self, path: &Path) -> Result<PeriodCounts> {
        read_period_counts(&self.context.load(path)?, self.context.as_of())
    }

    /// Groups rows by TSE. The sort is stable, so the growth order holds
    /// within each TSE.
    fn render(
        mut records: Vec<GrowthRecord>,
        code_to_tse: &BTreeMap<String, String>,
    ) -> Vec<Vec<String>> {
        let tse_of = |code: &str| code_to_tse.get(code).cloned().unwrap_or_default();
        records.sort_by_cached_key(|r| tse_of(&r.dealer_code));

        records
            .into_iter()
            .map(|r| {
                vec![
                    tse_of(&r.dealer_code),
                    r.dealer_code,
                    r.dealer_name,
                    r.mtd_sell_out.to_string(),
                    r.lmtd_sell_out.to_string(),
                    format_amount(r.sell_out_growth_pct),
                    r.mtd_sell_through.to_string(),
                    r.lmtd_sell_through.to_string(),
                    format_amount(r.sell_through_growth_pct),
                ]
            })
            .collect()
    }
}

impl ReportGenerator for GrowthReport<'_> {
    fn kind(&self) -> ReportKind {
        ReportKind::Growth
    }

    fn generate(&self) -> Result<ReportOutput> {
        let config = self.context.config();
        let inputs = &config.inputs;

        let metadata = self.context.load(&inputs.retailer_metadata)?;
        let code_to_tse = MappingBuilder::new(&metadata).code_to_tse()?;

        let growth_inputs = GrowthInputs {
            mtd_sell_out: self.counts(&inputs.mtd_sell_out)?,
            lmtd_sell_out: self.counts(&inputs.lmtd_sell_out)?,
            mtd_sell_through: self.counts(&inputs.mtd_sell_through)?,
            lmtd_sell_through: self.counts(&inputs.lmtd_sell_through)?,
        };
        let records = build_growth_report(&growth_inputs, config.growth_sort);

        let mut writer = self.context.writer(self.kind());
        writer.write(
            "sales_growth_report.csv",
            &HEADERS,
            Self::render(records, &code_to_tse),
        )?;
        Ok(writer.finish())
    }
}
