use super::{ReportContext, ReportGenerator, ReportKind, ReportOutput};
use crate::error::Result;
use crate::ingestion::{read_dealer_model_sales, read_inventory};
use crate::inventory::{model_counts, DealerKeyField};
use crate::mapping::{MappingBuilder, DEALER_NAME};
use crate::norms::zero_stock_outs;
use crate::schema::ZsoFlag;
use log::info;
use std::collections::{BTreeMap, BTreeSet};

const ZSO_MARKER: &str = "ZSO";

/// Models a dealer sold recently but no longer stocks.
pub struct ZsoReport<'a> {
    context: ReportContext<'a>,
}

impl<'a> ZsoReport<'a> {
    pub fn new(context: ReportContext<'a>) -> Self {
        Self { context }
    }

    /// Columns only for models flagged somewhere, rows only for dealers with
    /// at least one flag, ordered by TSE.
    fn render(
        flags: &[ZsoFlag],
        name_to_tse: &BTreeMap<String, String>,
    ) -> (Vec<String>, Vec<Vec<String>>) {
        let models: BTreeSet<&str> = flags.iter().map(|f| f.model.as_str()).collect();

        let mut by_dealer: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for flag in flags {
            by_dealer
                .entry(flag.dealer.as_str())
                .or_default()
                .insert(flag.model.as_str());
        }

        let mut rows: Vec<Vec<String>> = by_dealer
            .into_iter()
            .map(|(dealer, flagged)| {
                let mut cells = vec![
                    name_to_tse.get(dealer).cloned().unwrap_or_default(),
                    dealer.to_string(),
                ];
                cells.extend(models.iter().map(|m| {
                    if flagged.contains(m) {
                        ZSO_MARKER.to_string()
                    } else {
                        String::new()
                    }
                }));
                cells.push(flagged.len().to_string());
                cells
            })
            .collect();
        rows.sort_by(|a, b| a[0].cmp(&b[0]));

        let mut headers = vec!["TSE".to_string(), DEALER_NAME.to_string()];
        headers.extend(models.iter().map(|m| m.to_string()));
        headers.push("Total ZSO".to_string());

        (headers, rows)
    }
}

impl ReportGenerator for ZsoReport<'_> {
    fn kind(&self) -> ReportKind {
        ReportKind::Zso
    }

    fn generate(&self) -> Result<ReportOutput> {
        let config = self.context.config();

        let metadata = self.context.load(&config.inputs.retailer_metadata)?;
        let name_to_tse =
            MappingBuilder::new(&metadata).name_to_tse(&config.zso_dealer_name_header)?;

        let models: BTreeSet<String> = config.zso_models.iter().cloned().collect();
        let sales = read_dealer_model_sales(
            &self.context.load(&config.inputs.lookback_sell_out)?,
            &config.model_name_strip,
            &config.mobile_product_marker,
            &models,
        )?;
        let inventory = read_inventory(
            &self.context.load(&config.inputs.dealer_inventory)?,
            &config.model_name_strip,
        )?;
        let counts = model_counts(&inventory, DealerKeyField::Name);

        let flags = zero_stock_outs(&sales, &counts);
        info!("Flagged {} zero-stock-out dealer/model pairs", flags.len());

        let (headers, rows) = Self::render(&flags, &name_to_tse);
        let headers: Vec<&str> = headers.iter().map(String::as_str).collect();

        let mut writer = self.context.writer(self.kind());
        writer.write("zso_report.csv", &headers, rows)?;
        Ok(writer.finish())
    }
}
