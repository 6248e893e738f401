use super::{ReportContext, ReportGenerator, ReportKind, ReportOutput};
use crate::error::Result;
use crate::ingestion::read_inventory;
use crate::inventory::{model_counts, DealerKeyField};
use crate::mapping::{MappingBuilder, DEALER_NAME};
use crate::norms::ra_refill;
use crate::schema::RefillRequirement;
use std::collections::{BTreeMap, BTreeSet};

/// Units each RA dealer must order to meet its stocking norm, per model.
pub struct RaNormsReport<'a> {
    context: ReportContext<'a>,
}

impl<'a> RaNormsReport<'a> {
    pub fn new(context: ReportContext<'a>) -> Self {
        Self { context }
    }

    /// One row per dealer: TSE, name, a refill column per model and the
    /// total. Dealers are ordered by TSE, then by code. Zero refills render
    /// as empty cells.
    fn render(
        requirements: &[RefillRequirement],
        code_to_tse: &BTreeMap<String, String>,
        code_to_name: &BTreeMap<String, String>,
    ) -> (Vec<String>, Vec<Vec<String>>) {
        let models: BTreeSet<&str> = requirements.iter().map(|r| r.model.as_str()).collect();

        let mut by_dealer: BTreeMap<&str, BTreeMap<&str, u32>> = BTreeMap::new();
        for r in requirements {
            by_dealer
                .entry(r.dealer_code.as_str())
                .or_default()
                .insert(r.model.as_str(), r.required_refill);
        }

        let lookup =
            |map: &BTreeMap<String, String>, code: &str| map.get(code).cloned().unwrap_or_default();

        let mut rows: Vec<(String, Vec<String>)> = by_dealer
            .into_iter()
            .map(|(code, refills)| {
                let tse = lookup(code_to_tse, code);
                let mut cells = vec![tse.clone(), lookup(code_to_name, code)];
                // A model that needs no refill is left blank.
                cells.extend(models.iter().map(|m| match refills.get(m) {
                    Some(&refill) if refill > 0 => refill.to_string(),
                    _ => String::new(),
                }));
                cells.push(refills.values().sum::<u32>().to_string());
                (tse, cells)
            })
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        let mut headers = vec!["TSE".to_string(), DEALER_NAME.to_string()];
        headers.extend(models.iter().map(|m| m.to_string()));
        headers.push("Total Refill".to_string());

        (headers, rows.into_iter().map(|(_, cells)| cells).collect())
    }
}

impl ReportGenerator for RaNormsReport<'_> {
    fn kind(&self) -> ReportKind {
        ReportKind::RaNorms
    }

    fn generate(&self) -> Result<ReportOutput> {
        let config = self.context.config();

        let metadata = self.context.load(&config.inputs.retailer_metadata)?;
        let builder = MappingBuilder::new(&metadata);
        let code_to_tse = builder.code_to_tse()?;
        let code_to_name = builder.code_to_name()?;
        let quotas = builder.ra_quotas(&config.ra_type_sentinel)?;

        let inventory = read_inventory(
            &self.context.load(&config.inputs.dealer_inventory)?,
            &config.model_name_strip,
        )?;
        let counts = model_counts(&inventory, DealerKeyField::Code);

        let requirements = ra_refill(&quotas, &config.ra_models, &counts, config.refill_multiplier);
        let (headers, rows) = Self::render(&requirements, &code_to_tse, &code_to_name);
        let headers: Vec<&str> = headers.iter().map(String::as_str).collect();

        let mut writer = self.context.writer(self.kind());
        writer.write("ra_norms_report.csv", &headers, rows)?;
        Ok(writer.finish())
    }
}
