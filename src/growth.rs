use crate::config::SortDirection;
use crate::schema::{GrowthRecord, PeriodCounts};
use log::debug;
use std::cmp::Ordering;

/// Period-over-period change in percent.
///
/// A dealer with nothing last period and something this period counts as
/// +100%, and nothing in both periods counts as 0%.
pub fn growth_pct(current: u32, previous: u32) -> f64 {
    match (current, previous) {
        (0, 0) => 0.0,
        (_, 0) => 100.0,
        _ => (f64::from(current) - f64::from(previous)) / f64::from(previous) * 100.0,
    }
}

/// The four period datasets one growth run compares.
#[derive(Debug, Clone, Default)]
pub struct GrowthInputs {
    pub mtd_sell_out: PeriodCounts,
    pub lmtd_sell_out: PeriodCounts,
    pub mtd_sell_through: PeriodCounts,
    pub lmtd_sell_through: PeriodCounts,
}

/// One record per dealer active in the current sell-out period, sorted by
/// sell-out growth. Activity in the other three datasets alone does not
/// put a dealer in the report.
pub fn build_growth_report(inputs: &GrowthInputs, direction: SortDirection) -> Vec<GrowthRecord> {
    let units = |counts: &PeriodCounts, code: &str| counts.get(code).map_or(0, |d| d.units);

    let mut records: Vec<GrowthRecord> = inputs
        .mtd_sell_out
        .values()
        .map(|dealer| {
            let code = dealer.dealer_code.as_str();
            let mtd_sell_out = dealer.units;
            let lmtd_sell_out = units(&inputs.lmtd_sell_out, code);
            let mtd_sell_through = units(&inputs.mtd_sell_through, code);
            let lmtd_sell_through = units(&inputs.lmtd_sell_through, code);

            GrowthRecord {
                dealer_code: dealer.dealer_code.clone(),
                dealer_name: dealer.dealer_name.clone(),
                mtd_sell_out,
                lmtd_sell_out,
                sell_out_growth_pct: growth_pct(mtd_sell_out, lmtd_sell_out),
                mtd_sell_through,
                lmtd_sell_through,
                sell_through_growth_pct: growth_pct(mtd_sell_through, lmtd_sell_through),
            }
        })
        .collect();

    sort_by_growth(&mut records, direction);
    debug!("Built growth records for {} dealers", records.len());
    records
}

pub fn sort_by_growth(records: &mut [GrowthRecord], direction: SortDirection) {
    records.sort_by(|a, b| {
        let ord = a
            .sell_out_growth_pct
            .partial_cmp(&b.sell_out_growth_pct)
            .unwrap_or(Ordering::Equal);
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}
