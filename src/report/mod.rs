//! Report orchestrators.
//!
//! Each report loads its inputs, runs the aggregators and writes CSV files
//! into `<output_dir>/<prefix>_<YYYY-MM-DD>/`. Every input is loaded before
//! the output directory is created, so a failed load writes nothing.

mod cogs;
mod credit;
mod growth;
mod ranorms;
mod sales_target;
mod zso;

pub use cogs::InventoryCostReport;
pub use credit::CreditReport;
pub use growth::GrowthReport;
pub use ranorms::RaNormsReport;
pub use sales_target::SalesTargetReport;
pub use zso::ZsoReport;

use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::sheet::Sheet;
use crate::utils::dated_output_dir;
use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportKind {
    Cogs,
    Credit,
    Growth,
    RaNorms,
    Zso,
    SalesTarget,
}

impl ReportKind {
    pub const ALL: [ReportKind; 6] = [
        ReportKind::Cogs,
        ReportKind::Credit,
        ReportKind::Growth,
        ReportKind::RaNorms,
        ReportKind::Zso,
        ReportKind::SalesTarget,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ReportKind::Cogs => "cogs",
            ReportKind::Credit => "credit",
            ReportKind::Growth => "growth",
            ReportKind::RaNorms => "ranorms",
            ReportKind::Zso => "zso",
            ReportKind::SalesTarget => "salestarget",
        }
    }

    /// Prefix of the date-stamped directory the report is written into.
    pub fn output_prefix(&self) -> &'static str {
        match self {
            ReportKind::Cogs => "inventory_cost_report",
            ReportKind::Credit => "credit_reports",
            ReportKind::Growth => "growth_report",
            ReportKind::RaNorms => "ranorms_report",
            ReportKind::Zso => "zso_report",
            ReportKind::SalesTarget => "sales_report",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReportKind {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        ReportKind::ALL
            .iter()
            .find(|kind| kind.name() == wanted)
            .copied()
            .ok_or_else(|| ReportError::UnknownReport(s.to_string()))
    }
}

/// Files written by one report run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportOutput {
    pub kind: ReportKind,
    pub directory: PathBuf,
    pub files: Vec<PathBuf>,
}

pub trait ReportGenerator {
    fn kind(&self) -> ReportKind;

    fn generate(&self) -> Result<ReportOutput>;
}

pub fn generator_for<'a>(
    kind: ReportKind,
    config: &'a ReportConfig,
    as_of: NaiveDate,
) -> Box<dyn ReportGenerator + 'a> {
    let context = ReportContext::new(config, as_of);
    match kind {
        ReportKind::Cogs => Box::new(InventoryCostReport::new(context)),
        ReportKind::Credit => Box::new(CreditReport::new(context)),
        ReportKind::Growth => Box::new(GrowthReport::new(context)),
        ReportKind::RaNorms => Box::new(RaNormsReport::new(context)),
        ReportKind::Zso => Box::new(ZsoReport::new(context)),
        ReportKind::SalesTarget => Box::new(SalesTargetReport::new(context)),
    }
}

/// Parses `name` and runs the matching report.
pub fn run_report(name: &str, config: &ReportConfig, as_of: NaiveDate) -> Result<ReportOutput> {
    let kind: ReportKind = name.parse()?;
    info!("Generating {} report as of {}", kind, as_of);
    generator_for(kind, config, as_of).generate()
}

/// Shared by every generator: the run's configuration and as-of date.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    config: &'a ReportConfig,
    as_of: NaiveDate,
}

impl<'a> ReportContext<'a> {
    pub fn new(config: &'a ReportConfig, as_of: NaiveDate) -> Self {
        Self { config, as_of }
    }

    pub fn config(&self) -> &'a ReportConfig {
        self.config
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    fn load(&self, path: &Path) -> Result<Sheet> {
        self.load_with_header(path, 0)
    }

    fn load_with_header(&self, path: &Path, header_row: usize) -> Result<Sheet> {
        let sheet = Sheet::from_path(path, header_row)?;
        info!("Read {} rows from {}", sheet.len(), path.display());
        Ok(sheet)
    }

    fn output_dir(&self, kind: ReportKind) -> PathBuf {
        dated_output_dir(&self.config.output_dir, kind.output_prefix(), self.as_of)
    }

    fn writer(&self, kind: ReportKind) -> OutputWriter {
        OutputWriter {
            kind,
            directory: self.output_dir(kind),
            files: Vec::new(),
        }
    }
}

/// Collects the files of one run as they are written.
struct OutputWriter {
    kind: ReportKind,
    directory: PathBuf,
    files: Vec<PathBuf>,
}

impl OutputWriter {
    fn write(&mut self, file_name: &str, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        let path = self.unused_path(file_name);
        let sheet = Sheet::new(
            file_name,
            headers.iter().map(|h| h.to_string()).collect(),
            rows,
        );
        sheet.write_to_path(&path)?;
        info!("Wrote {} rows to {}", sheet.len(), path.display());
        self.files.push(path);
        Ok(())
    }

    /// Distinct names can share a stem ("Ravi K" and "Ravi_K"). Later files
    /// get a numeric suffix so an earlier file in the run is never overwritten.
    fn unused_path(&self, file_name: &str) -> PathBuf {
        let path = self.directory.join(file_name);
        if !self.files.contains(&path) {
            return path;
        }
        let (stem, extension) = match file_name.rsplit_once('.') {
            Some((stem, extension)) => (stem, format!(".{}", extension)),
            None => (file_name, String::new()),
        };
        let mut suffix = 2;
        loop {
            let candidate = self
                .directory
                .join(format!("{}_{}{}", stem, suffix, extension));
            if !self.files.contains(&candidate) {
                warn!(
                    "{} was already written in this run, writing {} instead",
                    file_name,
                    candidate.display()
                );
                return candidate;
            }
            suffix += 1;
        }
    }

    fn finish(self) -> ReportOutput {
        ReportOutput {
            kind: self.kind,
            directory: self.directory,
            files: self.files,
        }
    }
}

/// File-system safe stem for names that end up in file names.
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
