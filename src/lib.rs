//! # Dealer Reports
//!
//! Batch reports for a handset distribution business, built from the CSV
//! exports of the billing ledger, the dealer management portal and the
//! retailer metadata sheet.
//!
//! ## Reports
//!
//! - **credit**: pending credit per retailer split into age buckets, one file per TSE
//! - **cogs**: stock value per dealer set against today's credit
//! - **growth**: month-to-date vs last-month-to-date sell-out and sell-through
//! - **ranorms**: refill each RA dealer needs to hold its stocking norm
//! - **zso**: models a dealer sold recently but no longer stocks
//! - **salestarget**: monthly units against per-TSE targets
//!
//! ## Example
//!
//! ```rust,no_run
//! use dealer_reports::*;
//! use chrono::NaiveDate;
//!
//! let config = ReportConfig::with_data_dir("../data");
//! let as_of = NaiveDate::from_ymd_opt(2024, 10, 15).unwrap();
//!
//! let output = run_report("credit", &config, as_of).unwrap();
//! for file in output.files {
//!     println!("{}", file.display());
//! }
//! ```

pub mod config;
pub mod credit;
pub mod error;
pub mod growth;
pub mod ingestion;
pub mod inventory;
pub mod mapping;
pub mod norms;
pub mod report;
pub mod sales_target;
pub mod schema;
pub mod sheet;
pub mod utils;

pub use config::{BillColumns, InputFiles, ReportConfig, SalesTargetSettings, SortDirection};
pub use credit::{aggregate_credit, group_by_tse, CreditAggregator, TSE_MISSING};
pub use error::{ReportError, Result};
pub use growth::{build_growth_report, growth_pct, GrowthInputs};
pub use inventory::{join_credit, model_counts, DealerKeyField, InventoryAggregator};
pub use mapping::{EntityMappings, MappingBuilder};
pub use norms::{ra_refill, zero_stock_outs};
pub use report::{
    generator_for, run_report, ReportContext, ReportGenerator, ReportKind, ReportOutput,
};
pub use sales_target::{summarize_sales, CategorySales, DealerSales, TseAttainment};
pub use schema::*;
pub use sheet::{Row, Sheet};
