use crate::error::Result;
use crate::sheet::Sheet;
use crate::utils::parse_count;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEALER_CODE: &str = "Dealer Code";
pub const DEALER_NAME: &str = "Dealer Name";
pub const TSE_NAME: &str = "TSE Name";
pub const RETAILER_TYPE: &str = "Type";
pub const COUNT_OF_RA: &str = "Count of RA";

/// Lookup tables derived from the retailer metadata sheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityMappings {
    pub code_to_tse: BTreeMap<String, String>,
    pub code_to_name: BTreeMap<String, String>,
    pub name_to_code: BTreeMap<String, String>,
    pub name_to_tse: BTreeMap<String, String>,
}

impl EntityMappings {
    /// Builds all four tables. `dealer_name_header` names the column whose
    /// spelling matches the transactional source the names will be joined
    /// against.
    pub fn build(metadata: &Sheet, dealer_name_header: &str) -> Result<Self> {
        let builder = MappingBuilder::new(metadata);
        Ok(Self {
            code_to_tse: builder.code_to_tse()?,
            code_to_name: builder.code_to_name()?,
            name_to_code: builder.name_to_code(dealer_name_header)?,
            name_to_tse: builder.name_to_tse(dealer_name_header)?,
        })
    }
}

/// Single-pass builders over a metadata sheet. Rows with a blank key are
/// skipped; when a key repeats, the last row wins.
pub struct MappingBuilder<'a> {
    sheet: &'a Sheet,
}

impl<'a> MappingBuilder<'a> {
    pub fn new(sheet: &'a Sheet) -> Self {
        Self { sheet }
    }

    pub fn code_to_tse(&self) -> Result<BTreeMap<String, String>> {
        self.key_value(DEALER_CODE, TSE_NAME)
    }

    pub fn code_to_name(&self) -> Result<BTreeMap<String, String>> {
        self.key_value(DEALER_CODE, DEALER_NAME)
    }

    pub fn name_to_code(&self, dealer_name_header: &str) -> Result<BTreeMap<String, String>> {
        self.key_value(dealer_name_header, DEALER_CODE)
    }

    pub fn name_to_tse(&self, dealer_name_header: &str) -> Result<BTreeMap<String, String>> {
        self.key_value(dealer_name_header, TSE_NAME)
    }

    /// RA count per dealer code, for rows whose type equals `sentinel`.
    /// A count that does not parse drops the row with a warning.
    pub fn ra_quotas(&self, sentinel: &str) -> Result<BTreeMap<String, u32>> {
        let code_idx = self.sheet.column(DEALER_CODE)?;
        let type_idx = self.sheet.column(RETAILER_TYPE)?;
        let count_idx = self.sheet.column(COUNT_OF_RA)?;

        let mut quotas = BTreeMap::new();
        for row in self.sheet.rows() {
            let code = row.get(code_idx).trim();
            if code.is_empty() || row.get(type_idx).trim() != sentinel {
                continue;
            }
            match parse_count(row.get(count_idx)) {
                Some(count) => {
                    quotas.insert(code.to_string(), count);
                }
                None => warn!(
                    "Invalid count of RA '{}' for retailer {} (line {}), skipping",
                    row.get(count_idx),
                    code,
                    row.line
                ),
            }
        }

        debug!("Found {} RA retailers in {}", quotas.len(), self.sheet.name());
        Ok(quotas)
    }

    fn key_value(&self, key_column: &str, value_column: &str) -> Result<BTreeMap<String, String>> {
        let key_idx = self.sheet.column(key_column)?;
        let value_idx = self.sheet.column(value_column)?;

        let mut map = BTreeMap::new();
        for row in self.sheet.rows() {
            let key = row.get(key_idx).trim();
            if key.is_empty() {
                continue;
            }
            map.insert(key.to_string(), row.get(value_idx).trim().to_string());
        }

        debug!(
            "Built {} -> {} map with {} entries from {}",
            key_column,
            value_column,
            map.len(),
            self.sheet.name()
        );
        Ok(map)
    }
}
