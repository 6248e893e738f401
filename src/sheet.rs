//! Header-addressed tabular data.
//!
//! Every input export is read as a grid of strings whose header row names
//! the columns. Aggregation code never touches positions directly: it asks
//! the sheet for a column index once, then reads cells through [`Row`].

use crate::error::{ReportError, Result};
use log::{debug, warn};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    first_data_line: usize,
}

/// A data row borrowed from a [`Sheet`]. Cells past the end of a short row
/// read as empty.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    cells: &'a [String],
    /// 1-based line number in the source, for log messages.
    pub line: usize,
}

impl<'a> Row<'a> {
    pub fn get(&self, index: usize) -> &'a str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }
}

impl Sheet {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
            first_data_line: 2,
        }
    }

    /// Reads CSV data, taking line `header_row` (0-based) as the header and
    /// everything after it as data. Lines above the header are discarded.
    pub fn from_reader<R: Read>(name: &str, reader: R, header_row: usize) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut grid: Vec<Vec<String>> = Vec::new();
        for record in csv_reader.byte_records() {
            let record = record?;
            let cells: Vec<String> = record
                .iter()
                .map(|cell| String::from_utf8_lossy(cell).into_owned())
                .collect();
            if record.iter().any(|cell| std::str::from_utf8(cell).is_err()) {
                warn!(
                    "Line {} of {} is not valid UTF-8, invalid bytes replaced",
                    record.position().map_or(grid.len() as u64 + 1, |p| p.line()),
                    name
                );
            }
            grid.push(cells);
        }

        if grid.is_empty() {
            return Err(ReportError::EmptySheet(name.to_string()));
        }
        if header_row >= grid.len() {
            return Err(ReportError::HeaderRowOutOfRange {
                source_name: name.to_string(),
                header_row,
            });
        }

        let rows = grid.split_off(header_row + 1);
        let headers = grid.pop().unwrap_or_default();
        debug!("Read {} data rows from {}", rows.len(), name);

        Ok(Self {
            name: name.to_string(),
            headers,
            rows,
            first_data_line: header_row + 2,
        })
    }

    pub fn from_path(path: impl AsRef<Path>, header_row: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::from_reader(&path.display().to_string(), file, header_row)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the column whose header is exactly `column`.
    pub fn column(&self, column: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| ReportError::MissingColumn {
                column: column.to_string(),
                source_name: self.name.clone(),
            })
    }

    /// First header of `candidates` present in the sheet. Exports from
    /// different portal versions spell the same column differently.
    pub fn column_any(&self, candidates: &[&str]) -> Result<usize> {
        candidates
            .iter()
            .find_map(|c| self.headers.iter().position(|h| h == c))
            .ok_or_else(|| ReportError::MissingColumn {
                column: candidates.join(" | "),
                source_name: self.name.clone(),
            })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        let first = self.first_data_line;
        self.rows.iter().enumerate().map(move |(i, cells)| Row {
            cells,
            line: first + i,
        })
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.headers.iter().position(|h| h == column)?;
        self.rows.get(row).map(|r| r.get(idx).map(String::as_str).unwrap_or(""))
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new().flexible(true).from_writer(writer);
        csv_writer.write_record(&self.headers)?;
        for row in &self.rows {
            csv_writer.write_record(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        self.write_to(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const METADATA: &str = "Dealer Code,Dealer Name,TSE Name\n\
                            D1,Alpha Mobiles,Ravi\n\
                            D2,Beta Telecom\n";

    #[test]
    fn test_column_lookup() {
        let sheet = Sheet::from_reader("metadata", METADATA.as_bytes(), 0).unwrap();
        assert_eq!(sheet.column("Dealer Name").unwrap(), 1);
        assert_eq!(sheet.len(), 2);

        let err = sheet.column("Type").unwrap_err();
        assert!(matches!(err, ReportError::MissingColumn { ref column, .. } if column == "Type"));
    }

    #[test]
    fn test_column_lookup_is_case_sensitive() {
        let sheet = Sheet::from_reader("metadata", METADATA.as_bytes(), 0).unwrap();
        assert!(sheet.column("dealer code").is_err());
    }

    #[test]
    fn test_column_any_prefers_first_candidate_present() {
        let sheet =
            Sheet::from_reader("sales", "toDealerCode,Activate Time\nD1,x\n".as_bytes(), 0)
                .unwrap();
        assert_eq!(sheet.column_any(&["Dealer Code", "toDealerCode"]).unwrap(), 0);
        assert!(sheet.column_any(&["Dealer Name", "toDealerName"]).is_err());
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let sheet = Sheet::from_reader("metadata", METADATA.as_bytes(), 0).unwrap();
        let tse = sheet.column("TSE Name").unwrap();
        let values: Vec<&str> = sheet.rows().map(|r| r.get(tse)).collect();
        assert_eq!(values, vec!["Ravi", ""]);
    }

    #[test]
    fn test_header_row_offset_skips_preamble() {
        let raw = "Viking Distributors\nBills Receivable\nDate,Party's Name\n01-Oct,Alpha\n";
        let sheet = Sheet::from_reader("bills", raw.as_bytes(), 2).unwrap();
        assert_eq!(sheet.headers(), &["Date".to_string(), "Party's Name".to_string()]);
        assert_eq!(sheet.len(), 1);
        assert_eq!(sheet.cell(0, "Party's Name"), Some("Alpha"));
    }

    #[test]
    fn test_empty_and_out_of_range() {
        assert!(matches!(
            Sheet::from_reader("empty", "".as_bytes(), 0),
            Err(ReportError::EmptySheet(_))
        ));
        assert!(matches!(
            Sheet::from_reader("short", "a,b\n".as_bytes(), 3),
            Err(ReportError::HeaderRowOutOfRange { header_row: 3, .. })
        ));
    }

    #[test]
    fn test_invalid_utf8_cell_keeps_the_rest_of_the_sheet() {
        let raw: &[u8] = b"Material Code,NLC\nM1,200\nM2,\xE9\nM3,300\n";
        let sheet = Sheet::from_reader("prices", raw, 0).unwrap();

        assert_eq!(sheet.len(), 3);
        assert_eq!(sheet.cell(0, "NLC"), Some("200"));
        assert_eq!(sheet.cell(1, "Material Code"), Some("M2"));
        assert_eq!(sheet.cell(1, "NLC"), Some("\u{FFFD}"));
        assert_eq!(sheet.cell(2, "NLC"), Some("300"));
    }

    #[test]
    fn test_latin1_dealer_name_is_readable() {
        let raw: &[u8] = b"Dealer Code,Dealer Name\nD1,Caf\xE9 Mobiles\n";
        let sheet = Sheet::from_reader("metadata", raw, 0).unwrap();
        assert_eq!(sheet.cell(0, "Dealer Name"), Some("Caf\u{FFFD} Mobiles"));
    }

    #[test]
    fn test_write_then_read() {
        let sheet = Sheet::new(
            "out",
            vec!["Dealer Code".to_string(), "Total".to_string()],
            vec![vec!["D1".to_string(), "1,200.50".to_string()]],
        );
        let mut buffer = Vec::new();
        sheet.write_to(&mut buffer).unwrap();

        let reread = Sheet::from_reader("out", buffer.as_slice(), 0).unwrap();
        assert_eq!(reread.cell(0, "Total"), Some("1,200.50"));
    }
}
