use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Column '{column}' not found in {source_name}")]
    MissingColumn { column: String, source_name: String },

    #[error("No rows found in {0}")]
    EmptySheet(String),

    #[error("Header row {header_row} is beyond the end of {source_name}")]
    HeaderRowOutOfRange {
        source_name: String,
        header_row: usize,
    },

    #[error("Unknown report type: {0}")]
    UnknownReport(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
