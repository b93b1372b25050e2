use std::path::PathBuf;

use thiserror::Error;

/// Why a project sheet could not be turned into a table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("workbook contains no worksheet")]
    NoWorksheet,

    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("row {row}, column '{column}': cannot parse '{value}'")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {0} is not a JSON object")]
    NotARecord(usize),
}
