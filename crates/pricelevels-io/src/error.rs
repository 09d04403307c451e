//! I/O error types for pricelevels-io.

use std::path::PathBuf;

/// Errors from file I/O, CSV parsing, and artifact serialization.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when a required column is absent from the header row.
    #[error("missing column \"{column}\" in {path}")]
    MissingColumn {
        /// Path to the CSV file.
        path: PathBuf,
        /// Header name that was looked up.
        column: String,
    },

    /// Returned when a price cell is NaN, Inf, or otherwise not a finite float.
    #[error("non-finite price in {path}: row {row_index}, raw value \"{raw}\"")]
    NonFiniteValue {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when the CSV file contains a header but zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when the ticker contains characters outside `[A-Za-z0-9._^=-]`.
    #[error("invalid ticker \"{ticker}\": must match [A-Za-z0-9._^=-]+")]
    InvalidTicker {
        /// The rejected ticker.
        ticker: String,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when an artifact cannot be serialized to JSON.
    #[error("cannot serialize artifact for {path}")]
    Serialize {
        /// Destination path.
        path: PathBuf,
        /// Underlying serde error.
        source: serde_json::Error,
    },

    /// Returned when a CSV artifact row cannot be written.
    #[error("cannot write CSV file {path}")]
    CsvWrite {
        /// Destination path.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
