//! CSV price-history reader with full input validation.

use std::path::{Path, PathBuf};

use pricelevels_stats::PriceSeries;
use tracing::{debug, info, instrument};

use crate::domain::PriceHistory;
use crate::IoError;

/// Reads a date/price history from a CSV file.
///
/// Expected CSV format:
/// - Header row required
/// - A timestamp column (default `Date`) and a price column (default `Close`),
///   located by header name; any other columns are ignored
/// - One row per observation, oldest first
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::MissingColumn`] | Date or price header not present |
/// | [`IoError::NonFiniteValue`] | Price cell is NaN, Inf, empty, or unparseable |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
pub struct PriceReader {
    path: PathBuf,
    date_column: String,
    price_column: String,
}

impl PriceReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            date_column: "Date".to_string(),
            price_column: "Close".to_string(),
        }
    }

    /// Override the timestamp column header.
    #[must_use]
    pub fn with_date_column(mut self, name: impl Into<String>) -> Self {
        self.date_column = name.into();
        self
    }

    /// Override the price column header.
    #[must_use]
    pub fn with_price_column(mut self, name: impl Into<String>) -> Self {
        self.price_column = name.into();
        self
    }

    /// Read and validate the CSV file, returning a [`PriceHistory`].
    #[instrument(skip(self), fields(path = %self.path.display(), price = %self.price_column))]
    pub fn read(&self) -> Result<PriceHistory, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) so short rows surface as a bad price cell, not a parse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.parse_error(e))?;
        let date_idx = self.column_index(header, &self.date_column)?;
        let price_idx = self.column_index(header, &self.price_column)?;
        debug!(date_idx, price_idx, "resolved CSV columns");

        let mut dates = Vec::new();
        let mut prices = Vec::new();

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.parse_error(e))?;

            let raw = record.get(price_idx).unwrap_or("");
            let price = raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| IoError::NonFiniteValue {
                    path: self.path.clone(),
                    row_index,
                    raw: raw.to_string(),
                })?;

            dates.push(record.get(date_idx).unwrap_or("").to_string());
            prices.push(price);
        }

        let series = PriceSeries::new(prices).map_err(|_| IoError::EmptyDataset {
            path: self.path.clone(),
        })?;

        info!(
            n_rows = series.len(),
            first = dates.first().map_or("", String::as_str),
            last = dates.last().map_or("", String::as_str),
            "price history loaded"
        );

        Ok(PriceHistory { dates, series })
    }

    fn column_index(&self, header: &csv::StringRecord, name: &str) -> Result<usize, IoError> {
        header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| IoError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })
    }

    fn parse_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_ohlc_file() {
        let csv = "Date,Open,High,Low,Close,Volume\n\
                   2024-01-02,100,110,95,105.5,1000\n\
                   2024-01-03,105,112,101,110.25,1200\n\
                   2024-01-04,110,111,99,100.0,900\n";
        let f = write_csv(csv);
        let history = PriceReader::new(f.path()).read().unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history.series.as_ref(), &[105.5, 110.25, 100.0]);
        assert_eq!(history.dates[0], "2024-01-02");
        assert_eq!(history.last_date(), Some("2024-01-04"));
    }

    #[test]
    fn custom_columns() {
        let csv = "timestamp,price\n1700000000,42.0\n1700000060,43.5\n";
        let f = write_csv(csv);
        let history = PriceReader::new(f.path())
            .with_date_column("timestamp")
            .with_price_column("price")
            .read()
            .unwrap();
        assert_eq!(history.series.as_ref(), &[42.0, 43.5]);
        assert_eq!(history.dates[1], "1700000060");
    }

    #[test]
    fn whitespace_around_cells_is_trimmed() {
        let csv = "Date, Close\n2024-01-02, 7.5 \n";
        let f = write_csv(csv);
        let history = PriceReader::new(f.path()).read().unwrap();
        assert_eq!(history.series.as_ref(), &[7.5]);
    }

    #[test]
    fn file_order_preserved() {
        let csv = "Date,Close\n2024-03-01,3\n2024-01-01,1\n2024-02-01,2\n";
        let f = write_csv(csv);
        let history = PriceReader::new(f.path()).read().unwrap();
        assert_eq!(history.series.as_ref(), &[3.0, 1.0, 2.0]);
    }

    #[test]
    fn error_file_not_found() {
        let result = PriceReader::new(Path::new("/nonexistent/prices.csv")).read();
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }

    #[test]
    fn error_missing_price_column() {
        let csv = "Date,Open\n2024-01-02,1.0\n";
        let f = write_csv(csv);
        let result = PriceReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::MissingColumn { ref column, .. }) if column == "Close"
        ));
    }

    #[test]
    fn error_missing_date_column() {
        let csv = "When,Close\n2024-01-02,1.0\n";
        let f = write_csv(csv);
        let result = PriceReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::MissingColumn { ref column, .. }) if column == "Date"
        ));
    }

    #[test]
    fn error_empty_dataset() {
        let f = write_csv("Date,Close\n");
        let result = PriceReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::EmptyDataset { .. })));
    }

    #[test]
    fn error_non_finite_nan() {
        let csv = "Date,Close\n2024-01-02,1.0\n2024-01-03,NaN\n";
        let f = write_csv(csv);
        let result = PriceReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::NonFiniteValue { row_index: 1, ref raw, .. }) if raw == "NaN"
        ));
    }

    #[test]
    fn error_unparseable_price() {
        let csv = "Date,Close\n2024-01-02,null\n";
        let f = write_csv(csv);
        let result = PriceReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::NonFiniteValue { row_index: 0, .. })));
    }

    #[test]
    fn error_short_row() {
        let csv = "Date,Open,Close\n2024-01-02,1.0,2.0\n2024-01-03,1.0\n";
        let f = write_csv(csv);
        let result = PriceReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::NonFiniteValue { row_index: 1, .. })));
    }
}
