//! Domain types for pricelevels-io.

use pricelevels_stats::PriceSeries;

use crate::IoError;

/// A validated instrument symbol used to name output files.
///
/// Must match `[A-Za-z0-9._^=-]+`, which covers index symbols such as `^GSPC`
/// and pairs such as `BTC-USD` or `EURUSD=X`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticker(String);

impl Ticker {
    /// Parse and validate a ticker.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidTicker`] if the ticker is empty or contains
    /// characters outside `[A-Za-z0-9._^=-]`.
    pub fn new(ticker: String) -> Result<Self, IoError> {
        if ticker.is_empty()
            || !ticker
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '^' | '=' | '-'))
        {
            return Err(IoError::InvalidTicker { ticker });
        }
        Ok(Self(ticker))
    }

    /// Return the ticker as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A price history read from CSV.
///
/// Produced by [`PriceReader`](crate::PriceReader). `dates[i]` is the raw
/// timestamp text of `series[i]`; rows keep file order.
#[derive(Debug)]
pub struct PriceHistory {
    /// Timestamp column values, unparsed.
    pub dates: Vec<String>,
    /// Validated closing prices.
    pub series: PriceSeries,
}

impl PriceHistory {
    /// Return the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Always `false` for a history produced by the reader.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Return the timestamp of the most recent row.
    #[must_use]
    pub fn last_date(&self) -> Option<&str> {
        self.dates.last().map(String::as_str)
    }
}
