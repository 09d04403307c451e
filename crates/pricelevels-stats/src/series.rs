//! Validated price series and training-window extraction.

use std::ops::Index;

use crate::error::StatsError;

/// Owned, validated price series in time order. Guaranteed non-empty with all finite values.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries(Vec<f64>);

impl PriceSeries {
    /// Create a new price series, validating that it is non-empty and all values are finite.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`StatsError::EmptyInput`] | `values` is empty |
    /// | [`StatsError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn new(values: Vec<f64>) -> Result<Self, StatsError> {
        if values.is_empty() {
            return Err(StatsError::EmptyInput);
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(StatsError::NonFiniteValue { index });
        }
        Ok(Self(values))
    }

    /// Return the most recent `train_n` observations.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::InvalidWindow`] when `train_n` is zero or exceeds
    /// the series length.
    pub fn trailing(&self, train_n: usize) -> Result<&[f64], StatsError> {
        let len = self.0.len();
        if train_n == 0 || train_n > len {
            return Err(StatsError::InvalidWindow { train_n, len });
        }
        Ok(&self.0[len - train_n..])
    }

    /// Return the number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false` for a constructed series; provided for the `len_without_is_empty` convention.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return the most recent observation.
    #[must_use]
    pub fn last(&self) -> f64 {
        self.0[self.0.len() - 1]
    }

    /// Consume and return the inner vector.
    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl Index<usize> for PriceSeries {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl AsRef<[f64]> for PriceSeries {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl TryFrom<Vec<f64>> for PriceSeries {
    type Error = StatsError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}
