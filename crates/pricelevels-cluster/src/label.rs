use std::fmt;

/// Zero-based cluster index assigned to one observation.
///
/// Labels returned from a fit follow ascending center order: label 0 is the
/// lowest price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClusterLabel(usize);

impl ClusterLabel {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based cluster index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
