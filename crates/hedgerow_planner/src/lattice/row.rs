//! Edge/inner classification of hedgerow rows.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Whether a row is on the hedgerow margin or inside it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowClass {
    /// First or last row; shrubs only.
    Edge,
    /// Any row strictly between the edges; eligible for trees.
    Inner,
}

impl RowClass {
    #[inline]
    pub fn is_edge(self) -> bool {
        matches!(self, RowClass::Edge)
    }
}

/// Classifies `row` out of `rows` rows.
#[inline]
pub fn classify_row(row: usize, rows: usize) -> RowClass {
    if row == 0 || row + 1 == rows {
        RowClass::Edge
    } else {
        RowClass::Inner
    }
}
