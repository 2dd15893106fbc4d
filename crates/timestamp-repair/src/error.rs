//! Structural Error Types

use thiserror::Error;

/// Faults that leave the time axis undefined; none of them is recoverable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    /// Not a single timestamp parsed
    #[error("No valid timestamp in {rows} rows")]
    NoValidTimestamp { rows: usize },

    /// First and last valid timestamps are the same row
    #[error("Validity window is the single row {index}; cannot estimate a gap")]
    DegenerateWindow { index: usize },

    /// Gap between samples came out zero or negative
    #[error("Estimated gap of {gap_ms} ms is not positive")]
    NonPositiveGap { gap_ms: i64 },

    /// The structural pass rejected every timestamp
    #[error("No timestamp survived the structural check")]
    NoAnchor,

    /// Synthesized timestamp is outside the representable range
    #[error("Timestamp arithmetic overflowed at row {index}")]
    Overflow { index: usize },
}
