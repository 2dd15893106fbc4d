//! Timestamp Repair Engine
//!
//! Merges date and time fields into timestamps, then infers a regular time
//! axis from the entries that parsed and rewrites every missing or
//! structurally invalid timestamp from a robust gap estimate.

mod error;
mod gap;
mod parse;
mod repair;
mod window;

pub use error::StructuralError;
pub use gap::{GapEstimate, GapMethod};
pub use parse::{build_series, parse_timestamp, TIMESTAMP_FORMATS};
pub use repair::{RepairConfig, RepairReport, TimestampRepairer};
pub use window::ValidityWindow;
