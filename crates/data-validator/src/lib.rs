//! Data Validation and Normalization
//!
//! Column normalization of raw log fields, range checking, and linear
//! interpolation of missing temperature/humidity readings.

mod error;
mod interpolate;
mod normalizer;
mod validator;

pub use error::ValidationError;
pub use interpolate::{interpolate_linear, EdgePolicy, InterpolationReport, Interpolator};
pub use normalizer::{parse_reading, NormalizationConfig, NormalizationResult, Normalizer};
pub use validator::{Rejection, ValidationConfig, ValidationReport, Validator};
