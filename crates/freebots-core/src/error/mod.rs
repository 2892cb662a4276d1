//! Error types for the free-bots cache
//!
//! Every failure in the pipeline degrades to "value unavailable" at the
//! `resolve` boundary, but lower layers keep a typed error so callers that
//! care (the CLI, diagnostics) can tell a missing upstream file from a
//! transient failure or a corrupt cached token.

mod classifiers;
mod constructors;
mod conversions;
mod types;

pub use classifiers::ErrorCategory;
pub use types::{FreebotsError, FreebotsResult};
