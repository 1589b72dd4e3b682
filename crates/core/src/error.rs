//! Error taxonomy shared across the pipeline crates.
//!
//! Transport failures from vendor APIs never surface here — the adapter
//! layer converts them into failed generation results. What remains are
//! the caller-visible categories: bad configuration, bad input, text the
//! parser could not salvage, missing entities, and genuine bugs.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Unsupported vendor tag, malformed vendor parameters, missing or
    /// undecryptable credential. Always a deployment/configuration
    /// problem, never a user input problem.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed request data: out-of-range temperature, empty prompt,
    /// duplicate sequence numbers, and the like.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Model output could not be reduced to at least one storyboard entry.
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Internal error: {0}")]
    Internal(String),
}
