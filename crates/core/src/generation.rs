//! Generation request defaults and validation.
//!
//! Every stage request is validated here before a task is admitted.
//! Bounds mirror what the text vendors accept; stage-specific token
//! budgets differ because a script is substantially longer than its
//! storyboard breakdown.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Defaults and bounds
// ---------------------------------------------------------------------------

/// Sampling temperature used when the request does not specify one.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Inclusive temperature range accepted by all text vendors.
pub const TEMPERATURE_RANGE: (f64, f64) = (0.0, 2.0);

/// Default token budget for script generation.
pub const DEFAULT_SCRIPT_MAX_TOKENS: i32 = 4000;

/// Default token budget for storyboard generation.
pub const DEFAULT_STORYBOARD_MAX_TOKENS: i32 = 3000;

/// Hard ceiling on requested output tokens for any text stage.
pub const MAX_OUTPUT_TOKENS: i32 = 8192;

/// Longest prompt text accepted, in characters.
pub const MAX_PROMPT_CHARS: usize = 32_000;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A validated request for one text-generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The entity this generation targets (project, script, ...).
    pub target_id: DbId,
    /// User prompt text.
    pub prompt: String,
    /// Model configuration to generate with.
    pub model_config_id: DbId,
    /// Sampling temperature in [`TEMPERATURE_RANGE`].
    pub temperature: f64,
    /// Maximum output tokens, within stage-specific bounds.
    pub max_tokens: i32,
}

impl GenerationRequest {
    /// Validate all fields. Called before dispatch; an invalid request
    /// never reaches the adapter layer.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_prompt(&self.prompt)?;
        validate_temperature(self.temperature)?;
        validate_max_tokens(self.max_tokens)?;
        Ok(())
    }
}

/// Validate a sampling temperature.
///
/// NaN and infinity are rejected along with out-of-range values.
pub fn validate_temperature(temperature: f64) -> Result<(), CoreError> {
    let (lo, hi) = TEMPERATURE_RANGE;
    if !temperature.is_finite() || temperature < lo || temperature > hi {
        return Err(CoreError::Validation(format!(
            "temperature must be in {lo}..={hi}, got {temperature}"
        )));
    }
    Ok(())
}

/// Validate a requested output token budget.
pub fn validate_max_tokens(max_tokens: i32) -> Result<(), CoreError> {
    if max_tokens <= 0 || max_tokens > MAX_OUTPUT_TOKENS {
        return Err(CoreError::Validation(format!(
            "max_tokens must be in 1..={MAX_OUTPUT_TOKENS}, got {max_tokens}"
        )));
    }
    Ok(())
}

/// Validate prompt text: non-empty after trimming, bounded length.
pub fn validate_prompt(prompt: &str) -> Result<(), CoreError> {
    if prompt.trim().is_empty() {
        return Err(CoreError::Validation(
            "prompt must not be empty".to_string(),
        ));
    }
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(CoreError::Validation(format!(
            "prompt exceeds {MAX_PROMPT_CHARS} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
