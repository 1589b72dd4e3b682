//! Pure domain logic for the generation pipeline.
//!
//! No I/O lives here: error taxonomy, the task state machine, vendor and
//! parameter validation, the storyboard parser, default prompts, and
//! credential sealing. Everything is callable without pulling in database
//! or HTTP dependencies.

pub mod credentials;
pub mod error;
pub mod generation;
pub mod model_config;
pub mod prompts;
pub mod storyboard;
pub mod task;
pub mod types;
