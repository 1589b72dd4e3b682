//! Vendor bindings for the generation backends.
//!
//! One adapter per vendor, grouped behind the capability traits in
//! [`traits`]. The [`registry`] turns a resolved model configuration
//! into a boxed adapter; [`poll`] drives asynchronous video jobs to a
//! terminal outcome.

pub mod baidu;
mod chat;
mod http;
pub mod keling;
pub mod poll;
pub mod registry;
pub mod result;
pub mod stable_diffusion;
pub mod tongyi;
pub mod traits;
pub mod zhipu;

pub use poll::{poll_video_job, PollConfig, PollOutcome};
pub use registry::{AdapterRegistry, AdapterSpec};
pub use result::{
    GenerationPayload, GenerationResult, ImageRef, TokenUsage, VideoJobHandle, VideoJobStatus,
};
pub use traits::{ImageAdapter, TextAdapter, VideoAdapter};
