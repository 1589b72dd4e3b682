//! Generation pipeline: stage bodies, task orchestration and the
//! coordinator surface.

pub mod coordinator;
pub mod error;
pub mod orchestrator;
pub mod request;
pub mod stages;
pub mod store;

pub use coordinator::Coordinator;
pub use error::PipelineError;
pub use orchestrator::{Orchestrator, DEFAULT_CONCURRENCY};
pub use request::StageRequest;
pub use stages::{AdapterProvider, FfmpegMerger, StageContext, VideoMerger};
pub use store::{ContentStore, PgStore, PipelineStore, StoreError, TaskStore};
