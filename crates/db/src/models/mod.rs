//! Entity models and DTOs.
//!
//! Each submodule carries a `FromRow` + `Serialize` entity struct
//! matching the database row, plus a `Deserialize` create DTO for
//! inserts.

pub mod character;
pub mod model_config;
pub mod project;
pub mod scene;
pub mod script;
pub mod segment;
pub mod storyboard;
pub mod task;
