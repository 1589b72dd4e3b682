//! Repositories: stateless query structs over `PgPool`.

pub mod character_repo;
pub mod model_config_repo;
pub mod project_repo;
pub mod scene_repo;
pub mod script_repo;
pub mod segment_repo;
pub mod storyboard_repo;
pub mod task_repo;

pub use character_repo::CharacterRepo;
pub use model_config_repo::ModelConfigRepo;
pub use project_repo::ProjectRepo;
pub use scene_repo::SceneRepo;
pub use script_repo::ScriptRepo;
pub use segment_repo::SegmentRepo;
pub use storyboard_repo::StoryboardRepo;
pub use task_repo::TaskRepo;
