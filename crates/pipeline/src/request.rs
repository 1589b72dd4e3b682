//! Stage invocation requests.

use reelforge_core::task::TaskType;
use reelforge_core::types::DbId;
use serde::{Deserialize, Serialize};

/// One requested pipeline stage. Serialized verbatim into the task's
/// `args` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "kebab-case")]
pub enum StageRequest {
    Script {
        project_id: DbId,
        model_config_id: DbId,
    },
    Storyboard {
        project_id: DbId,
        script_id: DbId,
        model_config_id: DbId,
    },
    CharacterImage {
        project_id: DbId,
        character_id: DbId,
        model_config_id: DbId,
    },
    SceneImage {
        project_id: DbId,
        scene_id: DbId,
        model_config_id: DbId,
    },
    VideoSegment {
        project_id: DbId,
        shot_id: DbId,
        model_config_id: DbId,
    },
    Merge {
        project_id: DbId,
        output_path: String,
    },
}

impl StageRequest {
    pub fn task_type(&self) -> TaskType {
        match self {
            Self::Script { .. } => TaskType::Script,
            Self::Storyboard { .. } => TaskType::Storyboard,
            Self::CharacterImage { .. } => TaskType::CharacterImage,
            Self::SceneImage { .. } => TaskType::SceneImage,
            Self::VideoSegment { .. } => TaskType::VideoSegment,
            Self::Merge { .. } => TaskType::Merge,
        }
    }

    pub fn project_id(&self) -> DbId {
        match self {
            Self::Script { project_id, .. }
            | Self::Storyboard { project_id, .. }
            | Self::CharacterImage { project_id, .. }
            | Self::SceneImage { project_id, .. }
            | Self::VideoSegment { project_id, .. }
            | Self::Merge { project_id, .. } => *project_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_stage_tag() {
        let request = StageRequest::Script {
            project_id: 1,
            model_config_id: 2,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stage"], "script");
        assert_eq!(json["project_id"], 1);
    }

    #[test]
    fn task_type_matches_variant() {
        let request = StageRequest::Merge {
            project_id: 1,
            output_path: "/out/final.mp4".to_string(),
        };
        assert_eq!(request.task_type(), TaskType::Merge);
        assert_eq!(request.project_id(), 1);
    }
}
