//! Shared test fixtures: in-memory store, scripted adapters, recording
//! merger.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reelforge_adapters::{
    AdapterSpec, GenerationResult, ImageAdapter, PollConfig, TextAdapter, TokenUsage,
    VideoAdapter, VideoJobHandle, VideoJobStatus,
};
use reelforge_core::credentials::CredentialKey;
use reelforge_core::error::CoreError;
use reelforge_core::storyboard::StoryboardDraft;
use reelforge_core::task::{TaskStatus, PROGRESS_COMPLETE, PROGRESS_DISPATCHED};
use reelforge_core::types::{DbId, Timestamp};
use reelforge_db::models::character::Character;
use reelforge_db::models::model_config::ModelConfig;
use reelforge_db::models::project::Project;
use reelforge_db::models::scene::Scene;
use reelforge_db::models::script::{CreateScript, Script};
use reelforge_db::models::segment::{CreateVideoSegment, VideoSegment};
use reelforge_db::models::storyboard::StoryboardShot;
use reelforge_db::models::task::{CreateTask, Task};
use reelforge_pipeline::stages::merge::MergeError;
use reelforge_pipeline::{
    AdapterProvider, ContentStore, StageContext, StoreError, TaskStore, VideoMerger,
};

fn now() -> Timestamp {
    chrono::Utc::now()
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Inner {
    next_id: DbId,
    tasks: HashMap<DbId, Task>,
    projects: HashMap<DbId, Project>,
    configs: HashMap<DbId, ModelConfig>,
    scripts: HashMap<DbId, Script>,
    shots: HashMap<DbId, StoryboardShot>,
    characters: HashMap<DbId, Character>,
    scenes: HashMap<DbId, Scene>,
    segments: HashMap<DbId, VideoSegment>,
}

impl Inner {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory [`TaskStore`] + [`ContentStore`] mirroring the guarded
/// transition semantics of the Postgres repositories.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_project(&self, outline: Option<&str>) -> DbId {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.projects.insert(
            id,
            Project {
                id,
                title: format!("project {id}"),
                story_outline: outline.map(str::to_string),
                created_at: now(),
                updated_at: now(),
            },
        );
        id
    }

    pub fn add_config(&self, vendor: &str, endpoint: Option<&str>) -> DbId {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.configs.insert(
            id,
            ModelConfig {
                id,
                name: format!("config {id}"),
                vendor: vendor.to_string(),
                model_name: "test-model".to_string(),
                credential: None,
                endpoint: endpoint.map(str::to_string),
                system_prompt: None,
                prompt_template: None,
                params: serde_json::json!({}),
                is_enabled: true,
                created_at: now(),
                updated_at: now(),
            },
        );
        id
    }

    pub fn add_script(&self, project_id: DbId, content: &str) -> DbId {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let version = inner
            .scripts
            .values()
            .filter(|s| s.project_id == project_id)
            .map(|s| s.version)
            .max()
            .unwrap_or(0)
            + 1;
        inner.scripts.insert(
            id,
            Script {
                id,
                project_id,
                version,
                content: content.to_string(),
                generated_by_config: None,
                created_at: now(),
            },
        );
        id
    }

    pub fn add_shot(&self, script_id: DbId, sequence_number: i32, content: &str) -> DbId {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.shots.insert(
            id,
            StoryboardShot {
                id,
                script_id,
                sequence_number,
                content: content.to_string(),
                duration_secs: 5.0,
                created_at: now(),
            },
        );
        id
    }

    pub fn add_character(&self, project_id: DbId, description: Option<&str>) -> DbId {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.characters.insert(
            id,
            Character {
                id,
                project_id,
                name: format!("character {id}"),
                description: description.map(str::to_string),
                image_url: None,
                created_at: now(),
                updated_at: now(),
            },
        );
        id
    }

    pub fn add_scene(&self, project_id: DbId, description: &str) -> DbId {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.scenes.insert(
            id,
            Scene {
                id,
                project_id,
                description: description.to_string(),
                image_url: None,
                created_at: now(),
                updated_at: now(),
            },
        );
        id
    }

    pub fn task(&self, id: DbId) -> Task {
        self.inner.lock().unwrap().tasks[&id].clone()
    }

    pub fn tasks_for_project(&self, project_id: DbId) -> Vec<Task> {
        let mut tasks: Vec<_> = self
            .inner
            .lock()
            .unwrap()
            .tasks
            .values()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.id);
        tasks
    }

    pub fn segments(&self, project_id: DbId) -> Vec<VideoSegment> {
        let mut segments: Vec<_> = self
            .inner
            .lock()
            .unwrap()
            .segments
            .values()
            .filter(|s| s.project_id == project_id)
            .cloned()
            .collect();
        segments.sort_by_key(|s| s.sequence_number);
        segments
    }

    pub fn shots(&self, script_id: DbId) -> Vec<StoryboardShot> {
        let mut shots: Vec<_> = self
            .inner
            .lock()
            .unwrap()
            .shots
            .values()
            .filter(|s| s.script_id == script_id)
            .cloned()
            .collect();
        shots.sort_by_key(|s| s.sequence_number);
        shots
    }

    pub fn character(&self, id: DbId) -> Character {
        self.inner.lock().unwrap().characters[&id].clone()
    }

    pub fn force_segment_status(&self, id: DbId, status: TaskStatus, video_url: Option<&str>) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(segment) = inner.segments.get_mut(&id) {
            segment.status_id = status.id();
            segment.video_url = video_url.map(str::to_string);
        }
    }

    pub fn add_segment(&self, project_id: DbId, shot_id: DbId, sequence_number: i32) -> DbId {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.segments.insert(
            id,
            VideoSegment {
                id,
                project_id,
                shot_id,
                sequence_number,
                status_id: TaskStatus::Pending.id(),
                duration_secs: 5.0,
                vendor_job_id: None,
                video_url: None,
                error_message: None,
                created_at: now(),
                updated_at: now(),
            },
        );
        id
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create_task(&self, input: CreateTask) -> Result<Task, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let task = Task {
            id,
            project_id: input.project_id,
            task_type: input.task_type,
            status_id: TaskStatus::Pending.id(),
            progress: 0,
            args: input.args,
            result: None,
            error_message: None,
            created_at: now(),
            updated_at: now(),
            started_at: None,
            completed_at: None,
        };
        inner.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn get_task(&self, id: DbId) -> Result<Option<Task>, StoreError> {
        Ok(self.inner.lock().unwrap().tasks.get(&id).cloned())
    }

    async fn mark_task_processing(&self, id: DbId) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(match inner.tasks.get_mut(&id) {
            Some(task) if task.status_id == TaskStatus::Pending.id() => {
                task.status_id = TaskStatus::Processing.id();
                task.progress = PROGRESS_DISPATCHED;
                task.started_at = Some(now());
                true
            }
            _ => false,
        })
    }

    async fn update_task_progress(&self, id: DbId, progress: i16) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(match inner.tasks.get_mut(&id) {
            Some(task)
                if task.status_id == TaskStatus::Processing.id() && task.progress <= progress =>
            {
                task.progress = progress;
                true
            }
            _ => false,
        })
    }

    async fn complete_task(
        &self,
        id: DbId,
        result: &serde_json::Value,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(match inner.tasks.get_mut(&id) {
            Some(task) if task.status_id == TaskStatus::Processing.id() => {
                task.status_id = TaskStatus::Completed.id();
                task.progress = PROGRESS_COMPLETE;
                task.result = Some(result.clone());
                task.completed_at = Some(now());
                true
            }
            _ => false,
        })
    }

    async fn fail_task(&self, id: DbId, error: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(match inner.tasks.get_mut(&id) {
            Some(task)
                if task.status_id == TaskStatus::Pending.id()
                    || task.status_id == TaskStatus::Processing.id() =>
            {
                task.status_id = TaskStatus::Failed.id();
                task.error_message = Some(error.to_string());
                task.completed_at = Some(now());
                true
            }
            _ => false,
        })
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn get_project(&self, id: DbId) -> Result<Option<Project>, StoreError> {
        Ok(self.inner.lock().unwrap().projects.get(&id).cloned())
    }

    async fn get_model_config(&self, id: DbId) -> Result<Option<ModelConfig>, StoreError> {
        Ok(self.inner.lock().unwrap().configs.get(&id).cloned())
    }

    async fn create_script(&self, input: CreateScript) -> Result<Script, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let version = inner
            .scripts
            .values()
            .filter(|s| s.project_id == input.project_id)
            .map(|s| s.version)
            .max()
            .unwrap_or(0)
            + 1;
        let script = Script {
            id,
            project_id: input.project_id,
            version,
            content: input.content,
            generated_by_config: input.generated_by_config,
            created_at: now(),
        };
        inner.scripts.insert(id, script.clone());
        Ok(script)
    }

    async fn get_script_owned(
        &self,
        id: DbId,
        project_id: DbId,
    ) -> Result<Option<Script>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .scripts
            .get(&id)
            .filter(|s| s.project_id == project_id)
            .cloned())
    }

    async fn replace_storyboard(
        &self,
        script_id: DbId,
        drafts: &[StoryboardDraft],
    ) -> Result<Vec<StoryboardShot>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.shots.retain(|_, s| s.script_id != script_id);
        let mut shots = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let id = inner.next_id();
            let shot = StoryboardShot {
                id,
                script_id,
                sequence_number: draft.sequence_number,
                content: draft.content.clone(),
                duration_secs: draft.duration,
                created_at: now(),
            };
            inner.shots.insert(id, shot.clone());
            shots.push(shot);
        }
        Ok(shots)
    }

    async fn list_storyboard(&self, script_id: DbId) -> Result<Vec<StoryboardShot>, StoreError> {
        Ok(self.shots(script_id))
    }

    async fn get_shot_owned(
        &self,
        id: DbId,
        project_id: DbId,
    ) -> Result<Option<StoryboardShot>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .shots
            .get(&id)
            .filter(|shot| {
                inner
                    .scripts
                    .get(&shot.script_id)
                    .is_some_and(|s| s.project_id == project_id)
            })
            .cloned())
    }

    async fn get_character_owned(
        &self,
        id: DbId,
        project_id: DbId,
    ) -> Result<Option<Character>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .characters
            .get(&id)
            .filter(|c| c.project_id == project_id)
            .cloned())
    }

    async fn set_character_image(&self, id: DbId, url: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(match inner.characters.get_mut(&id) {
            Some(character) => {
                character.image_url = Some(url.to_string());
                true
            }
            None => false,
        })
    }

    async fn get_scene_owned(
        &self,
        id: DbId,
        project_id: DbId,
    ) -> Result<Option<Scene>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .scenes
            .get(&id)
            .filter(|s| s.project_id == project_id)
            .cloned())
    }

    async fn set_scene_image(&self, id: DbId, url: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(match inner.scenes.get_mut(&id) {
            Some(scene) => {
                scene.image_url = Some(url.to_string());
                true
            }
            None => false,
        })
    }

    async fn create_segment(
        &self,
        input: CreateVideoSegment,
    ) -> Result<VideoSegment, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let segment = VideoSegment {
            id,
            project_id: input.project_id,
            shot_id: input.shot_id,
            sequence_number: input.sequence_number,
            status_id: TaskStatus::Pending.id(),
            duration_secs: input.duration_secs,
            vendor_job_id: None,
            video_url: None,
            error_message: None,
            created_at: now(),
            updated_at: now(),
        };
        inner.segments.insert(id, segment.clone());
        Ok(segment)
    }

    async fn list_segments(&self, project_id: DbId) -> Result<Vec<VideoSegment>, StoreError> {
        Ok(self.segments(project_id))
    }

    async fn segment_mark_processing(&self, id: DbId, job_id: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(match inner.segments.get_mut(&id) {
            Some(segment) if segment.status_id == TaskStatus::Pending.id() => {
                segment.status_id = TaskStatus::Processing.id();
                segment.vendor_job_id = Some(job_id.to_string());
                true
            }
            _ => false,
        })
    }

    async fn segment_complete(&self, id: DbId, video_url: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(match inner.segments.get_mut(&id) {
            Some(segment) if segment.status_id == TaskStatus::Processing.id() => {
                segment.status_id = TaskStatus::Completed.id();
                segment.video_url = Some(video_url.to_string());
                true
            }
            _ => false,
        })
    }

    async fn segment_fail(&self, id: DbId, error: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(match inner.segments.get_mut(&id) {
            Some(segment)
                if segment.status_id == TaskStatus::Pending.id()
                    || segment.status_id == TaskStatus::Processing.id() =>
            {
                segment.status_id = TaskStatus::Failed.id();
                segment.error_message = Some(error.to_string());
                true
            }
            _ => false,
        })
    }
}

// ---------------------------------------------------------------------------
// Scripted adapters
// ---------------------------------------------------------------------------

/// [`AdapterProvider`] returning pre-scripted results in FIFO order.
///
/// Calls past the end of a queue resolve to a failure result. The gate
/// semaphore (default: effectively open) lets a test hold generation
/// calls in flight; `release(n)` lets `n` calls proceed.
pub struct ScriptedAdapters {
    text: Arc<Mutex<VecDeque<GenerationResult>>>,
    image: Arc<Mutex<VecDeque<GenerationResult>>>,
    video_submit: Arc<Mutex<VecDeque<GenerationResult>>>,
    video_polls: Arc<Mutex<VecDeque<VideoJobStatus>>>,
    gate: Arc<tokio::sync::Semaphore>,
}

impl Default for ScriptedAdapters {
    fn default() -> Self {
        Self {
            text: Arc::default(),
            image: Arc::default(),
            video_submit: Arc::default(),
            video_polls: Arc::default(),
            gate: Arc::new(tokio::sync::Semaphore::new(10_000)),
        }
    }
}

impl ScriptedAdapters {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A provider whose generation calls block until [`Self::release`].
    pub fn gated() -> Arc<Self> {
        Arc::new(Self {
            gate: Arc::new(tokio::sync::Semaphore::new(0)),
            ..Self::default()
        })
    }

    pub fn release(&self, calls: usize) {
        self.gate.add_permits(calls);
    }

    pub fn push_text(&self, result: GenerationResult) {
        self.text.lock().unwrap().push_back(result);
    }

    pub fn push_image(&self, result: GenerationResult) {
        self.image.lock().unwrap().push_back(result);
    }

    pub fn push_video_submit(&self, result: GenerationResult) {
        self.video_submit.lock().unwrap().push_back(result);
    }

    pub fn push_poll(&self, status: VideoJobStatus) {
        self.video_polls.lock().unwrap().push_back(status);
    }

    pub fn text_ok(&self, text: &str) {
        self.push_text(GenerationResult::text(
            text.to_string(),
            TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 20,
                total_tokens: 30,
            },
        ));
    }
}

impl AdapterProvider for ScriptedAdapters {
    fn text_adapter(&self, _spec: &AdapterSpec) -> Result<Box<dyn TextAdapter>, CoreError> {
        Ok(Box::new(FakeGenerator {
            results: Arc::clone(&self.text),
            gate: Arc::clone(&self.gate),
        }))
    }

    fn image_adapter(&self, _spec: &AdapterSpec) -> Result<Box<dyn ImageAdapter>, CoreError> {
        Ok(Box::new(FakeGenerator {
            results: Arc::clone(&self.image),
            gate: Arc::clone(&self.gate),
        }))
    }

    fn video_adapter(&self, _spec: &AdapterSpec) -> Result<Box<dyn VideoAdapter>, CoreError> {
        Ok(Box::new(FakeVideo {
            submits: Arc::clone(&self.video_submit),
            polls: Arc::clone(&self.video_polls),
            gate: Arc::clone(&self.gate),
        }))
    }
}

#[derive(Debug)]
struct FakeGenerator {
    results: Arc<Mutex<VecDeque<GenerationResult>>>,
    gate: Arc<tokio::sync::Semaphore>,
}

impl FakeGenerator {
    async fn next(&self) -> GenerationResult {
        match self.gate.acquire().await {
            Ok(permit) => permit.forget(),
            Err(_) => return GenerationResult::failure("gate closed"),
        }
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| GenerationResult::failure("no scripted result"))
    }
}

#[async_trait]
impl TextAdapter for FakeGenerator {
    async fn validate_credentials(&self) -> bool {
        true
    }

    async fn generate_text(
        &self,
        _prompt: &str,
        _system_prompt: Option<&str>,
        _temperature: f64,
        _max_tokens: i32,
    ) -> GenerationResult {
        self.next().await
    }
}

#[async_trait]
impl ImageAdapter for FakeGenerator {
    async fn validate_credentials(&self) -> bool {
        true
    }

    async fn generate_images(&self, _prompt: &str) -> GenerationResult {
        self.next().await
    }
}

struct FakeVideo {
    submits: Arc<Mutex<VecDeque<GenerationResult>>>,
    polls: Arc<Mutex<VecDeque<VideoJobStatus>>>,
    gate: Arc<tokio::sync::Semaphore>,
}

#[async_trait]
impl VideoAdapter for FakeVideo {
    async fn validate_credentials(&self) -> bool {
        true
    }

    async fn start_video(&self, _prompt: &str) -> GenerationResult {
        match self.gate.acquire().await {
            Ok(permit) => permit.forget(),
            Err(_) => return GenerationResult::failure("gate closed"),
        }
        self.submits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| GenerationResult::failure("no scripted submit"))
    }

    async fn poll_status(&self, _handle: &VideoJobHandle) -> VideoJobStatus {
        self.polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(VideoJobStatus::Pending { progress: 0 })
    }
}

// ---------------------------------------------------------------------------
// Recording merger
// ---------------------------------------------------------------------------

/// [`VideoMerger`] that records its calls instead of running ffmpeg.
#[derive(Default)]
pub struct RecordingMerger {
    pub calls: Mutex<Vec<(Vec<String>, String)>>,
    pub fail_with: Mutex<Option<String>>,
}

impl RecordingMerger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl VideoMerger for RecordingMerger {
    async fn merge(&self, segment_paths: &[String], output_path: &str) -> Result<(), MergeError> {
        if let Some(message) = self.fail_with.lock().unwrap().clone() {
            return Err(MergeError::ExecutionFailed {
                exit_code: Some(1),
                stderr: message,
            });
        }
        self.calls
            .lock()
            .unwrap()
            .push((segment_paths.to_vec(), output_path.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Context assembly
// ---------------------------------------------------------------------------

pub fn test_context(
    store: Arc<MemoryStore>,
    adapters: Arc<ScriptedAdapters>,
    merger: Arc<RecordingMerger>,
) -> StageContext {
    StageContext {
        store,
        adapters,
        key: CredentialKey::from_passphrase("test-key"),
        poll: PollConfig {
            interval: std::time::Duration::from_millis(5),
            budget: std::time::Duration::from_millis(50),
        },
        merger,
    }
}
