//! Orchestrator lifecycle: queueing, bounded dispatch, terminal
//! recording.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use common::{test_context, MemoryStore, RecordingMerger, ScriptedAdapters};
use reelforge_adapters::{GenerationResult, VideoJobStatus};
use reelforge_core::task::{TaskStatus, PROGRESS_COMPLETE};
use reelforge_core::types::DbId;
use reelforge_pipeline::{Orchestrator, PipelineError, StageRequest};

async fn wait_for_terminal(store: &MemoryStore, task_id: DbId) -> reelforge_db::models::task::Task {
    for _ in 0..200 {
        let task = store.task(task_id);
        if let Some(status) = TaskStatus::from_id(task.status_id) {
            if status.is_terminal() {
                return task;
            }
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("task {task_id} did not reach a terminal state");
}

#[tokio::test]
async fn script_task_completes_with_full_progress() {
    let store = MemoryStore::new();
    let adapters = ScriptedAdapters::new();
    adapters.text_ok("FADE IN. A quiet street.");
    let project_id = store.add_project(Some("a lost dog finds its way home"));
    let config_id = store.add_config("zhipu", None);

    let orchestrator = Orchestrator::start(
        test_context(Arc::clone(&store), adapters, RecordingMerger::new()),
        2,
    );
    let task_id = orchestrator
        .submit(StageRequest::Script {
            project_id,
            model_config_id: config_id,
        })
        .await
        .unwrap();

    let task = wait_for_terminal(&store, task_id).await;
    assert_eq!(task.status_id, TaskStatus::Completed.id());
    assert_eq!(task.progress, PROGRESS_COMPLETE);
    let result = task.result.unwrap();
    assert_eq!(result["version"], 1);
    assert_eq!(result["usage"]["total_tokens"], 30);
    orchestrator.shutdown().await;
}

#[tokio::test]
async fn queued_task_is_observable_as_pending() {
    let store = MemoryStore::new();
    let adapters = ScriptedAdapters::gated();
    adapters.text_ok("script one");
    adapters.text_ok("script two");
    let project_id = store.add_project(Some("outline"));
    let config_id = store.add_config("zhipu", None);

    // Concurrency 1: the first task occupies the only slot while gated.
    let orchestrator = Orchestrator::start(
        test_context(Arc::clone(&store), Arc::clone(&adapters), RecordingMerger::new()),
        1,
    );
    let first = orchestrator
        .submit(StageRequest::Script {
            project_id,
            model_config_id: config_id,
        })
        .await
        .unwrap();
    let second = orchestrator
        .submit(StageRequest::Script {
            project_id,
            model_config_id: config_id,
        })
        .await
        .unwrap();

    // Both rows exist immediately; the second cannot have started.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(store.task(second).status_id, TaskStatus::Pending.id());
    assert_eq!(store.task(second).progress, 0);

    adapters.release(2);
    let first = wait_for_terminal(&store, first).await;
    let second = wait_for_terminal(&store, second).await;
    assert_eq!(first.status_id, TaskStatus::Completed.id());
    assert_eq!(second.status_id, TaskStatus::Completed.id());
    orchestrator.shutdown().await;
}

#[tokio::test]
async fn submission_after_shutdown_fails_the_task_row() {
    let store = MemoryStore::new();
    let project_id = store.add_project(Some("outline"));
    let config_id = store.add_config("zhipu", None);

    let orchestrator = Orchestrator::start(
        test_context(
            Arc::clone(&store),
            ScriptedAdapters::new(),
            RecordingMerger::new(),
        ),
        1,
    );
    orchestrator.shutdown().await;

    let result = orchestrator
        .submit(StageRequest::Script {
            project_id,
            model_config_id: config_id,
        })
        .await;
    assert_matches!(result, Err(PipelineError::Shutdown));

    // The row is not left sitting in pending.
    let tasks = store.tasks_for_project(project_id);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].status_id, TaskStatus::Failed.id());
    assert!(!tasks[0].error_message.as_deref().unwrap_or("").is_empty());
}

#[tokio::test]
async fn vendor_failure_is_recorded_verbatim() {
    let store = MemoryStore::new();
    let adapters = ScriptedAdapters::new();
    adapters.push_text(GenerationResult::failure("request timed out"));
    let project_id = store.add_project(Some("outline"));
    let config_id = store.add_config("tongyi", None);

    let orchestrator = Orchestrator::start(
        test_context(Arc::clone(&store), adapters, RecordingMerger::new()),
        2,
    );
    let task_id = orchestrator
        .submit(StageRequest::Script {
            project_id,
            model_config_id: config_id,
        })
        .await
        .unwrap();

    let task = wait_for_terminal(&store, task_id).await;
    assert_eq!(task.status_id, TaskStatus::Failed.id());
    let error = task.error_message.unwrap();
    assert!(error.contains("request timed out"), "got: {error}");
    orchestrator.shutdown().await;
}

#[tokio::test]
async fn unknown_vendor_tag_fails_the_task() {
    let store = MemoryStore::new();
    let adapters = ScriptedAdapters::new();
    let project_id = store.add_project(Some("outline"));
    let config_id = store.add_config("mystery-llm", None);

    let orchestrator = Orchestrator::start(
        test_context(Arc::clone(&store), adapters, RecordingMerger::new()),
        2,
    );
    let task_id = orchestrator
        .submit(StageRequest::Script {
            project_id,
            model_config_id: config_id,
        })
        .await
        .unwrap();

    let task = wait_for_terminal(&store, task_id).await;
    assert_eq!(task.status_id, TaskStatus::Failed.id());
    assert!(!task.error_message.unwrap().is_empty());
    orchestrator.shutdown().await;
}

#[tokio::test]
async fn terminal_tasks_admit_no_further_transitions() {
    let store = MemoryStore::new();
    let adapters = ScriptedAdapters::new();
    adapters.text_ok("done");
    let project_id = store.add_project(Some("outline"));
    let config_id = store.add_config("zhipu", None);

    let orchestrator = Orchestrator::start(
        test_context(Arc::clone(&store), adapters, RecordingMerger::new()),
        2,
    );
    let task_id = orchestrator
        .submit(StageRequest::Script {
            project_id,
            model_config_id: config_id,
        })
        .await
        .unwrap();
    wait_for_terminal(&store, task_id).await;

    use reelforge_pipeline::TaskStore;
    assert!(!store.mark_task_processing(task_id).await.unwrap());
    assert!(!store.update_task_progress(task_id, 50).await.unwrap());
    assert!(!store.fail_task(task_id, "late failure").await.unwrap());
    let task = store.task(task_id);
    assert_eq!(task.status_id, TaskStatus::Completed.id());
    assert_eq!(task.progress, PROGRESS_COMPLETE);
    orchestrator.shutdown().await;
}

#[tokio::test]
async fn video_segment_task_records_timed_out_job() {
    let store = MemoryStore::new();
    let adapters = ScriptedAdapters::new();
    adapters.push_video_submit(GenerationResult::video_job("job-77".to_string()));
    // No terminal poll status scripted: every probe reports pending, so
    // the 50ms budget runs out.
    let project_id = store.add_project(Some("outline"));
    let config_id = store.add_config("keling", Some("https://video.example"));
    let script_id = store.add_script(project_id, "the script");
    let shot_id = store.add_shot(script_id, 1, "wide shot of the street");

    let orchestrator = Orchestrator::start(
        test_context(Arc::clone(&store), adapters, RecordingMerger::new()),
        2,
    );
    let task_id = orchestrator
        .submit(StageRequest::VideoSegment {
            project_id,
            shot_id,
            model_config_id: config_id,
        })
        .await
        .unwrap();

    let task = wait_for_terminal(&store, task_id).await;
    assert_eq!(task.status_id, TaskStatus::Failed.id());
    assert_eq!(task.error_message.as_deref(), Some("video generation timed out"));

    let segments = store.segments(project_id);
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].status_id, TaskStatus::Failed.id());
    assert_eq!(segments[0].vendor_job_id.as_deref(), Some("job-77"));
    orchestrator.shutdown().await;
}

#[tokio::test]
async fn video_segment_task_stores_finished_clip() {
    let store = MemoryStore::new();
    let adapters = ScriptedAdapters::new();
    adapters.push_video_submit(GenerationResult::video_job("job-1".to_string()));
    adapters.push_poll(VideoJobStatus::Pending { progress: 40 });
    adapters.push_poll(VideoJobStatus::Completed {
        video_url: "https://cdn.example/seg-1.mp4".to_string(),
    });
    let project_id = store.add_project(Some("outline"));
    let config_id = store.add_config("keling", Some("https://video.example"));
    let script_id = store.add_script(project_id, "the script");
    let shot_id = store.add_shot(script_id, 1, "close-up");

    let orchestrator = Orchestrator::start(
        test_context(Arc::clone(&store), adapters, RecordingMerger::new()),
        2,
    );
    let task_id = orchestrator
        .submit(StageRequest::VideoSegment {
            project_id,
            shot_id,
            model_config_id: config_id,
        })
        .await
        .unwrap();

    let task = wait_for_terminal(&store, task_id).await;
    assert_eq!(task.status_id, TaskStatus::Completed.id());

    let segments = store.segments(project_id);
    assert_eq!(segments[0].status_id, TaskStatus::Completed.id());
    assert_eq!(
        segments[0].video_url.as_deref(),
        Some("https://cdn.example/seg-1.mp4")
    );
    orchestrator.shutdown().await;
}
