use std::sync::Arc;

use lubankit_core::{
    AppEvent, ClippedShape, EventBus, EventBusConfig, EventCategory, EventFilter, HeadType,
    ModelId, StepStage, TaskData, TaskEvent, TaskId, TaskResult, TaskStatus,
};
use lubankit_editor::{Editor, ModelSpec, ProgressStatus, TaskDisposition, UploadedImage};
use lubankit_editor::scene::ToolPathStatus;
use lubankit_settings::Config;

const HEAD: HeadType = HeadType::Laser;

fn editor_with_bus() -> (Editor, Arc<EventBus>) {
    let bus = Arc::new(EventBus::with_config(EventBusConfig {
        enable_history: true,
        ..EventBusConfig::default()
    }));
    (Editor::with_event_bus(Config::default(), bus.clone()), bus)
}

fn requested(bus: &EventBus) -> Vec<lubankit_core::TaskRequest> {
    bus.history_matching(&EventFilter::Categories(vec![EventCategory::Task]))
        .into_iter()
        .filter_map(|e| match e {
            AppEvent::Task(TaskEvent::Requested(request)) => Some(request),
            _ => None,
        })
        .collect()
}

fn result(task_id: TaskId, task_status: TaskStatus, data: TaskData) -> TaskResult {
    TaskResult {
        head_type: HEAD,
        task_id,
        task_status,
        data,
        progress: 0.0,
    }
}

#[test]
fn test_upload_creates_model() {
    let (mut editor, _) = editor_with_bus();
    editor.upload_image(HEAD).unwrap();
    assert_eq!(editor.stage(HEAD), StepStage::UploadingImage);
    let p = editor.on_upload_progress(HEAD, 0.5);
    assert!((p - 0.25).abs() < 1e-9);

    let image = UploadedImage {
        original_name: "cat.png".to_string(),
        upload_name: "abc123.png".to_string(),
        width: 1600.0,
        height: 800.0,
    };
    let id = editor.on_upload_finished(HEAD, Ok(image)).unwrap().unwrap();
    assert_eq!(editor.stage(HEAD), StepStage::UploadImageSuccess);
    assert_eq!(editor.progress(HEAD).progress(), 1.0);

    let model = editor.scene(HEAD).models.get(id).unwrap();
    assert!(model.is_raster());
    // Fitted into the 400 x 400 work area.
    assert_eq!(model.transformation.width, 400.0);
    assert_eq!(model.transformation.height, 200.0);
    assert_eq!(
        editor.scene(HEAD).svg.element(id).unwrap().href.as_deref(),
        Some("abc123.png")
    );
    assert!(editor.can_undo(HEAD));
}

#[test]
fn test_upload_failure_records_nothing() {
    let (mut editor, _) = editor_with_bus();
    editor.upload_image(HEAD).unwrap();
    let id = editor
        .on_upload_finished(HEAD, Err("connection reset".to_string()))
        .unwrap();
    assert_eq!(id, None);
    assert_eq!(editor.stage(HEAD), StepStage::UploadImageFailed);
    assert_eq!(editor.progress(HEAD).state(), ProgressStatus::Failed);
    assert!(!editor.can_undo(HEAD));

    // A late result after the session ended is ignored.
    assert_eq!(editor.on_upload_finished(HEAD, Err("again".into())).unwrap(), None);
}

#[test]
fn test_process_image_swaps_href() {
    let (mut editor, bus) = editor_with_bus();
    let id = editor
        .add_model(HEAD, ModelSpec::raster("img", "original.png", 50.0, 50.0))
        .unwrap();
    let task_id = editor.process_image(HEAD, id).unwrap();
    assert_eq!(requested(&bus).len(), 1);

    let mut progress = result(task_id, TaskStatus::Progress, TaskData::None);
    progress.progress = 0.5;
    assert_eq!(editor.on_task_result(progress), TaskDisposition::Progressed);
    assert!((editor.progress(HEAD).progress() - 0.5).abs() < 1e-9);

    let done = result(
        task_id,
        TaskStatus::Complete,
        TaskData::ProcessedImage {
            filename: "processed.png".to_string(),
            width: 50.0,
            height: 50.0,
        },
    );
    assert_eq!(editor.on_task_result(done.clone()), TaskDisposition::Applied);
    assert_eq!(editor.stage(HEAD), StepStage::ProcessImageSuccess);
    assert_eq!(
        editor.scene(HEAD).models.get(id).unwrap().processed_image.as_deref(),
        Some("processed.png")
    );

    // Replaying the completion is a no-op.
    assert_eq!(editor.on_task_result(done), TaskDisposition::Ignored);

    editor.undo(HEAD).unwrap();
    assert_eq!(
        editor.scene(HEAD).svg.element(id).unwrap().href.as_deref(),
        Some("original.png")
    );
}

#[test]
fn test_failed_task_sets_failed_stage() {
    let (mut editor, _) = editor_with_bus();
    let id = editor
        .add_model(HEAD, ModelSpec::raster("img", "original.png", 50.0, 50.0))
        .unwrap();
    let depth = editor.history(HEAD).undo_depth();
    let task_id = editor.process_image(HEAD, id).unwrap();

    assert_eq!(
        editor.on_task_result(result(task_id, TaskStatus::Failed, TaskData::None)),
        TaskDisposition::Failed
    );
    assert_eq!(editor.stage(HEAD), StepStage::ProcessImageFailed);
    assert_eq!(editor.progress(HEAD).state(), ProgressStatus::Failed);
    assert_eq!(editor.history(HEAD).undo_depth(), depth);
}

#[test]
fn test_foreign_and_unknown_results_are_ignored() {
    let (mut editor, _) = editor_with_bus();
    let id = editor
        .add_model(HEAD, ModelSpec::raster("img", "a.png", 5.0, 5.0))
        .unwrap();
    let task_id = editor.process_image(HEAD, id).unwrap();

    let mut foreign = result(task_id, TaskStatus::Failed, TaskData::None);
    foreign.head_type = HeadType::Cnc;
    assert_eq!(editor.on_task_result(foreign), TaskDisposition::Ignored);

    let unknown = result(TaskId::new(), TaskStatus::Failed, TaskData::None);
    assert_eq!(editor.on_task_result(unknown), TaskDisposition::Ignored);

    assert_eq!(editor.on_task_message("{not json"), TaskDisposition::Ignored);
    assert_eq!(
        editor.on_task_message(r#"{"headType":"printer","taskId":"x","taskStatus":"failed"}"#),
        TaskDisposition::Ignored
    );
    assert!(editor.pending_task(task_id).is_some());
    assert_eq!(editor.stage(HEAD), StepStage::ProcessingImage);
}

#[test]
fn test_task_message_json() {
    let (mut editor, _) = editor_with_bus();
    let id = editor
        .add_model(HEAD, ModelSpec::raster("img", "a.png", 5.0, 5.0))
        .unwrap();
    let task_id = editor.process_image(HEAD, id).unwrap();
    let message = serde_json::json!({
        "headType": "laser",
        "taskId": task_id,
        "taskStatus": "complete",
        "data": { "type": "processedImage", "filename": "b.png", "width": 5.0, "height": 5.0 }
    })
    .to_string();
    assert_eq!(editor.on_task_message(&message), TaskDisposition::Applied);
    assert_eq!(editor.pending_task_count(), 0);
}

#[test]
fn test_tool_path_generation_and_preview() {
    let (mut editor, bus) = editor_with_bus();
    let a = editor.add_model(HEAD, ModelSpec::vector("a", 5.0, 5.0)).unwrap();
    let b = editor.add_model(HEAD, ModelSpec::vector("b", 5.0, 5.0)).unwrap();
    let tp_a = editor.add_tool_path(HEAD, "a", &[a]).unwrap();
    let tp_b = editor.add_tool_path(HEAD, "b", &[b]).unwrap();

    let tasks = editor.generate_tool_paths(HEAD).unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(requested(&bus).len(), 2);
    assert_eq!(editor.stage(HEAD), StepStage::GeneratingToolPath);

    let first = result(tasks[0], TaskStatus::Complete, TaskData::ToolPath { tool_path_id: tp_a });
    assert_eq!(editor.on_task_result(first), TaskDisposition::Applied);
    assert!((editor.progress(HEAD).progress() - 0.4).abs() < 1e-9);
    assert_eq!(editor.stage(HEAD), StepStage::GeneratingToolPath);

    let second = result(tasks[1], TaskStatus::Complete, TaskData::ToolPath { tool_path_id: tp_b });
    assert_eq!(editor.on_task_result(second), TaskDisposition::Applied);
    assert_eq!(editor.stage(HEAD), StepStage::PreviewingToolPath);
    assert_eq!(
        editor.scene(HEAD).tool_paths.get(tp_b).unwrap().status,
        ToolPathStatus::Ready
    );

    assert!(editor.on_tool_path_previewed(HEAD));
    assert_eq!(editor.stage(HEAD), StepStage::PreviewToolPathSuccess);
    assert_eq!(editor.progress(HEAD).progress(), 1.0);
    assert!(!editor.on_tool_path_previewed(HEAD));
}

#[test]
fn test_tool_path_failure_drops_siblings() {
    let (mut editor, _) = editor_with_bus();
    let a = editor.add_model(HEAD, ModelSpec::vector("a", 5.0, 5.0)).unwrap();
    let tp_a = editor.add_tool_path(HEAD, "a", &[a]).unwrap();
    editor.add_tool_path(HEAD, "again", &[a]).unwrap();
    let tasks = editor.generate_tool_paths(HEAD).unwrap();

    assert_eq!(
        editor.on_task_result(result(tasks[0], TaskStatus::Failed, TaskData::None)),
        TaskDisposition::Failed
    );
    assert_eq!(editor.stage(HEAD), StepStage::GenerateToolPathFailed);
    assert_eq!(
        editor.scene(HEAD).tool_paths.get(tp_a).unwrap().status,
        ToolPathStatus::Failed
    );
    assert_eq!(editor.pending_task_count(), 0);
}

#[test]
fn test_svg_clipping_is_one_step() {
    let (mut editor, _) = editor_with_bus();
    let a = editor.add_model(HEAD, ModelSpec::vector("a", 10.0, 10.0)).unwrap();
    let b = editor.add_model(HEAD, ModelSpec::vector("b", 10.0, 10.0)).unwrap();
    editor.select_models(HEAD, &[a, b]).unwrap();
    let depth = editor.history(HEAD).undo_depth();

    let task_id = editor
        .svg_clipping(HEAD, serde_json::json!({ "type": "union" }), false)
        .unwrap();
    let shapes = vec![ClippedShape {
        path: "M 395 395 L 405 395 L 405 405 Z".to_string(),
        position_x: 0.0,
        position_y: 0.0,
        width: 10.0,
        height: 10.0,
    }];
    assert_eq!(
        editor.on_task_result(result(task_id, TaskStatus::Complete, TaskData::Clipping { shapes })),
        TaskDisposition::Applied
    );
    let scene = editor.scene(HEAD);
    assert_eq!(scene.models.len(), 1);
    assert!(!scene.models.contains(a) && !scene.models.contains(b));
    assert_eq!(editor.history(HEAD).undo_depth(), depth + 1);
    assert_eq!(editor.stage(HEAD), StepStage::SvgClippingSuccess);

    editor.undo(HEAD).unwrap();
    let ids: Vec<ModelId> = editor.scene(HEAD).models.models().map(|m| m.model_id).collect();
    assert_eq!(ids, vec![a, b]);
}

#[test]
fn test_svg_clipping_needs_selection() {
    let (mut editor, _) = editor_with_bus();
    assert!(editor
        .svg_clipping(HEAD, serde_json::Value::Null, true)
        .is_err());
}

#[test]
fn test_resize_waits_for_raster_images() {
    let (mut editor, _) = editor_with_bus();
    let vector = editor.add_model(HEAD, ModelSpec::vector("v", 10.0, 10.0)).unwrap();
    let raster = editor
        .add_model(HEAD, ModelSpec::raster("r", "r.png", 10.0, 10.0))
        .unwrap();
    let broken = editor
        .add_model(HEAD, ModelSpec::raster("x", "x.png", 10.0, 10.0))
        .unwrap();
    editor.select_models(HEAD, &[vector, raster, broken]).unwrap();
    let depth = editor.history(HEAD).undo_depth();

    assert_eq!(editor.resize_selected_models(HEAD, 30.0, 20.0).unwrap(), 3);
    // Vector models resize at once, nothing recorded yet.
    assert_eq!(
        editor.scene(HEAD).models.get(vector).unwrap().transformation.width,
        30.0
    );
    assert_eq!(editor.history(HEAD).undo_depth(), depth);
    assert!(editor.resize_selected_models(HEAD, 40.0, 40.0).is_err());

    assert!(editor.on_image_loaded(HEAD, raster, Ok(())));
    assert!(!editor.on_image_loaded(HEAD, raster, Ok(())));
    assert_eq!(editor.history(HEAD).undo_depth(), depth);

    assert!(editor.on_image_loaded(HEAD, broken, Err("decode error".to_string())));
    assert_eq!(editor.history(HEAD).undo_depth(), depth + 1);
    assert_eq!(editor.stage(HEAD), StepStage::ResizeImageFailed);
    let scene = editor.scene(HEAD);
    assert_eq!(scene.models.get(raster).unwrap().transformation.height, 20.0);
    assert_eq!(scene.models.get(broken).unwrap().transformation.width, 10.0);

    editor.undo(HEAD).unwrap();
    let scene = editor.scene(HEAD);
    assert_eq!(scene.models.get(vector).unwrap().transformation.width, 10.0);
    assert_eq!(scene.models.get(raster).unwrap().transformation.width, 10.0);
}

#[test]
fn test_resize_of_vectors_completes_immediately() {
    let (mut editor, _) = editor_with_bus();
    let id = editor.add_model(HEAD, ModelSpec::vector("v", 10.0, 10.0)).unwrap();
    editor.select_models(HEAD, &[id]).unwrap();
    editor.resize_selected_models(HEAD, 12.0, 12.0).unwrap();
    assert_eq!(editor.stage(HEAD), StepStage::ResizeImageSuccess);
    assert_eq!(editor.history(HEAD).undo_description(), Some("Resize"));
}

#[test]
fn test_upload_announces_processing_stage() {
    let (mut editor, bus) = editor_with_bus();
    editor.upload_image(HEAD).unwrap();
    let image = UploadedImage {
        original_name: "cat.png".to_string(),
        upload_name: "abc123.png".to_string(),
        width: 100.0,
        height: 100.0,
    };
    editor.on_upload_finished(HEAD, Ok(image)).unwrap().unwrap();

    let stages: Vec<StepStage> = bus
        .history_matching(&EventFilter::Categories(vec![EventCategory::Progress]))
        .into_iter()
        .filter_map(|e| match e {
            AppEvent::Progress(progress) => Some(progress.stage),
            _ => None,
        })
        .collect();
    let processing = stages
        .iter()
        .position(|s| *s == StepStage::ProcessingImage)
        .unwrap();
    let success = stages
        .iter()
        .position(|s| *s == StepStage::UploadImageSuccess)
        .unwrap();
    assert!(processing < success);
}

#[test]
fn test_failed_clipping_restores_originals() {
    let (mut editor, _) = editor_with_bus();
    let a = editor.add_model(HEAD, ModelSpec::vector("a", 10.0, 10.0)).unwrap();
    let b = editor.add_model(HEAD, ModelSpec::vector("b", 10.0, 10.0)).unwrap();
    editor.select_models(HEAD, &[a, b]).unwrap();
    let depth = editor.history(HEAD).undo_depth();

    let task_id = editor
        .svg_clipping(HEAD, serde_json::json!({ "type": "union" }), false)
        .unwrap();
    // `b` leaves the canvas while the worker runs.
    editor.scene_mut(HEAD).detach_model(b).unwrap();

    let shapes = vec![ClippedShape {
        path: "M 395 395 L 405 395 L 405 405 Z".to_string(),
        position_x: 0.0,
        position_y: 0.0,
        width: 10.0,
        height: 10.0,
    }];
    assert_eq!(
        editor.on_task_result(result(task_id, TaskStatus::Complete, TaskData::Clipping { shapes })),
        TaskDisposition::Failed
    );
    let ids: Vec<ModelId> = editor.scene(HEAD).models.models().map(|m| m.model_id).collect();
    assert_eq!(ids, vec![a]);
    assert!(editor.scene(HEAD).svg.contains(a));
    assert_eq!(editor.scene(HEAD).svg.elements().len(), 1);
    assert_eq!(editor.history(HEAD).undo_depth(), depth);
}
