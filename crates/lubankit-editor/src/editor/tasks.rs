//! Asynchronous flows
//!
//! Requests go out on the event bus as [`TaskEvent::Requested`]; workers
//! answer through [`Editor::on_task_result`] (or the raw JSON entry point
//! [`Editor::on_task_message`]). A result is only applied when it matches a
//! pending task of the same head type. Nothing is recorded in history until
//! the work actually completed.

use std::collections::HashMap;

use lubankit_core::{
    AppEvent, ClippedShape, Error, HeadType, ModelId, ProcessStage, SceneError, StepStage,
    TaskData, TaskError, TaskEvent, TaskId, TaskKind, TaskRequest, TaskResult, TaskStatus, ToolPathId,
};

use super::Editor;
use crate::barrier::CompletionBarrier;
use crate::compound::CompoundOperation;
use crate::operations::{
    AddOperation2D, DeleteOperation2D, Operation, ScaleOperation2D, UpdateHrefOperation2D,
};
use crate::progress::ProgressStatus;
use crate::scene::{ModelSpec, Scene, ToolPathStatus, Transformation};

/// Image stored by the upload endpoint.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UploadedImage {
    pub original_name: String,
    pub upload_name: String,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PendingTaskKind {
    ProcessImage {
        model_id: ModelId,
    },
    GenerateToolPath {
        tool_path_id: ToolPathId,
    },
    SvgClipping {
        model_ids: Vec<ModelId>,
        keep_original: bool,
    },
}

impl PendingTaskKind {
    fn stage(&self) -> StepStage {
        match self {
            PendingTaskKind::ProcessImage { .. } => StepStage::ProcessingImage,
            PendingTaskKind::GenerateToolPath { .. } => StepStage::GeneratingToolPath,
            PendingTaskKind::SvgClipping { .. } => StepStage::SvgClipping,
        }
    }
}

/// A request waiting for its worker result.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTask {
    pub head_type: HeadType,
    pub kind: PendingTaskKind,
}

/// What happened to an inbound worker result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskDisposition {
    /// Completed and applied to the scene
    Applied,
    /// Progress update recorded
    Progressed,
    /// The task failed, or its result could not be applied
    Failed,
    /// Stale, foreign or undecodable; nothing changed
    Ignored,
}

/// Resize waiting for raster images to reload.
#[derive(Debug)]
pub(super) struct PendingResize {
    barrier: CompletionBarrier<ModelId, ScaleOperation2D, String>,
    /// Scales not yet applied, keyed by model
    waiting: HashMap<ModelId, ScaleOperation2D>,
}

impl Editor {
    pub fn pending_task(&self, task_id: TaskId) -> Option<&PendingTask> {
        self.pending_tasks.get(&task_id)
    }

    pub fn pending_task_count(&self) -> usize {
        self.pending_tasks.len()
    }

    fn request_task(
        &mut self,
        head_type: HeadType,
        kind: PendingTaskKind,
        model_ids: Vec<ModelId>,
        params: serde_json::Value,
    ) -> TaskId {
        let task_id = TaskId::new();
        let (task_kind, tool_path_id) = match &kind {
            PendingTaskKind::ProcessImage { .. } => (TaskKind::ProcessImage, None),
            PendingTaskKind::GenerateToolPath { tool_path_id } => {
                (TaskKind::GenerateToolPath, Some(*tool_path_id))
            }
            PendingTaskKind::SvgClipping { .. } => (TaskKind::SvgClipping, None),
        };
        self.pending_tasks
            .insert(task_id, PendingTask { head_type, kind });
        self.emit(AppEvent::Task(TaskEvent::Requested(TaskRequest {
            head_type,
            task_id,
            kind: task_kind,
            model_ids,
            tool_path_id,
            params,
        })));
        task_id
    }

    fn finish_stage(&mut self, head_type: HeadType, success: bool, stage: StepStage) {
        let surface = self.surface_mut(head_type);
        surface.progress.finish_progress(success);
        self.set_stage(head_type, stage);
    }

    fn is_uploading(&self, head_type: HeadType) -> bool {
        let progress = self.progress(head_type);
        progress.process_stage() == ProcessStage::UploadImage
            && progress.state() == ProgressStatus::Running
    }

    /// Begin an image upload session.
    pub fn upload_image(&mut self, head_type: HeadType) -> lubankit_core::Result<()> {
        self.surface_mut(head_type)
            .progress
            .start_progress(ProcessStage::UploadImage, &[1])?;
        self.set_stage(head_type, StepStage::UploadingImage);
        Ok(())
    }

    /// Transfer progress of the running upload. Returns the session progress.
    pub fn on_upload_progress(&mut self, head_type: HeadType, fraction: f64) -> f64 {
        if !self.is_uploading(head_type) {
            return self.progress(head_type).progress();
        }
        let progress = self
            .surface_mut(head_type)
            .progress
            .update_progress(StepStage::UploadingImage, fraction);
        self.publish_progress(head_type);
        progress
    }

    /// Upload finished: on success the image becomes a raster model fitted
    /// to the work area.
    pub fn on_upload_finished(
        &mut self,
        head_type: HeadType,
        result: Result<UploadedImage, String>,
    ) -> lubankit_core::Result<Option<ModelId>> {
        if !self.is_uploading(head_type) {
            tracing::debug!("{}: upload result without an upload session", head_type);
            return Ok(None);
        }
        let image = match result {
            Ok(image) => image,
            Err(reason) => {
                tracing::warn!("{}: upload failed: {}", head_type, reason);
                self.finish_stage(head_type, false, StepStage::UploadImageFailed);
                return Ok(None);
            }
        };

        self.surface_mut(head_type)
            .progress
            .update_progress(StepStage::UploadingImage, 1.0);
        self.set_stage(head_type, StepStage::ProcessingImage);

        let surface = self.surface_mut(head_type);
        let machine = surface.scene.svg.machine();
        let fit = if image.width > 0.0 && image.height > 0.0 {
            (machine.x / image.width).min(machine.y / image.height).min(1.0)
        } else {
            1.0
        };
        let mut spec = ModelSpec::raster(
            image.original_name.clone(),
            image.upload_name.clone(),
            image.width * fit,
            image.height * fit,
        );
        spec.config
            .insert("uploadName".to_string(), serde_json::Value::from(image.upload_name));

        let model_id = match surface.scene.insert_model(spec) {
            Ok(id) => id,
            Err(err) => {
                self.finish_stage(head_type, false, StepStage::UploadImageFailed);
                return Err(err.into());
            }
        };
        surface.scene.clear_selection();
        surface
            .progress
            .update_progress(StepStage::ProcessingImage, 1.0);
        self.commit(
            head_type,
            CompoundOperation::with_operation("Add Model", AddOperation2D::new(model_id)),
        );
        self.finish_stage(head_type, true, StepStage::UploadImageSuccess);
        Ok(Some(model_id))
    }

    /// Ask a worker to re-process an image model with its current config.
    pub fn process_image(&mut self, head_type: HeadType, model_id: ModelId) -> lubankit_core::Result<TaskId> {
        let surface = self.surface_mut(head_type);
        let model = surface.scene.models.get(model_id)?;
        let params = serde_json::Value::Object(model.config.clone().into_iter().collect());
        surface
            .progress
            .start_progress(ProcessStage::ProcessImage, &[1])?;
        self.set_stage(head_type, StepStage::ProcessingImage);
        Ok(self.request_task(
            head_type,
            PendingTaskKind::ProcessImage { model_id },
            vec![model_id],
            params,
        ))
    }

    /// Regenerate every tool path of a surface, one task each.
    pub fn generate_tool_paths(&mut self, head_type: HeadType) -> lubankit_core::Result<Vec<TaskId>> {
        let surface = self.surface_mut(head_type);
        let targets: Vec<(ToolPathId, Vec<ModelId>)> = surface
            .scene
            .tool_paths
            .get_tool_paths()
            .iter()
            .map(|t| (t.id, t.model_ids.clone()))
            .collect();
        if targets.is_empty() {
            return Ok(Vec::new());
        }
        let repeats = u32::try_from(targets.len()).unwrap_or(u32::MAX);
        surface
            .progress
            .start_progress(ProcessStage::GenerateToolPathAndPreview, &[repeats, 1])?;
        for (id, _) in &targets {
            surface.scene.tool_paths.get_mut(*id)?.status = ToolPathStatus::Running;
        }

        // A new generation supersedes results still in flight.
        self.pending_tasks.retain(|_, pending| {
            pending.head_type != head_type
                || !matches!(pending.kind, PendingTaskKind::GenerateToolPath { .. })
        });
        self.set_stage(head_type, StepStage::GeneratingToolPath);

        let task_ids = targets
            .into_iter()
            .map(|(tool_path_id, model_ids)| {
                self.request_task(
                    head_type,
                    PendingTaskKind::GenerateToolPath { tool_path_id },
                    model_ids,
                    serde_json::Value::Null,
                )
            })
            .collect();
        Ok(task_ids)
    }

    /// The canvas finished rendering the generated tool paths.
    pub fn on_tool_path_previewed(&mut self, head_type: HeadType) -> bool {
        if self.stage(head_type) != StepStage::PreviewingToolPath {
            return false;
        }
        self.surface_mut(head_type)
            .progress
            .update_progress(StepStage::PreviewingToolPath, 1.0);
        self.finish_stage(head_type, true, StepStage::PreviewToolPathSuccess);
        true
    }

    /// Clip the selected models. The worker returns the resulting shapes.
    pub fn svg_clipping(
        &mut self,
        head_type: HeadType,
        params: serde_json::Value,
        keep_original: bool,
    ) -> lubankit_core::Result<TaskId> {
        let surface = self.surface_mut(head_type);
        let model_ids = surface.scene.models.selected_ids().to_vec();
        if model_ids.is_empty() {
            return Err(Error::other("SVG clipping needs a selection"));
        }
        surface
            .progress
            .start_progress(ProcessStage::SvgClipping, &[1])?;
        self.set_stage(head_type, StepStage::SvgClipping);
        Ok(self.request_task(
            head_type,
            PendingTaskKind::SvgClipping {
                model_ids: model_ids.clone(),
                keep_original,
            },
            model_ids,
            params,
        ))
    }

    /// Resize the selection. Vector models change at once; raster models
    /// apply their new size when [`Editor::on_image_loaded`] reports the
    /// reloaded image. The whole resize is recorded as one step once every
    /// model reported.
    pub fn resize_selected_models(&mut self, head_type: HeadType, width: f64, height: f64) -> lubankit_core::Result<usize> {
        if !(width > 0.0 && height > 0.0) {
            return Err(Error::other(format!("Invalid size {}x{}", width, height)));
        }
        if self.pending_resizes.contains_key(&head_type) {
            return Err(Error::other("A resize is already in progress"));
        }

        let surface = self.surface_mut(head_type);
        let targets: Vec<(ModelId, bool, Transformation)> = surface
            .scene
            .models
            .selected_models()
            .into_iter()
            .map(|m| (m.model_id, m.is_raster(), m.transformation))
            .filter(|(_, _, t)| t.width != width || t.height != height)
            .collect();
        if targets.is_empty() {
            return Ok(0);
        }
        let repeats = u32::try_from(targets.len()).unwrap_or(u32::MAX);
        surface
            .progress
            .start_progress(ProcessStage::ResizeImage, &[repeats])?;
        surface.stage = StepStage::ResizingImage;

        let mut barrier = CompletionBarrier::new(targets.iter().map(|(id, _, _)| *id));
        let mut waiting = HashMap::new();
        for (model_id, is_raster, from) in &targets {
            let to = Transformation {
                width,
                height,
                ..*from
            };
            let op = ScaleOperation2D::new(*model_id, *from, to);
            if *is_raster {
                waiting.insert(*model_id, op);
                continue;
            }
            let mut op = op;
            let result = op.redo(&mut surface.scene).map(|_| op).map_err(|e| e.to_string());
            barrier.complete(model_id, result);
            surface
                .progress
                .update_progress(StepStage::ResizingImage, 1.0);
            surface.progress.start_next_step();
        }
        self.publish_progress(head_type);
        self.pending_resizes
            .insert(head_type, PendingResize { barrier, waiting });
        self.try_finish_resize(head_type);
        Ok(targets.len())
    }

    /// A raster model finished reloading (or failed to) during a resize.
    pub fn on_image_loaded(&mut self, head_type: HeadType, model_id: ModelId, result: Result<(), String>) -> bool {
        let Some(mut pending) = self.pending_resizes.remove(&head_type) else {
            return false;
        };
        let Some(mut op) = pending.waiting.remove(&model_id) else {
            self.pending_resizes.insert(head_type, pending);
            return false;
        };

        let surface = self.surface_mut(head_type);
        let outcome = match result {
            Ok(()) => op
                .redo(&mut surface.scene)
                .map(|_| op)
                .map_err(|e| e.to_string()),
            Err(reason) => Err(reason),
        };
        pending.barrier.complete(&model_id, outcome);
        surface
            .progress
            .update_progress(StepStage::ResizingImage, 1.0);
        surface.progress.start_next_step();
        self.publish_progress(head_type);

        self.pending_resizes.insert(head_type, pending);
        self.try_finish_resize(head_type);
        true
    }

    fn try_finish_resize(&mut self, head_type: HeadType) {
        let Some(PendingResize { barrier, waiting }) = self.pending_resizes.remove(&head_type) else {
            return;
        };
        let outcome = match barrier.try_finish() {
            Ok(outcome) => outcome,
            Err(barrier) => {
                self.pending_resizes
                    .insert(head_type, PendingResize { barrier, waiting });
                return;
            }
        };

        for (model_id, reason) in &outcome.failures {
            tracing::warn!("{}: resize of {} failed: {}", head_type, model_id, reason);
        }
        let mut compound = CompoundOperation::new("Resize");
        for (_, op) in outcome.successes {
            compound.push(op);
        }
        self.commit(head_type, compound);

        let success = outcome.failures.is_empty();
        let stage = if success {
            StepStage::ResizeImageSuccess
        } else {
            StepStage::ResizeImageFailed
        };
        self.finish_stage(head_type, success, stage);
    }

    /// Decode and dispatch a raw worker message. Malformed messages are ignored.
    pub fn on_task_message(&mut self, message: &str) -> TaskDisposition {
        match serde_json::from_str::<TaskResult>(message) {
            Ok(result) => self.on_task_result(result),
            Err(err) => {
                let err = TaskError::Malformed {
                    reason: err.to_string(),
                };
                tracing::debug!("Ignoring worker message: {}", err);
                TaskDisposition::Ignored
            }
        }
    }

    /// Dispatch a worker result to the task it belongs to.
    pub fn on_task_result(&mut self, result: TaskResult) -> TaskDisposition {
        let Some(pending) = self.pending_tasks.get(&result.task_id) else {
            tracing::debug!("Ignoring result of unknown {}", result.task_id);
            return TaskDisposition::Ignored;
        };
        if pending.head_type != result.head_type {
            tracing::debug!(
                "Ignoring {} result for {}, task belongs to {}",
                result.task_id,
                result.head_type,
                pending.head_type
            );
            return TaskDisposition::Ignored;
        }
        let head_type = pending.head_type;
        let stage = pending.kind.stage();

        match result.task_status {
            TaskStatus::Progress => {
                self.surface_mut(head_type)
                    .progress
                    .update_progress(stage, result.progress);
                self.publish_progress(head_type);
                TaskDisposition::Progressed
            }
            TaskStatus::Failed => {
                if let Some(pending) = self.pending_tasks.remove(&result.task_id) {
                    self.fail_task(pending);
                }
                TaskDisposition::Failed
            }
            TaskStatus::Complete => {
                let Some(pending) = self.pending_tasks.remove(&result.task_id) else {
                    return TaskDisposition::Ignored;
                };
                match self.apply_task_result(&pending, result.data) {
                    Ok(()) => TaskDisposition::Applied,
                    Err(err) => {
                        tracing::warn!("{}: could not apply {} result: {}", head_type, result.task_id, err);
                        self.fail_task(pending);
                        TaskDisposition::Failed
                    }
                }
            }
        }
    }

    fn fail_task(&mut self, pending: PendingTask) {
        let head_type = pending.head_type;
        if let PendingTaskKind::GenerateToolPath { tool_path_id } = pending.kind {
            if let Ok(tool_path) = self.surface_mut(head_type).scene.tool_paths.get_mut(tool_path_id) {
                tool_path.status = ToolPathStatus::Failed;
            }
            self.pending_tasks.retain(|_, other| {
                other.head_type != head_type
                    || !matches!(other.kind, PendingTaskKind::GenerateToolPath { .. })
            });
        }
        self.finish_stage(head_type, false, pending.kind.stage().failed());
    }

    fn apply_task_result(&mut self, pending: &PendingTask, data: TaskData) -> lubankit_core::Result<()> {
        let head_type = pending.head_type;
        match (&pending.kind, data) {
            (PendingTaskKind::ProcessImage { model_id }, TaskData::ProcessedImage { filename, .. }) => {
                let scene = &mut self.surface_mut(head_type).scene;
                let from = scene.models.get(*model_id)?.processed_image.clone();
                if from.as_deref() != Some(filename.as_str()) {
                    let mut compound = CompoundOperation::with_operation(
                        "Process Image",
                        UpdateHrefOperation2D::new(*model_id, from, Some(filename)),
                    );
                    compound.apply(scene)?;
                    self.commit(head_type, compound);
                }
                self.surface_mut(head_type)
                    .progress
                    .update_progress(StepStage::ProcessingImage, 1.0);
                self.finish_stage(head_type, true, StepStage::ProcessImageSuccess);
                Ok(())
            }
            (
                PendingTaskKind::GenerateToolPath { tool_path_id },
                TaskData::ToolPath {
                    tool_path_id: generated,
                },
            ) if *tool_path_id == generated => {
                let surface = self.surface_mut(head_type);
                surface.scene.tool_paths.get_mut(generated)?.status = ToolPathStatus::Ready;
                surface
                    .progress
                    .update_progress(StepStage::GeneratingToolPath, 1.0);
                surface.progress.start_next_step();

                let remaining = self.pending_tasks.values().any(|other| {
                    other.head_type == head_type
                        && matches!(other.kind, PendingTaskKind::GenerateToolPath { .. })
                });
                if remaining {
                    self.publish_progress(head_type);
                } else {
                    self.set_stage(head_type, StepStage::PreviewingToolPath);
                }
                Ok(())
            }
            (
                PendingTaskKind::SvgClipping {
                    model_ids,
                    keep_original,
                },
                TaskData::Clipping { shapes },
            ) => {
                self.apply_clipping(head_type, model_ids, *keep_original, &shapes)?;
                self.finish_stage(head_type, true, StepStage::SvgClippingSuccess);
                Ok(())
            }
            (kind, data) => Err(TaskError::Malformed {
                reason: format!("unexpected payload {:?} for {:?}", data, kind),
            }
            .into()),
        }
    }

    fn apply_clipping(
        &mut self,
        head_type: HeadType,
        originals: &[ModelId],
        keep_original: bool,
        shapes: &[ClippedShape],
    ) -> lubankit_core::Result<()> {
        let scene = &mut self.surface_mut(head_type).scene;
        let mut compound = CompoundOperation::new("SVG Clipping");
        if let Err(err) = build_clipping(scene, &mut compound, originals, keep_original, shapes) {
            if let Err(rollback) = compound.undo(scene) {
                tracing::warn!("{}: clipping rollback failed: {}", head_type, rollback);
            }
            return Err(err.into());
        }
        scene.clear_selection();
        self.commit(head_type, compound);
        Ok(())
    }
}

/// Put clipped shapes on the canvas, then delete the originals.
///
/// Every step that succeeded is in `compound` when an error is returned.
fn build_clipping(
    scene: &mut Scene,
    compound: &mut CompoundOperation,
    originals: &[ModelId],
    keep_original: bool,
    shapes: &[ClippedShape],
) -> Result<(), SceneError> {
    for shape in shapes {
        let spec = ModelSpec::vector("Clipped", shape.width, shape.height)
            .at(shape.position_x, shape.position_y)
            .with_path(shape.path.clone());
        let model_id = scene.insert_model(spec)?;
        compound.push(AddOperation2D::new(model_id));
    }
    if !keep_original {
        for id in originals {
            let mut delete = DeleteOperation2D::new(*id);
            delete.redo(scene)?;
            compound.push(delete);
        }
    }
    Ok(())
}
