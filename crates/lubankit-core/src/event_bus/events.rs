//! Event type definitions for the event bus.
//!
//! This module defines all application events organized by category.
//! Events are cloneable and serializable so worker processes can exchange
//! them as JSON.

use serde::{Deserialize, Serialize};

use crate::ids::{HeadType, ModelId, TaskId, ToolPathId};
use crate::stage::StepStage;

/// Root event enum for all application events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppEvent {
    /// Worker task requests and results
    Task(TaskEvent),
    /// Undo/redo stack changes
    History(HistoryEvent),
    /// Stage and progress changes
    Progress(ProgressEvent),
    /// A surface needs to be re-rendered
    Render(RenderEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Task(_) => EventCategory::Task,
            AppEvent::History(_) => EventCategory::History,
            AppEvent::Progress(_) => EventCategory::Progress,
            AppEvent::Render(_) => EventCategory::Render,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Task(e) => e.description(),
            AppEvent::History(e) => e.description(),
            AppEvent::Progress(e) => e.description(),
            AppEvent::Render(e) => format!("Render {}", e.head_type),
        }
    }

    /// Head type the event belongs to
    pub fn head_type(&self) -> HeadType {
        match self {
            AppEvent::Task(TaskEvent::Requested(r)) => r.head_type,
            AppEvent::Task(TaskEvent::Result(r)) => r.head_type,
            AppEvent::History(e) => e.head_type(),
            AppEvent::Progress(e) => e.head_type,
            AppEvent::Render(e) => e.head_type,
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Worker task events.
    Task,
    /// History events.
    History,
    /// Progress events.
    Progress,
    /// Render requests.
    Render,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Task => write!(f, "Task"),
            EventCategory::History => write!(f, "History"),
            EventCategory::Progress => write!(f, "Progress"),
            EventCategory::Render => write!(f, "Render"),
        }
    }
}

/// Kind of work a worker is asked to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskKind {
    /// Re-process an image model.
    ProcessImage,
    /// Compute one tool path.
    GenerateToolPath,
    /// Clip SVG models.
    SvgClipping,
}

/// Task lifecycle reported by a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Still running; `progress` carries the fraction.
    Progress,
    /// Finished successfully; `data` carries the result.
    Complete,
    /// Finished with an error.
    Failed,
}

/// Shape produced by SVG clipping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClippedShape {
    /// SVG path data.
    pub path: String,
    /// Center X in model space.
    pub position_x: f64,
    /// Center Y in model space.
    pub position_y: f64,
    /// Bounding width.
    pub width: f64,
    /// Bounding height.
    pub height: f64,
}

/// Typed worker result payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TaskData {
    /// No payload.
    #[default]
    None,
    /// A processed image is available under `filename`.
    #[serde(rename_all = "camelCase")]
    ProcessedImage {
        /// Processed image reference.
        filename: String,
        /// Pixel width.
        width: f64,
        /// Pixel height.
        height: f64,
    },
    /// A tool path finished generating.
    #[serde(rename_all = "camelCase")]
    ToolPath {
        /// The generated tool path.
        tool_path_id: ToolPathId,
    },
    /// Clipping result shapes.
    Clipping {
        /// Output shapes, one model each.
        shapes: Vec<ClippedShape>,
    },
}

/// Outbound request to the worker layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    /// Surface that issued the request.
    pub head_type: HeadType,
    /// Correlation id.
    pub task_id: TaskId,
    /// Work to perform.
    pub kind: TaskKind,
    /// Models the task operates on.
    pub model_ids: Vec<ModelId>,
    /// Tool path the task operates on, if any.
    #[serde(default)]
    pub tool_path_id: Option<ToolPathId>,
    /// Opaque worker configuration.
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Inbound result from the worker layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    /// Surface the task belongs to.
    pub head_type: HeadType,
    /// Correlation id.
    pub task_id: TaskId,
    /// Lifecycle status.
    pub task_status: TaskStatus,
    /// Result payload.
    #[serde(default)]
    pub data: TaskData,
    /// Fraction within the current stage.
    #[serde(default)]
    pub progress: f64,
}

/// Worker task events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TaskEvent {
    /// The editor asks a worker to run a task.
    Requested(TaskRequest),
    /// A worker reports back.
    Result(TaskResult),
}

impl TaskEvent {
    fn description(&self) -> String {
        match self {
            TaskEvent::Requested(r) => format!("{:?} requested ({}, {})", r.kind, r.head_type, r.task_id),
            TaskEvent::Result(r) => {
                format!("{} {:?} ({})", r.task_id, r.task_status, r.head_type)
            }
        }
    }
}

/// Undo/redo stack events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HistoryEvent {
    /// A compound operation was recorded.
    Pushed {
        /// Surface.
        head_type: HeadType,
        /// Entry description.
        name: String,
        /// Undo depth after the push.
        undo_depth: usize,
    },
    /// An entry was undone.
    Undone {
        /// Surface.
        head_type: HeadType,
        /// Entry description.
        name: String,
    },
    /// An entry was redone.
    Redone {
        /// Surface.
        head_type: HeadType,
        /// Entry description.
        name: String,
    },
    /// Transient entries were pruned.
    Pruned {
        /// Surface.
        head_type: HeadType,
        /// Number of entries removed.
        removed: usize,
    },
    /// History was cleared.
    Cleared {
        /// Surface.
        head_type: HeadType,
    },
    /// An entry could not be applied and was dropped.
    Failed {
        /// Surface.
        head_type: HeadType,
        /// Error message.
        reason: String,
    },
}

impl HistoryEvent {
    fn head_type(&self) -> HeadType {
        match self {
            HistoryEvent::Pushed { head_type, .. }
            | HistoryEvent::Undone { head_type, .. }
            | HistoryEvent::Redone { head_type, .. }
            | HistoryEvent::Pruned { head_type, .. }
            | HistoryEvent::Cleared { head_type }
            | HistoryEvent::Failed { head_type, .. } => *head_type,
        }
    }

    fn description(&self) -> String {
        match self {
            HistoryEvent::Pushed { name, undo_depth, .. } => {
                format!("Recorded '{}' (depth {})", name, undo_depth)
            }
            HistoryEvent::Undone { name, .. } => format!("Undo '{}'", name),
            HistoryEvent::Redone { name, .. } => format!("Redo '{}'", name),
            HistoryEvent::Pruned { removed, .. } => format!("Pruned {} entries", removed),
            HistoryEvent::Cleared { .. } => "History cleared".to_string(),
            HistoryEvent::Failed { reason, .. } => format!("History failure: {}", reason),
        }
    }
}

/// Stage/progress change for one surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Surface.
    pub head_type: HeadType,
    /// Current UI stage.
    pub stage: StepStage,
    /// Overall progress, 0..=1.
    pub progress: f64,
    /// Human-readable notice.
    pub notice: String,
}

impl ProgressEvent {
    fn description(&self) -> String {
        format!("{} {:.0}%", self.stage, self.progress * 100.0)
    }
}

/// Re-render request
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RenderEvent {
    /// Surface to re-render.
    pub head_type: HeadType,
}
