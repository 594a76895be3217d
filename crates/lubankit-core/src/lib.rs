//! # LubanKit Core
//!
//! Core types shared by the LubanKit editor crates: surface and entity
//! identifiers, process/step stages, the unified error type and the
//! application event bus.

pub mod error;
pub mod event_bus;
pub mod ids;
pub mod stage;

pub use error::{Error, HistoryError, ProgressError, Result, SceneError, TaskError};

pub use event_bus::{
    event_bus, init_event_bus, AppEvent, ClippedShape, EventBus, EventBusConfig, EventBusError,
    EventCategory, EventFilter, HistoryEvent, ProgressEvent, RenderEvent, SubscriptionId,
    TaskData, TaskEvent, TaskKind, TaskRequest, TaskResult, TaskStatus,
};

pub use ids::{FragmentId, HeadType, IdAllocator, ModelId, TaskId, ToolPathId};
pub use stage::{ProcessStage, StepStage};
