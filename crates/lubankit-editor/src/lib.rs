//! LubanKit Editor Crate
//!
//! The editing core of a laser/CNC design surface:
//! - `scene`: models, tool paths and the SVG canvas an operation mutates
//! - `operations`: reversible operations and their typed enum
//! - `compound` / `history`: undo steps and the bounded undo/redo stacks
//! - `progress`: weighted progress of long-running sessions
//! - `barrier`: join point for multi-part asynchronous work
//! - `editor`: the orchestrator tying user intents and worker results together

pub mod barrier;
pub mod compound;
pub mod editor;
pub mod history;
pub mod operations;
pub mod progress;
pub mod scene;

pub use barrier::{CompletionBarrier, JoinOutcome};
pub use compound::CompoundOperation;
pub use editor::{
    Editor, FlipDirection, PendingTask, PendingTaskKind, Surface, TaskDisposition, UploadedImage,
};
pub use history::{OperationHistory, DEFAULT_MAX_DEPTH};
pub use operations::{
    AddOperation2D, DeleteOperation2D, DrawDelete, DrawLine, DrawStart, DrawTransform,
    DrawTransformComplete, MoveOperation2D, Operation, Operation2D, OperationKind,
    RotateOperation2D, ScaleOperation2D, UpdateHrefOperation2D, VisibleOperation2D,
};
pub use progress::{ProgressStatesManager, ProgressStatus, StageCheckpoint};
pub use scene::{
    CanvasMode, Display, LineFragment, ModelSpec, ProcessMode, Scene, SourceType, SvgModel,
    Transformation,
};
