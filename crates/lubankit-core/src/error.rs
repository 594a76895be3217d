//! Error handling for LubanKit
//!
//! Provides error types for every layer of the editor core:
//! - Scene errors (missing models, tool paths, elements, draw fragments)
//! - History errors (an undo/redo entry that could not be applied)
//! - Progress errors (unknown or malformed progress profiles)
//! - Task errors (undecodable worker messages)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::ids::{FragmentId, ModelId, ToolPathId};

/// Scene error type
///
/// Raised when an operation refers to an entity that is no longer part of
/// the scene, e.g. after a project reload destroyed it independently.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// Model is not attached to the model group
    #[error("Model {model_id} not found")]
    ModelNotFound {
        /// The missing model.
        model_id: ModelId,
    },

    /// Model is already attached
    #[error("Model {model_id} already exists")]
    DuplicateModel {
        /// The duplicated model.
        model_id: ModelId,
    },

    /// SVG element backing a model is missing
    #[error("SVG element for {model_id} not found")]
    ElementNotFound {
        /// The model whose element is missing.
        model_id: ModelId,
    },

    /// Tool path is not part of the tool-path group
    #[error("Tool path {tool_path_id} not found")]
    ToolPathNotFound {
        /// The missing tool path.
        tool_path_id: ToolPathId,
    },

    /// Draw fragment is not part of the draw group
    #[error("Draw fragment {fragment_id} not found")]
    DrawFragmentNotFound {
        /// The missing fragment.
        fragment_id: FragmentId,
    },
}

/// History error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistoryError {
    /// An entry failed while being undone or redone and was discarded
    #[error("Failed to apply '{name}': {source}")]
    OperationFailed {
        /// Description of the history entry.
        name: String,
        /// The scene error raised by the failing operation.
        #[source]
        source: SceneError,
    },
}

/// Progress error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProgressError {
    /// No profile registered for the process stage
    #[error("Unknown process stage: {0}")]
    UnknownProcessStage(String),

    /// Step stage is not part of the active profile
    #[error("Stage {stage} is not part of process stage {process_stage}")]
    UnknownStage {
        /// The active process stage.
        process_stage: String,
        /// The step stage that was reported.
        stage: String,
    },

    /// Checkpoint list is empty, unordered or out of range
    #[error("Invalid stages: {reason}")]
    InvalidStages {
        /// Why the checkpoint list was rejected.
        reason: String,
    },
}

/// Task error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaskError {
    /// The worker message could not be decoded
    #[error("Malformed task message: {reason}")]
    Malformed {
        /// Decoder diagnostic.
        reason: String,
    },
}

/// Main error type for LubanKit
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Scene error
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// History error
    #[error(transparent)]
    History(#[from] HistoryError),

    /// Progress error
    #[error(transparent)]
    Progress(#[from] ProgressError),

    /// Task error
    #[error(transparent)]
    Task(#[from] TaskError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this error means a referenced entity no longer exists
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Scene(_) => true,
            Error::History(HistoryError::OperationFailed { .. }) => true,
            _ => false,
        }
    }

    /// Check if this is a history error
    pub fn is_history_error(&self) -> bool {
        matches!(self, Error::History(_))
    }

    /// Check if this is a progress error
    pub fn is_progress_error(&self) -> bool {
        matches!(self, Error::Progress(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
