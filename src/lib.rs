//! # LubanKit
//!
//! Headless editing core of a laser/CNC design tool:
//! - independent laser and CNC surfaces, each with its own models and tool paths
//! - bounded undo/redo built from reversible, compound operations
//! - weighted progress of long-running sessions (upload, image processing,
//!   tool-path generation, clipping, resize)
//! - an event bus bridging the editor and out-of-process workers
//!
//! ## Architecture
//!
//! 1. **lubankit-core** - Identifiers, stages, errors, the event bus
//! 2. **lubankit-settings** - Configuration and its persistence
//! 3. **lubankit-editor** - Scene, operations, history, progress, editor
//! 4. **lubankit** - Re-exports, logging setup and the script replay binary

pub mod script;

pub use lubankit_core::{
    event_bus, init_event_bus, AppEvent, Error, EventBus, EventBusConfig, EventCategory,
    EventFilter, FragmentId, HeadType, HistoryEvent, ModelId, ProcessStage, ProgressEvent, Result,
    StepStage, SubscriptionId, TaskId, TaskRequest, TaskResult, ToolPathId,
};

pub use lubankit_editor::{
    CompoundOperation, Editor, FlipDirection, ModelSpec, Operation, Operation2D,
    OperationHistory, ProgressStatesManager, Scene, TaskDisposition,
};

pub use lubankit_settings::Config;

pub use script::{parse_script, Replayer, ScriptStep, StepReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log output style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable, multi-line
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Log history and progress events of `bus` as they are published
pub fn log_events(bus: &EventBus) -> SubscriptionId {
    bus.subscribe(
        EventFilter::Categories(vec![EventCategory::History, EventCategory::Progress]),
        |event| tracing::info!(category = %event.category(), "{}", event.description()),
    )
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    init_logging_with(LogFormat::Pretty)
}

/// Initialize logging in the given format
pub fn init_logging_with(format: LogFormat) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    match format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_line_number(true)
                .pretty();

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(true)
                .with_line_number(true)
                .json();

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
    }

    Ok(())
}
