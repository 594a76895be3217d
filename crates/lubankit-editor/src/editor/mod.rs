//! Editor orchestrator
//!
//! Owns one [`Surface`] per head type and turns user intents and worker
//! results into applied, recorded operations. Every mutation goes through
//! `&mut self`, so flows on the same editor never interleave.
//!
//! Event flow:
//! - history pushes, undo/redo and prunes are published as [`HistoryEvent`]s
//! - every visible change is followed by a [`RenderEvent`]
//! - long-running flows publish [`ProgressEvent`]s and [`TaskEvent::Requested`]

mod draw;
mod models;
mod tasks;

pub use models::FlipDirection;
pub use tasks::{PendingTask, PendingTaskKind, TaskDisposition, UploadedImage};

use std::collections::HashMap;
use std::sync::Arc;

use lubankit_core::{
    AppEvent, EventBus, EventBusError, HeadType, HistoryEvent, ProgressEvent, RenderEvent,
    StepStage, TaskId,
};
use lubankit_settings::Config;

use crate::compound::CompoundOperation;
use crate::history::OperationHistory;
use crate::progress::ProgressStatesManager;
use crate::scene::Scene;

/// State of one editing surface.
#[derive(Debug, Clone)]
pub struct Surface {
    pub scene: Scene,
    pub history: OperationHistory,
    pub progress: ProgressStatesManager,
    /// UI-visible stage
    pub stage: StepStage,
}

impl Surface {
    fn new(head_type: HeadType, config: &Config) -> Self {
        Self {
            scene: Scene::new(config.machines.size_for(head_type)),
            history: OperationHistory::new(config.history.max_depth),
            progress: ProgressStatesManager::with_default_profiles(&config.notices),
            stage: StepStage::Empty,
        }
    }
}

pub struct Editor {
    config: Config,
    bus: Arc<EventBus>,
    laser: Surface,
    cnc: Surface,
    pending_tasks: HashMap<TaskId, PendingTask>,
    pending_resizes: HashMap<HeadType, tasks::PendingResize>,
}

impl Editor {
    pub fn new(config: Config) -> Self {
        Self::with_event_bus(config, Arc::new(EventBus::new()))
    }

    pub fn with_event_bus(config: Config, bus: Arc<EventBus>) -> Self {
        let laser = Surface::new(HeadType::Laser, &config);
        let cnc = Surface::new(HeadType::Cnc, &config);
        Self {
            config,
            bus,
            laser,
            cnc,
            pending_tasks: HashMap::new(),
            pending_resizes: HashMap::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn surface(&self, head_type: HeadType) -> &Surface {
        match head_type {
            HeadType::Laser => &self.laser,
            HeadType::Cnc => &self.cnc,
        }
    }

    fn surface_mut(&mut self, head_type: HeadType) -> &mut Surface {
        match head_type {
            HeadType::Laser => &mut self.laser,
            HeadType::Cnc => &mut self.cnc,
        }
    }

    pub fn scene(&self, head_type: HeadType) -> &Scene {
        &self.surface(head_type).scene
    }

    /// Unrecorded access, for collaborators that change the scene outside
    /// of history (project loading, for one).
    pub fn scene_mut(&mut self, head_type: HeadType) -> &mut Scene {
        &mut self.surface_mut(head_type).scene
    }

    pub fn history(&self, head_type: HeadType) -> &OperationHistory {
        &self.surface(head_type).history
    }

    pub fn progress(&self, head_type: HeadType) -> &ProgressStatesManager {
        &self.surface(head_type).progress
    }

    pub fn stage(&self, head_type: HeadType) -> StepStage {
        self.surface(head_type).stage
    }

    pub fn can_undo(&self, head_type: HeadType) -> bool {
        self.history(head_type).can_undo()
    }

    pub fn can_redo(&self, head_type: HeadType) -> bool {
        self.history(head_type).can_redo()
    }

    /// Revert the newest entry of a surface.
    ///
    /// An entry that fails (its model was destroyed elsewhere, say) is
    /// dropped from history and the error returned.
    pub fn undo(&mut self, head_type: HeadType) -> lubankit_core::Result<bool> {
        let surface = self.surface_mut(head_type);
        let name = surface.history.undo_description().map(str::to_string);
        match surface.history.undo(&mut surface.scene) {
            Ok(true) => {
                self.emit(AppEvent::History(HistoryEvent::Undone {
                    head_type,
                    name: name.unwrap_or_default(),
                }));
                self.render(head_type);
                Ok(true)
            }
            Ok(false) => Ok(false),
            Err(err) => {
                self.emit(AppEvent::History(HistoryEvent::Failed {
                    head_type,
                    reason: err.to_string(),
                }));
                self.render(head_type);
                Err(err.into())
            }
        }
    }

    pub fn redo(&mut self, head_type: HeadType) -> lubankit_core::Result<bool> {
        let surface = self.surface_mut(head_type);
        let name = surface.history.redo_description().map(str::to_string);
        match surface.history.redo(&mut surface.scene) {
            Ok(true) => {
                self.emit(AppEvent::History(HistoryEvent::Redone {
                    head_type,
                    name: name.unwrap_or_default(),
                }));
                self.render(head_type);
                Ok(true)
            }
            Ok(false) => Ok(false),
            Err(err) => {
                self.emit(AppEvent::History(HistoryEvent::Failed {
                    head_type,
                    reason: err.to_string(),
                }));
                self.render(head_type);
                Err(err.into())
            }
        }
    }

    /// Discard a surface's content, history and pending work.
    pub fn reset_surface(&mut self, head_type: HeadType) {
        *self.surface_mut(head_type) = Surface::new(head_type, &self.config);
        self.pending_tasks
            .retain(|_, pending| pending.head_type != head_type);
        self.pending_resizes.remove(&head_type);
        tracing::info!("Surface {} reset", head_type);
        self.emit(AppEvent::History(HistoryEvent::Cleared { head_type }));
        self.render(head_type);
    }

    /// Record an applied compound. Empty compounds are dropped.
    fn commit(&mut self, head_type: HeadType, compound: CompoundOperation) -> bool {
        if compound.is_empty() {
            return false;
        }
        let name = compound.name().to_string();
        let surface = self.surface_mut(head_type);
        surface.history.push(compound);
        let undo_depth = surface.history.undo_depth();
        tracing::debug!("{}: recorded '{}' (depth {})", head_type, name, undo_depth);
        self.emit(AppEvent::History(HistoryEvent::Pushed {
            head_type,
            name,
            undo_depth,
        }));
        self.render(head_type);
        true
    }

    fn prune_transient(&mut self, head_type: HeadType) {
        let removed = self.surface_mut(head_type).history.prune_transient();
        if removed > 0 {
            self.emit(AppEvent::History(HistoryEvent::Pruned { head_type, removed }));
        }
    }

    fn set_stage(&mut self, head_type: HeadType, stage: StepStage) {
        self.surface_mut(head_type).stage = stage;
        self.publish_progress(head_type);
    }

    fn publish_progress(&self, head_type: HeadType) {
        let surface = self.surface(head_type);
        let progress = surface.progress.progress();
        let notice = surface
            .progress
            .get_notice(surface.progress.process_stage(), progress);
        self.emit(AppEvent::Progress(ProgressEvent {
            head_type,
            stage: surface.stage,
            progress,
            notice,
        }));
    }

    fn render(&self, head_type: HeadType) {
        self.emit(AppEvent::Render(RenderEvent { head_type }));
    }

    fn emit(&self, event: AppEvent) {
        if let Err(EventBusError::NoSubscribers) = self.bus.publish(event) {
            tracing::trace!("Event dropped, no subscribers");
        }
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("laser_models", &self.laser.scene.models.len())
            .field("cnc_models", &self.cnc.scene.models.len())
            .field("pending_tasks", &self.pending_tasks.len())
            .finish()
    }
}
