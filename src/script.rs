//! Headless replay of editor actions
//!
//! A script is a JSON array of [`ScriptStep`]s tagged by `action`:
//!
//! ```json
//! [
//!   { "action": "add_model", "head": "laser", "name": "logo", "width": 40, "height": 20 },
//!   { "action": "select", "head": "laser", "models": ["logo"] },
//!   { "action": "move", "head": "laser", "dx": 10, "dy": 0 },
//!   { "action": "undo", "head": "laser" }
//! ]
//! ```
//!
//! Models are referred to by label. A label defaults to the model name and
//! is bound when the model is created.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use lubankit_core::{Error, HeadType, ModelId, Result, StepStage};
use lubankit_editor::{Editor, FlipDirection, ModelSpec};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptStep {
    AddModel {
        head: HeadType,
        name: String,
        width: f64,
        height: f64,
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        /// SVG path data for vector models
        #[serde(default)]
        path: Option<String>,
        /// Image reference; makes the model a raster
        #[serde(default)]
        href: Option<String>,
        #[serde(default)]
        label: Option<String>,
    },
    AddToolPath {
        head: HeadType,
        name: String,
        models: Vec<String>,
    },
    Select {
        head: HeadType,
        models: Vec<String>,
    },
    ClearSelection {
        head: HeadType,
    },
    Move {
        head: HeadType,
        dx: f64,
        dy: f64,
    },
    Rotate {
        head: HeadType,
        degrees: f64,
    },
    Flip {
        head: HeadType,
        direction: FlipDirection,
    },
    Resize {
        head: HeadType,
        width: f64,
        height: f64,
    },
    /// Report a raster reload requested by `resize`
    ImageLoaded {
        head: HeadType,
        model: String,
        #[serde(default)]
        error: Option<String>,
    },
    Hide {
        head: HeadType,
    },
    Show {
        head: HeadType,
    },
    Remove {
        head: HeadType,
    },
    StartDraw {
        head: HeadType,
        #[serde(default)]
        editing: Option<String>,
    },
    DrawLine {
        head: HeadType,
        points: Vec<[f64; 2]>,
        #[serde(default)]
        closed: bool,
    },
    DrawComplete {
        head: HeadType,
        /// Label bound to the drawn model, if one is created
        #[serde(default)]
        label: Option<String>,
    },
    DrawCancel {
        head: HeadType,
    },
    Undo {
        head: HeadType,
    },
    Redo {
        head: HeadType,
    },
    Reset {
        head: HeadType,
    },
}

impl ScriptStep {
    pub fn head(&self) -> HeadType {
        match self {
            ScriptStep::AddModel { head, .. }
            | ScriptStep::AddToolPath { head, .. }
            | ScriptStep::Select { head, .. }
            | ScriptStep::ClearSelection { head }
            | ScriptStep::Move { head, .. }
            | ScriptStep::Rotate { head, .. }
            | ScriptStep::Flip { head, .. }
            | ScriptStep::Resize { head, .. }
            | ScriptStep::ImageLoaded { head, .. }
            | ScriptStep::Hide { head }
            | ScriptStep::Show { head }
            | ScriptStep::Remove { head }
            | ScriptStep::StartDraw { head, .. }
            | ScriptStep::DrawLine { head, .. }
            | ScriptStep::DrawComplete { head, .. }
            | ScriptStep::DrawCancel { head }
            | ScriptStep::Undo { head }
            | ScriptStep::Redo { head }
            | ScriptStep::Reset { head } => *head,
        }
    }
}

/// Surface state after a step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub head: HeadType,
    pub models: usize,
    pub undo_depth: usize,
    pub redo_depth: usize,
    pub stage: StepStage,
    pub progress: f64,
}

pub fn parse_script(input: &str) -> serde_json::Result<Vec<ScriptStep>> {
    serde_json::from_str(input)
}

/// Drives an [`Editor`] from script steps.
#[derive(Debug)]
pub struct Replayer {
    editor: Editor,
    labels: HashMap<(HeadType, String), ModelId>,
}

impl Replayer {
    pub fn new(editor: Editor) -> Self {
        Self {
            editor,
            labels: HashMap::new(),
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn into_editor(self) -> Editor {
        self.editor
    }

    pub fn model_id(&self, head: HeadType, label: &str) -> Option<ModelId> {
        self.labels.get(&(head, label.to_string())).copied()
    }

    fn resolve(&self, head: HeadType, labels: &[String]) -> Result<Vec<ModelId>> {
        labels
            .iter()
            .map(|label| {
                self.model_id(head, label)
                    .ok_or_else(|| Error::other(format!("Unknown model label '{}' on {}", label, head)))
            })
            .collect()
    }

    fn bind(&mut self, head: HeadType, label: String, model_id: ModelId) {
        if self.labels.insert((head, label.clone()), model_id).is_some() {
            tracing::debug!("Label '{}' rebound to {}", label, model_id);
        }
    }

    /// Apply one step and report the resulting surface state.
    pub fn apply(&mut self, step: ScriptStep) -> Result<StepReport> {
        let head = step.head();
        match step {
            ScriptStep::AddModel {
                name,
                width,
                height,
                x,
                y,
                path,
                href,
                label,
                ..
            } => {
                let mut spec = match href {
                    Some(href) => ModelSpec::raster(name.clone(), href, width, height),
                    None => ModelSpec::vector(name.clone(), width, height),
                };
                if let Some(path) = path {
                    spec = spec.with_path(path);
                }
                let model_id = self.editor.add_model(head, spec.at(x, y))?;
                self.bind(head, label.unwrap_or(name), model_id);
            }
            ScriptStep::AddToolPath { name, models, .. } => {
                let ids = self.resolve(head, &models)?;
                self.editor.add_tool_path(head, &name, &ids)?;
            }
            ScriptStep::Select { models, .. } => {
                let ids = self.resolve(head, &models)?;
                self.editor.select_models(head, &ids)?;
            }
            ScriptStep::ClearSelection { .. } => self.editor.clear_selection(head),
            ScriptStep::Move { dx, dy, .. } => {
                self.editor.move_selected_models(head, dx, dy)?;
            }
            ScriptStep::Rotate { degrees, .. } => {
                self.editor.rotate_selected_models(head, degrees)?;
            }
            ScriptStep::Flip { direction, .. } => {
                self.editor.flip_selected_models(head, direction)?;
            }
            ScriptStep::Resize { width, height, .. } => {
                self.editor.resize_selected_models(head, width, height)?;
            }
            ScriptStep::ImageLoaded { model, error, .. } => {
                let model_id = self
                    .model_id(head, &model)
                    .ok_or_else(|| Error::other(format!("Unknown model label '{}' on {}", model, head)))?;
                let result = match error {
                    Some(reason) => Err(reason),
                    None => Ok(()),
                };
                if !self.editor.on_image_loaded(head, model_id, result) {
                    tracing::debug!("{}: no resize was waiting on {}", head, model_id);
                }
            }
            ScriptStep::Hide { .. } => {
                self.editor.hide_selected_models(head)?;
            }
            ScriptStep::Show { .. } => {
                self.editor.show_selected_models(head)?;
            }
            ScriptStep::Remove { .. } => {
                self.editor.remove_selected_models(head)?;
            }
            ScriptStep::StartDraw { editing, .. } => {
                let editing = match editing {
                    Some(label) => Some(self.resolve(head, &[label])?[0]),
                    None => None,
                };
                self.editor.start_draw(head, editing)?;
            }
            ScriptStep::DrawLine { points, closed, .. } => {
                self.editor.draw_line(head, points, closed)?;
            }
            ScriptStep::DrawComplete { label, .. } => {
                if let (Some(model_id), Some(label)) = (self.editor.draw_complete(head)?, label) {
                    self.bind(head, label, model_id);
                }
            }
            ScriptStep::DrawCancel { .. } => self.editor.draw_cancel(head)?,
            ScriptStep::Undo { .. } => {
                if !self.editor.undo(head)? {
                    tracing::debug!("{}: nothing to undo", head);
                }
            }
            ScriptStep::Redo { .. } => {
                if !self.editor.redo(head)? {
                    tracing::debug!("{}: nothing to redo", head);
                }
            }
            ScriptStep::Reset { .. } => {
                self.editor.reset_surface(head);
                self.labels.retain(|(h, _), _| *h != head);
            }
        }
        Ok(self.report(head))
    }

    pub fn report(&self, head: HeadType) -> StepReport {
        let surface = self.editor.surface(head);
        StepReport {
            head,
            models: surface.scene.models.len(),
            undo_depth: surface.history.undo_depth(),
            redo_depth: surface.history.redo_depth(),
            stage: surface.stage,
            progress: surface.progress.progress(),
        }
    }

    /// Apply every step in order, stopping at the first failure.
    pub fn run(&mut self, steps: Vec<ScriptStep>) -> Result<Vec<StepReport>> {
        let mut reports = Vec::with_capacity(steps.len());
        for (index, step) in steps.into_iter().enumerate() {
            let report = self.apply(step).map_err(|err| {
                tracing::warn!("Step {} failed: {}", index + 1, err);
                err
            })?;
            tracing::info!(
                "step {}: {} models={} undo={} redo={} stage={:?} progress={:.2}",
                index + 1,
                report.head,
                report.models,
                report.undo_depth,
                report.redo_depth,
                report.stage,
                report.progress
            );
            reports.push(report);
        }
        Ok(reports)
    }
}
