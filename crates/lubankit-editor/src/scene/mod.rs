//! Collaborators mutated by operations.
//!
//! A [`Scene`] bundles the model group, the tool-path group and the SVG
//! facade of one editing surface. Every operation receives the scene
//! explicitly; nothing reaches for ambient state.

mod draw;
mod model;
mod path;
mod svg;
mod tool_path;

pub use draw::{lines_to_path_data, CanvasMode, DrawGroup, LineFragment};
pub use path::{build_path, parse_path_data, path_bounds, PathSegment};
pub use model::{ModelGroup, ProcessMode, SourceType, SvgModel};
pub use svg::{Display, SvgActions, SvgElement};
pub use tool_path::{RemovedAssociation, ToolPath, ToolPathGroup, ToolPathStatus};

use lubankit_core::{ModelId, SceneError};
use lubankit_settings::MachineSize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placement of a model in model space (Y up, origin at the work area center).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    pub position_x: f64,
    pub position_y: f64,
    /// Degrees
    pub rotation_z: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Transformation {
    fn default() -> Self {
        Self {
            position_x: 0.0,
            position_y: 0.0,
            rotation_z: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            width: 0.0,
            height: 0.0,
        }
    }
}

/// Parameters of a model to create.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpec {
    pub name: String,
    pub source_type: SourceType,
    pub mode: ProcessMode,
    pub transformation: Transformation,
    pub href: Option<String>,
    pub path: Option<String>,
    pub config: BTreeMap<String, serde_json::Value>,
}

impl ModelSpec {
    /// Vector model of the given size.
    pub fn vector(name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            name: name.into(),
            source_type: SourceType::Svg,
            mode: ProcessMode::Vector,
            transformation: Transformation {
                width,
                height,
                ..Transformation::default()
            },
            href: None,
            path: None,
            config: BTreeMap::new(),
        }
    }

    /// Raster image model displayed from `href`.
    pub fn raster(name: impl Into<String>, href: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            source_type: SourceType::Raster,
            mode: ProcessMode::Greyscale,
            href: Some(href.into()),
            ..Self::vector(name, width, height)
        }
    }

    /// Place the model center at a model-space position.
    pub fn at(mut self, position_x: f64, position_y: f64) -> Self {
        self.transformation.position_x = position_x;
        self.transformation.position_y = position_y;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// A model taken off the canvas together with its element and positions.
#[derive(Debug, Clone, PartialEq)]
pub struct DetachedModel {
    pub model: SvgModel,
    pub element: SvgElement,
    pub model_index: usize,
    pub element_index: usize,
}

/// Everything an operation may touch on one surface.
#[derive(Debug, Clone)]
pub struct Scene {
    pub models: ModelGroup,
    pub tool_paths: ToolPathGroup,
    pub svg: SvgActions,
}

impl Scene {
    pub fn new(machine: MachineSize) -> Self {
        Self {
            models: ModelGroup::new(),
            tool_paths: ToolPathGroup::new(),
            svg: SvgActions::new(machine),
        }
    }

    /// Create a model and its element on top of the canvas.
    pub fn insert_model(&mut self, spec: ModelSpec) -> Result<ModelId, SceneError> {
        let model_id = self.models.next_model_id();
        let model = SvgModel {
            model_id,
            name: spec.name,
            source_type: spec.source_type,
            mode: spec.mode,
            transformation: spec.transformation,
            visible: true,
            config: spec.config,
            upload_name: spec.href.clone(),
            processed_image: spec.href.clone(),
            source_version: 0,
        };
        let element = self.svg.create_element(
            model_id,
            &model.transformation,
            true,
            spec.href,
            spec.path,
        );
        self.models.add_model(model, None)?;
        self.svg.add_element(element, None);
        self.models.model_changed();
        Ok(model_id)
    }

    /// Turn canvas path data into a vector model fitted to its bounds.
    pub fn create_model_from_element(&mut self, name: &str, path: &str) -> Result<ModelId, SceneError> {
        let (x1, y1, x2, y2) = path_bounds(path).unwrap_or((0.0, 0.0, 0.0, 0.0));
        let (position_x, position_y) = self.svg.to_model((x1 + x2) / 2.0, (y1 + y2) / 2.0);
        let spec = ModelSpec::vector(name, x2 - x1, y2 - y1)
            .at(position_x, position_y)
            .with_path(path);
        self.insert_model(spec)
    }

    /// Take a model and its element off the canvas.
    pub fn detach_model(&mut self, model_id: ModelId) -> Result<DetachedModel, SceneError> {
        // Check both sides first so a failure leaves the scene untouched.
        self.models.get(model_id)?;
        self.svg.element(model_id)?;
        let (model_index, model) = self.models.remove_model(model_id)?;
        let (element_index, element) = self.svg.remove_element(model_id)?;
        Ok(DetachedModel {
            model,
            element,
            model_index,
            element_index,
        })
    }

    /// Put a detached model back where it was.
    pub fn attach_model(&mut self, detached: DetachedModel) -> Result<(), SceneError> {
        let model_id = detached.model.model_id;
        if self.svg.contains(model_id) {
            return Err(SceneError::DuplicateModel { model_id });
        }
        self.models
            .add_model(detached.model, Some(detached.model_index))?;
        self.svg
            .add_element(detached.element, Some(detached.element_index));
        Ok(())
    }

    /// Select models on both the model group and the canvas.
    pub fn select_models(&mut self, ids: &[ModelId]) -> Result<(), SceneError> {
        self.models.select_models(ids)?;
        self.svg.clear_selection();
        self.svg.add_selected_svg_models_by_models(ids)
    }

    pub fn clear_selection(&mut self) {
        self.models.unselect_all();
        self.svg.clear_selection();
    }

    /// Write a model transformation and mirror it on the element.
    pub fn set_transformation(&mut self, model_id: ModelId, t: Transformation) -> Result<(), SceneError> {
        self.svg.element(model_id)?;
        self.models.get_mut(model_id)?.transformation = t;
        self.svg.update_element_transform(model_id, &t)
    }

    /// Refit a model to its element's path after the path changed.
    pub fn resync_model_from_element(&mut self, model_id: ModelId) -> Result<(), SceneError> {
        let path = self.svg.element(model_id)?.path.clone().unwrap_or_default();
        let model = self.models.get(model_id)?;
        let mut t = model.transformation;
        if let Some((x1, y1, x2, y2)) = path_bounds(&path) {
            let (position_x, position_y) = self.svg.to_model((x1 + x2) / 2.0, (y1 + y2) / 2.0);
            t.position_x = position_x;
            t.position_y = position_y;
            t.width = (x2 - x1) / t.scale_x.abs().max(f64::EPSILON);
            t.height = (y2 - y1) / t.scale_y.abs().max(f64::EPSILON);
        }
        self.set_transformation(model_id, t)?;
        self.models.get_mut(model_id)?.update_source();
        self.models.model_changed();
        Ok(())
    }
}
