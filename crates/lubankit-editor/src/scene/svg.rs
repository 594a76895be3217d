//! SVG canvas facade.
//!
//! Holds one element per model, the canvas selection and the draw group.
//! Canvas coordinates put the origin at the top-left corner of a canvas
//! twice the machine size, with Y pointing down:
//! `x = position_x + machine.x`, `y = -position_y + machine.y`.

use lubankit_core::{ModelId, SceneError};
use lubankit_settings::MachineSize;
use serde::{Deserialize, Serialize};

use super::draw::DrawGroup;
use super::Transformation;

/// SVG `display` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Display {
    Inherit,
    None,
}

impl Display {
    pub fn from_visible(visible: bool) -> Self {
        if visible {
            Display::Inherit
        } else {
            Display::None
        }
    }
}

/// Canvas element backing a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvgElement {
    pub model_id: ModelId,
    /// Center in canvas coordinates
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub display: Display,
    pub href: Option<String>,
    pub path: Option<String>,
}

/// Facade over the SVG canvas of one surface.
#[derive(Debug, Clone)]
pub struct SvgActions {
    machine: MachineSize,
    elements: Vec<SvgElement>,
    selection: Vec<ModelId>,
    draw: DrawGroup,
}

impl SvgActions {
    pub fn new(machine: MachineSize) -> Self {
        Self {
            machine,
            elements: Vec::new(),
            selection: Vec::new(),
            draw: DrawGroup::new(),
        }
    }

    pub fn machine(&self) -> MachineSize {
        self.machine
    }

    /// Model-space position to canvas coordinates.
    pub fn to_canvas(&self, position_x: f64, position_y: f64) -> (f64, f64) {
        (position_x + self.machine.x, -position_y + self.machine.y)
    }

    /// Canvas coordinates to model-space position.
    pub fn to_model(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.machine.x, self.machine.y - y)
    }

    /// Build the element for a model placed at `transformation`.
    pub fn create_element(
        &self,
        model_id: ModelId,
        transformation: &Transformation,
        visible: bool,
        href: Option<String>,
        path: Option<String>,
    ) -> SvgElement {
        let mut element = SvgElement {
            model_id,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            display: Display::from_visible(visible),
            href,
            path,
        };
        self.apply_transformation(&mut element, transformation);
        element
    }

    fn apply_transformation(&self, element: &mut SvgElement, t: &Transformation) {
        let (x, y) = self.to_canvas(t.position_x, t.position_y);
        element.x = x;
        element.y = y;
        element.width = t.width * t.scale_x.abs();
        element.height = t.height * t.scale_y.abs();
        element.rotation = t.rotation_z;
        element.scale_x = t.scale_x;
        element.scale_y = t.scale_y;
    }

    pub fn add_element(&mut self, element: SvgElement, index: Option<usize>) {
        let index = index.map_or(self.elements.len(), |i| i.min(self.elements.len()));
        self.elements.insert(index, element);
    }

    pub fn remove_element(&mut self, model_id: ModelId) -> Result<(usize, SvgElement), SceneError> {
        let index = self
            .elements
            .iter()
            .position(|e| e.model_id == model_id)
            .ok_or(SceneError::ElementNotFound { model_id })?;
        self.selection.retain(|id| *id != model_id);
        Ok((index, self.elements.remove(index)))
    }

    pub fn contains(&self, model_id: ModelId) -> bool {
        self.elements.iter().any(|e| e.model_id == model_id)
    }

    pub fn element(&self, model_id: ModelId) -> Result<&SvgElement, SceneError> {
        self.elements
            .iter()
            .find(|e| e.model_id == model_id)
            .ok_or(SceneError::ElementNotFound { model_id })
    }

    pub fn element_mut(&mut self, model_id: ModelId) -> Result<&mut SvgElement, SceneError> {
        self.elements
            .iter_mut()
            .find(|e| e.model_id == model_id)
            .ok_or(SceneError::ElementNotFound { model_id })
    }

    pub fn elements(&self) -> &[SvgElement] {
        &self.elements
    }

    /// Place an element's center at canvas coordinates without animation.
    pub fn move_element_immediately(&mut self, model_id: ModelId, x: f64, y: f64) -> Result<(), SceneError> {
        let element = self.element_mut(model_id)?;
        element.x = x;
        element.y = y;
        Ok(())
    }

    /// Sync an element with a model transformation.
    pub fn update_element_transform(&mut self, model_id: ModelId, t: &Transformation) -> Result<(), SceneError> {
        let mut element = self.element(model_id)?.clone();
        self.apply_transformation(&mut element, t);
        *self.element_mut(model_id)? = element;
        Ok(())
    }

    pub fn set_display(&mut self, model_id: ModelId, display: Display) -> Result<(), SceneError> {
        self.element_mut(model_id)?.display = display;
        Ok(())
    }

    pub fn set_href(&mut self, model_id: ModelId, href: Option<String>) -> Result<(), SceneError> {
        self.element_mut(model_id)?.href = href;
        Ok(())
    }

    pub fn set_path(&mut self, model_id: ModelId, path: Option<String>) -> Result<(), SceneError> {
        self.element_mut(model_id)?.path = path;
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Select the canvas elements of the given models.
    pub fn add_selected_svg_models_by_models(&mut self, ids: &[ModelId]) -> Result<(), SceneError> {
        for id in ids {
            if !self.contains(*id) {
                return Err(SceneError::ElementNotFound { model_id: *id });
            }
            if !self.selection.contains(id) {
                self.selection.push(*id);
            }
        }
        Ok(())
    }

    pub fn selection(&self) -> &[ModelId] {
        &self.selection
    }

    pub fn draw_group(&self) -> &DrawGroup {
        &self.draw
    }

    pub fn draw_group_mut(&mut self) -> &mut DrawGroup {
        &mut self.draw
    }
}
