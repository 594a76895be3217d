//! Move, scale and rotate.

use lubankit_core::{ModelId, SceneError};

use super::Operation;
use crate::scene::{Scene, Transformation};

/// Model moved between two absolute positions.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOperation2D {
    pub model_id: ModelId,
    pub from: Transformation,
    pub to: Transformation,
}

impl MoveOperation2D {
    pub fn new(model_id: ModelId, from: Transformation, to: Transformation) -> Self {
        Self { model_id, from, to }
    }

    fn apply(&self, scene: &mut Scene, state: &Transformation) -> Result<(), SceneError> {
        let (x, y) = scene.svg.to_canvas(state.position_x, state.position_y);
        scene.svg.move_element_immediately(self.model_id, x, y)?;
        let model = scene.models.get_mut(self.model_id)?;
        model.transformation.position_x = state.position_x;
        model.transformation.position_y = state.position_y;
        scene.models.model_changed();
        scene.clear_selection();
        Ok(())
    }
}

impl Operation for MoveOperation2D {
    fn redo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let to = self.to;
        self.apply(scene, &to)
    }

    fn undo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let from = self.from;
        self.apply(scene, &from)
    }

    fn name(&self) -> &str {
        "Move"
    }
}

/// Size or flip change. A flip is a negated scale factor.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleOperation2D {
    pub model_id: ModelId,
    pub from: Transformation,
    pub to: Transformation,
}

impl ScaleOperation2D {
    pub fn new(model_id: ModelId, from: Transformation, to: Transformation) -> Self {
        Self { model_id, from, to }
    }

    fn apply(&self, scene: &mut Scene, state: &Transformation) -> Result<(), SceneError> {
        let mut t = scene.models.get(self.model_id)?.transformation;
        t.width = state.width;
        t.height = state.height;
        t.scale_x = state.scale_x;
        t.scale_y = state.scale_y;
        scene.set_transformation(self.model_id, t)?;
        scene.models.model_changed();
        scene.clear_selection();
        Ok(())
    }
}

impl Operation for ScaleOperation2D {
    fn redo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let to = self.to;
        self.apply(scene, &to)
    }

    fn undo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let from = self.from;
        self.apply(scene, &from)
    }

    fn name(&self) -> &str {
        "Scale"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotateOperation2D {
    pub model_id: ModelId,
    pub from: Transformation,
    pub to: Transformation,
}

impl RotateOperation2D {
    pub fn new(model_id: ModelId, from: Transformation, to: Transformation) -> Self {
        Self { model_id, from, to }
    }

    fn apply(&self, scene: &mut Scene, state: &Transformation) -> Result<(), SceneError> {
        let mut t = scene.models.get(self.model_id)?.transformation;
        t.rotation_z = state.rotation_z;
        scene.set_transformation(self.model_id, t)?;
        scene.models.model_changed();
        scene.clear_selection();
        Ok(())
    }
}

impl Operation for RotateOperation2D {
    fn redo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let to = self.to;
        self.apply(scene, &to)
    }

    fn undo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let from = self.from;
        self.apply(scene, &from)
    }

    fn name(&self) -> &str {
        "Rotate"
    }
}
