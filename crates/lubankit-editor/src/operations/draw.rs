//! Steps of the freehand draw gesture.
//!
//! Everything but [`DrawTransformComplete`] is transient: the steps are
//! undoable while the gesture runs and are pruned from history once the
//! drawing is committed.

use lubankit_core::{ModelId, SceneError};

use super::{Operation, OperationKind};
use crate::scene::{LineFragment, Scene};

/// Entered draw mode, on an existing element or on a blank path.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawStart {
    pub editing: Option<ModelId>,
}

impl DrawStart {
    pub fn new(editing: Option<ModelId>) -> Self {
        Self { editing }
    }
}

impl Operation for DrawStart {
    fn redo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let path = match self.editing {
            Some(id) => scene.svg.element(id)?.path.clone(),
            None => None,
        };
        scene.clear_selection();
        scene
            .svg
            .draw_group_mut()
            .start(self.editing, path.as_deref());
        Ok(())
    }

    fn undo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        scene.svg.draw_group_mut().finish();
        match self.editing {
            Some(id) if scene.svg.contains(id) => scene.select_models(&[id]),
            _ => {
                scene.clear_selection();
                Ok(())
            }
        }
    }

    fn name(&self) -> &str {
        "Start Drawing"
    }

    fn kind(&self) -> OperationKind {
        OperationKind::Transient
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawLine {
    pub line: LineFragment,
}

impl DrawLine {
    pub fn new(line: LineFragment) -> Self {
        Self { line }
    }
}

impl Operation for DrawLine {
    fn redo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let draw = scene.svg.draw_group_mut();
        if draw.line(self.line.fragment_id).is_none() {
            draw.add_line(self.line.clone());
        }
        draw.reset_operation();
        Ok(())
    }

    fn undo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let draw = scene.svg.draw_group_mut();
        draw.remove_line(self.line.fragment_id)?;
        draw.reset_operation();
        Ok(())
    }

    fn name(&self) -> &str {
        "Draw Line"
    }

    fn kind(&self) -> OperationKind {
        OperationKind::Transient
    }
}

/// Fragments removed from the path being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawDelete {
    pub lines: Vec<LineFragment>,
}

impl DrawDelete {
    pub fn new(lines: Vec<LineFragment>) -> Self {
        Self { lines }
    }
}

impl Operation for DrawDelete {
    fn redo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let draw = scene.svg.draw_group_mut();
        for line in &self.lines {
            if draw.line(line.fragment_id).is_some() {
                draw.remove_line(line.fragment_id)?;
            }
        }
        draw.reset_operation();
        Ok(())
    }

    fn undo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let draw = scene.svg.draw_group_mut();
        for line in &self.lines {
            if draw.line(line.fragment_id).is_none() {
                draw.add_line(line.clone());
            }
        }
        draw.reset_operation();
        Ok(())
    }

    fn name(&self) -> &str {
        "Delete Lines"
    }

    fn kind(&self) -> OperationKind {
        OperationKind::Transient
    }
}

/// Fragments moved or reshaped during the gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawTransform {
    pub before: Vec<LineFragment>,
    pub after: Vec<LineFragment>,
}

impl DrawTransform {
    pub fn new(before: Vec<LineFragment>, after: Vec<LineFragment>) -> Self {
        Self { before, after }
    }
}

impl Operation for DrawTransform {
    fn redo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        scene.svg.draw_group_mut().replace_lines(self.after.clone());
        Ok(())
    }

    fn undo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        scene.svg.draw_group_mut().replace_lines(self.before.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "Transform Lines"
    }

    fn kind(&self) -> OperationKind {
        OperationKind::Transient
    }
}

/// Edited path written back to its element.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawTransformComplete {
    pub model_id: ModelId,
    pub before: String,
    pub after: String,
}

impl DrawTransformComplete {
    pub fn new(model_id: ModelId, before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            model_id,
            before: before.into(),
            after: after.into(),
        }
    }

    fn apply(&self, scene: &mut Scene, path: &str) -> Result<(), SceneError> {
        scene.models.get(self.model_id)?;
        scene.svg.set_path(self.model_id, Some(path.to_string()))?;
        scene.resync_model_from_element(self.model_id)
    }
}

impl Operation for DrawTransformComplete {
    fn redo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let after = self.after.clone();
        self.apply(scene, &after)
    }

    fn undo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let before = self.before.clone();
        self.apply(scene, &before)
    }

    fn name(&self) -> &str {
        "Edit Path"
    }
}
