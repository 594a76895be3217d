//! Adding and deleting models.
//!
//! Both operations keep the detached model (and the tool-path associations
//! it lost) on themselves while it is off the canvas, so repeated undo/redo
//! cycles restore exactly the same state.

use lubankit_core::{ModelId, SceneError};

use super::Operation;
use crate::scene::{DetachedModel, RemovedAssociation, Scene};

fn detach(
    scene: &mut Scene,
    model_id: ModelId,
) -> Result<(DetachedModel, Vec<RemovedAssociation>), SceneError> {
    let detached = scene.detach_model(model_id)?;
    let associations = scene.tool_paths.remove_model(model_id);
    scene.models.model_changed();
    scene.clear_selection();
    Ok((detached, associations))
}

fn reattach(
    scene: &mut Scene,
    detached: &DetachedModel,
    associations: &[RemovedAssociation],
) -> Result<(), SceneError> {
    scene.attach_model(detached.clone())?;
    scene.tool_paths.restore_model(associations)?;
    scene.models.model_changed();
    scene.clear_selection();
    Ok(())
}

/// A model was added to the surface.
///
/// Built after the model is already on the canvas; the first `undo` detaches
/// it and captures its tool-path associations.
#[derive(Debug, Clone, PartialEq)]
pub struct AddOperation2D {
    pub model_id: ModelId,
    detached: Option<DetachedModel>,
    associations: Vec<RemovedAssociation>,
}

impl AddOperation2D {
    pub fn new(model_id: ModelId) -> Self {
        Self {
            model_id,
            detached: None,
            associations: Vec::new(),
        }
    }

    /// Associations cached by the last undo.
    pub fn cached_associations(&self) -> &[RemovedAssociation] {
        &self.associations
    }
}

impl Operation for AddOperation2D {
    fn redo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        match &self.detached {
            Some(detached) => {
                reattach(scene, detached, &self.associations)?;
                self.detached = None;
                self.associations.clear();
            }
            None => {
                scene.models.get(self.model_id)?;
                scene.models.model_changed();
                scene.clear_selection();
            }
        }
        Ok(())
    }

    fn undo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        if self.detached.is_some() {
            return Ok(());
        }
        let (detached, associations) = detach(scene, self.model_id)?;
        self.detached = Some(detached);
        self.associations = associations;
        Ok(())
    }

    fn name(&self) -> &str {
        "Add Model"
    }
}

/// A model was deleted from the surface.
///
/// Associations are captured when the deletion is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteOperation2D {
    pub model_id: ModelId,
    detached: Option<DetachedModel>,
    associations: Vec<RemovedAssociation>,
}

impl DeleteOperation2D {
    pub fn new(model_id: ModelId) -> Self {
        Self {
            model_id,
            detached: None,
            associations: Vec::new(),
        }
    }
}

impl Operation for DeleteOperation2D {
    fn redo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        if self.detached.is_some() {
            return Ok(());
        }
        let (detached, associations) = detach(scene, self.model_id)?;
        self.detached = Some(detached);
        self.associations = associations;
        Ok(())
    }

    fn undo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let Some(detached) = &self.detached else {
            return Err(SceneError::ModelNotFound {
                model_id: self.model_id,
            });
        };
        reattach(scene, detached, &self.associations)?;
        self.detached = None;
        self.associations.clear();
        Ok(())
    }

    fn name(&self) -> &str {
        "Delete Model"
    }
}
