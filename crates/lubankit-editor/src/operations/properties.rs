use lubankit_core::{ModelId, SceneError};

use super::Operation;
use crate::scene::{Display, Scene};

/// Visibility toggle. Stores the target state; undo applies its negation.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleOperation2D {
    pub model_id: ModelId,
    pub visible: bool,
}

impl VisibleOperation2D {
    pub fn new(model_id: ModelId, visible: bool) -> Self {
        Self { model_id, visible }
    }

    fn apply(&self, scene: &mut Scene, visible: bool) -> Result<(), SceneError> {
        scene
            .svg
            .set_display(self.model_id, Display::from_visible(visible))?;
        scene.models.get_mut(self.model_id)?.visible = visible;
        scene.models.model_changed();
        Ok(())
    }
}

impl Operation for VisibleOperation2D {
    fn redo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        self.apply(scene, self.visible)
    }

    fn undo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        self.apply(scene, !self.visible)
    }

    fn name(&self) -> &str {
        if self.visible {
            "Show Model"
        } else {
            "Hide Model"
        }
    }
}

/// Processed image swapped on a raster model.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateHrefOperation2D {
    pub model_id: ModelId,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl UpdateHrefOperation2D {
    pub fn new(model_id: ModelId, from: Option<String>, to: Option<String>) -> Self {
        Self { model_id, from, to }
    }

    fn apply(&self, scene: &mut Scene, href: Option<String>) -> Result<(), SceneError> {
        scene.svg.set_href(self.model_id, href.clone())?;
        scene.models.get_mut(self.model_id)?.processed_image = href;
        scene.models.model_changed();
        Ok(())
    }
}

impl Operation for UpdateHrefOperation2D {
    fn redo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        self.apply(scene, self.to.clone())
    }

    fn undo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        self.apply(scene, self.from.clone())
    }

    fn name(&self) -> &str {
        "Update Image"
    }
}
