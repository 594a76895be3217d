//! Synchronous model flows: snapshot, mutate, compare, record.

use lubankit_core::{HeadType, ModelId, ToolPathId};

use super::Editor;
use crate::compound::CompoundOperation;
use crate::operations::{
    AddOperation2D, DeleteOperation2D, MoveOperation2D, RotateOperation2D, ScaleOperation2D,
    VisibleOperation2D,
};
use crate::scene::{ModelSpec, Transformation};

/// Mirror axis for [`Editor::flip_selected_models`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipDirection {
    Horizontal,
    Vertical,
}

impl Editor {
    /// Create a model on a surface and record it.
    pub fn add_model(&mut self, head_type: HeadType, spec: ModelSpec) -> lubankit_core::Result<ModelId> {
        let scene = &mut self.surface_mut(head_type).scene;
        let model_id = scene.insert_model(spec)?;
        scene.clear_selection();
        self.commit(
            head_type,
            CompoundOperation::with_operation("Add Model", AddOperation2D::new(model_id)),
        );
        Ok(model_id)
    }

    /// Create a tool path over existing models. Not recorded in history.
    pub fn add_tool_path(
        &mut self,
        head_type: HeadType,
        name: &str,
        model_ids: &[ModelId],
    ) -> lubankit_core::Result<ToolPathId> {
        let scene = &mut self.surface_mut(head_type).scene;
        for id in model_ids {
            scene.models.get(*id)?;
        }
        let id = scene.tool_paths.create_tool_path(name, model_ids.to_vec());
        tracing::debug!("{}: tool path {} over {} model(s)", head_type, id, model_ids.len());
        Ok(id)
    }

    pub fn select_models(&mut self, head_type: HeadType, ids: &[ModelId]) -> lubankit_core::Result<()> {
        self.surface_mut(head_type).scene.select_models(ids)?;
        self.render(head_type);
        Ok(())
    }

    pub fn clear_selection(&mut self, head_type: HeadType) {
        self.surface_mut(head_type).scene.clear_selection();
        self.render(head_type);
    }

    /// Delete every selected model as one undo step. Returns how many were removed.
    pub fn remove_selected_models(&mut self, head_type: HeadType) -> lubankit_core::Result<usize> {
        let scene = &mut self.surface_mut(head_type).scene;
        let ids = scene.models.selected_ids().to_vec();
        let mut compound = CompoundOperation::new("Delete Models");
        for id in ids {
            compound.push(DeleteOperation2D::new(id));
        }
        compound.apply(scene)?;
        let removed = compound.len();
        self.commit(head_type, compound);
        Ok(removed)
    }

    pub fn hide_selected_models(&mut self, head_type: HeadType) -> lubankit_core::Result<usize> {
        self.set_selected_visible(head_type, false)
    }

    pub fn show_selected_models(&mut self, head_type: HeadType) -> lubankit_core::Result<usize> {
        self.set_selected_visible(head_type, true)
    }

    fn set_selected_visible(&mut self, head_type: HeadType, visible: bool) -> lubankit_core::Result<usize> {
        let scene = &mut self.surface_mut(head_type).scene;
        let targets: Vec<ModelId> = scene
            .models
            .selected_models()
            .into_iter()
            .filter(|m| m.visible != visible)
            .map(|m| m.model_id)
            .collect();

        let name = if visible { "Show Models" } else { "Hide Models" };
        let mut compound = CompoundOperation::new(name);
        for id in targets {
            compound.push(VisibleOperation2D::new(id, visible));
        }
        compound.apply(scene)?;
        let changed = compound.len();
        self.commit(head_type, compound);
        Ok(changed)
    }

    /// Translate the selection by a model-space offset.
    pub fn move_selected_models(&mut self, head_type: HeadType, dx: f64, dy: f64) -> lubankit_core::Result<usize> {
        self.transform_selected(head_type, "Move", |t| Transformation {
            position_x: t.position_x + dx,
            position_y: t.position_y + dy,
            ..*t
        })
    }

    /// Rotate the selection in place by `degrees`.
    pub fn rotate_selected_models(&mut self, head_type: HeadType, degrees: f64) -> lubankit_core::Result<usize> {
        self.transform_selected(head_type, "Rotate", |t| Transformation {
            rotation_z: t.rotation_z + degrees,
            ..*t
        })
    }

    pub fn flip_selected_models(
        &mut self,
        head_type: HeadType,
        direction: FlipDirection,
    ) -> lubankit_core::Result<usize> {
        self.transform_selected(head_type, "Flip", |t| match direction {
            FlipDirection::Horizontal => Transformation {
                scale_x: -t.scale_x,
                ..*t
            },
            FlipDirection::Vertical => Transformation {
                scale_y: -t.scale_y,
                ..*t
            },
        })
    }

    fn transform_selected<F>(&mut self, head_type: HeadType, name: &str, f: F) -> lubankit_core::Result<usize>
    where
        F: Fn(&Transformation) -> Transformation,
    {
        let scene = &mut self.surface_mut(head_type).scene;
        let snapshots: Vec<(ModelId, Transformation)> = scene
            .models
            .selected_models()
            .into_iter()
            .map(|m| (m.model_id, m.transformation))
            .collect();

        let mut compound = CompoundOperation::new(name);
        for (id, from) in &snapshots {
            let (id, from) = (*id, *from);
            let to = f(&from);
            if from.position_x != to.position_x || from.position_y != to.position_y {
                compound.push(MoveOperation2D::new(id, from, to));
            }
            if from.rotation_z != to.rotation_z {
                compound.push(RotateOperation2D::new(id, from, to));
            }
            if from.scale_x != to.scale_x
                || from.scale_y != to.scale_y
                || from.width != to.width
                || from.height != to.height
            {
                compound.push(ScaleOperation2D::new(id, from, to));
            }
        }
        compound.apply(scene)?;

        // Operations clear the selection; keep the user's selection across the gesture.
        let ids: Vec<ModelId> = snapshots.iter().map(|(id, _)| *id).collect();
        scene.select_models(&ids)?;

        let changed = compound.len();
        self.commit(head_type, compound);
        Ok(changed)
    }
}
