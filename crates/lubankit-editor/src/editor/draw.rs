//! Freehand draw gesture.
//!
//! While drawing, every step is recorded as a transient entry so the user
//! can undo strokes one by one. Completing or cancelling the gesture prunes
//! those entries; only the committed result stays in history.

use lubankit_core::{Error, FragmentId, HeadType, ModelId};

use super::Editor;
use crate::compound::CompoundOperation;
use crate::operations::{
    AddOperation2D, DeleteOperation2D, DrawDelete, DrawLine, DrawStart, DrawTransform,
    DrawTransformComplete, Operation2D,
};
use crate::scene::{LineFragment, Scene};

const DRAWING_NAME: &str = "Drawing";

fn ensure_drawing(scene: &Scene) -> lubankit_core::Result<()> {
    if scene.svg.draw_group().is_drawing() {
        Ok(())
    } else {
        Err(Error::other("Canvas is not in draw mode"))
    }
}

impl Editor {
    /// Enter draw mode, on an existing element or on a blank path.
    pub fn start_draw(&mut self, head_type: HeadType, editing: Option<ModelId>) -> lubankit_core::Result<()> {
        let surface = self.surface_mut(head_type);
        let duplicate = surface.scene.svg.draw_group().is_drawing()
            && matches!(
                surface.history.get().map(|c| c.operations()),
                Some([Operation2D::DrawStart(start)]) if start.editing == editing
            );
        if duplicate {
            tracing::debug!("{}: already drawing, start ignored", head_type);
            return Ok(());
        }

        let mut compound = CompoundOperation::with_operation("Start Drawing", DrawStart::new(editing));
        compound.apply(&mut surface.scene)?;
        self.commit(head_type, compound);
        Ok(())
    }

    /// Finish one stroke. Returns the id of the new fragment.
    pub fn draw_line(
        &mut self,
        head_type: HeadType,
        points: Vec<[f64; 2]>,
        closed: bool,
    ) -> lubankit_core::Result<FragmentId> {
        let scene = &mut self.surface_mut(head_type).scene;
        ensure_drawing(scene)?;
        let fragment_id = scene.svg.draw_group_mut().next_fragment_id();
        let line = LineFragment {
            fragment_id,
            points,
            closed,
        };
        let mut compound = CompoundOperation::with_operation("Draw Line", DrawLine::new(line));
        compound.apply(scene)?;
        self.commit(head_type, compound);
        Ok(fragment_id)
    }

    pub fn delete_draw_lines(&mut self, head_type: HeadType, ids: &[FragmentId]) -> lubankit_core::Result<usize> {
        let scene = &mut self.surface_mut(head_type).scene;
        ensure_drawing(scene)?;
        let draw = scene.svg.draw_group();
        let lines: Vec<LineFragment> = ids
            .iter()
            .filter_map(|id| draw.line(*id).cloned())
            .collect();
        if lines.is_empty() {
            return Ok(0);
        }
        let count = lines.len();
        let mut compound = CompoundOperation::with_operation("Delete Lines", DrawDelete::new(lines));
        compound.apply(scene)?;
        self.commit(head_type, compound);
        Ok(count)
    }

    /// Translate fragments of the path being drawn, in canvas units.
    pub fn transform_draw_lines(
        &mut self,
        head_type: HeadType,
        ids: &[FragmentId],
        dx: f64,
        dy: f64,
    ) -> lubankit_core::Result<bool> {
        let scene = &mut self.surface_mut(head_type).scene;
        ensure_drawing(scene)?;
        let before = scene.svg.draw_group().lines().to_vec();
        let after: Vec<LineFragment> = before
            .iter()
            .map(|line| {
                let mut line = line.clone();
                if ids.contains(&line.fragment_id) {
                    for point in &mut line.points {
                        point[0] += dx;
                        point[1] += dy;
                    }
                }
                line
            })
            .collect();
        if after == before {
            return Ok(false);
        }
        let mut compound =
            CompoundOperation::with_operation("Transform Lines", DrawTransform::new(before, after));
        compound.apply(scene)?;
        self.commit(head_type, compound);
        Ok(true)
    }

    /// Commit the drawing.
    ///
    /// A new drawing becomes a vector model. An edited element gets its new
    /// path, or is deleted when every fragment was removed. Returns the
    /// model that holds the result, if any.
    pub fn draw_complete(&mut self, head_type: HeadType) -> lubankit_core::Result<Option<ModelId>> {
        let scene = &mut self.surface_mut(head_type).scene;
        if !scene.svg.draw_group().is_drawing() {
            return Ok(None);
        }
        let draw = scene.svg.draw_group_mut();
        let editing = draw.editing();
        let path = draw.path_data();
        draw.finish();
        self.prune_transient(head_type);

        let scene = &mut self.surface_mut(head_type).scene;
        let (compound, result) = match editing {
            None if path.is_empty() => (CompoundOperation::new(DRAWING_NAME), None),
            None => {
                let model_id = scene.create_model_from_element(DRAWING_NAME, &path)?;
                scene.clear_selection();
                let compound = CompoundOperation::with_operation(DRAWING_NAME, AddOperation2D::new(model_id));
                (compound, Some(model_id))
            }
            Some(model_id) if path.is_empty() => {
                let mut compound =
                    CompoundOperation::with_operation("Delete Model", DeleteOperation2D::new(model_id));
                compound.apply(scene)?;
                (compound, None)
            }
            Some(model_id) => {
                let before = scene.svg.element(model_id)?.path.clone().unwrap_or_default();
                let mut compound = CompoundOperation::new("Edit Path");
                if before != path {
                    compound.push(DrawTransformComplete::new(model_id, before, path));
                    compound.apply(scene)?;
                }
                scene.select_models(&[model_id])?;
                (compound, Some(model_id))
            }
        };
        self.commit(head_type, compound);
        self.render(head_type);
        Ok(result)
    }

    /// Leave draw mode without changing any model.
    pub fn draw_cancel(&mut self, head_type: HeadType) -> lubankit_core::Result<()> {
        let scene = &mut self.surface_mut(head_type).scene;
        if !scene.svg.draw_group().is_drawing() {
            return Ok(());
        }
        let editing = scene.svg.draw_group().editing();
        scene.svg.draw_group_mut().finish();
        match editing {
            Some(id) if scene.svg.contains(id) => scene.select_models(&[id])?,
            _ => scene.clear_selection(),
        }
        self.prune_transient(head_type);
        self.render(head_type);
        Ok(())
    }
}
