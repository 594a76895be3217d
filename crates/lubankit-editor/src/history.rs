//! Bounded undo/redo stacks of [`CompoundOperation`]s.

use std::collections::VecDeque;

use lubankit_core::HistoryError;

use crate::compound::CompoundOperation;
use crate::operations::Operation2D;
use crate::scene::Scene;

pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Undo/redo history of one editing surface.
#[derive(Debug, Clone)]
pub struct OperationHistory {
    past: VecDeque<CompoundOperation>,
    future: Vec<CompoundOperation>,
    max_depth: usize,
}

impl Default for OperationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl OperationHistory {
    pub fn new(max_depth: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Record an already applied compound. Clears the redo stack.
    pub fn push(&mut self, compound: CompoundOperation) {
        self.future.clear();
        self.past.push_back(compound);
        while self.past.len() > self.max_depth {
            if let Some(evicted) = self.past.pop_front() {
                tracing::debug!("History full, dropping '{}'", evicted.name());
            }
        }
    }

    /// Revert the newest entry. `Ok(false)` when there is nothing to undo.
    pub fn undo(&mut self, scene: &mut Scene) -> Result<bool, HistoryError> {
        let Some(mut compound) = self.past.pop_back() else {
            return Ok(false);
        };
        match compound.undo(scene) {
            Ok(()) => {
                self.future.push(compound);
                Ok(true)
            }
            Err(source) => {
                tracing::warn!("Undo of '{}' failed, entry discarded: {}", compound.name(), source);
                Err(HistoryError::OperationFailed {
                    name: compound.name().to_string(),
                    source,
                })
            }
        }
    }

    /// Re-apply the newest undone entry. `Ok(false)` when there is nothing to redo.
    pub fn redo(&mut self, scene: &mut Scene) -> Result<bool, HistoryError> {
        let Some(mut compound) = self.future.pop() else {
            return Ok(false);
        };
        match compound.redo(scene) {
            Ok(()) => {
                self.past.push_back(compound);
                Ok(true)
            }
            Err(source) => {
                tracing::warn!("Redo of '{}' failed, entry discarded: {}", compound.name(), source);
                Err(HistoryError::OperationFailed {
                    name: compound.name().to_string(),
                    source,
                })
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.past.back().map(CompoundOperation::name)
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.future.last().map(CompoundOperation::name)
    }

    /// Newest undoable entry.
    pub fn get(&self) -> Option<&CompoundOperation> {
        self.past.back()
    }

    /// Remove the newest undoable entry without reverting it.
    pub fn pop(&mut self) -> Option<CompoundOperation> {
        self.past.pop_back()
    }

    /// Drop entries on both stacks whose operations all match `predicate`.
    ///
    /// Returns the number of entries removed.
    pub fn filter<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&Operation2D) -> bool,
    {
        let keep = |compound: &CompoundOperation| {
            compound.is_empty() || !compound.operations().iter().all(&predicate)
        };
        let before = self.past.len() + self.future.len();
        self.past.retain(|compound| keep(compound));
        self.future.retain(|compound| keep(compound));
        before - self.past.len() - self.future.len()
    }

    /// Drop the steps of a finished gesture.
    pub fn prune_transient(&mut self) -> usize {
        self.filter(Operation2D::is_transient)
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::{DrawStart, VisibleOperation2D};
    use crate::scene::ModelSpec;
    use lubankit_core::{ModelId, SceneError};
    use lubankit_settings::MachineSize;

    fn hide(id: ModelId) -> CompoundOperation {
        CompoundOperation::with_operation("Hide", VisibleOperation2D::new(id, false))
    }

    fn scene_with_model() -> (Scene, ModelId) {
        let mut scene = Scene::new(MachineSize::new(100.0, 100.0));
        let id = scene
            .insert_model(ModelSpec::vector("a", 10.0, 10.0))
            .unwrap();
        (scene, id)
    }

    #[test]
    fn test_empty_history_is_noop() {
        let (mut scene, _) = scene_with_model();
        let mut history = OperationHistory::default();
        assert_eq!(history.undo(&mut scene), Ok(false));
        assert_eq!(history.redo(&mut scene), Ok(false));
    }

    #[test]
    fn test_push_clears_redo() {
        let (mut scene, id) = scene_with_model();
        let mut history = OperationHistory::new(10);
        history.push(hide(id));
        assert_eq!(history.undo(&mut scene), Ok(true));
        assert!(history.can_redo());
        history.push(hide(id));
        assert!(!history.can_redo());
        assert_eq!(history.undo_depth(), 1);
    }

    #[test]
    fn test_evicts_oldest() {
        let mut history = OperationHistory::new(2);
        for name in ["one", "two", "three"] {
            history.push(CompoundOperation::new(name));
        }
        assert_eq!(history.undo_depth(), 2);
        assert_eq!(history.undo_description(), Some("three"));
        history.pop();
        assert_eq!(history.undo_description(), Some("two"));
    }

    #[test]
    fn test_failed_undo_discards_entry() {
        let (mut scene, id) = scene_with_model();
        let mut history = OperationHistory::new(10);
        history.push(hide(id));
        scene.detach_model(id).unwrap();

        let err = history.undo(&mut scene).unwrap_err();
        assert!(matches!(
            err,
            HistoryError::OperationFailed {
                source: SceneError::ElementNotFound { .. },
                ..
            }
        ));
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_prune_transient_keeps_committed() {
        let (_, id) = scene_with_model();
        let mut history = OperationHistory::new(10);
        history.push(hide(id));
        history.push(CompoundOperation::with_operation("Start", DrawStart::new(None)));
        history.push(CompoundOperation::with_operation("Start", DrawStart::new(None)));
        assert_eq!(history.prune_transient(), 2);
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.undo_description(), Some("Hide"));
    }

    #[test]
    fn test_prune_transient_clears_undone_gesture_steps() {
        let (mut scene, id) = scene_with_model();
        let mut history = OperationHistory::new(10);
        history.push(hide(id));
        history.push(CompoundOperation::with_operation("Start", DrawStart::new(None)));
        assert_eq!(history.undo(&mut scene), Ok(true));
        assert_eq!(history.undo(&mut scene), Ok(true));
        assert_eq!(history.redo_depth(), 2);

        assert_eq!(history.prune_transient(), 1);
        assert_eq!(history.redo_depth(), 1);
        assert_eq!(history.redo_description(), Some("Hide"));
    }
}
