//! Ordered groups of operations forming one undo step.

use lubankit_core::SceneError;

use crate::operations::{Operation, Operation2D, OperationKind};
use crate::scene::Scene;

/// One history entry: operations applied front to back, reverted back to front.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundOperation {
    name: String,
    operations: Vec<Operation2D>,
}

impl CompoundOperation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operations: Vec::new(),
        }
    }

    pub fn with_operation(name: impl Into<String>, operation: impl Into<Operation2D>) -> Self {
        let mut compound = Self::new(name);
        compound.push(operation);
        compound
    }

    pub fn push(&mut self, operation: impl Into<Operation2D>) {
        self.operations.push(operation.into());
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn operations(&self) -> &[Operation2D] {
        &self.operations
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when every operation is a gesture step. Empty compounds are not.
    pub fn is_transient(&self) -> bool {
        !self.operations.is_empty() && self.operations.iter().all(Operation2D::is_transient)
    }

    /// Apply all operations in order.
    ///
    /// On failure the operations already applied are reverted before the
    /// error is returned, so the scene is left as it was.
    pub fn redo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        for index in 0..self.operations.len() {
            if let Err(err) = self.operations[index].redo(scene) {
                for applied in self.operations[..index].iter_mut().rev() {
                    if let Err(rollback) = applied.undo(scene) {
                        tracing::warn!("Rollback of '{}' failed: {}", applied.name(), rollback);
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }

    /// Apply a freshly built compound. Same contract as [`Self::redo`].
    pub fn apply(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        self.redo(scene)
    }

    /// Revert all operations in reverse order.
    ///
    /// On failure the operations already reverted are re-applied before the
    /// error is returned.
    pub fn undo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        for index in (0..self.operations.len()).rev() {
            if let Err(err) = self.operations[index].undo(scene) {
                for reverted in self.operations[index + 1..].iter_mut() {
                    if let Err(rollback) = reverted.redo(scene) {
                        tracing::warn!("Rollback of '{}' failed: {}", reverted.name(), rollback);
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }

    pub fn kind(&self) -> OperationKind {
        if self.is_transient() {
            OperationKind::Transient
        } else {
            OperationKind::Committed
        }
    }
}
