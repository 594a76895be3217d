//! Reversible operations on a [`Scene`].
//!
//! Each concrete operation captures what it needs at construction time (or,
//! for add/delete, at the first application) and implements `redo`/`undo`
//! as exact inverses. [`Operation2D`] wraps every kind in one enum so a
//! history entry is a plain `Vec` of values.

mod draw;
mod model;
mod properties;
mod transform;

pub use draw::{DrawDelete, DrawLine, DrawStart, DrawTransform, DrawTransformComplete};
pub use model::{AddOperation2D, DeleteOperation2D};
pub use properties::{UpdateHrefOperation2D, VisibleOperation2D};
pub use transform::{MoveOperation2D, RotateOperation2D, ScaleOperation2D};

use lubankit_core::SceneError;

use crate::scene::Scene;

/// Whether an operation survives the end of a composite gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Intermediate step of a gesture; pruned once the gesture completes.
    Transient,
    /// A user-visible change that stays undoable.
    Committed,
}

/// A reversible unit of work.
pub trait Operation {
    /// Apply (or re-apply) the change.
    fn redo(&mut self, scene: &mut Scene) -> Result<(), SceneError>;

    /// Revert the change.
    fn undo(&mut self, scene: &mut Scene) -> Result<(), SceneError>;

    /// Display name.
    fn name(&self) -> &str;

    fn kind(&self) -> OperationKind {
        OperationKind::Committed
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operation2D {
    Add(AddOperation2D),
    Delete(DeleteOperation2D),
    Move(MoveOperation2D),
    Scale(ScaleOperation2D),
    Rotate(RotateOperation2D),
    Visible(VisibleOperation2D),
    UpdateHref(UpdateHrefOperation2D),
    DrawStart(DrawStart),
    DrawLine(DrawLine),
    DrawDelete(DrawDelete),
    DrawTransform(DrawTransform),
    DrawTransformComplete(DrawTransformComplete),
}

impl Operation2D {
    fn inner(&self) -> &dyn Operation {
        match self {
            Operation2D::Add(op) => op,
            Operation2D::Delete(op) => op,
            Operation2D::Move(op) => op,
            Operation2D::Scale(op) => op,
            Operation2D::Rotate(op) => op,
            Operation2D::Visible(op) => op,
            Operation2D::UpdateHref(op) => op,
            Operation2D::DrawStart(op) => op,
            Operation2D::DrawLine(op) => op,
            Operation2D::DrawDelete(op) => op,
            Operation2D::DrawTransform(op) => op,
            Operation2D::DrawTransformComplete(op) => op,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Operation {
        match self {
            Operation2D::Add(op) => op,
            Operation2D::Delete(op) => op,
            Operation2D::Move(op) => op,
            Operation2D::Scale(op) => op,
            Operation2D::Rotate(op) => op,
            Operation2D::Visible(op) => op,
            Operation2D::UpdateHref(op) => op,
            Operation2D::DrawStart(op) => op,
            Operation2D::DrawLine(op) => op,
            Operation2D::DrawDelete(op) => op,
            Operation2D::DrawTransform(op) => op,
            Operation2D::DrawTransformComplete(op) => op,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind() == OperationKind::Transient
    }
}

impl Operation for Operation2D {
    fn redo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        self.inner_mut().redo(scene)
    }

    fn undo(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        self.inner_mut().undo(scene)
    }

    fn name(&self) -> &str {
        self.inner().name()
    }

    fn kind(&self) -> OperationKind {
        self.inner().kind()
    }
}

macro_rules! impl_from_operation {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Operation2D {
                fn from(op: $ty) -> Self {
                    Operation2D::$variant(op)
                }
            }
        )*
    };
}

impl_from_operation!(
    Add => AddOperation2D,
    Delete => DeleteOperation2D,
    Move => MoveOperation2D,
    Scale => ScaleOperation2D,
    Rotate => RotateOperation2D,
    Visible => VisibleOperation2D,
    UpdateHref => UpdateHrefOperation2D,
    DrawStart => DrawStart,
    DrawLine => DrawLine,
    DrawDelete => DrawDelete,
    DrawTransform => DrawTransform,
    DrawTransformComplete => DrawTransformComplete,
);
