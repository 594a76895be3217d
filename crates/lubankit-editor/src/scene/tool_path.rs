//! Tool paths and their association with models.
//!
//! A tool path references one or more models by id. Removing a model drops it
//! from every tool path, and a tool path left without models is deleted. The
//! removal is reported as a list of [`RemovedAssociation`] records which,
//! replayed through [`ToolPathGroup::restore_model`], rebuild exactly the
//! previous state.

use lubankit_core::{IdAllocator, ModelId, SceneError, ToolPathId};
use serde::{Deserialize, Serialize};

/// Generation status of a tool path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolPathStatus {
    /// Inputs changed since the last generation
    Stale,
    Running,
    Ready,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolPath {
    pub id: ToolPathId,
    pub name: String,
    pub model_ids: Vec<ModelId>,
    pub status: ToolPathStatus,
    /// Cache version; bumped by [`ToolPath::updated`]
    pub version: u64,
}

impl ToolPath {
    /// Invalidate cached results after the model set changed.
    pub fn updated(&mut self) {
        self.version += 1;
        self.status = ToolPathStatus::Stale;
    }

    pub fn contains(&self, model_id: ModelId) -> bool {
        self.model_ids.contains(&model_id)
    }
}

/// One tool-path association dropped when a model was removed.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedAssociation {
    pub model_id: ModelId,
    pub tool_path_id: ToolPathId,
    /// Position of the model id inside `model_ids`
    pub index: usize,
    /// The tool path itself when it was deleted for becoming empty,
    /// with its position in the group
    pub deleted_tool_path: Option<(usize, ToolPath)>,
}

/// Ordered tool paths of one surface.
#[derive(Debug, Clone, Default)]
pub struct ToolPathGroup {
    tool_paths: Vec<ToolPath>,
    ids: IdAllocator,
}

impl ToolPathGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_tool_path(&mut self, name: impl Into<String>, model_ids: Vec<ModelId>) -> ToolPathId {
        let id = ToolPathId(self.ids.allocate());
        self.tool_paths.push(ToolPath {
            id,
            name: name.into(),
            model_ids,
            status: ToolPathStatus::Stale,
            version: 0,
        });
        id
    }

    pub fn delete_tool_path(&mut self, id: ToolPathId) -> Result<(usize, ToolPath), SceneError> {
        let index = self
            .tool_paths
            .iter()
            .position(|t| t.id == id)
            .ok_or(SceneError::ToolPathNotFound { tool_path_id: id })?;
        Ok((index, self.tool_paths.remove(index)))
    }

    pub fn get(&self, id: ToolPathId) -> Result<&ToolPath, SceneError> {
        self.tool_paths
            .iter()
            .find(|t| t.id == id)
            .ok_or(SceneError::ToolPathNotFound { tool_path_id: id })
    }

    pub fn get_mut(&mut self, id: ToolPathId) -> Result<&mut ToolPath, SceneError> {
        self.tool_paths
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(SceneError::ToolPathNotFound { tool_path_id: id })
    }

    pub fn get_tool_paths(&self) -> &[ToolPath] {
        &self.tool_paths
    }

    pub fn len(&self) -> usize {
        self.tool_paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tool_paths.is_empty()
    }

    /// Tool paths referencing a model.
    pub fn tool_paths_for_model(&self, model_id: ModelId) -> Vec<ToolPathId> {
        self.tool_paths
            .iter()
            .filter(|t| t.contains(model_id))
            .map(|t| t.id)
            .collect()
    }

    /// Drop a model from every tool path, deleting tool paths left empty.
    ///
    /// Tool paths are visited last to first so recorded positions stay valid
    /// when restoring in reverse order.
    pub fn remove_model(&mut self, model_id: ModelId) -> Vec<RemovedAssociation> {
        let mut removed = Vec::new();
        for position in (0..self.tool_paths.len()).rev() {
            let tool_path = &mut self.tool_paths[position];
            let Some(index) = tool_path.model_ids.iter().position(|id| *id == model_id) else {
                continue;
            };
            tool_path.model_ids.remove(index);
            let tool_path_id = tool_path.id;

            let deleted_tool_path = if tool_path.model_ids.is_empty() {
                Some((position, self.tool_paths.remove(position)))
            } else {
                tool_path.updated();
                None
            };

            removed.push(RemovedAssociation {
                model_id,
                tool_path_id,
                index,
                deleted_tool_path,
            });
        }
        if !removed.is_empty() {
            tracing::debug!(
                "Removed {} tool path association(s) of {}",
                removed.len(),
                model_id
            );
        }
        removed
    }

    /// Re-establish associations captured by [`ToolPathGroup::remove_model`].
    pub fn restore_model(&mut self, removed: &[RemovedAssociation]) -> Result<(), SceneError> {
        for association in removed.iter().rev() {
            match &association.deleted_tool_path {
                Some((position, tool_path)) => {
                    let mut tool_path = tool_path.clone();
                    let index = association.index.min(tool_path.model_ids.len());
                    tool_path.model_ids.insert(index, association.model_id);
                    tool_path.updated();
                    self.ids.observe(tool_path.id.get());
                    let position = (*position).min(self.tool_paths.len());
                    self.tool_paths.insert(position, tool_path);
                }
                None => {
                    let tool_path = self.get_mut(association.tool_path_id)?;
                    let index = association.index.min(tool_path.model_ids.len());
                    tool_path.model_ids.insert(index, association.model_id);
                    tool_path.updated();
                }
            }
        }
        Ok(())
    }
}
