//! SVG-backed models and the model group that orders them.

use lubankit_core::{IdAllocator, ModelId, SceneError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Transformation;

/// Where a model's content came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Svg,
    Raster,
    Text,
    Dxf,
}

/// Image processing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessMode {
    Bw,
    Greyscale,
    Vector,
    Trace,
}

/// A 2D model placed on an editing surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvgModel {
    pub model_id: ModelId,
    pub name: String,
    pub source_type: SourceType,
    pub mode: ProcessMode,
    pub transformation: Transformation,
    pub visible: bool,
    /// Processing parameters, opaque to the editor
    pub config: BTreeMap<String, serde_json::Value>,
    pub upload_name: Option<String>,
    /// Reference of the processed image shown on the canvas
    pub processed_image: Option<String>,
    /// Bumped whenever the model source is regenerated
    pub source_version: u64,
}

impl SvgModel {
    /// Whether the model needs an image load before geometry changes settle
    pub fn is_raster(&self) -> bool {
        matches!(self.source_type, SourceType::Raster)
    }

    /// Mark the source as regenerated
    pub fn update_source(&mut self) {
        self.source_version += 1;
    }
}

/// Ordered collection of models with a selection.
#[derive(Debug, Clone, Default)]
pub struct ModelGroup {
    models: Vec<SvgModel>,
    selected: Vec<ModelId>,
    ids: IdAllocator,
    version: u64,
}

impl ModelGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve an id for a model about to be created.
    pub fn next_model_id(&mut self) -> ModelId {
        ModelId(self.ids.allocate())
    }

    /// Insert a model at `index` (clamped), or at the top when `None`.
    pub fn add_model(&mut self, model: SvgModel, index: Option<usize>) -> Result<(), SceneError> {
        if self.contains(model.model_id) {
            return Err(SceneError::DuplicateModel {
                model_id: model.model_id,
            });
        }
        self.ids.observe(model.model_id.get());
        let index = index.map_or(self.models.len(), |i| i.min(self.models.len()));
        self.models.insert(index, model);
        Ok(())
    }

    /// Detach a model, returning it with its former index.
    pub fn remove_model(&mut self, model_id: ModelId) -> Result<(usize, SvgModel), SceneError> {
        let index = self
            .index_of(model_id)
            .ok_or(SceneError::ModelNotFound { model_id })?;
        self.selected.retain(|id| *id != model_id);
        Ok((index, self.models.remove(index)))
    }

    pub fn contains(&self, model_id: ModelId) -> bool {
        self.index_of(model_id).is_some()
    }

    pub fn index_of(&self, model_id: ModelId) -> Option<usize> {
        self.models.iter().position(|m| m.model_id == model_id)
    }

    pub fn get(&self, model_id: ModelId) -> Result<&SvgModel, SceneError> {
        self.models
            .iter()
            .find(|m| m.model_id == model_id)
            .ok_or(SceneError::ModelNotFound { model_id })
    }

    pub fn get_mut(&mut self, model_id: ModelId) -> Result<&mut SvgModel, SceneError> {
        self.models
            .iter_mut()
            .find(|m| m.model_id == model_id)
            .ok_or(SceneError::ModelNotFound { model_id })
    }

    pub fn models(&self) -> impl Iterator<Item = &SvgModel> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Replace the selection.
    pub fn select_models(&mut self, ids: &[ModelId]) -> Result<(), SceneError> {
        for id in ids {
            if !self.contains(*id) {
                return Err(SceneError::ModelNotFound { model_id: *id });
            }
        }
        self.selected = ids.to_vec();
        self.selected.dedup();
        Ok(())
    }

    pub fn unselect_all(&mut self) {
        self.selected.clear();
    }

    pub fn selected_ids(&self) -> &[ModelId] {
        &self.selected
    }

    /// Selected models in selection order.
    pub fn selected_models(&self) -> Vec<&SvgModel> {
        self.selected
            .iter()
            .filter_map(|id| self.get(*id).ok())
            .collect()
    }

    /// Signal that the group changed and views must refresh.
    pub fn model_changed(&mut self) {
        self.version += 1;
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}
