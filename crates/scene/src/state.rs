use std::collections::BTreeMap;

use foundation::math::Vec3;

use crate::model::{Model, ModelId, ModelPatch};
use crate::transform::SceneTransform;

/// Mutable per-project scene parameters and placed models.
///
/// Every mutator returns `true` if the state changed. Unknown ids and
/// invalid numbers (non-finite, non-positive scale) leave the state as is.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneState {
    transform: SceneTransform,
    models: BTreeMap<ModelId, Model>,
}

impl SceneState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transform(&self) -> &SceneTransform {
        &self.transform
    }

    pub fn model(&self, id: &ModelId) -> Option<&Model> {
        self.models.get(id)
    }

    /// Models in id order.
    pub fn models(&self) -> impl Iterator<Item = &Model> {
        self.models.values()
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn set_transform(&mut self, transform: SceneTransform) -> bool {
        if !transform.is_valid() || self.transform == transform {
            return false;
        }
        self.transform = transform;
        true
    }

    pub fn set_translation(&mut self, translation: Vec3) -> bool {
        if !translation.is_finite() || self.transform.translation == translation {
            return false;
        }
        self.transform.translation = translation;
        true
    }

    pub fn nudge_translation(&mut self, delta: Vec3) -> bool {
        if delta == Vec3::ZERO {
            return false;
        }
        self.set_translation(self.transform.translation + delta)
    }

    pub fn set_orientation(&mut self, degrees: f64) -> bool {
        if !degrees.is_finite() || self.transform.orientation == degrees {
            return false;
        }
        self.transform.orientation = degrees;
        true
    }

    pub fn rotate(&mut self, delta_degrees: f64) -> bool {
        if delta_degrees == 0.0 {
            return false;
        }
        self.set_orientation(self.transform.orientation + delta_degrees)
    }

    pub fn set_scale(&mut self, scale: f64) -> bool {
        if !scale.is_finite() || scale <= 0.0 || self.transform.scale == scale {
            return false;
        }
        self.transform.scale = scale;
        true
    }

    pub fn reset_transform(&mut self) -> bool {
        self.set_transform(SceneTransform::identity())
    }

    /// Replaces the whole model collection, as when a project is loaded.
    ///
    /// Models with non-finite placement are skipped.
    pub fn replace_models(&mut self, models: impl IntoIterator<Item = Model>) -> bool {
        let models: BTreeMap<ModelId, Model> = models
            .into_iter()
            .filter(|m| {
                let finite = m.is_finite();
                if !finite {
                    tracing::warn!(id = %m.id, "skipping model with non-finite placement");
                }
                finite
            })
            .map(|m| (m.id.clone(), m))
            .collect();
        if models == self.models {
            return false;
        }
        self.models = models;
        true
    }

    pub fn update_model(&mut self, id: &ModelId, patch: &ModelPatch) -> bool {
        if !patch.is_finite() {
            return false;
        }
        let Some(model) = self.models.get_mut(id) else {
            return false;
        };
        let before = model.clone();
        model.apply(patch);
        *model != before
    }

    /// Selects `id` and deselects every other model.
    pub fn select_model(&mut self, id: &ModelId) -> bool {
        if !self.models.contains_key(id) {
            return false;
        }
        let mut changed = false;
        for (model_id, model) in &mut self.models {
            let selected = model_id == id;
            if model.is_selected != selected {
                model.is_selected = selected;
                changed = true;
            }
        }
        changed
    }

    pub fn clear_selection(&mut self) -> bool {
        let mut changed = false;
        for model in self.models.values_mut() {
            if model.is_selected {
                model.is_selected = false;
                changed = true;
            }
        }
        changed
    }

    pub fn selected_model(&self) -> Option<&Model> {
        self.models.values().find(|m| m.is_selected)
    }
}
