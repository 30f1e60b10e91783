use foundation::math::Vec3;

/// Stable identifier of a placed model within a project.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ModelId(pub String);

impl ModelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ModelScale {
    Uniform(f64),
    PerAxis(Vec3),
}

impl Default for ModelScale {
    fn default() -> Self {
        ModelScale::Uniform(1.0)
    }
}

impl ModelScale {
    pub fn to_vec3(self) -> Vec3 {
        match self {
            ModelScale::Uniform(s) => Vec3::splat(s),
            ModelScale::PerAxis(v) => v,
        }
    }

    pub fn is_finite(self) -> bool {
        self.to_vec3().is_finite()
    }
}

/// A placed furniture model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Model {
    pub id: ModelId,
    /// Id of the catalog document this model was instantiated from.
    pub asset_id: String,
    pub name: String,
    pub url: String,
    pub position: Vec3,
    /// Euler angles in degrees.
    pub rotation: Vec3,
    pub scale: ModelScale,
    pub is_visible: bool,
    pub is_selected: bool,
}

impl Model {
    pub fn new(id: ModelId, asset_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            asset_id: asset_id.into(),
            name: name.into(),
            url: String::new(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: ModelScale::default(),
            is_visible: true,
            is_selected: false,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }

    /// Shallow-merges `patch` into this model.
    ///
    /// Selection is not part of a patch; it goes through the scene so it stays
    /// exclusive.
    pub fn apply(&mut self, patch: &ModelPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(url) = &patch.url {
            self.url.clone_from(url);
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(scale) = patch.scale {
            self.scale = scale;
        }
        if let Some(is_visible) = patch.is_visible {
            self.is_visible = is_visible;
        }
    }
}

/// Partial model update; `None` fields are left as they are.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ModelPatch {
    pub name: Option<String>,
    pub url: Option<String>,
    pub position: Option<Vec3>,
    pub rotation: Option<Vec3>,
    pub scale: Option<ModelScale>,
    pub is_visible: Option<bool>,
}

impl ModelPatch {
    /// Numeric fields must be finite to enter the model.
    pub fn is_finite(&self) -> bool {
        self.position.is_none_or(Vec3::is_finite)
            && self.rotation.is_none_or(Vec3::is_finite)
            && self.scale.is_none_or(ModelScale::is_finite)
    }

    pub fn visibility(is_visible: bool) -> Self {
        Self {
            is_visible: Some(is_visible),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Model, ModelId, ModelPatch, ModelScale};
    use foundation::math::Vec3;

    #[test]
    fn patch_merges_only_present_fields() {
        let mut model = Model::new(ModelId::new("0"), "chair", "Chair");
        model.position = Vec3::new(1.0, 2.0, 3.0);

        model.apply(&ModelPatch {
            rotation: Some(Vec3::new(0.0, 90.0, 0.0)),
            ..ModelPatch::default()
        });

        assert_eq!(model.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(model.rotation, Vec3::new(0.0, 90.0, 0.0));
        assert_eq!(model.name, "Chair");
        assert!(model.is_visible);
    }

    #[test]
    fn uniform_scale_expands_to_all_axes() {
        assert_eq!(ModelScale::Uniform(2.0).to_vec3(), Vec3::splat(2.0));
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(ModelScale::PerAxis(v).to_vec3(), v);
    }

    #[test]
    fn patch_with_nan_is_not_finite() {
        let patch = ModelPatch {
            position: Some(Vec3::new(f64::NAN, 0.0, 0.0)),
            ..ModelPatch::default()
        };
        assert!(!patch.is_finite());
        assert!(ModelPatch::visibility(false).is_finite());
    }
}
