use foundation::math::Vec3;

/// Whole-scene rigid transform applied on top of geo-anchoring.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SceneTransform {
    pub translation: Vec3,
    /// Degrees, any real value (conceptually mod 360).
    pub orientation: f64,
    /// Uniform scale, always `> 0`.
    pub scale: f64,
}

impl Default for SceneTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl SceneTransform {
    pub fn identity() -> Self {
        Self {
            translation: Vec3::ZERO,
            orientation: 0.0,
            scale: 1.0,
        }
    }

    /// Returns `true` when every field satisfies the transform invariants.
    pub fn is_valid(&self) -> bool {
        self.translation.is_finite()
            && self.orientation.is_finite()
            && self.scale.is_finite()
            && self.scale > 0.0
    }
}
