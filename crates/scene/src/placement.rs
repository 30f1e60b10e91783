//! World placement handed to the renderer.
//!
//! Combines the geo-anchor frame with the scene transform. Hidden models and
//! lights are left out. While AR tracking is unavailable the frame is empty;
//! the underlying state is never altered by placement.

use foundation::math::{Vec3, rotate_2d, rotate_around_origin};

use crate::anchor::{AnchorFrame, DeviceFix, GeoAnchor};
use crate::light::{Light, LightId};
use crate::lights::LightState;
use crate::model::ModelId;
use crate::state::SceneState;
use crate::transform::SceneTransform;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum TrackingState {
    Normal,
    #[default]
    Unavailable,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ModelPlacement {
    pub id: ModelId,
    pub url: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub is_selected: bool,
}

/// A light with its position and direction expressed in world space.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LightPlacement {
    pub id: LightId,
    pub light: Light,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RenderFrame {
    pub models: Vec<ModelPlacement>,
    pub lights: Vec<LightPlacement>,
}

impl RenderFrame {
    pub fn is_empty(&self) -> bool {
        self.models.is_empty() && self.lights.is_empty()
    }
}

struct Placer<'a> {
    anchor: AnchorFrame,
    transform: &'a SceneTransform,
}

impl Placer<'_> {
    fn position(&self, local: Vec3) -> Vec3 {
        let t = self.transform;
        let anchored = self.anchor.position(local);
        let placed = anchored * t.scale + t.translation;
        rotate_around_origin(placed, t.translation, t.orientation)
    }

    fn rotation(&self, rotation: Vec3) -> Vec3 {
        let r = self.anchor.rotation(rotation);
        Vec3::new(r.x, r.y + self.transform.orientation, r.z)
    }

    fn direction(&self, direction: Vec3) -> Vec3 {
        let angle = if self.anchor.is_identity() {
            self.transform.orientation
        } else {
            self.anchor.orientation() + self.transform.orientation
        };
        let (x, z) = rotate_2d(direction.x, direction.z, angle);
        Vec3::new(x, direction.y, z)
    }

    fn light(&self, light: &Light) -> Light {
        match light {
            Light::Ambient(l) => Light::Ambient(l.clone()),
            Light::Directional(l) => {
                let mut l = l.clone();
                l.direction = self.direction(l.direction);
                Light::Directional(l)
            }
            Light::Spot(l) => {
                let mut l = l.clone();
                l.position = self.position(l.position);
                l.direction = self.direction(l.direction);
                Light::Spot(l)
            }
        }
    }
}

/// Computes world placements for every visible model and light.
pub fn compute_frame(
    scene: &SceneState,
    lights: &LightState,
    anchor: &GeoAnchor,
    device: Option<DeviceFix>,
    tracking: TrackingState,
) -> RenderFrame {
    if tracking == TrackingState::Unavailable {
        return RenderFrame::default();
    }

    let placer = Placer {
        anchor: anchor.frame(device),
        transform: scene.transform(),
    };
    let scene_scale = scene.transform().scale;

    let models = scene
        .models()
        .filter(|m| m.is_visible)
        .map(|m| ModelPlacement {
            id: m.id.clone(),
            url: m.url.clone(),
            position: placer.position(m.position),
            rotation: placer.rotation(m.rotation),
            scale: m.scale.to_vec3() * scene_scale,
            is_selected: m.is_selected,
        })
        .collect();

    let lights = lights
        .lights()
        .into_iter()
        .filter(|(_, l)| l.common().is_visible)
        .map(|(id, l)| LightPlacement {
            id,
            light: placer.light(&l),
        })
        .collect();

    RenderFrame { models, lights }
}

#[cfg(test)]
mod tests {
    use super::{TrackingState, compute_frame};
    use crate::anchor::{DeviceFix, GeoAnchor, ReferenceLocation};
    use crate::light::{DirectionalLight, Light, SpotLight};
    use crate::lights::LightState;
    use crate::model::{Model, ModelId, ModelPatch};
    use crate::state::SceneState;
    use foundation::math::{GeoPoint, Vec3};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn assert_vec_close(a: Vec3, b: Vec3, eps: f64) {
        assert_close(a.x, b.x, eps);
        assert_close(a.y, b.y, eps);
        assert_close(a.z, b.z, eps);
    }

    fn one_model_at(position: Vec3) -> SceneState {
        let mut model = Model::new(ModelId::new("m"), "asset", "Sofa");
        model.position = position;
        let mut scene = SceneState::new();
        scene.replace_models([model]);
        scene
    }

    #[test]
    fn unavailable_tracking_renders_nothing() {
        let scene = one_model_at(Vec3::new(1.0, 0.0, 0.0));
        let before = scene.clone();
        let frame = compute_frame(
            &scene,
            &LightState::new(),
            &GeoAnchor::default(),
            None,
            TrackingState::Unavailable,
        );
        assert!(frame.is_empty());
        assert_eq!(scene, before);
    }

    #[test]
    fn reference_point_renders_authored_position() {
        let point = GeoPoint::new_unchecked(52.2051982, 20.9665666);
        let anchor = GeoAnchor::new(Some(ReferenceLocation {
            point,
            orientation: 0.0,
        }));
        let device = DeviceFix {
            point,
            heading: 0.0,
        };
        let scene = one_model_at(Vec3::new(1.0, 0.0, 0.0));
        let frame = compute_frame(
            &scene,
            &LightState::new(),
            &anchor,
            Some(device),
            TrackingState::Normal,
        );
        assert_eq!(frame.models.len(), 1);
        assert_vec_close(frame.models[0].position, Vec3::new(1.0, 0.0, 0.0), 1e-12);
    }

    #[test]
    fn device_east_of_reference_shifts_model() {
        let anchor = GeoAnchor::new(Some(ReferenceLocation {
            point: GeoPoint::new_unchecked(0.0, 0.0),
            orientation: 0.0,
        }));
        let device = DeviceFix {
            point: GeoPoint::new_unchecked(0.0, 0.001),
            heading: 0.0,
        };
        let scene = one_model_at(Vec3::ZERO);
        let frame = compute_frame(
            &scene,
            &LightState::new(),
            &anchor,
            Some(device),
            TrackingState::Normal,
        );
        assert_vec_close(frame.models[0].position, Vec3::new(111.0, 0.0, 0.0), 1.0);
    }

    #[test]
    fn scene_transform_scales_translates_then_rotates() {
        let mut scene = one_model_at(Vec3::new(1.0, 0.5, 0.0));
        scene.set_scale(2.0);
        scene.set_translation(Vec3::new(10.0, 0.0, 0.0));
        scene.set_orientation(90.0);

        let frame = compute_frame(
            &scene,
            &LightState::new(),
            &GeoAnchor::default(),
            None,
            TrackingState::Normal,
        );
        let placed = &frame.models[0];
        assert_vec_close(placed.position, Vec3::new(10.0, 1.0, 2.0), 1e-9);
        assert_close(placed.rotation.y, 90.0, 1e-12);
        assert_eq!(placed.scale, Vec3::splat(2.0));
    }

    #[test]
    fn hidden_entities_are_filtered() {
        let mut scene = one_model_at(Vec3::ZERO);
        scene.update_model(&ModelId::new("m"), &ModelPatch::visibility(false));

        let mut lights = LightState::new();
        let hidden = lights.add_spot(SpotLight::new("hidden")).expect("finite");
        lights.hide_spot(hidden);
        lights.add_directional(DirectionalLight::new("sun"));

        let frame = compute_frame(
            &scene,
            &lights,
            &GeoAnchor::default(),
            None,
            TrackingState::Normal,
        );
        assert!(frame.models.is_empty());
        assert_eq!(frame.lights.len(), 1);
        assert!(matches!(frame.lights[0].light, Light::Directional(_)));
    }

    #[test]
    fn spot_light_follows_scene_rotation() {
        let mut scene = SceneState::new();
        scene.set_orientation(90.0);
        let mut lights = LightState::new();
        let mut spot = SpotLight::new("lamp");
        spot.position = Vec3::new(1.0, 2.0, 0.0);
        spot.direction = Vec3::new(1.0, 0.0, 0.0);
        lights.add_spot(spot);

        let frame = compute_frame(
            &scene,
            &lights,
            &GeoAnchor::default(),
            None,
            TrackingState::Normal,
        );
        let Light::Spot(placed) = &frame.lights[0].light else {
            panic!("expected spot light");
        };
        assert_vec_close(placed.position, Vec3::new(0.0, 2.0, 1.0), 1e-9);
        assert_vec_close(placed.direction, Vec3::new(0.0, 0.0, 1.0), 1e-9);
    }
}
