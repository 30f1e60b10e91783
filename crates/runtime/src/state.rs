use foundation::math::Vec2;
use foundation::time::TimestampMs;
use formats::LightDocument;
use scene::{
    DeviceFix, LightState, Model, ReferenceLocation, SceneState, SceneTransform, TrackingState,
};
use serde::{Deserialize, Serialize};

/// Editor preferences and the dirty flag driving autosave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub auto_save: bool,
    /// Whether lights are written along with the project.
    pub save_lights: bool,
    pub unsaved_changes: bool,
    /// Nudge step for translations, in meters.
    pub step_size: f64,
    /// Nudge step for rotations, in degrees.
    pub angle_step_size: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_save: true,
            save_lights: true,
            unsaved_changes: false,
            step_size: 0.1,
            angle_step_size: 5.0,
        }
    }
}

/// Identity of the open project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMeta {
    pub id: String,
    pub name: String,
    pub created_at: TimestampMs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectState {
    /// `None` until a project is loaded.
    pub meta: Option<ProjectMeta>,
    /// Captured once per project; never overwritten by a later capture.
    pub reference: Option<ReferenceLocation>,
    pub corners: Vec<Vec2>,
    pub is_first_time: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DeviceState {
    pub fix: Option<DeviceFix>,
    pub tracking: TrackingState,
}

/// Everything a session holds. Only the reducers produce new values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub project: ProjectState,
    pub scene: SceneState,
    pub lights: LightState,
    pub settings: Settings,
    pub device: DeviceState,
}

/// Payload of `LOAD_PROJECT`: a fetched project with its models resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedProject {
    pub meta: ProjectMeta,
    #[serde(default)]
    pub reference: Option<ReferenceLocation>,
    #[serde(default)]
    pub corners: Vec<Vec2>,
    pub is_first_time: bool,
    #[serde(default)]
    pub transform: SceneTransform,
    #[serde(default)]
    pub models: Vec<Model>,
    #[serde(default)]
    pub lights: Vec<LightDocument>,
}
