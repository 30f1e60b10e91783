//! Every state transition of a session, as a serializable record.
//!
//! The wire form is `{"type": "SET_SCALE", "payload": 1.5}`; actions without
//! data omit `payload`.

use foundation::math::{Vec2, Vec3};
use formats::LightDocument;
use scene::{
    AmbientLight, DeviceFix, DirectionalLight, DirectionalLightPatch, LightId, LightPatch, Model,
    ModelId, ModelPatch, ReferenceLocation, SpotLight, SpotLightPatch, TrackingState,
};
use serde::{Deserialize, Serialize};

use crate::state::LoadedProject;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    // Scene transform.
    SetTranslation(Vec3),
    NudgeTranslation(Vec3),
    SetOrientation(f64),
    RotateScene(f64),
    SetScale(f64),
    ResetTransform,

    // Models.
    SetModels(Vec<Model>),
    UpdateModel { id: ModelId, changes: ModelPatch },
    SelectModel(ModelId),
    ClearSelection,

    // Lights.
    AddAmbientLight(AmbientLight),
    UpdateAmbientLight { id: LightId, changes: LightPatch },
    RemoveAmbientLight(LightId),
    AddDirectionalLight(DirectionalLight),
    UpdateDirectionalLight { id: LightId, changes: DirectionalLightPatch },
    RemoveDirectionalLight(LightId),
    AddSpotLight(SpotLight),
    UpdateSpotLight { id: LightId, changes: SpotLightPatch },
    RemoveSpotLight(LightId),
    HideSpotLight(LightId),
    SetLights(Vec<LightDocument>),

    // Settings.
    SetAutoSave(bool),
    SetSaveLights(bool),
    SetUnsavedChanges(bool),
    SetStepSize(f64),
    SetAngleStepSize(f64),

    // Project.
    LoadProject(Box<LoadedProject>),
    SetReferenceLocation(ReferenceLocation),
    SetCorners(Vec<Vec2>),
    SetProjectName(String),
    CompleteSetup,

    // Device.
    SetDeviceFix(DeviceFix),
    SetTrackingState(TrackingState),

    Logout,

    /// An action type this build does not know. Reducers ignore it.
    #[serde(skip)]
    Unrecognized(String),
}

/// Every `type` string [`Action`] decodes.
pub const ACTION_KINDS: &[&str] = &[
    "SET_TRANSLATION",
    "NUDGE_TRANSLATION",
    "SET_ORIENTATION",
    "ROTATE_SCENE",
    "SET_SCALE",
    "RESET_TRANSFORM",
    "SET_MODELS",
    "UPDATE_MODEL",
    "SELECT_MODEL",
    "CLEAR_SELECTION",
    "ADD_AMBIENT_LIGHT",
    "UPDATE_AMBIENT_LIGHT",
    "REMOVE_AMBIENT_LIGHT",
    "ADD_DIRECTIONAL_LIGHT",
    "UPDATE_DIRECTIONAL_LIGHT",
    "REMOVE_DIRECTIONAL_LIGHT",
    "ADD_SPOT_LIGHT",
    "UPDATE_SPOT_LIGHT",
    "REMOVE_SPOT_LIGHT",
    "HIDE_SPOT_LIGHT",
    "SET_LIGHTS",
    "SET_AUTO_SAVE",
    "SET_SAVE_LIGHTS",
    "SET_UNSAVED_CHANGES",
    "SET_STEP_SIZE",
    "SET_ANGLE_STEP_SIZE",
    "LOAD_PROJECT",
    "SET_REFERENCE_LOCATION",
    "SET_CORNERS",
    "SET_PROJECT_NAME",
    "COMPLETE_SETUP",
    "SET_DEVICE_FIX",
    "SET_TRACKING_STATE",
    "LOGOUT",
];

#[derive(Debug)]
pub enum ActionDecodeError {
    /// Not an object with a string `type`.
    Malformed(serde_json::Error),
    /// Known `type` with a payload of the wrong shape.
    Payload {
        kind: String,
        source: serde_json::Error,
    },
}

impl std::fmt::Display for ActionDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionDecodeError::Malformed(e) => write!(f, "malformed action: {e}"),
            ActionDecodeError::Payload { kind, source } => {
                write!(f, "invalid payload for {kind}: {source}")
            }
        }
    }
}

impl std::error::Error for ActionDecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ActionDecodeError::Malformed(e) => Some(e),
            ActionDecodeError::Payload { source, .. } => Some(source),
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
}

impl Action {
    /// Decodes one action. Unknown types become [`Action::Unrecognized`].
    pub fn from_value(value: serde_json::Value) -> Result<Self, ActionDecodeError> {
        let envelope = Envelope::deserialize(&value).map_err(ActionDecodeError::Malformed)?;
        if !ACTION_KINDS.contains(&envelope.kind.as_str()) {
            return Ok(Action::Unrecognized(envelope.kind));
        }
        serde_json::from_value(value).map_err(|source| ActionDecodeError::Payload {
            kind: envelope.kind,
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, ActionDecodeError> {
        let value = serde_json::from_str(text).map_err(ActionDecodeError::Malformed)?;
        Self::from_value(value)
    }

    /// Decodes a JSON array of actions.
    pub fn list_from_json(text: &str) -> Result<Vec<Self>, ActionDecodeError> {
        let values: Vec<serde_json::Value> =
            serde_json::from_str(text).map_err(ActionDecodeError::Malformed)?;
        values.into_iter().map(Self::from_value).collect()
    }

    pub fn kind(&self) -> &str {
        match self {
            Action::SetTranslation(_) => "SET_TRANSLATION",
            Action::NudgeTranslation(_) => "NUDGE_TRANSLATION",
            Action::SetOrientation(_) => "SET_ORIENTATION",
            Action::RotateScene(_) => "ROTATE_SCENE",
            Action::SetScale(_) => "SET_SCALE",
            Action::ResetTransform => "RESET_TRANSFORM",
            Action::SetModels(_) => "SET_MODELS",
            Action::UpdateModel { .. } => "UPDATE_MODEL",
            Action::SelectModel(_) => "SELECT_MODEL",
            Action::ClearSelection => "CLEAR_SELECTION",
            Action::AddAmbientLight(_) => "ADD_AMBIENT_LIGHT",
            Action::UpdateAmbientLight { .. } => "UPDATE_AMBIENT_LIGHT",
            Action::RemoveAmbientLight(_) => "REMOVE_AMBIENT_LIGHT",
            Action::AddDirectionalLight(_) => "ADD_DIRECTIONAL_LIGHT",
            Action::UpdateDirectionalLight { .. } => "UPDATE_DIRECTIONAL_LIGHT",
            Action::RemoveDirectionalLight(_) => "REMOVE_DIRECTIONAL_LIGHT",
            Action::AddSpotLight(_) => "ADD_SPOT_LIGHT",
            Action::UpdateSpotLight { .. } => "UPDATE_SPOT_LIGHT",
            Action::RemoveSpotLight(_) => "REMOVE_SPOT_LIGHT",
            Action::HideSpotLight(_) => "HIDE_SPOT_LIGHT",
            Action::SetLights(_) => "SET_LIGHTS",
            Action::SetAutoSave(_) => "SET_AUTO_SAVE",
            Action::SetSaveLights(_) => "SET_SAVE_LIGHTS",
            Action::SetUnsavedChanges(_) => "SET_UNSAVED_CHANGES",
            Action::SetStepSize(_) => "SET_STEP_SIZE",
            Action::SetAngleStepSize(_) => "SET_ANGLE_STEP_SIZE",
            Action::LoadProject(_) => "LOAD_PROJECT",
            Action::SetReferenceLocation(_) => "SET_REFERENCE_LOCATION",
            Action::SetCorners(_) => "SET_CORNERS",
            Action::SetProjectName(_) => "SET_PROJECT_NAME",
            Action::CompleteSetup => "COMPLETE_SETUP",
            Action::SetDeviceFix(_) => "SET_DEVICE_FIX",
            Action::SetTrackingState(_) => "SET_TRACKING_STATE",
            Action::Logout => "LOGOUT",
            Action::Unrecognized(kind) => kind,
        }
    }

    /// Edits to persisted project content. A change caused by one of these
    /// marks the session as having unsaved changes.
    pub fn is_content_edit(&self) -> bool {
        matches!(
            self,
            Action::SetTranslation(_)
                | Action::NudgeTranslation(_)
                | Action::SetOrientation(_)
                | Action::RotateScene(_)
                | Action::SetScale(_)
                | Action::ResetTransform
                | Action::SetModels(_)
                | Action::UpdateModel { .. }
                | Action::AddAmbientLight(_)
                | Action::UpdateAmbientLight { .. }
                | Action::RemoveAmbientLight(_)
                | Action::AddDirectionalLight(_)
                | Action::UpdateDirectionalLight { .. }
                | Action::RemoveDirectionalLight(_)
                | Action::AddSpotLight(_)
                | Action::UpdateSpotLight { .. }
                | Action::RemoveSpotLight(_)
                | Action::HideSpotLight(_)
                | Action::SetLights(_)
                | Action::SetReferenceLocation(_)
                | Action::SetCorners(_)
                | Action::SetProjectName(_)
                | Action::CompleteSetup
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{ACTION_KINDS, Action, ActionDecodeError};
    use foundation::math::Vec3;
    use scene::LightId;

    #[test]
    fn decodes_adjacently_tagged_actions() {
        let action = Action::from_json(r#"{"type":"SET_TRANSLATION","payload":{"x":1,"y":2,"z":3}}"#)
            .expect("decode");
        assert_eq!(action, Action::SetTranslation(Vec3::new(1.0, 2.0, 3.0)));

        let reset = Action::from_json(r#"{"type":"RESET_TRANSFORM"}"#).expect("decode");
        assert_eq!(reset, Action::ResetTransform);
    }

    #[test]
    fn struct_payloads_use_field_names() {
        let action = Action::from_json(
            r#"{"type":"UPDATE_SPOT_LIGHT","payload":{"id":4,"changes":{"outerAngle":30.0,"intensity":50.0}}}"#,
        )
        .expect("decode");
        let Action::UpdateSpotLight { id, changes } = action else {
            panic!("wrong variant");
        };
        assert_eq!(id, LightId(4));
        assert_eq!(changes.outer_angle, Some(30.0));
        assert_eq!(changes.common.intensity, Some(50.0));
        assert_eq!(changes.position, None);
    }

    #[test]
    fn unknown_types_are_unrecognized_not_errors() {
        let action = Action::from_json(r#"{"type":"SET_WEATHER","payload":12}"#).expect("decode");
        assert_eq!(action, Action::Unrecognized("SET_WEATHER".to_string()));
        assert_eq!(action.kind(), "SET_WEATHER");
    }

    #[test]
    fn bad_payload_for_known_type_is_an_error() {
        let err = Action::from_json(r#"{"type":"SET_SCALE","payload":"big"}"#)
            .expect_err("payload is not a number");
        assert!(matches!(err, ActionDecodeError::Payload { ref kind, .. } if kind == "SET_SCALE"));
        assert!(matches!(
            Action::from_json("[1,2]"),
            Err(ActionDecodeError::Malformed(_))
        ));
    }

    #[test]
    fn serialized_kind_matches_kind_table() {
        let samples = [
            Action::SetScale(2.0),
            Action::ClearSelection,
            Action::HideSpotLight(LightId(1)),
            Action::SetUnsavedChanges(false),
            Action::CompleteSetup,
            Action::Logout,
        ];
        for action in samples {
            let value = serde_json::to_value(&action).expect("encode");
            let kind = value["type"].as_str().expect("type field");
            assert_eq!(kind, action.kind());
            assert!(ACTION_KINDS.contains(&kind));
            assert_eq!(Action::from_value(value).expect("decode"), action);
        }
    }

    #[test]
    fn decodes_action_lists() {
        let actions = Action::list_from_json(
            r#"[{"type":"SET_SCALE","payload":2.0},{"type":"NOPE"},{"type":"LOGOUT"}]"#,
        )
        .expect("decode");
        assert_eq!(actions.len(), 3);
        assert_eq!(actions[1], Action::Unrecognized("NOPE".to_string()));
    }
}
