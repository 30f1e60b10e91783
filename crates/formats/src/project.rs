use foundation::math::{GeoError, GeoPoint, Vec2, Vec3};
use foundation::time::TimestampMs;
use scene::{
    Light, LightId, LightState, Model, ModelId, ModelScale, ReferenceLocation, SceneState,
    SceneTransform,
};
use serde::{Deserialize, Serialize};

/// A project as stored by the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    pub id: String,
    pub project_name: String,
    /// Room outline marked during setup, in local meters.
    #[serde(default)]
    pub corners: Vec<Vec2>,
    #[serde(default)]
    pub objects: Vec<ModelObject>,
    #[serde(default)]
    pub lights: Vec<LightDocument>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub orientation: Option<f64>,
    #[serde(default)]
    pub scene: SceneTransform,
    #[serde(default = "default_true")]
    pub is_first_time: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
    pub created_at: TimestampMs,
    pub modified_at: TimestampMs,
}

fn default_true() -> bool {
    true
}

/// A placed model as persisted; display name and url are resolved at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelObject {
    pub id: String,
    /// Id of the [`ModelDocument`] describing the asset.
    pub model_id: String,
    pub position: Vec3,
    pub rotation: Vec3,
    #[serde(default)]
    pub scale: ModelScale,
    #[serde(default = "default_true")]
    pub is_visible: bool,
}

/// Catalog metadata for a furniture asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDocument {
    pub id: String,
    pub name: String,
    /// Storage path of the asset; resolved to a url by the store.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightDocument {
    pub id: LightId,
    #[serde(flatten)]
    pub light: Light,
}

#[derive(Debug)]
pub enum DocumentError {
    Parse(serde_json::Error),
    InvalidReference(GeoError),
    PartialReference,
    InvalidScene,
}

impl std::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentError::Parse(err) => write!(f, "project parse error: {err}"),
            DocumentError::InvalidReference(err) => write!(f, "invalid reference location: {err}"),
            DocumentError::PartialReference => {
                write!(f, "reference location needs both latitude and longitude")
            }
            DocumentError::InvalidScene => write!(f, "scene transform is out of range"),
        }
    }
}

impl std::error::Error for DocumentError {}

impl ProjectDocument {
    pub fn new(id: impl Into<String>, project_name: impl Into<String>, now: TimestampMs) -> Self {
        Self {
            id: id.into(),
            project_name: project_name.into(),
            corners: Vec::new(),
            objects: Vec::new(),
            lights: Vec::new(),
            latitude: None,
            longitude: None,
            orientation: None,
            scene: SceneTransform::identity(),
            is_first_time: true,
            thumb: None,
            created_at: now,
            modified_at: now,
        }
    }

    pub fn from_json(payload: &str) -> Result<Self, DocumentError> {
        serde_json::from_str(payload).map_err(DocumentError::Parse)
    }

    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        serde_json::to_string_pretty(self).map_err(DocumentError::Parse)
    }

    /// Saved reference location, if the project was set up.
    ///
    /// A missing location is not an error. Coordinates out of range, or only
    /// one of latitude/longitude present, are.
    pub fn reference_location(&self) -> Result<Option<ReferenceLocation>, DocumentError> {
        match (self.latitude, self.longitude) {
            (None, None) => Ok(None),
            (Some(lat), Some(long)) => {
                let point = GeoPoint::new(lat, long).map_err(DocumentError::InvalidReference)?;
                Ok(Some(ReferenceLocation {
                    point,
                    orientation: self.orientation.unwrap_or(0.0),
                }))
            }
            _ => Err(DocumentError::PartialReference),
        }
    }

    pub fn set_reference_location(&mut self, reference: Option<ReferenceLocation>) {
        self.latitude = reference.map(|r| r.point.latitude);
        self.longitude = reference.map(|r| r.point.longitude);
        self.orientation = reference.map(|r| r.orientation);
    }

    pub fn validated_scene(&self) -> Result<SceneTransform, DocumentError> {
        if self.scene.is_valid() {
            Ok(self.scene)
        } else {
            Err(DocumentError::InvalidScene)
        }
    }

    /// Fills objects and scene transform from `scene`.
    pub fn write_scene(&mut self, scene: &SceneState) {
        self.scene = *scene.transform();
        self.objects = scene.models().map(ModelObject::from_model).collect();
    }

    pub fn write_lights(&mut self, lights: &LightState) {
        self.lights = lights
            .lights()
            .into_iter()
            .map(|(id, light)| LightDocument { id, light })
            .collect();
    }

    /// Hash of the persisted content, ignoring `modifiedAt`.
    ///
    /// Two saves of an unchanged project produce the same hash.
    pub fn content_hash(&self) -> String {
        let mut canonical = self.clone();
        canonical.modified_at = TimestampMs(0);
        let bytes = serde_json::to_vec(&canonical).unwrap_or_default();
        blake3::hash(&bytes).to_hex().to_string()
    }
}

impl ModelObject {
    pub fn from_model(model: &Model) -> Self {
        Self {
            id: model.id.0.clone(),
            model_id: model.asset_id.clone(),
            position: model.position,
            rotation: model.rotation,
            scale: model.scale,
            is_visible: model.is_visible,
        }
    }

    /// Builds the in-session model once its metadata and url are known.
    pub fn into_model(self, name: impl Into<String>, url: impl Into<String>) -> Model {
        Model {
            id: ModelId(self.id),
            asset_id: self.model_id,
            name: name.into(),
            url: url.into(),
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
            is_visible: self.is_visible,
            is_selected: false,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }
}
