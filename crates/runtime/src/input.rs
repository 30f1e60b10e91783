//! Parsing of user-entered text fields into actions.
//!
//! Every field is checked; a form with any invalid field produces a
//! [`ValidationError`] naming all of them, and no action.

use foundation::math::Vec3;
use scene::{Color, DirectionalLightPatch, LightId, LightPatch, ModelId, ModelPatch, ModelScale, SpotLightPatch};

use crate::action::Action;
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub text: String,
    pub reason: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid input:")?;
        for (i, err) in self.fields.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{} ({}: {:?})", err.field, err.reason, err.text)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collects field errors while parsing a form.
#[derive(Debug, Default)]
struct Fields {
    errors: Vec<FieldError>,
}

impl Fields {
    fn reject(&mut self, field: &str, text: &str, reason: &'static str) {
        self.errors.push(FieldError {
            field: field.to_string(),
            text: text.to_string(),
            reason,
        });
    }

    fn number(&mut self, field: &str, text: &str) -> f64 {
        match text.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            Ok(_) => {
                self.reject(field, text, "not finite");
                f64::NAN
            }
            Err(_) => {
                self.reject(field, text, "not a number");
                f64::NAN
            }
        }
    }

    fn positive(&mut self, field: &str, text: &str) -> f64 {
        let before = self.errors.len();
        let v = self.number(field, text);
        if self.errors.len() == before && v <= 0.0 {
            self.reject(field, text, "must be positive");
        }
        v
    }

    fn optional_number(&mut self, field: &str, text: &Option<String>) -> Option<f64> {
        text.as_deref().map(|t| self.number(field, t))
    }

    fn vec3(&mut self, field: &str, text: &[String; 3]) -> Vec3 {
        Vec3::new(
            self.number(&format!("{field}.x"), &text[0]),
            self.number(&format!("{field}.y"), &text[1]),
            self.number(&format!("{field}.z"), &text[2]),
        )
    }

    fn optional_vec3(&mut self, field: &str, text: &Option<[String; 3]>) -> Option<Vec3> {
        text.as_ref().map(|t| self.vec3(field, t))
    }

    fn color(&mut self, field: &str, text: &Option<String>) -> Option<Color> {
        let text = text.as_deref()?;
        match Color::from_hex(text.trim()) {
            Ok(c) => Some(c),
            Err(_) => {
                self.reject(field, text, "not a #rrggbb color");
                None
            }
        }
    }

    fn finish<T>(self, value: T) -> Result<T, ValidationError> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(ValidationError {
                fields: self.errors,
            })
        }
    }
}

/// Edited fields shared by every light kind. `None` means "unchanged".
#[derive(Debug, Clone, Default)]
pub struct LightForm {
    pub name: Option<String>,
    pub color: Option<String>,
    pub intensity: Option<String>,
    pub is_visible: Option<bool>,
}

impl LightForm {
    fn parse(&self, fields: &mut Fields) -> LightPatch {
        LightPatch {
            name: self.name.clone(),
            color: fields.color("color", &self.color),
            intensity: fields.optional_number("intensity", &self.intensity),
            is_visible: self.is_visible,
        }
    }

    pub fn to_patch(&self) -> Result<LightPatch, ValidationError> {
        let mut fields = Fields::default();
        let patch = self.parse(&mut fields);
        fields.finish(patch)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DirectionalLightForm {
    pub common: LightForm,
    pub direction: Option<[String; 3]>,
    pub casts_shadow: Option<bool>,
}

impl DirectionalLightForm {
    pub fn to_patch(&self) -> Result<DirectionalLightPatch, ValidationError> {
        let mut fields = Fields::default();
        let patch = DirectionalLightPatch {
            common: self.common.parse(&mut fields),
            direction: fields.optional_vec3("direction", &self.direction),
            casts_shadow: self.casts_shadow,
        };
        fields.finish(patch)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpotLightForm {
    pub common: LightForm,
    pub position: Option<[String; 3]>,
    pub direction: Option<[String; 3]>,
    pub inner_angle: Option<String>,
    pub outer_angle: Option<String>,
    pub attenuation_start: Option<String>,
    pub attenuation_end: Option<String>,
    pub casts_shadow: Option<bool>,
}

impl SpotLightForm {
    pub fn to_patch(&self) -> Result<SpotLightPatch, ValidationError> {
        let mut fields = Fields::default();
        let patch = SpotLightPatch {
            common: self.common.parse(&mut fields),
            position: fields.optional_vec3("position", &self.position),
            direction: fields.optional_vec3("direction", &self.direction),
            inner_angle: fields.optional_number("innerAngle", &self.inner_angle),
            outer_angle: fields.optional_number("outerAngle", &self.outer_angle),
            attenuation_start: fields.optional_number("attenuationStart", &self.attenuation_start),
            attenuation_end: fields.optional_number("attenuationEnd", &self.attenuation_end),
            casts_shadow: self.casts_shadow,
        };
        fields.finish(patch)
    }
}

/// Position/rotation/scale of one placed model.
#[derive(Debug, Clone, Default)]
pub struct ModelForm {
    pub position: Option<[String; 3]>,
    pub rotation: Option<[String; 3]>,
    pub scale: Option<String>,
}

impl ModelForm {
    pub fn to_patch(&self) -> Result<ModelPatch, ValidationError> {
        let mut fields = Fields::default();
        let patch = ModelPatch {
            position: fields.optional_vec3("position", &self.position),
            rotation: fields.optional_vec3("rotation", &self.rotation),
            scale: self
                .scale
                .as_deref()
                .map(|t| ModelScale::Uniform(fields.positive("scale", t))),
            ..ModelPatch::default()
        };
        fields.finish(patch)
    }
}

/// Whole-scene translation, orientation and scale.
#[derive(Debug, Clone)]
pub struct TransformForm {
    pub translation: [String; 3],
    pub orientation: String,
    pub scale: String,
}

impl TransformForm {
    pub fn to_actions(&self) -> Result<Vec<Action>, ValidationError> {
        let mut fields = Fields::default();
        let translation = fields.vec3("translation", &self.translation);
        let orientation = fields.number("orientation", &self.orientation);
        let scale = fields.positive("scale", &self.scale);
        fields.finish(vec![
            Action::SetTranslation(translation),
            Action::SetOrientation(orientation),
            Action::SetScale(scale),
        ])
    }
}

pub fn update_model_action(id: ModelId, form: &ModelForm) -> Result<Action, ValidationError> {
    Ok(Action::UpdateModel {
        id,
        changes: form.to_patch()?,
    })
}

pub fn update_ambient_action(id: LightId, form: &LightForm) -> Result<Action, ValidationError> {
    Ok(Action::UpdateAmbientLight {
        id,
        changes: form.to_patch()?,
    })
}

pub fn update_directional_action(
    id: LightId,
    form: &DirectionalLightForm,
) -> Result<Action, ValidationError> {
    Ok(Action::UpdateDirectionalLight {
        id,
        changes: form.to_patch()?,
    })
}

pub fn update_spot_action(id: LightId, form: &SpotLightForm) -> Result<Action, ValidationError> {
    Ok(Action::UpdateSpotLight {
        id,
        changes: form.to_patch()?,
    })
}

/// Dispatches `actions` only if the form parsed; returns how many changed state.
pub fn submit(
    store: &mut Store,
    actions: Result<Vec<Action>, ValidationError>,
) -> Result<usize, ValidationError> {
    match actions {
        Ok(actions) => Ok(store.dispatch_all(actions)),
        Err(err) => {
            tracing::debug!("rejected input: {err}");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LightForm, ModelForm, SpotLightForm, TransformForm, submit, update_spot_action};
    use crate::action::Action;
    use crate::store::Store;
    use foundation::math::Vec3;
    use scene::{Color, LightId, ModelScale, SceneTransform};

    fn xyz(x: &str, y: &str, z: &str) -> [String; 3] {
        [x.to_string(), y.to_string(), z.to_string()]
    }

    #[test]
    fn parses_valid_spot_form() {
        let form = SpotLightForm {
            common: LightForm {
                color: Some("#ff8800".to_string()),
                intensity: Some(" 400 ".to_string()),
                ..LightForm::default()
            },
            position: Some(xyz("1", "2.5", "-3")),
            outer_angle: Some("30".to_string()),
            ..SpotLightForm::default()
        };
        let patch = form.to_patch().expect("valid");
        assert_eq!(patch.common.color, Some(Color { r: 255, g: 0x88, b: 0 }));
        assert_eq!(patch.common.intensity, Some(400.0));
        assert_eq!(patch.position, Some(Vec3::new(1.0, 2.5, -3.0)));
        assert_eq!(patch.outer_angle, Some(30.0));
        assert_eq!(patch.direction, None);
    }

    #[test]
    fn reports_every_bad_field() {
        let form = SpotLightForm {
            common: LightForm {
                color: Some("orange".to_string()),
                ..LightForm::default()
            },
            direction: Some(xyz("0", "abc", "")),
            inner_angle: Some("NaN".to_string()),
            ..SpotLightForm::default()
        };
        let err = update_spot_action(LightId(1), &form).expect_err("invalid");
        assert_eq!(err.fields.len(), 4);
        assert!(err.has_field("color"));
        assert!(err.has_field("direction.y"));
        assert!(err.has_field("direction.z"));
        assert!(err.has_field("innerAngle"));
        assert!(!err.has_field("direction.x"));
    }

    #[test]
    fn model_scale_must_be_positive() {
        let ok = ModelForm {
            scale: Some("1.5".to_string()),
            ..ModelForm::default()
        };
        assert_eq!(ok.to_patch().expect("valid").scale, Some(ModelScale::Uniform(1.5)));

        let bad = ModelForm {
            scale: Some("0".to_string()),
            ..ModelForm::default()
        };
        assert!(bad.to_patch().expect_err("zero").has_field("scale"));
    }

    #[test]
    fn invalid_form_dispatches_nothing() {
        let mut store = Store::new();
        let form = TransformForm {
            translation: xyz("1", "2", "three"),
            orientation: "90".to_string(),
            scale: "2".to_string(),
        };
        let err = submit(&mut store, form.to_actions()).expect_err("invalid");
        assert!(err.has_field("translation.z"));
        assert_eq!(*store.state().scene.transform(), SceneTransform::identity());
        assert_eq!(store.revision(), 0);

        let form = TransformForm {
            translation: xyz("1", "2", "3"),
            ..form
        };
        assert_eq!(submit(&mut store, form.to_actions()), Ok(3));
        assert_eq!(store.state().scene.transform().scale, 2.0);
        assert!(matches!(form.to_actions().expect("valid")[1], Action::SetOrientation(o) if o == 90.0));
    }
}
