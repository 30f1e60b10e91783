use foundation::math::Vec3;

/// Identity of a light, unique across every kind for a store session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LightId(pub u64);

impl std::fmt::Display for LightId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ColorParseError;

impl std::fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "expected a #rrggbb color")
    }
}

impl std::error::Error for ColorParseError {}

/// 8-bit RGB color, written as `#rrggbb`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Self = Self {
        r: 0xff,
        g: 0xff,
        b: 0xff,
    };

    pub fn from_hex(text: &str) -> Result<Self, ColorParseError> {
        let hex = text.strip_prefix('#').unwrap_or(text);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorParseError);
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ColorParseError);
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Fields shared by every light kind.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct LightCommon {
    pub name: String,
    pub color: Color,
    pub intensity: f64,
    pub is_visible: bool,
}

impl LightCommon {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: Color::WHITE,
            intensity: 1000.0,
            is_visible: true,
        }
    }

    fn is_finite(&self) -> bool {
        self.intensity.is_finite()
    }

    fn apply(&mut self, patch: &LightPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(intensity) = patch.intensity {
            self.intensity = intensity;
        }
        if let Some(is_visible) = patch.is_visible {
            self.is_visible = is_visible;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AmbientLight {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub common: LightCommon,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DirectionalLight {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub common: LightCommon,
    pub direction: Vec3,
    pub casts_shadow: bool,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SpotLight {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub common: LightCommon,
    pub position: Vec3,
    pub direction: Vec3,
    /// Degrees.
    pub inner_angle: f64,
    /// Degrees.
    pub outer_angle: f64,
    pub attenuation_start: f64,
    pub attenuation_end: f64,
    pub casts_shadow: bool,
}

impl AmbientLight {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            common: LightCommon::named(name),
        }
    }
}

impl DirectionalLight {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            common: LightCommon::named(name),
            direction: Vec3::new(0.0, -1.0, 0.0),
            casts_shadow: false,
        }
    }
}

impl SpotLight {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            common: LightCommon::named(name),
            position: Vec3::new(0.0, 2.0, 0.0),
            direction: Vec3::new(0.0, -1.0, 0.0),
            inner_angle: 0.0,
            outer_angle: 45.0,
            attenuation_start: 0.0,
            attenuation_end: 10.0,
            casts_shadow: false,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LightKind {
    Ambient,
    Directional,
    Spot,
}

/// Any light, discriminated by kind.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "lowercase"))]
pub enum Light {
    Ambient(AmbientLight),
    Directional(DirectionalLight),
    Spot(SpotLight),
}

impl Light {
    pub fn kind(&self) -> LightKind {
        match self {
            Light::Ambient(_) => LightKind::Ambient,
            Light::Directional(_) => LightKind::Directional,
            Light::Spot(_) => LightKind::Spot,
        }
    }

    pub fn common(&self) -> &LightCommon {
        match self {
            Light::Ambient(l) => &l.common,
            Light::Directional(l) => &l.common,
            Light::Spot(l) => &l.common,
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Light::Ambient(l) => l.is_finite(),
            Light::Directional(l) => l.is_finite(),
            Light::Spot(l) => l.is_finite(),
        }
    }
}

/// Partial update of the shared light fields.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct LightPatch {
    pub name: Option<String>,
    pub color: Option<Color>,
    pub intensity: Option<f64>,
    pub is_visible: Option<bool>,
}

impl LightPatch {
    pub fn is_finite(&self) -> bool {
        self.intensity.is_none_or(f64::is_finite)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct DirectionalLightPatch {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub common: LightPatch,
    pub direction: Option<Vec3>,
    pub casts_shadow: Option<bool>,
}

impl DirectionalLightPatch {
    pub fn is_finite(&self) -> bool {
        self.common.is_finite() && self.direction.is_none_or(Vec3::is_finite)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct SpotLightPatch {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub common: LightPatch,
    pub position: Option<Vec3>,
    pub direction: Option<Vec3>,
    pub inner_angle: Option<f64>,
    pub outer_angle: Option<f64>,
    pub attenuation_start: Option<f64>,
    pub attenuation_end: Option<f64>,
    pub casts_shadow: Option<bool>,
}

impl SpotLightPatch {
    pub fn is_finite(&self) -> bool {
        self.common.is_finite()
            && self.position.is_none_or(Vec3::is_finite)
            && self.direction.is_none_or(Vec3::is_finite)
            && [
                self.inner_angle,
                self.outer_angle,
                self.attenuation_start,
                self.attenuation_end,
            ]
            .iter()
            .all(|v| v.is_none_or(f64::is_finite))
    }
}

impl AmbientLight {
    pub fn is_finite(&self) -> bool {
        self.common.is_finite()
    }

    pub fn apply(&mut self, patch: &LightPatch) {
        self.common.apply(patch);
    }
}

impl DirectionalLight {
    pub fn is_finite(&self) -> bool {
        self.common.is_finite() && self.direction.is_finite()
    }

    pub fn apply(&mut self, patch: &DirectionalLightPatch) {
        self.common.apply(&patch.common);
        if let Some(direction) = patch.direction {
            self.direction = direction;
        }
        if let Some(casts_shadow) = patch.casts_shadow {
            self.casts_shadow = casts_shadow;
        }
    }
}

impl SpotLight {
    /// Every numeric field must be finite to enter a light collection.
    pub fn is_finite(&self) -> bool {
        self.common.is_finite()
            && self.position.is_finite()
            && self.direction.is_finite()
            && [
                self.inner_angle,
                self.outer_angle,
                self.attenuation_start,
                self.attenuation_end,
            ]
            .iter()
            .all(|v| v.is_finite())
    }

    pub fn apply(&mut self, patch: &SpotLightPatch) {
        self.common.apply(&patch.common);
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(direction) = patch.direction {
            self.direction = direction;
        }
        if let Some(v) = patch.inner_angle {
            self.inner_angle = v;
        }
        if let Some(v) = patch.outer_angle {
            self.outer_angle = v;
        }
        if let Some(v) = patch.attenuation_start {
            self.attenuation_start = v;
        }
        if let Some(v) = patch.attenuation_end {
            self.attenuation_end = v;
        }
        if let Some(casts_shadow) = patch.casts_shadow {
            self.casts_shadow = casts_shadow;
        }
    }
}
