//! Short-range geodesy for anchoring AR content to a captured location.
//!
//! Offsets use an equirectangular (planar) approximation: a fixed number of
//! meters per degree of latitude, and the same scaled by the cosine of the
//! mean latitude for longitude. Error grows with distance and toward the
//! poles; it is meant for tens to low hundreds of meters.

use super::Vec2;

/// Meters spanned by one degree of latitude.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Geographic coordinates in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GeoError {
    NonFinite,
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
}

impl std::fmt::Display for GeoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoError::NonFinite => write!(f, "coordinates must be finite numbers"),
            GeoError::LatitudeOutOfRange(v) => {
                write!(f, "latitude {v} outside [-90, 90]")
            }
            GeoError::LongitudeOutOfRange(v) => {
                write!(f, "longitude {v} outside [-180, 180]")
            }
        }
    }
}

impl std::error::Error for GeoError {}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(GeoError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Builds a point without range checks. Use for data already validated.
    pub const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Meters spanned by one degree of longitude at `latitude_degrees`.
pub fn meters_per_degree_longitude(latitude_degrees: f64) -> f64 {
    METERS_PER_DEGREE * latitude_degrees.to_radians().cos()
}

/// Planar offset of `current` from `reference` in meters.
///
/// `x` grows eastward (longitude), `y` grows northward (latitude). The
/// longitude scale is taken at the mean latitude of the two points.
pub fn equirectangular_offset(current: GeoPoint, reference: GeoPoint) -> Vec2 {
    let delta_lat = current.latitude - reference.latitude;
    let delta_long = current.longitude - reference.longitude;
    let mean_lat = (current.latitude + reference.latitude) / 2.0;

    Vec2::new(
        delta_long * meters_per_degree_longitude(mean_lat),
        delta_lat * METERS_PER_DEGREE,
    )
}
