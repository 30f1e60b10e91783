//! Geo-anchoring: maps authored model coordinates into the live AR world.
//!
//! A project stores a reference location (where the room was set up and which
//! way the device faced). When a session starts somewhere else, or facing a
//! different direction, the authored positions are shifted by the planar
//! distance between the two readings and rotated by the heading difference.

use foundation::math::{GeoPoint, Vec3, equirectangular_offset, rotate_2d};

/// Location and compass orientation captured when a project was set up.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferenceLocation {
    pub point: GeoPoint,
    /// Compass heading in degrees at capture time.
    pub orientation: f64,
}

impl ReferenceLocation {
    /// Coordinates within geographic range and a finite orientation.
    pub fn is_valid(&self) -> bool {
        is_valid_reading(self.point, self.orientation)
    }
}

/// A live device reading.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceFix {
    pub point: GeoPoint,
    /// Compass heading in degrees.
    pub heading: f64,
}

impl DeviceFix {
    pub fn is_valid(&self) -> bool {
        is_valid_reading(self.point, self.heading)
    }
}

fn is_valid_reading(point: GeoPoint, degrees: f64) -> bool {
    degrees.is_finite() && GeoPoint::new(point.latitude, point.longitude).is_ok()
}

/// Shifts `local` by the geo offset of `current` from `reference`, rotated by
/// `orientation_degrees`.
///
/// Without a reference or without a current reading no alignment is possible
/// and `local` is returned unchanged. The y component is never touched.
pub fn compute_offset(
    local: Vec3,
    current: Option<GeoPoint>,
    reference: Option<GeoPoint>,
    orientation_degrees: f64,
) -> Vec3 {
    let (Some(current), Some(reference)) = (current, reference) else {
        return local;
    };

    let offset = equirectangular_offset(current, reference);
    let (x, z) = rotate_2d(offset.x, offset.y, orientation_degrees);
    Vec3::new(local.x + x, local.y, local.z + z)
}

/// Adds `orientation_degrees` to the y rotation; x and z pass through.
pub fn compute_rotation(rotation: Vec3, orientation_degrees: f64) -> Vec3 {
    Vec3::new(rotation.x, rotation.y + orientation_degrees, rotation.z)
}

/// Per-frame alignment, resolved once and applied to every model.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AnchorFrame {
    current: Option<GeoPoint>,
    reference: Option<GeoPoint>,
    orientation: f64,
}

impl AnchorFrame {
    /// Frame that leaves authored coordinates as they are.
    pub fn identity() -> Self {
        Self {
            current: None,
            reference: None,
            orientation: 0.0,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.current.is_none() || self.reference.is_none()
    }

    pub fn orientation(&self) -> f64 {
        self.orientation
    }

    pub fn position(&self, local: Vec3) -> Vec3 {
        compute_offset(local, self.current, self.reference, self.orientation)
    }

    pub fn rotation(&self, rotation: Vec3) -> Vec3 {
        if self.is_identity() {
            return rotation;
        }
        compute_rotation(rotation, self.orientation)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct GeoAnchor {
    pub reference: Option<ReferenceLocation>,
}

impl GeoAnchor {
    pub fn new(reference: Option<ReferenceLocation>) -> Self {
        Self { reference }
    }

    /// Resolves the alignment for a device reading.
    ///
    /// The applied orientation is the heading change since capture:
    /// `reference.orientation - device.heading`.
    pub fn frame(&self, device: Option<DeviceFix>) -> AnchorFrame {
        match (self.reference, device) {
            (Some(reference), Some(device)) => AnchorFrame {
                current: Some(device.point),
                reference: Some(reference.point),
                orientation: reference.orientation - device.heading,
            },
            _ => AnchorFrame::identity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DeviceFix, GeoAnchor, ReferenceLocation, compute_offset, compute_rotation};
    use foundation::math::{GeoPoint, Vec3};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn missing_reference_passes_position_through() {
        let local = Vec3::new(1.5, -2.0, 3.0);
        for current in [None, Some(GeoPoint::new_unchecked(10.0, 10.0))] {
            for orientation in [0.0, 90.0, -33.0] {
                assert_eq!(compute_offset(local, current, None, orientation), local);
            }
        }
    }

    #[test]
    fn zero_delta_ignores_orientation() {
        let p = GeoPoint::new_unchecked(52.2051982, 20.9665666);
        let local = Vec3::new(1.0, 0.0, 0.0);
        for orientation in [0.0, 45.0, 180.0, 359.0] {
            let out = compute_offset(local, Some(p), Some(p), orientation);
            assert_close(out.x, 1.0, 1e-12);
            assert_close(out.y, 0.0, 1e-12);
            assert_close(out.z, 0.0, 1e-12);
        }
    }

    #[test]
    fn same_place_renders_at_authored_position() {
        let p = GeoPoint::new_unchecked(52.2051982, 20.9665666);
        let out = compute_offset(Vec3::new(1.0, 0.0, 0.0), Some(p), Some(p), 0.0);
        assert_eq!(out, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn east_offset_at_equator() {
        let reference = GeoPoint::new_unchecked(0.0, 0.0);
        let current = GeoPoint::new_unchecked(0.0, 0.001);
        let out = compute_offset(Vec3::ZERO, Some(current), Some(reference), 0.0);
        assert_close(out.x, 111.0, 1.0);
        assert_close(out.y, 0.0, 1e-12);
        assert_close(out.z, 0.0, 1e-9);
    }

    #[test]
    fn offset_is_rotated_by_orientation() {
        let reference = GeoPoint::new_unchecked(0.0, 0.0);
        let current = GeoPoint::new_unchecked(0.0, 0.001);
        let out = compute_offset(Vec3::new(0.0, 2.0, 0.0), Some(current), Some(reference), 90.0);
        assert_close(out.x, 0.0, 1e-6);
        assert_close(out.y, 2.0, 1e-12);
        assert_close(out.z, 111.0, 1e-6);
    }

    #[test]
    fn rotation_only_touches_y() {
        let r = compute_rotation(Vec3::new(10.0, 20.0, 30.0), 15.0);
        assert_eq!(r, Vec3::new(10.0, 35.0, 30.0));
    }

    #[test]
    fn frame_uses_heading_change_since_capture() {
        let point = GeoPoint::new_unchecked(1.0, 1.0);
        let anchor = GeoAnchor::new(Some(ReferenceLocation {
            point,
            orientation: 100.0,
        }));
        let frame = anchor.frame(Some(DeviceFix {
            point,
            heading: 70.0,
        }));
        assert_close(frame.orientation(), 30.0, 1e-12);
        assert_eq!(frame.rotation(Vec3::ZERO), Vec3::new(0.0, 30.0, 0.0));
    }

    #[test]
    fn frame_without_device_fix_is_identity() {
        let anchor = GeoAnchor::new(Some(ReferenceLocation {
            point: GeoPoint::new_unchecked(1.0, 1.0),
            orientation: 100.0,
        }));
        let frame = anchor.frame(None);
        assert!(frame.is_identity());
        let v = Vec3::new(3.0, 4.0, 5.0);
        assert_eq!(frame.position(v), v);
        assert_eq!(frame.rotation(v), v);
    }

    #[test]
    fn out_of_range_readings_are_invalid() {
        let reference = ReferenceLocation {
            point: GeoPoint::new_unchecked(500.0, -999.0),
            orientation: 0.0,
        };
        assert!(!reference.is_valid());

        let fix = DeviceFix {
            point: GeoPoint::new_unchecked(10.0, 20.0),
            heading: f64::NAN,
        };
        assert!(!fix.is_valid());

        let fix = DeviceFix {
            heading: 359.0,
            ..fix
        };
        assert!(fix.is_valid());
    }
}
