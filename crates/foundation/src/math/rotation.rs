//! Planar rotations about the vertical (y) axis.
//!
//! Angles are in degrees. Positive angles rotate x toward z.

use super::Vec3;

/// Rotates the `(x, z)` pair by `angle_degrees`.
pub fn rotate_2d(x: f64, z: f64, angle_degrees: f64) -> (f64, f64) {
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    (x * cos - z * sin, x * sin + z * cos)
}

/// Rotates `point` about the vertical axis passing through `origin`.
///
/// The point is shifted into origin-relative space, its x/z pair rotated with
/// [`rotate_2d`], then shifted back. The y component goes through the same
/// shift and un-shift, so it comes out unchanged.
pub fn rotate_around_origin(point: Vec3, origin: Vec3, angle_degrees: f64) -> Vec3 {
    let local = point - origin;
    let (x, z) = rotate_2d(local.x, local.z, angle_degrees);
    Vec3::new(x, local.y, z) + origin
}

/// Wraps an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(angle_degrees: f64) -> f64 {
    let wrapped = angle_degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::{normalize_degrees, rotate_2d, rotate_around_origin};
    use crate::math::Vec3;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn assert_vec_close(a: Vec3, b: Vec3, eps: f64) {
        assert_close(a.x, b.x, eps);
        assert_close(a.y, b.y, eps);
        assert_close(a.z, b.z, eps);
    }

    #[test]
    fn quarter_turn_maps_x_onto_z() {
        let (x, z) = rotate_2d(1.0, 0.0, 90.0);
        assert_close(x, 0.0, 1e-12);
        assert_close(z, 1.0, 1e-12);
    }

    #[test]
    fn zero_angle_is_identity() {
        assert_eq!(rotate_2d(3.5, -2.0, 0.0), (3.5, -2.0));
    }

    #[test]
    fn rotation_is_invertible() {
        let samples = [-720.0, -181.5, -45.0, 0.0, 13.0, 90.0, 270.0, 1234.5];
        for &angle in &samples {
            for &(x, z) in &[(1.0, 0.0), (-3.25, 7.5), (1e4, -2e3), (0.0, 0.0)] {
                let (rx, rz) = rotate_2d(x, z, angle);
                let (bx, bz) = rotate_2d(rx, rz, -angle);
                assert_close(bx, x, 1e-9 * (1.0 + x.abs()));
                assert_close(bz, z, 1e-9 * (1.0 + z.abs()));
            }
        }
    }

    #[test]
    fn rotation_preserves_length() {
        let (x, z) = rotate_2d(3.0, 4.0, 37.0);
        assert_close((x * x + z * z).sqrt(), 5.0, 1e-12);
    }

    #[test]
    fn rotate_around_origin_pivots_on_origin() {
        let origin = Vec3::new(1.0, 5.0, 1.0);
        let point = Vec3::new(2.0, 0.5, 1.0);
        let rotated = rotate_around_origin(point, origin, 90.0);
        assert_vec_close(rotated, Vec3::new(1.0, 0.5, 2.0), 1e-12);
    }

    #[test]
    fn rotate_around_origin_leaves_y_untouched() {
        let origin = Vec3::new(-4.0, 12.0, 3.0);
        let point = Vec3::new(0.0, -1.5, 0.0);
        for angle in [0.0, 33.0, 180.0, -90.0] {
            assert_close(rotate_around_origin(point, origin, angle).y, -1.5, 1e-12);
        }
    }

    #[test]
    fn rotate_around_origin_is_invertible() {
        let origins = [Vec3::ZERO, Vec3::new(2.0, -3.0, 9.5), Vec3::new(-100.0, 7.0, 0.25)];
        let points = [Vec3::new(1.0, 0.0, 0.0), Vec3::new(-6.0, 2.0, 4.0)];
        for origin in origins {
            for point in points {
                for angle in [-270.0, -12.5, 45.0, 359.0] {
                    let there = rotate_around_origin(point, origin, angle);
                    let back = rotate_around_origin(there, origin, -angle);
                    assert_vec_close(back, point, 1e-9);
                }
            }
        }
    }

    #[test]
    fn non_finite_input_propagates() {
        let (x, _) = rotate_2d(f64::NAN, 1.0, 10.0);
        assert!(x.is_nan());
    }

    #[test]
    fn normalize_wraps_into_range() {
        assert_close(normalize_degrees(-90.0), 270.0, 1e-12);
        assert_close(normalize_degrees(720.0), 0.0, 1e-12);
        assert_close(normalize_degrees(359.5), 359.5, 1e-12);
    }
}
