use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// Axis-aligned extent of a solid, in mm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lower_left: [f64; 3],
    pub upper_right: [f64; 3],
    pub center: [f64; 3],
    pub width: [f64; 3],
}

impl BoundingBox {
    pub fn new(lower_left: [f64; 3], upper_right: [f64; 3]) -> Self {
        let center = [
            0.5 * (lower_left[0] + upper_right[0]),
            0.5 * (lower_left[1] + upper_right[1]),
            0.5 * (lower_left[2] + upper_right[2]),
        ];
        let width = [
            upper_right[0] - lower_left[0],
            upper_right[1] - lower_left[1],
            upper_right[2] - lower_left[2],
        ];
        BoundingBox {
            lower_left,
            upper_right,
            center,
            width,
        }
    }

    /// Box centred on the origin with the given half lengths.
    pub fn from_half_extents(half: [f64; 3]) -> Self {
        Self::new([-half[0], -half[1], -half[2]], half)
    }

    /// True if `other` lies inside `self`, allowing `tolerance` mm of overhang
    /// on every face.
    pub fn contains_box(&self, other: &BoundingBox, tolerance: f64) -> bool {
        (0..3).all(|i| {
            other.lower_left[i] >= self.lower_left[i] - tolerance
                && other.upper_right[i] <= self.upper_right[i] + tolerance
        })
    }

    /// Axis-aligned envelope of this box after rotating it by `rotation` and
    /// then shifting it by `translation`.
    pub fn transformed(&self, rotation: &Rotation3<f64>, translation: [f64; 3]) -> BoundingBox {
        let shift = Vector3::from(translation);
        let mut lower = [f64::INFINITY; 3];
        let mut upper = [f64::NEG_INFINITY; 3];
        for corner in 0..8 {
            let local = Vector3::new(
                if corner & 1 == 0 { self.lower_left[0] } else { self.upper_right[0] },
                if corner & 2 == 0 { self.lower_left[1] } else { self.upper_right[1] },
                if corner & 4 == 0 { self.lower_left[2] } else { self.upper_right[2] },
            );
            let moved = rotation * local + shift;
            for i in 0..3 {
                lower[i] = lower[i].min(moved[i]);
                upper[i] = upper[i].max(moved[i]);
            }
        }
        BoundingBox::new(lower, upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_center_and_width() {
        let bb = BoundingBox::new([-1.0, 0.0, 2.0], [1.0, 4.0, 3.0]);
        assert_eq!(bb.center, [0.0, 2.0, 2.5]);
        assert_eq!(bb.width, [2.0, 4.0, 1.0]);
    }

    #[test]
    fn test_contains_box_with_tolerance() {
        let outer = BoundingBox::from_half_extents([10.0, 10.0, 10.0]);
        let inner = BoundingBox::from_half_extents([5.0, 5.0, 10.0]);
        let poking = BoundingBox::new([-5.0, -5.0, 0.0], [5.0, 5.0, 10.5]);
        assert!(outer.contains_box(&inner, 0.0));
        assert!(!outer.contains_box(&poking, 1e-9));
        assert!(outer.contains_box(&poking, 0.5));
    }

    #[test]
    fn test_transformed_rotation_swaps_axes() {
        let plane = BoundingBox::from_half_extents([81.28, 0.025, 81.28]);
        let rot = Rotation3::from_axis_angle(&Vector3::x_axis(), -FRAC_PI_2);
        let moved = plane.transformed(&rot, [0.0, 0.0, -9.975]);
        assert!((moved.width[0] - 162.56).abs() < 1e-9);
        assert!((moved.width[1] - 162.56).abs() < 1e-9);
        assert!((moved.width[2] - 0.05).abs() < 1e-9);
        assert!((moved.upper_right[2] + 9.95).abs() < 1e-9);
    }

    #[test]
    fn test_transformed_identity_is_translation() {
        let bb = BoundingBox::from_half_extents([1.0, 2.0, 3.0]);
        let moved = bb.transformed(&Rotation3::identity(), [0.0, 0.0, 100.0]);
        assert_eq!(moved.lower_left, [-1.0, -2.0, 97.0]);
        assert_eq!(moved.upper_right, [1.0, 2.0, 103.0]);
    }
}
