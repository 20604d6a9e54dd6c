use crate::bounding_box::BoundingBox;
use crate::error::{GeometryError, GeometryResult};
use crate::volume::Rotation;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::sync::Arc;

/// Constructive solid shapes, all dimensions in mm and angles in radians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Box {
        half_x: f64,
        half_y: f64,
        half_z: f64,
    },
    /// Cylindrical section centred on the origin, spanning `±half_z`.
    Tubs {
        rmin: f64,
        rmax: f64,
        half_z: f64,
        start_phi: f64,
        delta_phi: f64,
    },
    /// Stack of conical sections; z planes are absolute local coordinates.
    Polycone {
        start_phi: f64,
        delta_phi: f64,
        z_planes: Vec<f64>,
        r_inner: Vec<f64>,
        r_outer: Vec<f64>,
    },
    /// `minuend` with `subtrahend` removed; the subtrahend is placed with
    /// `rotation` and `translation` in the minuend's frame.
    Subtraction {
        minuend: Arc<Solid>,
        subtrahend: Arc<Solid>,
        rotation: Rotation,
        translation: [f64; 3],
    },
}

/// A named shape that logical volumes can share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solid {
    pub name: String,
    pub shape: Shape,
}

impl Solid {
    pub fn boxed(
        name: impl Into<String>,
        half_x: f64,
        half_y: f64,
        half_z: f64,
    ) -> GeometryResult<Self> {
        let name = name.into();
        for (axis, half) in [("x", half_x), ("y", half_y), ("z", half_z)] {
            if !(half > 0.0) {
                let reason = format!("half length along {} must be positive, got {}", axis, half);
                return Err(invalid(&name, reason));
            }
        }
        Ok(Solid {
            name,
            shape: Shape::Box {
                half_x,
                half_y,
                half_z,
            },
        })
    }

    pub fn tubs(
        name: impl Into<String>,
        rmin: f64,
        rmax: f64,
        half_z: f64,
        start_phi: f64,
        delta_phi: f64,
    ) -> GeometryResult<Self> {
        let name = name.into();
        if !(rmin >= 0.0) || !(rmax > rmin) {
            let reason = format!("radii must satisfy 0 <= rmin < rmax, got {} and {}", rmin, rmax);
            return Err(invalid(&name, reason));
        }
        if !(half_z > 0.0) {
            return Err(invalid(&name, format!("half length must be positive, got {}", half_z)));
        }
        if !(delta_phi > 0.0) {
            return Err(invalid(&name, format!("phi span must be positive, got {}", delta_phi)));
        }
        Ok(Solid {
            name,
            shape: Shape::Tubs {
                rmin,
                rmax,
                half_z,
                start_phi,
                delta_phi: delta_phi.min(2.0 * PI),
            },
        })
    }

    /// Full 2π tube or disk.
    pub fn cylinder(
        name: impl Into<String>,
        rmin: f64,
        rmax: f64,
        half_z: f64,
    ) -> GeometryResult<Self> {
        Self::tubs(name, rmin, rmax, half_z, 0.0, 2.0 * PI)
    }

    pub fn polycone(
        name: impl Into<String>,
        start_phi: f64,
        delta_phi: f64,
        z_planes: Vec<f64>,
        r_inner: Vec<f64>,
        r_outer: Vec<f64>,
    ) -> GeometryResult<Self> {
        let name = name.into();
        if z_planes.len() < 2 {
            return Err(invalid(&name, "polycone needs at least two z planes".to_string()));
        }
        if r_inner.len() != z_planes.len() || r_outer.len() != z_planes.len() {
            return Err(invalid(
                &name,
                format!(
                    "{} z planes but {} inner and {} outer radii",
                    z_planes.len(),
                    r_inner.len(),
                    r_outer.len()
                ),
            ));
        }
        if z_planes.windows(2).any(|w| w[1] < w[0]) {
            return Err(invalid(&name, "z planes must be non-decreasing".to_string()));
        }
        let bad_plane =
            (0..z_planes.len()).find(|&i| !(r_inner[i] >= 0.0 && r_outer[i] >= r_inner[i]));
        if let Some(i) = bad_plane {
            return Err(invalid(&name, format!("bad radii at plane {}", i)));
        }
        Ok(Solid {
            name,
            shape: Shape::Polycone {
                start_phi,
                delta_phi: delta_phi.min(2.0 * PI),
                z_planes,
                r_inner,
                r_outer,
            },
        })
    }

    pub fn subtraction(
        name: impl Into<String>,
        minuend: Arc<Solid>,
        subtrahend: Arc<Solid>,
        rotation: Rotation,
        translation: [f64; 3],
    ) -> Self {
        Solid {
            name: name.into(),
            shape: Shape::Subtraction {
                minuend,
                subtrahend,
                rotation,
                translation,
            },
        }
    }

    /// Local extent. Tubes and polycones report their full 2π envelope and a
    /// subtraction reports its minuend's extent.
    pub fn bounding_box(&self) -> BoundingBox {
        match &self.shape {
            Shape::Box { half_x, half_y, half_z } => {
                BoundingBox::from_half_extents([*half_x, *half_y, *half_z])
            }
            Shape::Tubs { rmax, half_z, .. } => {
                BoundingBox::from_half_extents([*rmax, *rmax, *half_z])
            }
            Shape::Polycone { z_planes, r_outer, .. } => {
                let r = r_outer.iter().cloned().fold(0.0, f64::max);
                let z_lo = z_planes.iter().cloned().fold(f64::INFINITY, f64::min);
                let z_hi = z_planes.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                BoundingBox::new([-r, -r, z_lo], [r, r, z_hi])
            }
            Shape::Subtraction { minuend, .. } => minuend.bounding_box(),
        }
    }

    /// Length of the solid along `axis` (0 = x, 1 = y, 2 = z).
    pub fn extent(&self, axis: usize) -> f64 {
        self.bounding_box().width[axis]
    }
}

fn invalid(solid: &str, reason: String) -> GeometryError {
    GeometryError::InvalidDimensions {
        solid: solid.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_extent() {
        let b = Solid::boxed("b", 1.0, 2.0, 3.0).unwrap();
        assert_eq!(b.bounding_box().width, [2.0, 4.0, 6.0]);
        assert_eq!(b.extent(2), 6.0);
    }

    #[test]
    fn test_invalid_dimensions_rejected() {
        assert!(Solid::boxed("b", 0.0, 1.0, 1.0).is_err());
        assert!(Solid::cylinder("t", 5.0, 4.0, 1.0).is_err());
        assert!(Solid::cylinder("t", -1.0, 4.0, 1.0).is_err());
        assert!(Solid::cylinder("t", 0.0, 4.0, f64::NAN).is_err());
        let err = Solid::polycone("p", 0.0, 2.0 * PI, vec![0.0, 1.0], vec![0.0], vec![1.0, 1.0]);
        assert!(matches!(err, Err(GeometryError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_polycone_extent_uses_planes() {
        let lg = Solid::polycone(
            "lightguide",
            0.0,
            2.0 * PI,
            vec![0.0, 3.5, 3.5, 10.0],
            vec![75.0, 75.0, 68.5, 68.5],
            vec![100.0, 100.0, 100.0, 100.0],
        )
        .unwrap();
        let bb = lg.bounding_box();
        assert_eq!(bb.lower_left, [-100.0, -100.0, 0.0]);
        assert_eq!(bb.upper_right, [100.0, 100.0, 10.0]);
    }

    #[test]
    fn test_subtraction_keeps_minuend_extent() {
        let outer = Arc::new(Solid::boxed("outer", 10.0, 10.0, 10.0).unwrap());
        let hole = Arc::new(Solid::cylinder("hole", 0.0, 5.0, 20.0).unwrap());
        let s = Solid::subtraction(
            "holder",
            Arc::clone(&outer),
            hole,
            Rotation::identity(),
            [0.0; 3],
        );
        assert_eq!(s.bounding_box(), outer.bounding_box());
    }
}
