use crate::field::MwpcFieldSetup;
use crate::material::Material;
use crate::solid::Solid;
use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Index of a logical volume in a [`crate::geometry::Geometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VolumeId(pub usize);

/// Index of a placed or replicated volume in a [`crate::geometry::Geometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PhysicalId(pub usize);

/// A proper rotation.
///
/// `rotate_x`, `rotate_y` and `rotate_z` each apply a further rotation on top
/// of the current one, so `Rotation::identity().rotate_x(a).rotate_y(b)` is
/// `Ry(b) * Rx(a)`. A placement's rotation turns the mother frame; the
/// daughter appears in its mother rotated by the inverse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    matrix: Rotation3<f64>,
}

impl Rotation {
    pub fn identity() -> Self {
        Rotation {
            matrix: Rotation3::identity(),
        }
    }

    pub fn rotate_x(self, angle: f64) -> Self {
        self.then(Rotation3::from_axis_angle(&Vector3::x_axis(), angle))
    }

    pub fn rotate_y(self, angle: f64) -> Self {
        self.then(Rotation3::from_axis_angle(&Vector3::y_axis(), angle))
    }

    pub fn rotate_z(self, angle: f64) -> Self {
        self.then(Rotation3::from_axis_angle(&Vector3::z_axis(), angle))
    }

    fn then(self, next: Rotation3<f64>) -> Self {
        Rotation {
            matrix: next * self.matrix,
        }
    }

    pub fn inverse(&self) -> Self {
        Rotation {
            matrix: self.matrix.inverse(),
        }
    }

    pub fn matrix(&self) -> &Rotation3<f64> {
        &self.matrix
    }

    pub fn apply(&self, v: [f64; 3]) -> [f64; 3] {
        let r = self.matrix * Vector3::from(v);
        [r.x, r.y, r.z]
    }

    pub fn is_identity(&self) -> bool {
        self.matrix.angle() == 0.0
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisAttributes {
    /// red, green, blue, alpha in [0, 1]
    pub colour: [f64; 4],
    pub visible: bool,
}

impl VisAttributes {
    pub fn colour(r: f64, g: f64, b: f64, a: f64) -> Self {
        VisAttributes {
            colour: [r, g, b, a],
            visible: true,
        }
    }

    pub fn invisible() -> Self {
        VisAttributes {
            colour: [1.0, 1.0, 1.0, 1.0],
            visible: false,
        }
    }
}

/// Tracking constraints for particles inside a volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserLimits {
    /// mm
    pub max_step: f64,
}

impl UserLimits {
    pub fn max_step(max_step: f64) -> Self {
        UserLimits { max_step }
    }
}

/// A local field and whether it also applies inside the volume's daughters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAttachment {
    pub setup: MwpcFieldSetup,
    pub propagate_to_daughters: bool,
}

/// Shape, material and tracking attributes, independent of placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalVolume {
    pub name: String,
    pub solid: Arc<Solid>,
    pub material: Arc<Material>,
    pub vis: Option<VisAttributes>,
    pub user_limits: Option<UserLimits>,
    pub field: Option<FieldAttachment>,
}

impl LogicalVolume {
    pub fn new(name: impl Into<String>, solid: Arc<Solid>, material: Arc<Material>) -> Self {
        LogicalVolume {
            name: name.into(),
            solid,
            material,
            vis: None,
            user_limits: None,
            field: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.vis.map_or(true, |v| v.visible)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// A single positioned copy of a logical volume inside its mother.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub name: String,
    pub logical: VolumeId,
    pub mother: VolumeId,
    pub rotation: Rotation,
    pub translation: [f64; 3],
    pub copy_no: u32,
    /// Include this placement in [`crate::geometry::Geometry::check_overlaps`].
    pub check_overlaps: bool,
}

/// `count` copies of a logical volume, each `width` mm wide, tiling the
/// mother along `axis` and centred on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replica {
    pub name: String,
    pub logical: VolumeId,
    pub mother: VolumeId,
    pub axis: Axis,
    pub count: u32,
    pub width: f64,
}

impl Replica {
    /// Centre of copy `copy` along the replication axis.
    pub fn offset(&self, copy: u32) -> f64 {
        -0.5 * self.width * self.count as f64 + self.width * (copy as f64 + 0.5)
    }

    pub fn total_width(&self) -> f64 {
        self.width * self.count as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PhysicalVolume {
    Placement(Placement),
    Replica(Replica),
}

impl PhysicalVolume {
    pub fn name(&self) -> &str {
        match self {
            PhysicalVolume::Placement(p) => &p.name,
            PhysicalVolume::Replica(r) => &r.name,
        }
    }

    pub fn logical(&self) -> VolumeId {
        match self {
            PhysicalVolume::Placement(p) => p.logical,
            PhysicalVolume::Replica(r) => r.logical,
        }
    }

    pub fn mother(&self) -> VolumeId {
        match self {
            PhysicalVolume::Placement(p) => p.mother,
            PhysicalVolume::Replica(r) => r.mother,
        }
    }

    /// Number of copies this entry stands for.
    pub fn copies(&self) -> u32 {
        match self {
            PhysicalVolume::Placement(_) => 1,
            PhysicalVolume::Replica(r) => r.count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn close(a: [f64; 3], b: [f64; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-12)
    }

    #[test]
    fn test_rotations_compose_left() {
        let r = Rotation::identity().rotate_x(FRAC_PI_2).rotate_y(FRAC_PI_2);
        // Rx takes y to z, then Ry takes z to x
        assert!(close(r.apply([0.0, 1.0, 0.0]), [1.0, 0.0, 0.0]));
        let back = r.inverse().apply(r.apply([0.3, -0.2, 0.9]));
        assert!(close(back, [0.3, -0.2, 0.9]));
    }

    #[test]
    fn test_half_turn_about_y() {
        let r = Rotation::identity().rotate_y(PI);
        assert!(close(r.apply([0.0, 0.0, 1.0]), [0.0, 0.0, -1.0]));
        assert!(!r.is_identity());
        assert!(Rotation::default().is_identity());
    }

    #[test]
    fn test_replica_offsets_tile_mother() {
        let r = Replica {
            name: "AnodeArray_0".to_string(),
            logical: VolumeId(1),
            mother: VolumeId(0),
            axis: Axis::X,
            count: 64,
            width: 2.54,
        };
        assert!((r.offset(0) + 81.28 - 1.27).abs() < 1e-9);
        assert!((r.offset(63) - 81.28 + 1.27).abs() < 1e-9);
        assert!((r.total_width() - 162.56).abs() < 1e-9);
    }

    #[test]
    fn test_vis_defaults() {
        assert!(!VisAttributes::invisible().visible);
        assert_eq!(VisAttributes::colour(0.0, 1.0, 0.0, 1.0).colour, [0.0, 1.0, 0.0, 1.0]);
    }
}
