use crate::error::{GeometryError, GeometryResult};
use crate::field::MwpcFieldSetup;
use crate::material::Material;
use crate::volume::{
    FieldAttachment, LogicalVolume, PhysicalId, PhysicalVolume, Placement, Replica, UserLimits,
    VolumeId,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Slack allowed when comparing extents, in mm.
pub const OVERLAP_TOLERANCE: f64 = 1e-6;

/// Geometry is an arena of logical volumes and the physical volumes that
/// position them inside one another.
///
/// Volumes are referred to by index. Logical volume names are unique;
/// physical volume names are looked up first-come.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Geometry {
    logical: Vec<LogicalVolume>,
    physical: Vec<PhysicalVolume>,
    world: Option<VolumeId>,
    world_name: String,
    #[serde(skip)]
    logical_index: HashMap<String, VolumeId>,
    #[serde(skip)]
    physical_index: HashMap<String, PhysicalId>,
}

impl Geometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_logical(&mut self, volume: LogicalVolume) -> GeometryResult<VolumeId> {
        if self.logical_index.contains_key(&volume.name) {
            return Err(GeometryError::DuplicateVolume(volume.name));
        }
        let id = VolumeId(self.logical.len());
        self.logical_index.insert(volume.name.clone(), id);
        self.logical.push(volume);
        Ok(id)
    }

    /// Make `volume` the unplaced top of the tree.
    pub fn set_world(&mut self, volume: VolumeId, name: impl Into<String>) -> GeometryResult<()> {
        self.logical(volume)?;
        self.world = Some(volume);
        self.world_name = name.into();
        Ok(())
    }

    pub fn world(&self) -> GeometryResult<VolumeId> {
        self.world.ok_or(GeometryError::NoWorld)
    }

    pub fn world_name(&self) -> &str {
        &self.world_name
    }

    pub fn place(&mut self, placement: Placement) -> GeometryResult<PhysicalId> {
        self.check_link(&placement.name, placement.logical, placement.mother)?;
        Ok(self.push_physical(PhysicalVolume::Placement(placement)))
    }

    /// Add a replica; its copies together must fit the mother along the axis.
    pub fn replicate(&mut self, replica: Replica) -> GeometryResult<PhysicalId> {
        self.check_link(&replica.name, replica.logical, replica.mother)?;
        if replica.count == 0 || !(replica.width > 0.0) {
            return Err(GeometryError::InvalidDimensions {
                solid: replica.name,
                reason: format!(
                    "replica needs a positive count and width, got {} x {}",
                    replica.count, replica.width
                ),
            });
        }
        let mother = self.logical(replica.mother)?;
        let available = mother.solid.extent(replica.axis.index());
        let required = replica.total_width();
        if required > available + OVERLAP_TOLERANCE {
            return Err(GeometryError::ReplicaOverflow {
                replica: replica.name,
                mother: mother.name.clone(),
                required,
                available,
            });
        }
        Ok(self.push_physical(PhysicalVolume::Replica(replica)))
    }

    fn check_link(&self, name: &str, logical: VolumeId, mother: VolumeId) -> GeometryResult<()> {
        self.logical(logical)?;
        self.logical(mother)?;
        if logical == mother || Some(logical) == self.world {
            return Err(GeometryError::UnknownVolume(format!(
                "{} cannot be placed inside {}",
                name, self.logical[mother.0].name
            )));
        }
        Ok(())
    }

    fn push_physical(&mut self, volume: PhysicalVolume) -> PhysicalId {
        let id = PhysicalId(self.physical.len());
        self.physical_index
            .entry(volume.name().to_string())
            .or_insert(id);
        self.physical.push(volume);
        id
    }

    pub fn logical(&self, id: VolumeId) -> GeometryResult<&LogicalVolume> {
        self.logical
            .get(id.0)
            .ok_or_else(|| GeometryError::UnknownVolume(format!("logical volume #{}", id.0)))
    }

    pub fn physical(&self, id: PhysicalId) -> GeometryResult<&PhysicalVolume> {
        self.physical
            .get(id.0)
            .ok_or_else(|| GeometryError::UnknownVolume(format!("physical volume #{}", id.0)))
    }

    fn logical_mut(&mut self, id: VolumeId) -> GeometryResult<&mut LogicalVolume> {
        self.logical
            .get_mut(id.0)
            .ok_or_else(|| GeometryError::UnknownVolume(format!("logical volume #{}", id.0)))
    }

    pub fn find_logical(&self, name: &str) -> Option<VolumeId> {
        self.logical_index.get(name).copied()
    }

    pub fn find_physical(&self, name: &str) -> Option<PhysicalId> {
        self.physical_index.get(name).copied()
    }

    /// Look up a logical volume by name, failing with `UnknownVolume`.
    pub fn logical_by_name(&self, name: &str) -> GeometryResult<&LogicalVolume> {
        let id = self
            .find_logical(name)
            .ok_or_else(|| GeometryError::UnknownVolume(name.to_string()))?;
        self.logical(id)
    }

    pub fn set_user_limits(&mut self, volume: VolumeId, limits: UserLimits) -> GeometryResult<()> {
        self.logical_mut(volume)?.user_limits = Some(limits);
        Ok(())
    }

    pub fn attach_field(
        &mut self,
        volume: VolumeId,
        setup: MwpcFieldSetup,
        propagate_to_daughters: bool,
    ) -> GeometryResult<()> {
        self.logical_mut(volume)?.field = Some(FieldAttachment {
            setup,
            propagate_to_daughters,
        });
        Ok(())
    }

    /// Point every volume filled with a material of the same name at
    /// `material`. Returns how many volumes changed.
    pub fn replace_material(&mut self, material: &Arc<Material>) -> usize {
        let mut count = 0;
        for volume in self.logical.iter_mut() {
            if volume.material.name == material.name {
                volume.material = Arc::clone(material);
                count += 1;
            }
        }
        count
    }

    /// Physical volumes placed directly inside `volume`.
    pub fn daughters(&self, volume: VolumeId) -> Vec<PhysicalId> {
        self.physical
            .iter()
            .enumerate()
            .filter(|(_, p)| p.mother() == volume)
            .map(|(i, _)| PhysicalId(i))
            .collect()
    }

    /// First physical volume that positions `volume`, if any.
    fn parent(&self, volume: VolumeId) -> Option<VolumeId> {
        self.physical
            .iter()
            .find(|p| p.logical() == volume)
            .map(|p| p.mother())
    }

    /// Number of mothers between `volume` and the world; the world has depth 0.
    pub fn depth(&self, volume: VolumeId) -> GeometryResult<usize> {
        let world = self.world()?;
        let mut current = volume;
        let mut depth = 0;
        while current != world {
            current = self.parent(current).ok_or_else(|| {
                GeometryError::UnknownVolume(format!(
                    "{} is not connected to the world",
                    self.logical.get(volume.0).map_or("?", |v| v.name.as_str())
                ))
            })?;
            depth += 1;
            if depth > self.physical.len() {
                return Err(GeometryError::UnknownVolume(format!(
                    "placement cycle above logical volume #{}",
                    volume.0
                )));
            }
        }
        Ok(depth)
    }

    /// The field acting inside `volume`: its own, or the nearest ancestor's
    /// when that one propagates to daughters.
    pub fn effective_field(&self, volume: VolumeId) -> Option<&MwpcFieldSetup> {
        let mut current = volume;
        let mut own = true;
        for _ in 0..=self.physical.len() {
            let lv = self.logical.get(current.0)?;
            if let Some(attachment) = &lv.field {
                if own || attachment.propagate_to_daughters {
                    return Some(&attachment.setup);
                }
            }
            own = false;
            current = self.parent(current)?;
        }
        None
    }

    pub fn logical_count(&self) -> usize {
        self.logical.len()
    }

    /// Number of placements and replicas, counting a replica once.
    pub fn physical_count(&self) -> usize {
        self.physical.len()
    }

    pub fn logical_volumes(&self) -> impl Iterator<Item = (VolumeId, &LogicalVolume)> {
        self.logical.iter().enumerate().map(|(i, v)| (VolumeId(i), v))
    }

    pub fn physical_volumes(&self) -> impl Iterator<Item = (PhysicalId, &PhysicalVolume)> {
        self.physical.iter().enumerate().map(|(i, v)| (PhysicalId(i), v))
    }

    /// Every checked placement whose daughter extent leaves its mother's extent.
    pub fn overlap_violations(&self) -> Vec<GeometryError> {
        let mut violations = Vec::new();
        for volume in &self.physical {
            let PhysicalVolume::Placement(p) = volume else {
                continue;
            };
            if !p.check_overlaps {
                continue;
            }
            let (Some(daughter), Some(mother)) =
                (self.logical.get(p.logical.0), self.logical.get(p.mother.0))
            else {
                continue;
            };
            let orientation = p.rotation.inverse();
            let extent = daughter
                .solid
                .bounding_box()
                .transformed(orientation.matrix(), p.translation);
            let inside = mother
                .solid
                .bounding_box()
                .contains_box(&extent, OVERLAP_TOLERANCE);
            tracing::debug!(
                placement = %p.name,
                mother = %mother.name,
                inside,
                "checking placement"
            );
            if !inside {
                violations.push(GeometryError::OutsideMother {
                    placement: p.name.clone(),
                    mother: mother.name.clone(),
                });
            }
        }
        violations
    }

    pub fn check_overlaps(&self) -> GeometryResult<()> {
        match self.overlap_violations().into_iter().next() {
            Some(violation) => Err(violation),
            None => Ok(()),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
