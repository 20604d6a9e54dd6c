use crate::decay::DecayTable;
use crate::error::SourceError;
use crate::particle::EmissionEvent;
use crate::stats::{sample_disk, AngularDistribution};
use crate::units::MM;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Physical extent of the emitting foil: a disk in the plane z = center.z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceGeometry {
    radius: f64,
    center: [f64; 3],
}

impl SourceGeometry {
    pub fn new(radius: f64, center: [f64; 3]) -> Result<Self, SourceError> {
        if !(radius >= 0.0) || !radius.is_finite() {
            return Err(SourceError::InvalidRadius(radius));
        }
        Ok(Self { radius, center })
    }

    /// A point source at `center`.
    pub fn point(center: [f64; 3]) -> Self {
        Self {
            radius: 0.0,
            center,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn center(&self) -> [f64; 3] {
        self.center
    }

    /// Uniform emission point on the disk.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<[f64; 3], SourceError> {
        let [x, y] = sample_disk(self.radius, rng)?;
        Ok([self.center[0] + x, self.center[1] + y, self.center[2]])
    }
}

impl Default for SourceGeometry {
    /// The sealed source foil: 3 mm radius at the origin.
    fn default() -> Self {
        Self {
            radius: 3.0 * MM,
            center: [0.0, 0.0, 0.0],
        }
    }
}

/// Radioactive calibration source: decay lines, emission angles and foil extent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecaySource {
    pub table: DecayTable,
    pub angle: AngularDistribution,
    pub geometry: SourceGeometry,
}

impl DecaySource {
    /// Isotropic 113Sn source on the default foil.
    pub fn new() -> Self {
        Self {
            table: DecayTable::sn113(),
            angle: AngularDistribution::Isotropic,
            geometry: SourceGeometry::default(),
        }
    }

    pub fn with_geometry(mut self, geometry: SourceGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Draw one primary. Branch selection happens first, then the direction
    /// and the position, so the draw order matches a plain sequential run.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<EmissionEvent, SourceError> {
        let branch = *self.table.sample(rng)?;
        let direction = self.angle.sample(rng);
        let position = self.geometry.sample(rng)?;
        Ok(EmissionEvent::new(
            branch.species,
            branch.energy,
            direction,
            position,
        ))
    }
}

impl Default for DecaySource {
    fn default() -> Self {
        Self::new()
    }
}
