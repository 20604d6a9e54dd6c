use crate::error::SourceError;
use crate::units::{ELECTRON_MASS, KEV, M, NS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Particle species emitted by the calibration source, named as in the host
/// particle table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleSpecies {
    Gamma,
    Electron,
}

impl ParticleSpecies {
    /// Look up a species by its particle-table name ("gamma", "e-").
    pub fn from_name(name: &str) -> Result<Self, SourceError> {
        match name {
            "gamma" => Ok(ParticleSpecies::Gamma),
            "e-" => Ok(ParticleSpecies::Electron),
            other => Err(SourceError::UnknownParticle(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ParticleSpecies::Gamma => "gamma",
            ParticleSpecies::Electron => "e-",
        }
    }

    pub fn pdg_code(&self) -> i32 {
        match self {
            ParticleSpecies::Gamma => 22,
            ParticleSpecies::Electron => 11,
        }
    }

    /// Rest mass in MeV.
    pub fn mass(&self) -> f64 {
        match self {
            ParticleSpecies::Gamma => 0.0,
            ParticleSpecies::Electron => ELECTRON_MASS,
        }
    }
}

impl fmt::Display for ParticleSpecies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for ParticleSpecies {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// One primary particle handed to the transport engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionEvent {
    pub species: ParticleSpecies,
    /// Kinetic energy in MeV
    pub energy: f64,
    /// Unit momentum direction
    pub direction: [f64; 3],
    /// Emission point in mm
    pub position: [f64; 3],
    /// Emission time in ns
    pub time: f64,
}

impl EmissionEvent {
    pub fn new(
        species: ParticleSpecies,
        energy: f64,
        direction: [f64; 3],
        position: [f64; 3],
    ) -> Self {
        Self {
            species,
            energy,
            direction,
            position,
            time: 0.0,
        }
    }

    /// Momentum vector in MeV/c, from the relativistic energy-momentum relation.
    pub fn momentum(&self) -> [f64; 3] {
        let mass = self.species.mass();
        let p = (self.energy * (self.energy + 2.0 * mass)).sqrt();
        [
            p * self.direction[0],
            p * self.direction[1],
            p * self.direction[2],
        ]
    }
}

/// Gun status line: species, origin in m, direction, time in ns, energy in keV.
impl fmt::Display for EmissionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} gun firing from ({}, {}, {}) m towards ({}, {}, {}) at {} ns : {} keV",
            self.species,
            self.position[0] / M,
            self.position[1] / M,
            self.position[2] / M,
            self.direction[0],
            self.direction[1],
            self.direction[2],
            self.time / NS,
            self.energy / KEV
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_lookup() {
        assert_eq!(ParticleSpecies::from_name("gamma"), Ok(ParticleSpecies::Gamma));
        assert_eq!("e-".parse::<ParticleSpecies>(), Ok(ParticleSpecies::Electron));
        assert_eq!(
            ParticleSpecies::from_name("proton"),
            Err(SourceError::UnknownParticle("proton".to_string()))
        );
    }

    #[test]
    fn test_species_round_trip_name() {
        for species in [ParticleSpecies::Gamma, ParticleSpecies::Electron] {
            assert_eq!(ParticleSpecies::from_name(species.name()), Ok(species));
        }
        assert_eq!(ParticleSpecies::Gamma.pdg_code(), 22);
        assert_eq!(ParticleSpecies::Electron.pdg_code(), 11);
    }

    #[test]
    fn test_event_construction() {
        let e = EmissionEvent::new(
            ParticleSpecies::Gamma,
            0.391698,
            [0.0, 0.0, 1.0],
            [1.0, 2.0, 0.0],
        );
        assert_eq!(e.time, 0.0);
        assert_eq!(e.position, [1.0, 2.0, 0.0]);
        assert_eq!(e.direction, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_photon_momentum_equals_energy() {
        let e = EmissionEvent::new(ParticleSpecies::Gamma, 0.4, [0.0, 1.0, 0.0], [0.0; 3]);
        let p = e.momentum();
        assert!((p[1] - 0.4).abs() < 1e-12);
        assert_eq!(p[0], 0.0);
    }

    #[test]
    fn test_electron_momentum() {
        let t = 0.363758;
        let e = EmissionEvent::new(ParticleSpecies::Electron, t, [1.0, 0.0, 0.0], [0.0; 3]);
        let p = e.momentum()[0];
        let total = t + ELECTRON_MASS;
        assert!((total * total - p * p - ELECTRON_MASS * ELECTRON_MASS).abs() < 1e-12);
    }

    #[test]
    fn test_gun_status_line() {
        let e = EmissionEvent::new(
            ParticleSpecies::Electron,
            363.758 * KEV,
            [0.0, 0.0, 1.0],
            [0.0; 3],
        );
        let line = e.to_string();
        assert!(line.starts_with("e- gun firing"));
        assert!(line.contains("363.758"));
        assert!(line.ends_with("keV"));
    }
}
