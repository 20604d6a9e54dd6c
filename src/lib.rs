// Primary generation and detector description for a 113Sn calibration run
// of a UCNA-style beta spectrometer.
pub mod bounding_box;
pub mod config;
pub mod decay;
pub mod detector;
pub mod diagnostics;
pub mod error;
pub mod fast_rng;
pub mod field;
pub mod generator;
pub mod geometry;
pub mod material;
pub mod materials;
pub mod particle;
pub mod settings;
pub mod solid;
pub mod source;
pub mod stats;
pub mod units;
pub mod volume;

pub use config::Config;
pub use decay::{DecayBranch, DecayTable};
pub use detector::{Detector, DetectorConstruction, Side};
pub use diagnostics::{DiagnosticLog, EventObserver, EventRecorder};
pub use error::{ConfigError, GeometryError, SourceError};
pub use fast_rng::FastRng;
pub use generator::{OutOfRangePolicy, PrimaryGenerator};
pub use geometry::Geometry;
pub use material::{Element, Material};
pub use materials::Materials;
pub use particle::{EmissionEvent, ParticleSpecies};
pub use settings::Settings;
pub use source::{DecaySource, SourceGeometry};
pub use stats::AngularDistribution;
