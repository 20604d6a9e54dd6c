use thiserror::Error;

/// Failures while sampling a primary event.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    /// The scaled draw fell outside every decay branch.
    #[error("random number sampled beyond the decay table: {percentage}% of {total}%")]
    SelectionOutOfRange { percentage: f64, total: f64 },

    /// Disk rejection sampling hit its attempt cap.
    #[error("disk rejection sampling exhausted after {attempts} attempts (radius {radius} mm)")]
    RejectionExhausted { attempts: usize, radius: f64 },

    #[error("invalid source radius: {0}")]
    InvalidRadius(f64),

    #[error("invalid decay table: {0}")]
    InvalidDecayTable(String),

    #[error("unknown particle species: {0}")]
    UnknownParticle(String),

    #[error("direction vector cannot be zero")]
    ZeroDirection,

    /// Every redraw allowed by the retry policy was out of range.
    #[error("no primary produced after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

/// Failures while assembling the detector description.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("invalid dimensions for solid '{solid}': {reason}")]
    InvalidDimensions { solid: String, reason: String },

    #[error("duplicate logical volume name: {0}")]
    DuplicateVolume(String),

    #[error("unknown volume: {0}")]
    UnknownVolume(String),

    #[error("invalid material '{material}': {reason}")]
    InvalidMaterial { material: String, reason: String },

    #[error("unknown material: {0}")]
    UnknownMaterial(String),

    #[error("geometry has no world volume")]
    NoWorld,

    /// A checked placement pokes out of its mother's extent.
    #[error("placement '{placement}' extends outside mother '{mother}'")]
    OutsideMother { placement: String, mother: String },

    #[error("replica '{replica}' needs {required} mm but mother '{mother}' offers {available} mm")]
    ReplicaOverflow {
        replica: String,
        mother: String,
        required: f64,
        available: f64,
    },
}

/// Failures while loading configuration or settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type SourceResult<T> = Result<T, SourceError>;
pub type GeometryResult<T> = Result<T, GeometryError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
