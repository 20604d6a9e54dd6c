use crate::diagnostics::DiagnosticLog;
use crate::error::{ConfigError, ConfigResult};
use crate::fast_rng::FastRng;
use crate::generator::{OutOfRangePolicy, PrimaryGenerator};
use crate::source::{DecaySource, SourceGeometry};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Run-level settings the host hands to the primary generators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub events: usize,
    pub seed: u64,
    pub policy: OutOfRangePolicy,
    pub source: DecaySource,
    /// Per-event text log; worker `n > 0` writes to `<stem>.<n>.<ext>`.
    pub diagnostic_log: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            events: 1000,
            seed: 1,
            policy: OutOfRangePolicy::default(),
            source: DecaySource::new(),
            diagnostic_log: None,
        }
    }
}

impl Settings {
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let g = self.source.geometry;
        SourceGeometry::new(g.radius(), g.center())
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if let OutOfRangePolicy::Retry { max_attempts: 0 } = self.policy {
            return Err(ConfigError::Invalid(
                "retry policy needs at least one attempt".to_string(),
            ));
        }
        Ok(())
    }

    /// Generator for stream 0 of the configured seed.
    pub fn generator(&self) -> PrimaryGenerator<FastRng> {
        self.stream_generator(0)
    }

    /// Generator drawing from stream `stream` of the configured seed.
    pub fn stream_generator(&self, stream: u64) -> PrimaryGenerator<FastRng> {
        let rng = FastRng::with_stream(self.seed, stream);
        let mut generator =
            PrimaryGenerator::new(self.source.clone(), rng).with_policy(self.policy);
        if let Some(path) = &self.diagnostic_log {
            generator.attach(Box::new(DiagnosticLog::new(worker_log_path(path, stream))));
        }
        generator
    }

    /// One independent generator per worker, each on its own stream.
    pub fn worker_generators(&self, workers: usize) -> Vec<PrimaryGenerator<FastRng>> {
        (0..workers as u64)
            .map(|stream| self.stream_generator(stream))
            .collect()
    }
}

fn worker_log_path(path: &Path, stream: u64) -> PathBuf {
    if stream == 0 {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}.{}.{}", stem, stream, ext.to_string_lossy()),
        None => format!("{}.{}", stem, stream),
    };
    path.with_file_name(name)
}
