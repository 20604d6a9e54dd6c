use crate::diagnostics::EventObserver;
use crate::error::SourceError;
use crate::fast_rng::FastRng;
use crate::particle::EmissionEvent;
use crate::source::DecaySource;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// What to do when a draw lands outside every decay branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutOfRangePolicy {
    /// Redraw the whole event, up to `max_attempts` draws in total.
    Retry { max_attempts: u32 },
    /// Return the error for this event immediately.
    Abort,
}

impl Default for OutOfRangePolicy {
    fn default() -> Self {
        OutOfRangePolicy::Retry { max_attempts: 8 }
    }
}

/// Produces one primary per call from a source and a generator-owned RNG.
///
/// The RNG is never shared: hosts that parallelise event generation build one
/// `PrimaryGenerator` per worker (see [`crate::settings::Settings::worker_generators`]).
pub struct PrimaryGenerator<R: Rng = FastRng> {
    source: DecaySource,
    rng: R,
    policy: OutOfRangePolicy,
    observers: Vec<Box<dyn EventObserver>>,
    generated: u64,
    anomalies: u64,
}

impl<R: Rng> PrimaryGenerator<R> {
    pub fn new(source: DecaySource, rng: R) -> Self {
        Self {
            source,
            rng,
            policy: OutOfRangePolicy::default(),
            observers: Vec::new(),
            generated: 0,
            anomalies: 0,
        }
    }

    pub fn with_policy(mut self, policy: OutOfRangePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn attach(&mut self, observer: Box<dyn EventObserver>) {
        self.observers.push(observer);
    }

    pub fn source(&self) -> &DecaySource {
        &self.source
    }

    pub fn policy(&self) -> OutOfRangePolicy {
        self.policy
    }

    /// Events handed out so far.
    pub fn generated(&self) -> u64 {
        self.generated
    }

    /// Out-of-range draws seen so far, including ones a retry recovered from.
    pub fn anomalies(&self) -> u64 {
        self.anomalies
    }

    /// Generate the next primary event.
    ///
    /// An out-of-range branch draw is never turned into a particle: depending
    /// on the policy the event is redrawn or the error is returned. Any other
    /// sampling error is returned as is.
    pub fn generate_primaries(&mut self) -> Result<EmissionEvent, SourceError> {
        let attempts = match self.policy {
            OutOfRangePolicy::Retry { max_attempts } => max_attempts.max(1),
            OutOfRangePolicy::Abort => 1,
        };
        for attempt in 1..=attempts {
            match self.source.sample(&mut self.rng) {
                Ok(event) => {
                    self.generated += 1;
                    tracing::trace!(event = self.generated, "{}", event);
                    for observer in self.observers.iter_mut() {
                        observer.on_event(&event);
                    }
                    return Ok(event);
                }
                Err(e @ SourceError::SelectionOutOfRange { .. }) => {
                    self.anomalies += 1;
                    tracing::warn!(attempt, error = %e, "primary selection out of range");
                    if self.policy == OutOfRangePolicy::Abort {
                        return Err(e);
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Err(SourceError::RetriesExhausted { attempts })
    }

    pub fn flush(&mut self) {
        for observer in self.observers.iter_mut() {
            observer.flush();
        }
    }
}

impl<R: Rng> Drop for PrimaryGenerator<R> {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Lets a host keep a handle on an observer it attached.
impl<T: EventObserver> EventObserver for Arc<Mutex<T>> {
    fn on_event(&mut self, event: &EmissionEvent) {
        self.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .on_event(event);
    }

    fn flush(&mut self) {
        self.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .flush();
    }
}
