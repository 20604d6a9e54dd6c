// Observers attached to a primary generator. They see every emitted event
// after sampling; none of them can fail the generator.

use crate::particle::EmissionEvent;
use crate::units::CM;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Receives each primary after it has been generated.
pub trait EventObserver: Send {
    fn on_event(&mut self, event: &EmissionEvent);

    fn flush(&mut self) {}
}

/// One tab-separated record: name, direction x/y/z, position x/y/z in cm.
pub fn format_record(event: &EmissionEvent) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}",
        event.species.name(),
        event.direction[0],
        event.direction[1],
        event.direction[2],
        event.position[0] / CM,
        event.position[1] / CM,
        event.position[2] / CM
    )
}

/// Append-only text log of emitted primaries.
///
/// The file is opened lazily in append mode. An open or write failure is
/// reported once through `tracing` and the log goes quiet; generation carries on.
pub struct DiagnosticLog {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    failed: bool,
    written: u64,
}

impl DiagnosticLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
            failed: false,
            written: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records successfully handed to the writer.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// True once an I/O error has disabled the log.
    pub fn is_disabled(&self) -> bool {
        self.failed
    }

    fn writer(&mut self) -> Option<&mut BufWriter<File>> {
        if self.failed {
            return None;
        }
        if self.writer.is_none() {
            match OpenOptions::new().create(true).append(true).open(&self.path) {
                Ok(file) => self.writer = Some(BufWriter::new(file)),
                Err(e) => {
                    self.disable(&e);
                    return None;
                }
            }
        }
        self.writer.as_mut()
    }

    fn disable(&mut self, error: &std::io::Error) {
        tracing::warn!(
            path = %self.path.display(),
            error = %error,
            "diagnostic log disabled"
        );
        self.failed = true;
        self.writer = None;
    }
}

impl EventObserver for DiagnosticLog {
    fn on_event(&mut self, event: &EmissionEvent) {
        let line = format_record(event);
        let result = match self.writer() {
            Some(w) => writeln!(w, "{}", line),
            None => return,
        };
        match result {
            Ok(()) => self.written += 1,
            Err(e) => self.disable(&e),
        }
    }

    fn flush(&mut self) {
        if let Some(w) = self.writer.as_mut() {
            if let Err(e) = w.flush() {
                self.disable(&e);
            }
        }
    }
}

impl Drop for DiagnosticLog {
    fn drop(&mut self) {
        EventObserver::flush(self);
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default, Clone)]
pub struct EventRecorder {
    pub events: Vec<EmissionEvent>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventObserver for EventRecorder {
    fn on_event(&mut self, event: &EmissionEvent) {
        self.events.push(event.clone());
    }
}
