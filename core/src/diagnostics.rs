//! Reporting hook for failures that are absorbed instead of raised.
//!
//! A body that fails to encode, or extra headers that fail to project, do not
//! fail the request. They are reported here so the degradation stays visible.

use std::sync::Mutex;

/// Something went wrong locally and the request continued without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The POST body could not be encoded; the request is sent without a body.
    BodyEncodingFailed { error: String },

    /// The additional-headers payload could not be projected; no extra
    /// headers were applied.
    HeaderProjectionFailed { error: String },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::BodyEncodingFailed { error } => {
                write!(f, "failed to encode body: {error}")
            }
            Diagnostic::HeaderProjectionFailed { error } => {
                write!(f, "failed to project additional headers: {error}")
            }
        }
    }
}

/// Receives diagnostics raised during request assembly.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic);
}

/// Forwards diagnostics to the `log` facade at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, diagnostic: &Diagnostic) {
        log::warn!("{diagnostic}");
    }
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Diagnostic>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far, oldest first.
    pub fn events(&self) -> Vec<Diagnostic> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        match self.events.lock() {
            Ok(mut events) => events.push(diagnostic.clone()),
            Err(poisoned) => poisoned.into_inner().push(diagnostic.clone()),
        }
    }
}
