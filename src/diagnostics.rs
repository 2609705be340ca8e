//! Append-only diagnostic log shared by the parser and the enricher.
//!
//! Lines starting with `!` are errors and lines starting with `}` are
//! warnings; anything else is informational. Every line pushed through
//! [`Diagnostics`] is mirrored to `tracing` at the matching level.

use tracing::{error, info, warn};

use crate::error::MapError;

/// Prefix marking an error line.
pub const ERROR_PREFIX: char = '!';
/// Prefix marking a warning line.
pub const WARNING_PREFIX: char = '}';
/// Final line written after a fatal error.
pub const ABORT_LINE: &str = "!Aborting...";

/// Receiver for human-readable diagnostic lines.
pub trait DiagnosticSink: Send {
    fn push(&mut self, line: String);
}

impl DiagnosticSink for Vec<String> {
    fn push(&mut self, line: String) {
        Vec::push(self, line);
    }
}

/// Drops every line. For callers whose only output is the `tracing` mirror.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl DiagnosticSink for DiscardSink {
    fn push(&mut self, _line: String) {}
}

/// Severity encoded in the first character of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn of(line: &str) -> Self {
        match line.chars().next() {
            Some(ERROR_PREFIX) => Severity::Error,
            Some(WARNING_PREFIX) => Severity::Warning,
            _ => Severity::Info,
        }
    }
}

/// Thin writer over a sink that applies the line conventions.
pub struct Diagnostics<'a> {
    sink: &'a mut dyn DiagnosticSink,
}

impl<'a> Diagnostics<'a> {
    pub fn new(sink: &'a mut dyn DiagnosticSink) -> Self {
        Self { sink }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("{message}");
        self.sink.push(message);
    }

    pub fn warn(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        warn!("{message}");
        self.sink.push(format!("{WARNING_PREFIX}{message}"));
    }

    /// Records a per-item error that does not stop the surrounding operation.
    pub fn error(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        error!("{message}");
        self.sink.push(format!("{ERROR_PREFIX}{message}"));
    }

    /// Records a fatal error followed by the abort marker and hands the error
    /// back so callers can `return Err(diag.fatal(..))`.
    pub fn fatal(&mut self, err: MapError) -> MapError {
        self.error(err.to_string());
        self.sink.push(ABORT_LINE.to_string());
        err
    }
}
