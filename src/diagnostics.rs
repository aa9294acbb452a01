use crate::error::{ErrorKind, LoxError};
use std::io;
use tracing::debug;

/// Sink shared by the scanner, parser and interpreter.
///
/// Records every reported error in order and keeps two sticky flags. The
/// syntax flag is cleared only by [`Diagnostics::reset_syntax_error`]; the
/// runtime flag lives as long as the sink.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<LoxError>,
    had_syntax_error: bool,
    had_runtime_error: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error of any kind. Scanner and parser errors set the syntax
    /// flag, runtime errors the runtime flag.
    pub fn report(&mut self, error: LoxError) {
        debug!(line = error.line(), kind = ?error.kind, "{}", error.message);
        if error.kind.is_static() {
            self.had_syntax_error = true;
        } else {
            self.had_runtime_error = true;
        }
        self.errors.push(error);
    }

    pub fn runtime_error(&mut self, error: LoxError) {
        debug_assert_eq!(error.kind, ErrorKind::Runtime);
        self.report(error);
    }

    pub fn had_syntax_error(&self) -> bool {
        self.had_syntax_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    pub fn reset_syntax_error(&mut self) {
        self.had_syntax_error = false;
    }

    pub fn errors(&self) -> &[LoxError] {
        &self.errors
    }

    /// Drain the recorded errors. Flags are untouched.
    pub fn take_errors(&mut self) -> Vec<LoxError> {
        std::mem::take(&mut self.errors)
    }

    /// Render and drain pending errors on stderr.
    ///
    /// `plain` prints the one-line `[line N] ...` form instead of an ariadne
    /// report.
    pub fn flush(&mut self, source: &str, filename: Option<&str>, plain: bool) -> io::Result<()> {
        for error in self.take_errors() {
            if plain {
                eprintln!("{}", error);
            } else {
                error.report(source, filename)?;
            }
        }
        Ok(())
    }
}
