//! Collector for accumulating diagnostics during a parse.
//!
//! The preprocessing stages and the inliner report content problems (an
//! undefined variable, a malformed span class) as warnings and keep going.
//! The [`DiagnosticCollector`] gathers them and decides at the end whether
//! the parse as a whole succeeded.

use crate::error::{Diagnostic, ParseError};

/// A collector for accumulating diagnostics during a parse.
///
/// # Example
///
/// ```text
/// let mut collector = DiagnosticCollector::new();
///
/// collector.emit(
///     Diagnostic::warning("undefined variable `mood`")
///         .with_code(ErrorCode::W001)
///         .with_label(Span::new(20..27), "referenced here")
/// );
///
/// // Only warnings were emitted, so the parse succeeds
/// let warnings = collector.finish()?;
/// ```
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    ///
    /// The diagnostic is added to the collection and if it's an error,
    /// the collector is marked as having errors.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Abort with a fatal diagnostic, keeping everything emitted so far.
    pub fn fail(mut self, diagnostic: Diagnostic) -> ParseError {
        self.emit(diagnostic);
        ParseError::new(self.diagnostics)
    }

    /// Take all diagnostics regardless of severity.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Finish collection and return a result.
    ///
    /// - If there are errors, returns `Err(ParseError)` with all diagnostics.
    /// - If there are no errors, returns the warnings in emission order.
    pub fn finish(self) -> Result<Vec<Diagnostic>, ParseError> {
        if self.has_errors {
            Err(ParseError::new(self.diagnostics))
        } else {
            Ok(self.diagnostics)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorCode, span::Span};

    #[test]
    fn test_collector_new_finish_ok() {
        let collector = DiagnosticCollector::new();
        let warnings = collector.finish().expect("no errors emitted");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_collector_emit_error_finish_err() {
        let mut collector = DiagnosticCollector::new();

        collector.emit(Diagnostic::error("missing title"));

        assert!(collector.finish().is_err());
    }

    #[test]
    fn test_collector_warnings_are_returned() {
        let mut collector = DiagnosticCollector::new();

        collector.emit(Diagnostic::warning("warning 1").with_code(ErrorCode::W001));
        collector.emit(Diagnostic::warning("warning 2").with_code(ErrorCode::W003));

        let warnings = collector.finish().expect("warnings only");
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].code(), Some(ErrorCode::W001));
        assert_eq!(warnings[1].code(), Some(ErrorCode::W003));
    }

    #[test]
    fn test_collector_error_keeps_earlier_warnings() {
        let mut collector = DiagnosticCollector::new();

        collector.emit(Diagnostic::warning("undefined variable `x`").with_code(ErrorCode::W001));
        collector.emit(
            Diagnostic::error("missing or invalid date")
                .with_code(ErrorCode::E002)
                .with_label(Span::new(10..20), "here"),
        );

        let err = collector.finish().unwrap_err();
        assert_eq!(err.diagnostics().len(), 2);
        assert_eq!(err.diagnostics()[1].message(), "missing or invalid date");
    }

    #[test]
    fn test_collector_fail_appends_fatal() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::warning("empty span class").with_code(ErrorCode::W002));

        let err = collector.fail(Diagnostic::error("missing title").with_code(ErrorCode::E001));
        assert_eq!(err.diagnostics().len(), 2);
        assert_eq!(
            err.first_error().and_then(Diagnostic::code),
            Some(ErrorCode::E001)
        );
    }
}
