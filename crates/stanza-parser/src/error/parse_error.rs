//! The error returned by a failed parse.

use std::fmt;

use crate::error::Diagnostic;

/// Everything the parser reported before it gave up.
///
/// Diagnostics stay in the order they were raised, so warnings from
/// preprocessing come before the error that stopped the parse. The
/// `Display` form names only the error and counts the rest.
#[derive(Debug)]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The earliest diagnostic with error severity.
    pub fn first_error(&self) -> Option<&Diagnostic> {
        self.diagnostics
            .iter()
            .find(|diag| diag.severity().is_error())
    }

    fn headline(&self) -> Option<&Diagnostic> {
        self.first_error().or_else(|| self.diagnostics.first())
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(headline) = self.headline() else {
            return f.write_str("parse failed");
        };
        fmt::Display::fmt(headline, f)?;
        match self.diagnostics.len() {
            0 | 1 => Ok(()),
            n => write!(f, " (+{} more)", n - 1),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::new(vec![diagnostic])
    }
}

impl From<Vec<Diagnostic>> for ParseError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self::new(diagnostics)
    }
}
