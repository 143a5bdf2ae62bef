//! A single parser finding.

use std::fmt;

use crate::{
    error::{Severity, error_code::ErrorCode, label::Label},
    span::Span,
};

/// One error or warning raised while parsing a `.poem` source.
///
/// Built with a severity constructor and refined with the `with_*`
/// methods. The first label added is the one the CLI underlines with
/// carets; later ones may be secondary.
///
/// ```text
/// warning[W001]: undefined variable `mood`
///  9 | ${mood}
///    | ^^^^^^^ referenced here
///    = help: define it with `={mood}=...` before first use
/// ```
///
/// ```
/// # use stanza_parser::error::{Diagnostic, ErrorCode};
/// # use stanza_parser::Span;
/// let diag = Diagnostic::error("missing title")
///     .with_code(ErrorCode::E001)
///     .with_label(Span::new(0..0), "expected a title line")
///     .with_help("the first non-empty line of a poem is its title");
///
/// assert_eq!(diag.to_string(), "error[E001]: missing title");
/// assert_eq!(diag.primary_span(), Some(Span::new(0..0)));
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    fn with_severity(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }

    /// A finding that stops the parse.
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, message)
    }

    /// A finding the parse recovers from.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Warning, message)
    }

    pub fn with_code(self, code: ErrorCode) -> Self {
        Self {
            code: Some(code),
            ..self
        }
    }

    pub fn with_label(self, span: Span, message: impl Into<String>) -> Self {
        self.push_label(Label::primary(span, message))
    }

    /// Add a label for related source, such as the line a name was defined.
    pub fn with_secondary_label(self, span: Span, message: impl Into<String>) -> Self {
        self.push_label(Label::secondary(span, message))
    }

    pub fn with_help(self, help: impl Into<String>) -> Self {
        Self {
            help: Some(help.into()),
            ..self
        }
    }

    fn push_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Span of the first primary label.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find(|label| label.is_primary())
            .map(Label::span)
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{code}]")?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_warning() {
        let diag = Diagnostic::warning("empty span class");

        assert!(diag.severity().is_warning());
        assert_eq!(diag.code(), None);
        assert_eq!(diag.primary_span(), None);
        assert_eq!(diag.help(), None);
        assert_eq!(diag.to_string(), "warning: empty span class");
    }

    #[test]
    fn test_unresolved_variable_warning() {
        let diag = Diagnostic::warning("variable `a` still contains `${c}`")
            .with_code(ErrorCode::W004)
            .with_secondary_label(Span::new(0..9), "`c` defined here")
            .with_label(Span::new(30..34), "used here")
            .with_help("define `c` before `b` refers to it");

        assert_eq!(diag.labels().len(), 2);
        assert!(diag.labels()[0].is_secondary());
        assert_eq!(diag.primary_span(), Some(Span::new(30..34)));
        assert_eq!(diag.help(), Some("define `c` before `b` refers to it"));
        assert_eq!(
            diag.to_string(),
            "warning[W004]: variable `a` still contains `${c}`"
        );
    }

    #[test]
    fn test_later_code_replaces_earlier() {
        let diag = Diagnostic::error("poem has no versions")
            .with_code(ErrorCode::E001)
            .with_code(ErrorCode::E003);

        assert!(diag.severity().is_error());
        assert_eq!(diag.to_string(), "error[E003]: poem has no versions");
    }
}
