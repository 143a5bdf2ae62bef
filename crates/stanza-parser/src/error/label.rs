//! Source spans annotated with a short message.

use crate::span::Span;

/// A message pinned to a byte range of the `.poem` source.
///
/// Each diagnostic has one primary label at the offending line. Secondary
/// labels point at related lines, such as the definition a `W004` warning
/// is about:
///
/// ```text
/// warning[W004]: variable `a` still contains `${c}`
///  1 | ={a}=${b}
///    | --------- defined here
///  3 | ={c}=x
///    | ------ `c` defined here
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    span: Span,
    message: String,
    primary: bool,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self::with_role(span, message, true)
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self::with_role(span, message, false)
    }

    fn with_role(span: Span, message: impl Into<String>, primary: bool) -> Self {
        Self {
            span,
            message: message.into(),
            primary,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    pub fn is_secondary(&self) -> bool {
        !self.primary
    }
}
