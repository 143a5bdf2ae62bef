//! Error codes for the Stanza diagnostic system.
//!
//! Codes are organized by severity:
//! - `E0xx` - Structural errors that abort the parse
//! - `W0xx` - Content warnings; the parse still produces a document

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Structural Errors (E0xx)
    // =========================================================================
    /// Missing title.
    ///
    /// The source has no non-empty line left after comments and variable
    /// definitions are removed.
    E001,

    /// Missing or invalid date.
    ///
    /// The header must carry a `YYYY-MM-DD` date on the line after the title
    /// (or after the author, when one is given).
    E002,

    /// Poem has no versions.
    ///
    /// The header was followed by no segment content at all.
    E003,

    // =========================================================================
    // Content Warnings (W0xx)
    // =========================================================================
    /// Undefined variable.
    ///
    /// A `${name}` reference names a variable that was never defined. The
    /// reference is left in the output verbatim.
    W001,

    /// Empty span class.
    ///
    /// A `<<.:text>>` span has no class and is rendered as a bare `<span>`.
    W002,

    /// Invalid span class.
    ///
    /// A span class contains characters outside letters, digits, `_`, `-`
    /// and `.`; the markup is left unchanged.
    W003,

    /// Unresolved variable reference.
    ///
    /// A variable value still contains a `${...}` reference after the
    /// definitions were resolved, usually because it refers to a variable
    /// defined further down the file.
    W004,

    /// Content left after the last section.
    ///
    /// A section stopped at a line it did not recognize, for example prose
    /// after a leading literal note, and everything from there on was not
    /// parsed.
    W005,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::W001 => "W001",
            ErrorCode::W002 => "W002",
            ErrorCode::W003 => "W003",
            ErrorCode::W004 => "W004",
            ErrorCode::W005 => "W005",
        }
    }

    /// Returns a short description of what this code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "missing title",
            ErrorCode::E002 => "missing or invalid date",
            ErrorCode::E003 => "poem has no versions",
            ErrorCode::W001 => "undefined variable",
            ErrorCode::W002 => "empty span class",
            ErrorCode::W003 => "invalid span class",
            ErrorCode::W004 => "unresolved variable reference",
            ErrorCode::W005 => "unparsed trailing content",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
