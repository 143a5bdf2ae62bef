//! Error and diagnostic system for the Stanza parser.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Labeled spans pointing back into the `.poem` source
//! - Severity levels separating fatal errors from content warnings
//! - Diagnostic collector for accumulating warnings during a parse
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning message with optional error code, source
//! locations, and help text. A failed parse returns a [`ParseError`] that
//! wraps the fatal diagnostic together with any warnings raised before it.
//!
//! # Example
//!
//! ```
//! # use stanza_parser::error::{Diagnostic, ErrorCode};
//! # use stanza_parser::Span;
//!
//! let span = Span::new(6..16);
//!
//! let diag = Diagnostic::error("missing or invalid date")
//!     .with_code(ErrorCode::E002)
//!     .with_label(span, "expected a date in YYYY-MM-DD form")
//!     .with_help("put the date on the line after the title or author");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
