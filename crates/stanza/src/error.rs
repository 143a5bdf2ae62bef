//! Error types for Stanza operations.
//!
//! This module provides the main error type [`StanzaError`] which wraps
//! the error conditions that can occur while converting poems.

use std::io;

use thiserror::Error;

use stanza_parser::ParseError;

/// The main error type for Stanza operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the source text the diagnostics point into, so
/// callers can render labelled snippets.
#[derive(Debug, Error)]
pub enum StanzaError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid document: {0}")]
    Document(String),

    #[error("{failed} of {total} file(s) failed")]
    Batch { failed: usize, total: usize },
}

impl StanzaError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
