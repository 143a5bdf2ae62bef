//! # Stanza Parser
//!
//! Parser for the `.poem` plain-text format. This crate turns poem source
//! into a [`stanza_core::document::Document`]:
//!
//! 1. **Strip comments** - Drop `<<#` ... `#>>` regions
//! 2. **Preprocess variables** - Extract `={name}=` definitions, resolve them
//!    and expand standalone `${name}` lines
//! 3. **Parse structure** - Header, versions, audio, postscript and analysis
//! 4. **Inline markup** - Convert prose to HTML fragments
//!
//! ## Usage
//!
//! ```
//! # use stanza_parser::{parse, ParseConfig, ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = "\
//! Low Tide
//! 2024-03-09
//!
//! the water leaves
//! its *own* outline
//! ";
//!
//!     let parsed = parse(source, &ParseConfig::default())?;
//!     let document = parsed.document();
//!     assert_eq!(document.title(), "Low Tide");
//!     assert_eq!(document.author(), "Anonymous");
//!     assert_eq!(
//!         document.versions()[0].segments()[0].lines(),
//!         "the water leaves\nits *own* outline\n"
//!     );
//!     Ok(())
//! }
//! ```

mod config;
pub mod error;
mod grammar;
mod inline;
mod literal;
mod parser;
mod source;
mod span;
mod variables;

pub use config::{AudioPlatforms, ParseConfig};
pub use error::ParseError;
pub use span::Span;

use stanza_core::document::Document;

use error::{Diagnostic, DiagnosticCollector};

/// A successfully parsed poem and the warnings raised along the way.
#[derive(Debug, Clone)]
pub struct Parsed {
    document: Document,
    warnings: Vec<Diagnostic>,
}

impl Parsed {
    pub(crate) fn new(document: Document, warnings: Vec<Diagnostic>) -> Self {
        Self { document, warnings }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Non-fatal diagnostics, such as undefined variables.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn into_parts(self) -> (Document, Vec<Diagnostic>) {
        (self.document, self.warnings)
    }
}

/// Parse `.poem` source text into a document.
///
/// The source may be prefixed with the content of a shared include file;
/// spans in diagnostics are byte offsets into `source` as given.
///
/// # Errors
///
/// Returns a [`ParseError`] when the poem has no title, no valid date or no
/// versions. Everything else is reported through [`Parsed::warnings`].
///
/// # Example
///
/// ```
/// # use stanza_parser::{parse, ParseConfig};
/// let err = parse("Untitled\n", &ParseConfig::default()).unwrap_err();
/// assert!(err.to_string().contains("missing or invalid date"));
/// ```
pub fn parse(source: &str, config: &ParseConfig) -> Result<Parsed, ParseError> {
    parser::parse_document(source, config)
}

/// Convert a single run of inline markup to HTML.
///
/// Returns the HTML together with any span-class warnings; their spans
/// cover the whole of `text`.
///
/// ```
/// # use stanza_parser::render_inline;
/// let (html, warnings) = render_inline("[Click|example.com/x]");
/// assert_eq!(html, r#"<a href="https://example.com/x">Click</a>"#);
/// assert!(warnings.is_empty());
/// ```
pub fn render_inline(text: &str) -> (String, Vec<Diagnostic>) {
    let mut diagnostics = DiagnosticCollector::new();
    let html = inline::to_html(text, Span::new(0..text.len()), &mut diagnostics);
    (html, diagnostics.into_diagnostics())
}
