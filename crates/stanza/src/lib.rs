//! Stanza - Convert `.poem` sources to structured YAML and back.
//!
//! Parsing is done by [`stanza_parser`]; this crate adds configuration, the
//! YAML storage format, `.poem` reconstruction, `$ref` resolution and
//! directory-level batch conversion.

pub mod config;

mod batch;
mod error;
mod html;
mod poem;
mod reference;
mod yaml;

pub use stanza_core::{document, slug};
pub use stanza_parser::{ParseConfig, ParseError};

pub use batch::BatchReport;
pub use error::StanzaError;
pub use html::html_to_markup;
pub use poem::write_poem;
pub use reference::{FsReader, ReferenceCache, ReferenceResolver, ResolveError, SourceReader};
pub use yaml::{from_yaml, to_yaml};

use std::{fs, path::Path};

use log::{debug, info, trace, warn};

use config::AppConfig;
use document::Document;

/// Builder for converting poems between `.poem` source and YAML.
///
/// # Examples
///
/// ```rust
/// use stanza::{PoemBuilder, config::AppConfig};
///
/// let source = "Low Tide\n2024-03-09\n\nthe water leaves\n";
///
/// let builder = PoemBuilder::new(AppConfig::default());
///
/// // Parse source to a document
/// let document = builder.parse(source).expect("Failed to parse");
///
/// // Serialize it for templates
/// let yaml = builder.to_yaml(&document).expect("Failed to serialize");
/// assert!(yaml.contains("slug: low-tide"));
///
/// // And write it back out as source
/// let poem = builder.to_poem(&document).expect("Failed to write");
/// assert!(poem.starts_with("Low Tide\n2024-03-09\n"));
/// ```
#[derive(Debug, Default)]
pub struct PoemBuilder {
    config: AppConfig,
}

impl PoemBuilder {
    /// Create a new poem builder with the given configuration.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stanza::{PoemBuilder, config::AppConfig};
    ///
    /// let builder = PoemBuilder::new(AppConfig::default());
    /// ```
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse `.poem` source into a document.
    ///
    /// Parser warnings are logged and do not fail the parse.
    ///
    /// # Errors
    ///
    /// Returns [`StanzaError::Parse`] for a missing title, a missing or
    /// invalid date, or a poem without versions.
    pub fn parse(&self, source: &str) -> Result<Document, StanzaError> {
        debug!("Parsing poem");

        let parse_config = self.config.parser().parse_config();
        let parsed = stanza_parser::parse(source, &parse_config)
            .map_err(|err| StanzaError::new_parse_error(err, source))?;

        let (document, warnings) = parsed.into_parts();
        for warning in &warnings {
            warn!(title = document.title(); "{warning}");
        }
        trace!(document:?; "Parsed poem");

        Ok(document)
    }

    /// Read and parse a `.poem` file.
    ///
    /// When the configured shared include exists next to the file, its
    /// content is prepended to the source first.
    ///
    /// # Errors
    ///
    /// Returns [`StanzaError::Io`] if a file cannot be read, or the errors
    /// of [`PoemBuilder::parse`].
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Document, StanzaError> {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Reading poem");

        let mut source = String::new();
        let include = path
            .parent()
            .map(|dir| dir.join(self.config.build().shared_include()));
        if let Some(include) = include.filter(|include| include.is_file() && include != path) {
            debug!(path = include.display().to_string(); "Prepending shared include");
            source.push_str(&fs::read_to_string(&include)?);
        }
        source.push_str(&fs::read_to_string(path)?);

        self.parse(&source)
    }

    /// Serialize a document to YAML.
    ///
    /// # Errors
    ///
    /// Returns [`StanzaError::Yaml`] if serialization fails.
    pub fn to_yaml(&self, document: &Document) -> Result<String, StanzaError> {
        to_yaml(document)
    }

    /// Deserialize a document from YAML.
    ///
    /// # Errors
    ///
    /// Returns [`StanzaError::Yaml`] if the YAML is not a document.
    pub fn from_yaml(&self, yaml: &str) -> Result<Document, StanzaError> {
        from_yaml(yaml)
    }

    /// Reconstruct `.poem` source for a document.
    ///
    /// # Errors
    ///
    /// Returns [`StanzaError::Document`] if the document has no versions or
    /// an empty version.
    pub fn to_poem(&self, document: &Document) -> Result<String, StanzaError> {
        write_poem(document, &self.config.parser().parse_config())
    }

    /// Convert one `.poem` file to a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if reading, parsing, serializing or writing fails.
    pub fn poem_file_to_yaml(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<(), StanzaError> {
        let document = self.parse_file(input)?;
        let yaml = self.to_yaml(&document)?;
        fs::write(output.as_ref(), yaml)?;
        info!(output = output.as_ref().display().to_string(); "YAML written");
        Ok(())
    }

    /// Convert one YAML file to a `.poem` file.
    ///
    /// # Errors
    ///
    /// Returns an error if reading, deserializing, writing the source or
    /// writing the file fails.
    pub fn yaml_file_to_poem(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<(), StanzaError> {
        let input = input.as_ref();
        info!(path = input.display().to_string(); "Reading YAML");
        let document = self.from_yaml(&fs::read_to_string(input)?)?;
        let poem = self.to_poem(&document)?;
        fs::write(output.as_ref(), poem)?;
        info!(output = output.as_ref().display().to_string(); "Poem written");
        Ok(())
    }

    /// Convert every poem in `dir` to `<name>.yaml` in `out_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`StanzaError::Io`] if `dir` cannot be listed or `out_dir`
    /// cannot be created. Failures of single files are counted in the
    /// report instead.
    pub fn poems_to_yaml(
        &self,
        dir: impl AsRef<Path>,
        out_dir: impl AsRef<Path>,
    ) -> Result<BatchReport, StanzaError> {
        batch::poems_to_yaml(self, dir.as_ref(), out_dir.as_ref())
    }

    /// Convert every YAML poem record in `dir` to `<name>.poem` in `out_dir`.
    ///
    /// # Errors
    ///
    /// Same as [`PoemBuilder::poems_to_yaml`].
    pub fn yaml_to_poems(
        &self,
        dir: impl AsRef<Path>,
        out_dir: impl AsRef<Path>,
    ) -> Result<BatchReport, StanzaError> {
        batch::yaml_to_poems(self, dir.as_ref(), out_dir.as_ref())
    }

    /// Parse every poem in `dir`, resolve its references and write
    /// `<slug>.yaml` records to `out_dir`.
    ///
    /// # Errors
    ///
    /// Same as [`PoemBuilder::poems_to_yaml`].
    pub fn build(
        &self,
        dir: impl AsRef<Path>,
        out_dir: impl AsRef<Path>,
    ) -> Result<BatchReport, StanzaError> {
        let dir = dir.as_ref();
        let mut resolver = ReferenceResolver::new(dir);
        batch::build(self, dir, out_dir.as_ref(), &mut resolver)
    }

    /// Like [`PoemBuilder::build`], with a caller-supplied resolver.
    ///
    /// The resolver is reset to `dir` with an empty cache before the batch
    /// starts.
    ///
    /// # Errors
    ///
    /// Same as [`PoemBuilder::poems_to_yaml`].
    pub fn build_with<R: SourceReader>(
        &self,
        dir: impl AsRef<Path>,
        out_dir: impl AsRef<Path>,
        resolver: &mut ReferenceResolver<R>,
    ) -> Result<BatchReport, StanzaError> {
        batch::build(self, dir.as_ref(), out_dir.as_ref(), resolver)
    }
}
