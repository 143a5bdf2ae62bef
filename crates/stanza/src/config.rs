//! Configuration types for Stanza conversions.
//!
//! This module provides configuration structures that control how poems are
//! parsed and how directories of poems are processed. All types implement
//! [`serde::Deserialize`] for loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration.
//! - [`ParserConfig`] - Default author, heading levels and audio platforms.
//! - [`BuildConfig`] - Shared include name and skipped file prefixes.
//!
//! # Example
//!
//! ```
//! # use stanza::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.parser().default_author(), "Anonymous");
//! assert_eq!(config.build().shared_include(), ".shared.poem");
//! ```

use serde::Deserialize;

use stanza_parser::{AudioPlatforms, ParseConfig};

/// Top-level application configuration.
///
/// Groups [`ParserConfig`] and [`BuildConfig`] into a single configuration
/// root.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Parser configuration section.
    #[serde(default)]
    parser: ParserConfig,

    /// Batch build configuration section.
    #[serde(default)]
    build: BuildConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified sections.
    pub fn new(parser: ParserConfig, build: BuildConfig) -> Self {
        Self { parser, build }
    }

    /// Returns the parser configuration.
    pub fn parser(&self) -> &ParserConfig {
        &self.parser
    }

    /// Returns the build configuration.
    pub fn build(&self) -> &BuildConfig {
        &self.build
    }
}

/// Settings passed through to the `.poem` parser.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Author assumed when a poem names none.
    default_author: String,

    /// HTML heading level for `#` in analysis text.
    heading_base_level: u8,

    /// Recognized audio platforms.
    audio: AudioConfig,
}

impl ParserConfig {
    /// Creates a new [`ParserConfig`].
    ///
    /// # Arguments
    ///
    /// * `default_author` - Author used when a poem has no author line.
    /// * `heading_base_level` - HTML heading level for `#` analysis headings.
    /// * `audio` - Flag and reference platform names.
    pub fn new(
        default_author: impl Into<String>,
        heading_base_level: u8,
        audio: AudioConfig,
    ) -> Self {
        Self {
            default_author: default_author.into(),
            heading_base_level,
            audio,
        }
    }

    /// Returns the default author.
    pub fn default_author(&self) -> &str {
        &self.default_author
    }

    /// Returns the heading level used for `#` headings.
    pub fn heading_base_level(&self) -> u8 {
        self.heading_base_level
    }

    /// Returns the audio platform configuration.
    pub fn audio(&self) -> &AudioConfig {
        &self.audio
    }

    /// Build the parser-level configuration from this section.
    pub fn parse_config(&self) -> ParseConfig {
        ParseConfig {
            default_author: self.default_author.clone(),
            heading_base_level: self.heading_base_level,
            audio: AudioPlatforms::new(self.audio.flags.clone(), self.audio.references.clone()),
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        let defaults = ParseConfig::default();
        Self {
            default_author: defaults.default_author,
            heading_base_level: defaults.heading_base_level,
            audio: AudioConfig::default(),
        }
    }
}

/// Audio platform names as written in `.poem` sources.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Platforms written as a bare name, e.g. `Audiomack`.
    flags: Vec<String>,

    /// Platforms written as `Name: value`, e.g. `Suno: song/abc`.
    references: Vec<String>,
}

impl AudioConfig {
    pub fn new(flags: Vec<String>, references: Vec<String>) -> Self {
        Self { flags, references }
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    pub fn references(&self) -> &[String] {
        &self.references
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        let AudioPlatforms { flags, references } = AudioPlatforms::default();
        Self { flags, references }
    }
}

/// Directory processing configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// File prepended to every poem in the same directory.
    shared_include: String,

    /// YAML files whose names start with one of these are not poems.
    skip_prefixes: Vec<String>,
}

impl BuildConfig {
    /// Creates a new [`BuildConfig`].
    pub fn new(shared_include: impl Into<String>, skip_prefixes: Vec<String>) -> Self {
        Self {
            shared_include: shared_include.into(),
            skip_prefixes,
        }
    }

    /// Returns the shared include file name.
    pub fn shared_include(&self) -> &str {
        &self.shared_include
    }

    /// Returns the skipped file name prefixes.
    pub fn skip_prefixes(&self) -> &[String] {
        &self.skip_prefixes
    }

    /// Whether a YAML file name is excluded from conversion.
    pub fn is_skipped(&self, file_name: &str) -> bool {
        self.skip_prefixes
            .iter()
            .any(|prefix| file_name.starts_with(prefix.as_str()))
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            shared_include: ".shared.poem".to_string(),
            skip_prefixes: vec!["_".to_string(), ".".to_string()],
        }
    }
}
