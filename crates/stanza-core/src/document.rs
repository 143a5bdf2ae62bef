//! Parsed poem document model.
//!
//! A [`Document`] is produced fresh by every parse and is immutable from the
//! caller's point of view, except for the reference-resolution step which
//! swaps `$ref` postscript notes for the notes they point to.
//!
//! # Structure
//!
//! ```text
//! Document
//! ├── title / author / date / slug
//! ├── versions: [Version]          (at least one)
//! │   └── segments: [Segment]      (at least one per version)
//! ├── audio: Audio?                (platform name → flag or reference)
//! ├── postscript: [PostscriptNote]?
//! └── analysis: Analysis?          (synopsis and/or full)
//! ```
//!
//! Field order on the structs is the field order of the serialized YAML.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::slug::slugify;

/// A complete poem with all of its optional sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    title: String,
    author: String,
    date: String,
    #[serde(default)]
    slug: String,
    versions: Vec<Version>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    audio: Option<Audio>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    postscript: Option<Vec<PostscriptNote>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    analysis: Option<Analysis>,
}

impl Document {
    /// Create a document from its required fields.
    ///
    /// The slug is derived from the title.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        date: impl Into<String>,
        versions: Vec<Version>,
    ) -> Self {
        let title = title.into();
        let slug = slugify(&title);
        Self {
            title,
            author: author.into(),
            date: date.into(),
            slug,
            versions,
            audio: None,
            postscript: None,
            analysis: None,
        }
    }

    /// Attach audio links. An empty audio table is stored as absent.
    pub fn with_audio(mut self, audio: Audio) -> Self {
        self.audio = (!audio.is_empty()).then_some(audio);
        self
    }

    /// Attach postscript notes. An empty list is stored as absent.
    pub fn with_postscript(mut self, notes: Vec<PostscriptNote>) -> Self {
        self.postscript = (!notes.is_empty()).then_some(notes);
        self
    }

    /// Attach analysis. An analysis with neither tier is stored as absent.
    pub fn with_analysis(mut self, analysis: Analysis) -> Self {
        self.analysis = (!analysis.is_empty()).then_some(analysis);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// The date in `YYYY-MM-DD` form.
    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Re-derive the slug from the title when it is missing.
    ///
    /// Documents deserialized from records that predate slugs carry an empty
    /// slug.
    pub fn ensure_slug(&mut self) {
        if self.slug.is_empty() {
            self.slug = slugify(&self.title);
        }
    }

    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    pub fn audio(&self) -> Option<&Audio> {
        self.audio.as_ref()
    }

    pub fn postscript(&self) -> Option<&[PostscriptNote]> {
        self.postscript.as_deref()
    }

    /// Mutable access to postscript notes, used when resolving references.
    pub fn postscript_mut(&mut self) -> Option<&mut Vec<PostscriptNote>> {
        self.postscript.as_mut()
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }
}

/// One reading of the poem, e.g. an alternate set of lyrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    segments: Vec<Segment>,
}

impl Version {
    pub fn new(label: Option<String>, segments: Vec<Segment>) -> Self {
        Self { label, segments }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

/// A contiguous block of poem lines such as a verse or chorus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    lines: String,
}

impl Segment {
    pub fn new(label: Option<String>, lines: impl Into<String>) -> Self {
        Self {
            label,
            lines: lines.into(),
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The segment text: newline-separated lines with one trailing newline.
    pub fn lines(&self) -> &str {
        &self.lines
    }
}

/// An audio platform entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AudioEntry {
    /// The recording is present on the platform.
    Flag(bool),
    /// The recording lives at a platform-specific path.
    Reference(String),
}

/// Audio links keyed by lower-cased platform name, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Audio(IndexMap<String, AudioEntry>);

impl Audio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry for a platform, replacing any earlier one.
    pub fn insert(&mut self, platform: impl Into<String>, entry: AudioEntry) {
        self.0.insert(platform.into(), entry);
    }

    pub fn get(&self, platform: &str) -> Option<&AudioEntry> {
        self.0.get(platform)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AudioEntry)> {
        self.0.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// A note appended after the poem body.
///
/// The reference variant must stay first: the prose variant has only
/// optional fields and would otherwise match every mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostscriptNote {
    /// A pointer into another file, e.g. `shared.yaml#/disclaimer`.
    Reference {
        #[serde(rename = "$ref")]
        target: String,
    },
    /// A prose note with an optional label and HTML content.
    Prose {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },
}

impl PostscriptNote {
    /// Create a reference note.
    pub fn reference(target: impl Into<String>) -> Self {
        Self::Reference {
            target: target.into(),
        }
    }

    /// Create a prose note.
    pub fn prose(label: Option<String>, content: Option<String>) -> Self {
        Self::Prose { label, content }
    }

    /// The reference target, if this is a reference note.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Reference { target } => Some(target),
            Self::Prose { .. } => None,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Reference { .. } => None,
            Self::Prose { label, .. } => label.as_deref(),
        }
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Reference { .. } => None,
            Self::Prose { content, .. } => content.as_deref(),
        }
    }
}

/// Two-tier critical commentary. Each tier is a sequence of HTML blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    synopsis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    full: Option<String>,
}

impl Analysis {
    pub fn new(synopsis: Option<String>, full: Option<String>) -> Self {
        Self { synopsis, full }
    }

    pub fn synopsis(&self) -> Option<&str> {
        self.synopsis.as_deref()
    }

    pub fn full(&self) -> Option<&str> {
        self.full.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.synopsis.is_none() && self.full.is_none()
    }
}
