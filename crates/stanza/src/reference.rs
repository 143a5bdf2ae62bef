//! Resolution of `$ref` postscript notes.
//!
//! A reference such as `shared.yaml#/notes/license` names a YAML file
//! relative to the poem's directory and an optional slash-delimited pointer
//! into it. Resolved values are cached per batch run so each target is read
//! from disk at most once.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, trace, warn};
use serde_yaml::Value;
use thiserror::Error;

use stanza_core::document::{Document, PostscriptNote};

/// Errors raised while resolving one reference.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid YAML in `{}`: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("pointer `{pointer}` has no segment `{segment}`")]
    Pointer { pointer: String, segment: String },

    #[error("`{target}` does not point at a postscript note")]
    NotANote { target: String },
}

/// Source of reference target text.
pub trait SourceReader {
    /// Read the whole file at `path`.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Reads reference targets from the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsReader;

impl SourceReader for FsReader {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

type CacheKey = (PathBuf, Option<String>);

/// Resolved values keyed by absolute file path and pointer.
///
/// The whole file is cached under a `None` pointer, so a second pointer
/// into an already-read file does not read it again.
#[derive(Debug, Default)]
pub struct ReferenceCache {
    entries: HashMap<CacheKey, Value>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path, pointer: Option<&str>) -> Option<&Value> {
        self.entries
            .get(&(path.to_path_buf(), pointer.map(str::to_string)))
    }

    pub fn insert(&mut self, path: PathBuf, pointer: Option<String>, value: Value) {
        self.entries.insert((path, pointer), value);
    }

    /// Drop every entry. Called at the start of each batch.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves references against files in one base directory.
#[derive(Debug)]
pub struct ReferenceResolver<R = FsReader> {
    base_dir: PathBuf,
    reader: R,
    cache: ReferenceCache,
}

impl ReferenceResolver<FsReader> {
    /// Create a resolver reading from the filesystem.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self::with_reader(base_dir, FsReader)
    }
}

impl<R: SourceReader> ReferenceResolver<R> {
    /// Create a resolver with a custom reader.
    pub fn with_reader(base_dir: impl Into<PathBuf>, reader: R) -> Self {
        Self {
            base_dir: base_dir.into(),
            reader,
            cache: ReferenceCache::new(),
        }
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn cache(&self) -> &ReferenceCache {
        &self.cache
    }

    /// Point the resolver at another directory and empty the cache.
    pub fn reset(&mut self, base_dir: impl Into<PathBuf>) {
        self.base_dir = base_dir.into();
        self.cache.clear();
    }

    /// Resolve a `file#/pointer` reference to a YAML value.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] if the file cannot be read or parsed, or
    /// a pointer segment does not exist.
    pub fn resolve(&mut self, target: &str) -> Result<Value, ResolveError> {
        let (file, pointer) = match target.split_once('#') {
            Some((file, pointer)) => (file, Some(pointer).filter(|p| !p.is_empty() && *p != "/")),
            None => (target, None),
        };
        let path = self.absolute(file);

        if let Some(value) = self.cache.get(&path, pointer) {
            trace!(reference = target; "Reference cache hit");
            return Ok(value.clone());
        }

        let document = match self.cache.get(&path, None) {
            Some(value) => value.clone(),
            None => {
                debug!(path = path.display().to_string(); "Reading reference target");
                let text = self
                    .reader
                    .read_to_string(&path)
                    .map_err(|source| ResolveError::Io {
                        path: path.clone(),
                        source,
                    })?;
                let value: Value =
                    serde_yaml::from_str(&text).map_err(|source| ResolveError::Yaml {
                        path: path.clone(),
                        source,
                    })?;
                self.cache.insert(path.clone(), None, value.clone());
                value
            }
        };

        let Some(pointer) = pointer else {
            return Ok(document);
        };
        let value = follow_pointer(&document, pointer)?.clone();
        self.cache
            .insert(path, Some(pointer.to_string()), value.clone());
        Ok(value)
    }

    /// Resolve a reference to a postscript note.
    ///
    /// A mapping becomes a note through its `label` and `content` keys; a
    /// plain string becomes label-less content.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] if resolution fails or the value is not a
    /// note.
    pub fn resolve_note(&mut self, target: &str) -> Result<PostscriptNote, ResolveError> {
        let value = self.resolve(target)?;
        let note = match value {
            Value::String(content) => Some(PostscriptNote::prose(None, Some(content))),
            Value::Mapping(_) => serde_yaml::from_value(value).ok(),
            _ => None,
        };
        note.ok_or_else(|| ResolveError::NotANote {
            target: target.to_string(),
        })
    }

    /// Replace every `$ref` postscript note of `document` with its target.
    ///
    /// A reference that cannot be resolved is logged and left in place.
    /// Returns the number of notes replaced.
    pub fn resolve_document(&mut self, document: &mut Document) -> usize {
        let Some(notes) = document.postscript_mut() else {
            return 0;
        };

        let mut resolved = 0;
        for note in notes.iter_mut() {
            let Some(target) = note.target().map(str::to_string) else {
                continue;
            };
            match self.resolve_note(&target) {
                Ok(replacement) => {
                    *note = replacement;
                    resolved += 1;
                }
                Err(err) => warn!(reference = target.as_str(), err:%; "Leaving reference unresolved"),
            }
        }
        resolved
    }

    fn absolute(&self, file: &str) -> PathBuf {
        let path = self.base_dir.join(file);
        std::path::absolute(&path).unwrap_or(path)
    }
}

/// Follow a `/a/b/0` pointer through mappings and sequences.
fn follow_pointer<'v>(root: &'v Value, pointer: &str) -> Result<&'v Value, ResolveError> {
    let mut current = root;
    for raw in pointer.trim_start_matches('/').split('/') {
        let segment = raw.replace("~1", "/").replace("~0", "~");
        let next = match current {
            Value::Mapping(map) => map.get(segment.as_str()),
            Value::Sequence(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        current = next.ok_or_else(|| ResolveError::Pointer {
            pointer: pointer.to_string(),
            segment: segment.clone(),
        })?;
    }
    Ok(current)
}
