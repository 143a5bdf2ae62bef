//! Directory-level conversions.
//!
//! Every operation walks the sorted entries of one directory sequentially.
//! A failing file is logged and counted; it never stops its siblings.

use std::{
    collections::HashMap,
    ffi::OsStr,
    fmt, fs, io,
    path::{Path, PathBuf},
};

use log::{error, info, warn};

use crate::{PoemBuilder, ReferenceResolver, SourceReader, StanzaError};

const POEM_EXTENSIONS: [&str; 1] = ["poem"];
const YAML_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// Per-file outcome counts of one batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchReport {
    /// Number of files considered, skipped ones included.
    pub fn total(&self) -> usize {
        self.converted + self.skipped + self.failed
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Turn a report with failures into [`StanzaError::Batch`].
    ///
    /// # Errors
    ///
    /// Returns [`StanzaError::Batch`] when any file failed.
    pub fn into_result(self) -> Result<Self, StanzaError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(StanzaError::Batch {
                failed: self.failed,
                total: self.total(),
            })
        }
    }

    fn record(&mut self, path: &Path, result: Result<(), StanzaError>) {
        match result {
            Ok(()) => self.converted += 1,
            Err(err) => {
                error!(path = path.display().to_string(), err:%; "Conversion failed");
                self.failed += 1;
            }
        }
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} converted, {} skipped, {} failed",
            self.converted, self.skipped, self.failed
        )
    }
}

/// Files in `dir` with one of `extensions`, sorted by path.
fn matching_files(dir: &Path, extensions: &[&str]) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| extensions.contains(&ext));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(OsStr::to_str).unwrap_or_default()
}

fn output_path(out_dir: &Path, input: &Path, extension: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    out_dir.join(format!("{stem}.{extension}"))
}

pub(crate) fn poems_to_yaml(
    builder: &PoemBuilder,
    dir: &Path,
    out_dir: &Path,
) -> Result<BatchReport, StanzaError> {
    let files = matching_files(dir, &POEM_EXTENSIONS)?;
    fs::create_dir_all(out_dir)?;
    info!(dir = dir.display().to_string(), files = files.len(); "Converting poems to YAML");

    let shared_include = builder.config().build().shared_include();
    let mut report = BatchReport::default();
    for path in files {
        if file_name(&path) == shared_include {
            report.skipped += 1;
            continue;
        }
        let output = output_path(out_dir, &path, "yaml");
        report.record(&path, builder.poem_file_to_yaml(&path, &output));
    }

    info!(report:%; "Poem conversion finished");
    Ok(report)
}

pub(crate) fn yaml_to_poems(
    builder: &PoemBuilder,
    dir: &Path,
    out_dir: &Path,
) -> Result<BatchReport, StanzaError> {
    let files = matching_files(dir, &YAML_EXTENSIONS)?;
    fs::create_dir_all(out_dir)?;
    info!(dir = dir.display().to_string(), files = files.len(); "Converting YAML to poems");

    let build = builder.config().build();
    let mut report = BatchReport::default();
    for path in files {
        if build.is_skipped(file_name(&path)) {
            report.skipped += 1;
            continue;
        }
        let output = output_path(out_dir, &path, "poem");
        report.record(&path, builder.yaml_file_to_poem(&path, &output));
    }

    info!(report:%; "YAML conversion finished");
    Ok(report)
}

pub(crate) fn build<R: SourceReader>(
    builder: &PoemBuilder,
    dir: &Path,
    out_dir: &Path,
    resolver: &mut ReferenceResolver<R>,
) -> Result<BatchReport, StanzaError> {
    let files = matching_files(dir, &POEM_EXTENSIONS)?;
    fs::create_dir_all(out_dir)?;
    resolver.reset(dir);
    info!(dir = dir.display().to_string(), files = files.len(); "Building poem records");

    let shared_include = builder.config().build().shared_include();
    let mut report = BatchReport::default();
    let mut written = HashMap::new();
    for path in files {
        if file_name(&path) == shared_include {
            report.skipped += 1;
            continue;
        }
        let result = build_one(builder, &path, out_dir, resolver, &mut written);
        report.record(&path, result);
    }

    info!(report:%; "Build finished");
    Ok(report)
}

fn build_one<R: SourceReader>(
    builder: &PoemBuilder,
    path: &Path,
    out_dir: &Path,
    resolver: &mut ReferenceResolver<R>,
    written: &mut HashMap<String, PathBuf>,
) -> Result<(), StanzaError> {
    let mut document = builder.parse_file(path)?;
    resolver.resolve_document(&mut document);

    let name = if document.slug().is_empty() {
        warn!(path = path.display().to_string(); "Title has no slug characters, using file name");
        path.file_stem()
            .and_then(OsStr::to_str)
            .unwrap_or("poem")
            .to_string()
    } else {
        document.slug().to_string()
    };

    if let Some(first) = written.get(&name) {
        return Err(StanzaError::Document(format!(
            "record `{name}.yaml` already written from {}",
            first.display()
        )));
    }

    let output = out_dir.join(format!("{name}.yaml"));
    written.insert(name, path.to_path_buf());
    fs::write(&output, builder.to_yaml(&document)?)?;
    info!(output = output.display().to_string(); "Record written");
    Ok(())
}
