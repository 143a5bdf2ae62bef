//! Stanza CLI library
//!
//! This module contains the core CLI logic for the Stanza poetry tool.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Command};

use std::path::{Path, PathBuf};

use log::info;

use stanza::{BatchReport, PoemBuilder, StanzaError};

/// Run the Stanza CLI application
///
/// A file input converts that one file; a directory input converts every
/// matching file in it and fails if any single file failed.
///
/// # Errors
///
/// Returns `StanzaError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
/// - YAML errors
/// - Batch runs with failed files
pub fn run(args: &Args) -> Result<(), StanzaError> {
    let app_config = config::load_config(args.config.as_ref())?;
    let builder = PoemBuilder::new(app_config);

    match &args.command {
        Command::ToYaml { input, output } => {
            let input = Path::new(input);
            if input.is_dir() {
                let out_dir = output_dir(input, output.as_deref());
                info!(input_path = input.display().to_string(), output_path = out_dir.display().to_string(); "Converting poem directory");
                finish(builder.poems_to_yaml(input, &out_dir)?)
            } else {
                let output = output_file(input, output.as_deref(), "yaml");
                info!(input_path = input.display().to_string(), output_path = output.display().to_string(); "Converting poem");
                builder.poem_file_to_yaml(input, &output)
            }
        }
        Command::ToPoem { input, output } => {
            let input = Path::new(input);
            if input.is_dir() {
                let out_dir = output_dir(input, output.as_deref());
                info!(input_path = input.display().to_string(), output_path = out_dir.display().to_string(); "Converting YAML directory");
                finish(builder.yaml_to_poems(input, &out_dir)?)
            } else {
                let output = output_file(input, output.as_deref(), "poem");
                info!(input_path = input.display().to_string(), output_path = output.display().to_string(); "Converting YAML record");
                builder.yaml_file_to_poem(input, &output)
            }
        }
        Command::Build { dir, output } => {
            info!(input_path = dir, output_path = output; "Building poem records");
            finish(builder.build(dir, output)?)
        }
    }
}

fn finish(report: BatchReport) -> Result<(), StanzaError> {
    info!(report:%; "Batch finished");
    report.into_result().map(|_| ())
}

/// Output directory for a batch: the given one, else the input directory.
fn output_dir(input: &Path, output: Option<&str>) -> PathBuf {
    output.map_or_else(|| input.to_path_buf(), PathBuf::from)
}

/// Output file for a single conversion: the given one, else the input
/// path with `extension`.
fn output_file(input: &Path, output: Option<&str>, extension: &str) -> PathBuf {
    output.map_or_else(|| input.with_extension(extension), PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_defaults_to_sibling() {
        assert_eq!(
            output_file(Path::new("poems/low-tide.poem"), None, "yaml"),
            PathBuf::from("poems/low-tide.yaml")
        );
        assert_eq!(
            output_file(Path::new("poems/low-tide.poem"), Some("out.yaml"), "yaml"),
            PathBuf::from("out.yaml")
        );
    }

    #[test]
    fn test_output_dir_defaults_to_input() {
        assert_eq!(output_dir(Path::new("poems"), None), PathBuf::from("poems"));
        assert_eq!(
            output_dir(Path::new("poems"), Some("_data")),
            PathBuf::from("_data")
        );
    }
}
