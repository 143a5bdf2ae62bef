//! Command-line argument definitions for the Stanza CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Global flags select the configuration file and logging
//! verbosity; the [`Command`] picks the conversion to run.

use clap::{Parser, Subcommand};

/// Command-line arguments for the Stanza poetry tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert a `.poem` file, or every poem in a directory, to YAML
    ToYaml {
        /// Input `.poem` file or directory
        input: String,

        /// Output file or directory
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Convert a YAML record, or every record in a directory, back to `.poem`
    ToPoem {
        /// Input YAML file or directory
        input: String,

        /// Output file or directory
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Parse a poem directory, resolve `$ref` notes and write `<slug>.yaml` records
    Build {
        /// Directory of `.poem` sources
        dir: String,

        /// Output directory
        #[arg(short, long, default_value = "_data/poems")]
        output: String,
    },
}
