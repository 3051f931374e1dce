//! Command-line interface definitions for uniqwalk.
//!
//! # Example
//!
//! ```bash
//! # List files in the current directory, flagging repeated content
//! uniqwalk
//!
//! # Recurse and print only the duplicates, as JSON lines
//! uniqwalk -r --show dupes --output json ~/Pictures
//!
//! # Only look at images, skipping dotfiles
//! uniqwalk -r -e jpg -e png --skip-hidden ~/Pictures
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::Settings;
use crate::scanner::HashAlgorithm;

/// Walk a directory and report each file, flagging content seen earlier in the walk.
#[derive(Debug, Parser)]
#[command(name = "uniqwalk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to search
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Path to a TOML config file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Search subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Do not hash files; report every file as unique
    #[arg(long)]
    pub allow_dupes: bool,

    /// Digest used to compare file contents
    #[arg(long, value_enum)]
    pub algorithm: Option<HashAlgorithm>,

    /// Visit directory entries in file-name order
    #[arg(long)]
    pub sorted: bool,

    /// Only include files with this extension (can be specified multiple times)
    #[arg(short = 'e', long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Exclude files whose name matches this regex (can be specified multiple times)
    #[arg(short = 'x', long = "exclude", value_name = "REGEX")]
    pub exclude: Vec<String>,

    /// Exclude files whose name starts with `.`
    #[arg(long)]
    pub skip_hidden: bool,

    /// Which files to print
    #[arg(long, value_enum, default_value = "all")]
    pub show: ShowMode,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

impl Cli {
    /// Apply command-line overrides on top of loaded settings.
    ///
    /// Flags only ever switch options on; list options replace the
    /// configured list when given.
    pub fn apply_to(&self, settings: &mut Settings) {
        settings.recursive |= self.recursive;
        settings.allow_dupes |= self.allow_dupes;
        settings.sort_entries |= self.sorted;
        settings.skip_hidden |= self.skip_hidden;
        if let Some(algorithm) = self.algorithm {
            settings.algorithm = algorithm;
        }
        if !self.extensions.is_empty() {
            settings.extensions = self.extensions.clone();
        }
        if !self.exclude.is_empty() {
            settings.exclude = self.exclude.clone();
        }
    }
}

/// Which reported files are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ShowMode {
    /// Every included file
    #[default]
    All,
    /// Files whose content was not seen before
    Unique,
    /// Files whose content was already seen
    Dupes,
}

/// Report output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One human-readable line per file
    #[default]
    Text,
    /// One JSON object per line
    Json,
}
