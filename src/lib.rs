//! uniqwalk - stateful directory walker with content dedup.
//!
//! Walks a directory once, depth-first, and hands every included regular
//! file to a callback together with whether the same content (by hash)
//! was already reported earlier in the walk, and where.
//!
//! The library entry point is [`scanner::find_unique_files`]; the
//! `uniqwalk` binary wraps it with a CLI, layered config and logging.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod report;
pub mod scanner;

use anyhow::{Context, Result};

use crate::cli::Cli;
use crate::config::Settings;
use crate::error::ExitCode;
use crate::report::{FileFilter, Reporter};
use crate::scanner::{find_unique_files, FindConfig};

pub use crate::error::WalkError;
pub use crate::scanner::{StatefulFileInfo, StatefulWalker};

/// Run the binary: load settings, walk, print reports.
///
/// # Errors
///
/// Fails on configuration errors and on any error that aborts the walk.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let mut settings = Settings::load(cli.config.as_deref())?;
    cli.apply_to(&mut settings);
    log::debug!("Effective settings: {:?}", settings);

    let filter = FileFilter::from_settings(&settings)?;
    let stdout = std::io::stdout();
    let mut reporter = Reporter::new(stdout.lock(), cli.show, cli.output);

    let config = FindConfig::new(&cli.path)
        .recursive(settings.recursive)
        .allow_dupes(settings.allow_dupes)
        .hash_algorithm(settings.algorithm)
        .sort_entries(settings.sort_entries)
        .include_file_fn(|path| filter.matches(path))
        .found_file_fn(|info| reporter.report(&info));

    find_unique_files(config)
        .with_context(|| format!("Failed to search {}", cli.path.display()))?;
    reporter.flush()?;

    let summary = reporter.summary();
    log::info!(
        "{} files, {} unique, {} duplicates ({} bytes duplicated)",
        summary.files,
        summary.unique,
        summary.duplicates,
        summary.bytes_duplicated
    );

    if !settings.allow_dupes && summary.duplicates == 0 {
        Ok(ExitCode::NoDuplicates)
    } else {
        Ok(ExitCode::Success)
    }
}
