//! Include filtering and report printing for the binary.
//!
//! [`FileFilter`] becomes the walker's include predicate and
//! [`Reporter`] its found-file callback.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;

use crate::cli::{OutputFormat, ShowMode};
use crate::config::Settings;
use crate::scanner::StatefulFileInfo;

/// Include predicate built from extension, regex and hidden-file settings.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    extensions: Vec<String>,
    exclude: Vec<Regex>,
    skip_hidden: bool,
}

impl FileFilter {
    /// Build a filter from settings.
    ///
    /// # Errors
    ///
    /// Fails if an exclude pattern is not a valid regex.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let extensions = settings
            .extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();

        let exclude = settings
            .exclude
            .iter()
            .map(|p| Regex::new(p).with_context(|| format!("Invalid exclude pattern '{}'", p)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            extensions,
            exclude,
            skip_hidden: settings.skip_hidden,
        })
    }

    /// Whether the file at `path` should be reported.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self.skip_hidden && name.starts_with('.') {
            return false;
        }

        if !self.extensions.is_empty() {
            let ext = path
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            if !self.extensions.contains(&ext) {
                return false;
            }
        }

        !self.exclude.iter().any(|re| re.is_match(&name))
    }
}

/// Totals for one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Files reported by the walker
    pub files: usize,
    /// Files whose content was seen for the first time
    pub unique: usize,
    /// Files whose content was already seen
    pub duplicates: usize,
    /// Total size of the duplicate files
    pub bytes_duplicated: u64,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    path: &'a Path,
    relative_path: &'a Path,
    already_seen: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_path: Option<&'a Path>,
    #[serde(skip_serializing_if = "str::is_empty")]
    hash: &'a str,
    size: u64,
}

/// Writes one line per reported file and keeps a [`Summary`].
#[derive(Debug)]
pub struct Reporter<W: Write> {
    out: W,
    show: ShowMode,
    format: OutputFormat,
    summary: Summary,
}

impl<W: Write> Reporter<W> {
    /// Create a reporter writing to `out`.
    pub fn new(out: W, show: ShowMode, format: OutputFormat) -> Self {
        Self {
            out,
            show,
            format,
            summary: Summary::default(),
        }
    }

    /// Record a file and print it if the show mode selects it.
    ///
    /// # Errors
    ///
    /// Fails if writing to the output fails, e.g. on a closed pipe.
    pub fn report(&mut self, info: &StatefulFileInfo) -> Result<()> {
        self.summary.files += 1;
        if info.already_seen {
            self.summary.duplicates += 1;
            self.summary.bytes_duplicated += info.size();
        } else {
            self.summary.unique += 1;
        }

        let selected = match self.show {
            ShowMode::All => true,
            ShowMode::Unique => !info.already_seen,
            ShowMode::Dupes => info.already_seen,
        };
        if !selected {
            return Ok(());
        }

        match self.format {
            OutputFormat::Text => match &info.previous_file_path {
                Some(previous) => writeln!(
                    self.out,
                    "DUPE   {} -> {}",
                    shown_path(info).display(),
                    previous.display()
                ),
                None => writeln!(self.out, "UNIQUE {}", shown_path(info).display()),
            }
            .context("Failed to write report")?,
            OutputFormat::Json => {
                let record = JsonRecord {
                    path: &info.file_path,
                    relative_path: shown_path(info),
                    already_seen: info.already_seen,
                    previous_path: info.previous_file_path.as_deref(),
                    hash: &info.hash,
                    size: info.size(),
                };
                serde_json::to_writer(&mut self.out, &record)
                    .context("Failed to serialize report")?;
                writeln!(self.out).context("Failed to write report")?;
            }
        }
        Ok(())
    }

    /// Flush buffered output.
    ///
    /// # Errors
    ///
    /// Fails if the underlying writer cannot be flushed.
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush().context("Failed to flush report output")
    }

    /// Totals so far.
    #[must_use]
    pub fn summary(&self) -> Summary {
        self.summary
    }

}

/// Path printed for a file: relative to the search root, or the bare file
/// name when the root is the file itself.
fn shown_path(info: &StatefulFileInfo) -> &Path {
    let relative = info.relative_path();
    if relative.as_os_str().is_empty() {
        info.file_path
            .file_name()
            .map_or(info.file_path.as_path(), Path::new)
    } else {
        relative
    }
}
