//! Scanner module: stateful directory walking and content hashing.
//!
//! This module provides functionality for:
//! - Depth-first directory walking using walkdir
//! - Streaming content hashing (SHA-256 by default)
//! - Tracking which content has already been seen during one walk
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: The stateful walker and its dedup index
//! - [`hasher`]: Digest selection and streaming file hashing
//!
//! # Example
//!
//! ```no_run
//! use uniqwalk::scanner::{find_unique_files, FindConfig};
//!
//! let config = FindConfig::new("/home/user/Downloads")
//!     .recursive(true)
//!     .include_file_fn(|path| path.extension().is_some_and(|e| e == "jpg"))
//!     .found_file_fn(|info| {
//!         if info.already_seen {
//!             println!("{} duplicates {:?}", info.file_path.display(), info.previous_file_path);
//!         }
//!         Ok(())
//!     });
//!
//! find_unique_files(config).unwrap();
//! ```

pub mod hasher;
pub mod walker;

use std::fs::Metadata;
use std::path::{Path, PathBuf};

use sha2::digest::DynDigest;

use crate::error::WalkError;

// Re-export main types
pub use hasher::{hash_file, hash_to_hex, HashAlgorithm};
pub use walker::StatefulWalker;

/// Produces a fresh digest accumulator for each hashed file.
pub type HasherFn<'a> = Box<dyn Fn() -> Box<dyn DynDigest> + 'a>;

/// Decides whether a file, given its absolute path, is reported.
pub type IncludeFileFn<'a> = Box<dyn FnMut(&Path) -> bool + 'a>;

/// Receives one record per included file. Returning an error aborts the walk.
pub type FoundFileFn<'a> = Box<dyn FnMut(StatefulFileInfo) -> anyhow::Result<()> + 'a>;

/// Configuration for a single walk.
///
/// Both callbacks are required; [`FindConfig::validate`] rejects a
/// configuration that lacks either of them.
pub struct FindConfig<'a> {
    /// Directory to search. Relative paths are resolved against the
    /// current working directory.
    pub target_dir: PathBuf,

    /// Descend into subdirectories of `target_dir`.
    pub recursive: bool,

    /// Skip hashing and report every file as never seen.
    pub allow_dupes: bool,

    /// Digest factory. SHA-256 is used if unset.
    pub hasher_fn: Option<HasherFn<'a>>,

    /// Called for every regular file encountered.
    pub include_file_fn: Option<IncludeFileFn<'a>>,

    /// Called for every file the include predicate accepted.
    pub found_file_fn: Option<FoundFileFn<'a>>,

    /// Visit directory entries in file-name order instead of the
    /// filesystem's listing order.
    pub sort_entries: bool,
}

impl std::fmt::Debug for FindConfig<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FindConfig")
            .field("target_dir", &self.target_dir)
            .field("recursive", &self.recursive)
            .field("allow_dupes", &self.allow_dupes)
            .field("hasher_fn", &self.hasher_fn.as_ref().map(|_| "<hasher>"))
            .field(
                "include_file_fn",
                &self.include_file_fn.as_ref().map(|_| "<callback>"),
            )
            .field(
                "found_file_fn",
                &self.found_file_fn.as_ref().map(|_| "<callback>"),
            )
            .field("sort_entries", &self.sort_entries)
            .finish()
    }
}

impl<'a> FindConfig<'a> {
    /// Create a non-recursive, dedup-enabled configuration with no callbacks.
    #[must_use]
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
            recursive: false,
            allow_dupes: false,
            hasher_fn: None,
            include_file_fn: None,
            found_file_fn: None,
            sort_entries: false,
        }
    }

    /// Set whether subdirectories are searched.
    #[must_use]
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Set whether duplicate tracking is disabled.
    #[must_use]
    pub fn allow_dupes(mut self, allow_dupes: bool) -> Self {
        self.allow_dupes = allow_dupes;
        self
    }

    /// Set a custom digest factory.
    #[must_use]
    pub fn hasher_fn(mut self, f: impl Fn() -> Box<dyn DynDigest> + 'a) -> Self {
        self.hasher_fn = Some(Box::new(f));
        self
    }

    /// Use one of the built-in digest algorithms.
    #[must_use]
    pub fn hash_algorithm(self, algorithm: HashAlgorithm) -> Self {
        self.hasher_fn(move || algorithm.hasher())
    }

    /// Set the include predicate.
    #[must_use]
    pub fn include_file_fn(mut self, f: impl FnMut(&Path) -> bool + 'a) -> Self {
        self.include_file_fn = Some(Box::new(f));
        self
    }

    /// Set the found-file callback.
    #[must_use]
    pub fn found_file_fn(
        mut self,
        f: impl FnMut(StatefulFileInfo) -> anyhow::Result<()> + 'a,
    ) -> Self {
        self.found_file_fn = Some(Box::new(f));
        self
    }

    /// Set whether entries are visited in file-name order.
    #[must_use]
    pub fn sort_entries(mut self, sort: bool) -> Self {
        self.sort_entries = sort;
        self
    }

    /// Check that both required callbacks are present.
    ///
    /// # Errors
    ///
    /// Returns [`WalkError::Validation`] naming the first missing callback.
    pub fn validate(&self) -> Result<(), WalkError> {
        if self.include_file_fn.is_none() {
            return Err(missing_callback("include_file_fn"));
        }
        if self.found_file_fn.is_none() {
            return Err(missing_callback("found_file_fn"));
        }
        Ok(())
    }
}

pub(crate) fn missing_callback(name: &str) -> WalkError {
    WalkError::Validation(format!("{} is required", name))
}

/// A file reported by the walker, with its dedup state.
#[derive(Debug, Clone)]
pub struct StatefulFileInfo {
    /// Whether a file with the same content was reported earlier in this walk.
    ///
    /// Always `false` when duplicates are allowed.
    pub already_seen: bool,

    /// Absolute path of the file.
    pub file_path: PathBuf,

    /// Path, relative to the search root, of the first file with the same
    /// content. `None` unless `already_seen` is set.
    pub previous_file_path: Option<PathBuf>,

    /// Directory containing the file.
    pub parent_dir_path: PathBuf,

    /// Lowercase hex digest of the file contents.
    ///
    /// Empty when duplicates are allowed.
    pub hash: String,

    /// Metadata from the directory walk.
    pub info: Metadata,

    /// Absolute path of the directory that was searched.
    pub abs_search_dir_path: PathBuf,
}

impl StatefulFileInfo {
    /// Path of this file relative to the search root.
    #[must_use]
    pub fn relative_path(&self) -> &Path {
        self.file_path
            .strip_prefix(&self.abs_search_dir_path)
            .unwrap_or(&self.file_path)
    }

    /// File size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.info.len()
    }
}

/// Walk `config.target_dir` once and report files through the config's callbacks.
///
/// # Errors
///
/// Fails on the first validation, path, traversal, hashing or callback error.
pub fn find_unique_files(config: FindConfig<'_>) -> Result<(), WalkError> {
    StatefulWalker::new(config)?.search()
}
