//! Stateful directory walker built on walkdir.
//!
//! # Overview
//!
//! [`StatefulWalker`] performs one synchronous depth-first walk of a
//! directory and hands every included regular file to the found-file
//! callback, annotated with whether the same content was already reported
//! during this walk and, if so, where.
//!
//! # Behavior
//!
//! - Subdirectories are pruned unless the walk is recursive
//! - Symlinks, sockets, FIFOs and devices are never reported
//! - The include predicate runs before any file is opened
//! - The first traversal, hashing or callback error aborts the walk
//!
//! Symlinks are skipped rather than followed or resolved; there is no
//! support for reporting link targets.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::hasher::{hash_file, HashAlgorithm};
use super::{
    missing_callback, FindConfig, FoundFileFn, HasherFn, IncludeFileFn, StatefulFileInfo,
};
use crate::error::WalkError;

/// Walker holding the dedup index for exactly one search.
///
/// The index maps a hex digest to the path, relative to the search root,
/// of the first file seen with that digest. [`StatefulWalker::search`]
/// consumes the walker, so the index never outlives its walk.
pub struct StatefulWalker<'a> {
    /// Absolute search root
    abs_target_dir_path: PathBuf,
    /// Digest -> relative path of first occurrence
    file_hashes_to_previous: HashMap<String, PathBuf>,
    recursive: bool,
    allow_dupes: bool,
    sort_entries: bool,
    hasher_fn: HasherFn<'a>,
    include_file_fn: IncludeFileFn<'a>,
    found_file_fn: FoundFileFn<'a>,
    /// Files handed to the found callback
    reported: usize,
    /// Reported files whose content was already seen
    duplicates: usize,
}

impl std::fmt::Debug for StatefulWalker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatefulWalker")
            .field("abs_target_dir_path", &self.abs_target_dir_path)
            .field("known_hashes", &self.file_hashes_to_previous.len())
            .field("recursive", &self.recursive)
            .field("allow_dupes", &self.allow_dupes)
            .field("sort_entries", &self.sort_entries)
            .finish_non_exhaustive()
    }
}

impl<'a> StatefulWalker<'a> {
    /// Create a walker from a configuration.
    ///
    /// Callbacks are checked before the filesystem is touched. The target
    /// directory is made absolute against the current working directory
    /// and cleaned lexically (`.` dropped, `..` removes the preceding
    /// component, symlinks are not resolved); it is not required to exist yet.
    ///
    /// # Errors
    ///
    /// - [`WalkError::Validation`] if a required callback is missing
    /// - [`WalkError::PathResolution`] if the target cannot be made absolute
    pub fn new(config: FindConfig<'a>) -> Result<Self, WalkError> {
        let FindConfig {
            target_dir,
            recursive,
            allow_dupes,
            hasher_fn,
            include_file_fn,
            found_file_fn,
            sort_entries,
        } = config;

        let include_file_fn = include_file_fn.ok_or_else(|| missing_callback("include_file_fn"))?;
        let found_file_fn = found_file_fn.ok_or_else(|| missing_callback("found_file_fn"))?;
        let hasher_fn =
            hasher_fn.unwrap_or_else(|| Box::new(|| HashAlgorithm::default().hasher()));

        let abs_target_dir_path = std::path::absolute(&target_dir)
            .map(|path| clean_path(&path))
            .map_err(|source| WalkError::PathResolution {
                path: target_dir.clone(),
                source,
            })?;

        Ok(Self {
            abs_target_dir_path,
            file_hashes_to_previous: HashMap::new(),
            recursive,
            allow_dupes,
            sort_entries,
            hasher_fn,
            include_file_fn,
            found_file_fn,
            reported: 0,
            duplicates: 0,
        })
    }

    #[cfg(test)]
    fn root(&self) -> &Path {
        &self.abs_target_dir_path
    }

    /// Walk the directory tree once, reporting each included file.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered. Traversal errors and callback
    /// errors are passed through unchanged; hashing failures are wrapped in
    /// [`WalkError::Io`] with the file path.
    pub fn search(mut self) -> Result<(), WalkError> {
        log::debug!(
            "Walking {} (recursive: {}, allow_dupes: {})",
            self.abs_target_dir_path.display(),
            self.recursive,
            self.allow_dupes
        );

        let mut walk_dir = WalkDir::new(&self.abs_target_dir_path).follow_links(false);
        if self.sort_entries {
            walk_dir = walk_dir.sort_by_file_name();
        }

        let mut entries = walk_dir.into_iter();
        while let Some(entry) = entries.next() {
            let entry = entry?;
            let file_type = entry.file_type();

            if file_type.is_dir() {
                if entry.depth() > 0 && !self.recursive {
                    log::trace!("Pruning directory: {}", entry.path().display());
                    entries.skip_current_dir();
                }
                continue;
            }

            if !file_type.is_file() {
                log::trace!("Skipping non-regular file: {}", entry.path().display());
                continue;
            }

            self.visit_file(entry)?;
        }

        log::debug!(
            "Walk of {} finished: {} files reported, {} already seen",
            self.abs_target_dir_path.display(),
            self.reported,
            self.duplicates
        );
        Ok(())
    }

    /// Filter, hash and report a single regular file.
    fn visit_file(&mut self, entry: DirEntry) -> Result<(), WalkError> {
        if !(self.include_file_fn)(entry.path()) {
            log::trace!("Excluded by filter: {}", entry.path().display());
            return Ok(());
        }

        let info = entry.metadata()?;
        let file_path = entry.into_path();

        let mut already_seen = false;
        let mut previous_file_path = None;
        let mut hash = String::new();

        if !self.allow_dupes {
            hash = hash_file(&file_path, (self.hasher_fn)())?;

            match self.file_hashes_to_previous.get(&hash) {
                Some(previous) => {
                    log::debug!(
                        "{} has the same content as {}",
                        file_path.display(),
                        previous.display()
                    );
                    already_seen = true;
                    previous_file_path = Some(previous.clone());
                }
                None => {
                    let relative = self.relative_to_root(&file_path);
                    self.file_hashes_to_previous.insert(hash.clone(), relative);
                }
            }
        }

        let parent_dir_path = file_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        self.reported += 1;
        if already_seen {
            self.duplicates += 1;
        }

        (self.found_file_fn)(StatefulFileInfo {
            already_seen,
            file_path,
            previous_file_path,
            parent_dir_path,
            hash,
            info,
            abs_search_dir_path: self.abs_target_dir_path.clone(),
        })
        .map_err(WalkError::Callback)
    }

    /// Express `path` relative to the search root, component-wise.
    fn relative_to_root(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.abs_target_dir_path)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf)
    }
}

/// Resolve `.` and `..` components without touching the filesystem.
///
/// `..` at the root stays at the root.
fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other),
        }
    }
    cleaned
}
