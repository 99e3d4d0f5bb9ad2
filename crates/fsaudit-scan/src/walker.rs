//! Stack-based lazy directory walker.

use std::fs::{self, DirEntry, ReadDir};
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use fsaudit_core::{ScanWarning, WarningKind};

use crate::ancestors::Ancestors;

/// Counters collected while walking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkStats {
    /// Non-directory entries yielded.
    pub files_yielded: u64,
    /// Directories whose listing was read.
    pub dirs_read: u64,
    /// Directories skipped because they could not be listed or loop back to an ancestor.
    pub dirs_skipped: u64,
}

/// A directory waiting on the stack, with the chain that led to it.
#[derive(Debug)]
struct PendingDir {
    path: PathBuf,
    ancestors: Ancestors,
}

/// What to do with one directory entry.
enum EntryAction {
    Descend,
    Yield,
    Skip,
}

/// Lazily yields every non-directory path under a root.
///
/// Directories are kept on a stack, so the visiting order is unspecified.
/// Only one directory listing is open at a time. A directory that cannot be
/// listed is skipped with one warning and the walk carries on with the rest
/// of the stack; nothing here ever aborts the walk.
///
/// Symbolic links are followed by default: a link to a directory is walked
/// and a link to anything else (including a dangling link) is yielded. Files
/// reached through several links are yielded once per path. A link back to
/// one of its own ancestors is not entered.
///
/// With [`follow_symlinks(false)`](Walker::follow_symlinks) links to
/// directories are neither walked nor yielded.
#[derive(Debug)]
pub struct Walker {
    stack: Vec<PendingDir>,
    current: Option<ReadDir>,
    current_dir: PathBuf,
    current_ancestors: Ancestors,
    follow_symlinks: bool,
    warnings: Vec<ScanWarning>,
    stats: WalkStats,
}

impl Walker {
    /// Create a walker rooted at `root`. Nothing is read until iteration.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            stack: vec![PendingDir {
                path: root.into(),
                ancestors: Ancestors::new(),
            }],
            current: None,
            current_dir: PathBuf::new(),
            current_ancestors: Ancestors::new(),
            follow_symlinks: true,
            warnings: Vec::new(),
            stats: WalkStats::default(),
        }
    }

    /// Whether symbolic links to directories are traversed.
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Warnings recorded so far.
    pub fn warnings(&self) -> &[ScanWarning] {
        &self.warnings
    }

    /// Take ownership of the warnings recorded so far.
    pub fn take_warnings(&mut self) -> Vec<ScanWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Counters so far.
    pub fn stats(&self) -> WalkStats {
        self.stats
    }

    fn warn(&mut self, warning: ScanWarning) {
        tracing::warn!(path = %warning.path.display(), "{}", warning.message);
        self.warnings.push(warning);
    }

    /// Pop directories until one can be listed. Returns `false` when the stack is empty.
    fn open_next_dir(&mut self) -> bool {
        while let Some(PendingDir { path: dir, ancestors }) = self.stack.pop() {
            let ancestors = match fs::metadata(&dir) {
                Ok(metadata) => match ancestors.enter(&dir, &metadata) {
                    Some(chain) => chain,
                    None => {
                        self.stats.dirs_skipped += 1;
                        self.warn(ScanWarning::symlink_loop(&dir));
                        continue;
                    }
                },
                // read_dir below reports the failure.
                Err(_) => ancestors,
            };

            match fs::read_dir(&dir) {
                Ok(listing) => {
                    self.stats.dirs_read += 1;
                    self.current = Some(listing);
                    self.current_dir = dir;
                    self.current_ancestors = ancestors;
                    return true;
                }
                Err(err) => {
                    self.stats.dirs_skipped += 1;
                    self.warn(ScanWarning::unreadable_dir(&dir, &err));
                }
            }
        }
        false
    }

    fn action_for(&self, entry: &DirEntry) -> EntryAction {
        match entry.file_type() {
            Ok(kind) if kind.is_dir() => EntryAction::Descend,
            Ok(kind) if kind.is_symlink() => {
                match (points_to_dir(&entry.path()), self.follow_symlinks) {
                    (false, _) => EntryAction::Yield,
                    (true, true) => EntryAction::Descend,
                    (true, false) => EntryAction::Skip,
                }
            }
            Ok(_) => EntryAction::Yield,
            Err(_) if points_to_dir(&entry.path()) => EntryAction::Descend,
            Err(_) => EntryAction::Yield,
        }
    }
}

impl Iterator for Walker {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let Some(listing) = self.current.as_mut() else {
                if !self.open_next_dir() {
                    return None;
                }
                continue;
            };

            match listing.next() {
                Some(Ok(entry)) => match self.action_for(&entry) {
                    EntryAction::Descend => self.stack.push(PendingDir {
                        path: entry.path(),
                        ancestors: self.current_ancestors.clone(),
                    }),
                    EntryAction::Yield => {
                        self.stats.files_yielded += 1;
                        return Some(entry.path());
                    }
                    EntryAction::Skip => {
                        tracing::debug!(
                            path = %entry.path().display(),
                            "not following directory link"
                        );
                    }
                },
                Some(Err(err)) => {
                    let warning = ScanWarning::new(
                        &self.current_dir,
                        format!(
                            "cannot read entry in {}: {err}",
                            self.current_dir.display()
                        ),
                        WarningKind::EntryError,
                    );
                    self.warn(warning);
                }
                None => self.current = None,
            }
        }
    }
}

impl FusedIterator for Walker {}

/// `stat` through any symlinks; unreadable targets are not directories.
fn points_to_dir(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}
