//! Template discovery.

use std::collections::VecDeque;
use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ScanError;

/// Source of directory listings for a [`TemplateWalker`].
///
/// Implemented for any `Fn(&Path) -> io::Result<Vec<PathBuf>>`, so a closure
/// can stand in for the filesystem.
pub trait DirectoryLister: Send + Sync {
    /// Returns the full paths of the entries directly inside `dir`, in any
    /// order.
    fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;
}

impl<F> DirectoryLister for F
where
    F: Fn(&Path) -> io::Result<Vec<PathBuf>> + Send + Sync,
{
    fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        self(dir)
    }
}

/// Lists directories with [`fs::read_dir`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLister;

impl DirectoryLister for FsLister {
    fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect()
    }
}

/// Lazily walks root directories and yields every file with the template
/// extension.
///
/// Roots are walked in the order given. Within a directory, files come out
/// before the contents of subdirectories, and both are sorted by name.
/// Symbolic links to files are yielded; symbolic links to directories are not
/// followed, so the walk always terminates.
pub struct TemplateWalker {
    extension: String,
    lister: Arc<dyn DirectoryLister>,
    pending_roots: VecDeque<PathBuf>,
    dirs: Vec<PathBuf>,
    files: VecDeque<PathBuf>,
}

impl TemplateWalker {
    /// Creates a walker over `roots` matching files whose extension equals
    /// `extension` (given without the leading dot).
    pub fn new(roots: Vec<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            lister: Arc::new(FsLister),
            pending_roots: roots.into(),
            dirs: Vec::new(),
            files: VecDeque::new(),
        }
    }

    /// Replaces the filesystem listing. Entry types are still read from the
    /// filesystem.
    pub fn with_lister(mut self, lister: Arc<dyn DirectoryLister>) -> Self {
        self.lister = lister;
        self
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension() == Some(OsStr::new(&self.extension))
    }

    /// Lists `dir`, buffering matching files and pushing subdirectories so the
    /// smallest name is visited first.
    fn expand(&mut self, dir: &Path) -> Result<(), ScanError> {
        let mut entries = self.lister.list(dir).map_err(|source| ScanError::DirectoryRead {
            path: dir.to_path_buf(),
            source,
        })?;
        entries.sort();

        let mut subdirs = Vec::new();
        for path in entries {
            let Ok(meta) = fs::symlink_metadata(&path) else {
                tracing::debug!(path = %path.display(), "entry vanished during scan");
                continue;
            };
            if meta.is_dir() {
                subdirs.push(path);
            } else if self.matches(&path) && (meta.is_file() || path.is_file()) {
                self.files.push_back(path);
            }
        }
        self.dirs.extend(subdirs.into_iter().rev());
        Ok(())
    }
}

impl fmt::Debug for TemplateWalker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateWalker")
            .field("extension", &self.extension)
            .field("pending_roots", &self.pending_roots)
            .field("dirs", &self.dirs)
            .field("files", &self.files)
            .finish_non_exhaustive()
    }
}

impl Iterator for TemplateWalker {
    type Item = Result<PathBuf, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(file) = self.files.pop_front() {
                return Some(Ok(file));
            }
            let dir = match self.dirs.pop() {
                Some(dir) => dir,
                None => self.pending_roots.pop_front()?,
            };
            if let Err(e) = self.expand(&dir) {
                tracing::warn!(error = %e, "skipping unreadable directory");
                return Some(Err(e));
            }
        }
    }
}
