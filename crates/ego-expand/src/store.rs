//! Run file storage: trait plus local filesystem implementation.
//!
//! Run files are write-once: a store never appends to, truncates, or
//! deletes an existing file. A new run file only appears under its final
//! name once it has been written completely.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Errors that can occur while reading or writing run files.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Run file already exists: {}", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("Run file {} has no `{column}` column", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("Malformed row {line} in {}: {reason}", path.display())]
    Malformed {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Cannot list run files: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Trait for run file backends.
pub trait RunStore: Send + Sync {
    /// Paths of every run file whose name matches `pattern`, sorted.
    fn list(&self, pattern: &str) -> Result<Vec<PathBuf>, StoreError>;

    /// Open a listed run file for reading.
    fn open(&self, path: &Path) -> Result<Box<dyn Read>, StoreError>;

    /// Start a brand-new run file. Fails with [`StoreError::AlreadyExists`]
    /// rather than touching an existing one.
    fn create(&self, file_name: &str) -> Result<Box<dyn RunWriter>, StoreError>;
}

/// A run file being written.
///
/// Nothing is visible to [`RunStore::list`] until [`RunWriter::commit`]
/// succeeds. Dropping an uncommitted writer discards what was written.
pub trait RunWriter: Write {
    /// Publish the file under its final name and return its path.
    fn commit(self: Box<Self>) -> Result<PathBuf, StoreError>;
}

/// Filesystem-backed run store.
///
/// ```text
/// {root}/
///   users_following_2024_01_15_09_30_00.csv
///   users_following_2024_02_01_18_05_12.csv
/// ```
pub struct FsRunStore {
    root: PathBuf,
}

impl FsRunStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl RunStore for FsRunStore {
    fn list(&self, pattern: &str) -> Result<Vec<PathBuf>, StoreError> {
        // A ledger that was never written is an empty ledger.
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let root = glob::Pattern::escape(&self.root.to_string_lossy());
        let full = Path::new(&root).join(pattern);
        let mut paths = glob::glob(&full.to_string_lossy())?
            .collect::<Result<Vec<_>, _>>()?;
        paths.retain(|p| p.is_file());
        paths.sort();
        Ok(paths)
    }

    fn open(&self, path: &Path) -> Result<Box<dyn Read>, StoreError> {
        Ok(Box::new(BufReader::new(File::open(path)?)))
    }

    fn create(&self, file_name: &str) -> Result<Box<dyn RunWriter>, StoreError> {
        fs::create_dir_all(&self.root)?;
        let path = self.root.join(file_name);
        if path.exists() {
            return Err(StoreError::AlreadyExists { path });
        }

        // Staged in the same directory so the final rename stays on one
        // filesystem. The `.partial` suffix keeps it out of every ledger pattern.
        let staging = tempfile::Builder::new()
            .prefix(".staging-")
            .suffix(".partial")
            .tempfile_in(&self.root)?;

        Ok(Box::new(FsRunWriter {
            staging: BufWriter::new(staging),
            path,
        }))
    }
}

/// Writes into a staging file, then hard-renames it without clobbering.
struct FsRunWriter {
    staging: BufWriter<NamedTempFile>,
    path: PathBuf,
}

impl Write for FsRunWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.staging.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.staging.flush()
    }
}

impl RunWriter for FsRunWriter {
    fn commit(self: Box<Self>) -> Result<PathBuf, StoreError> {
        let FsRunWriter { staging, path } = *self;
        let file = staging.into_inner().map_err(|e| StoreError::Io(e.into_error()))?;
        file.as_file().sync_all()?;

        file.persist_noclobber(&path).map_err(|e| match e.error.kind() {
            io::ErrorKind::AlreadyExists => StoreError::AlreadyExists { path: path.clone() },
            _ => StoreError::Io(e.error),
        })?;
        Ok(path)
    }
}
