//! The combined store - everything ever reported into one target directory

use crate::MetaData;
use fs4::fs_std::FileExt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

pub const COMBINED_FILENAME: &str = "combined.json";
const LOCK_FILENAME: &str = "combined.json.lock";
const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Failure reading or writing the combined store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("combined store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        source: io::Error,
    },
    #[error("combined store at {path} is not a valid dataset: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("combined dataset could not be serialized: {source}")]
    Encode { source: serde_json::Error },
}

/// The combined dataset of one target directory, kept on disk so every
/// reporting process observes the same state.
pub struct CombinedStore {
    dir: PathBuf,
}

impl CombinedStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn combined_path(&self) -> PathBuf {
        self.dir.join(COMBINED_FILENAME)
    }

    fn lock_path(&self) -> PathBuf {
        self.dir.join(LOCK_FILENAME)
    }

    /// Read the current dataset. A store that does not exist yet is an
    /// empty dataset, not an error.
    pub fn load(&self) -> Result<Vec<MetaData>, StoreError> {
        let path = self.combined_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io { path, source: e }),
        };
        serde_json::from_str(&content).map_err(|e| StoreError::Corrupt { path, source: e })
    }

    /// Read the current dataset, degrading to an empty one when the store
    /// cannot be read. The failure is logged here, once.
    pub fn load_or_empty(&self) -> Vec<MetaData> {
        match self.load() {
            Ok(dataset) => dataset,
            Err(e) => {
                tracing::error!(
                    "combined store read failed, continuing with an empty dataset: {}",
                    e
                );
                Vec::new()
            }
        }
    }

    /// Replace the persisted dataset, creating the directory when needed.
    pub fn save(&self, dataset: &[MetaData]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::Io {
            path: self.dir.clone(),
            source: e,
        })?;
        let content =
            serde_json::to_string(dataset).map_err(|e| StoreError::Encode { source: e })?;
        let path = self.combined_path();
        fs::write(&path, content).map_err(|e| StoreError::Io { path, source: e })
    }

    /// Append one record under the directory's exclusive lock and persist
    /// the grown dataset.
    ///
    /// Never fails: a missing lock degrades to an unlocked write with a
    /// warning, and read or write failures are logged while the in-memory
    /// dataset is still returned so rendering can proceed.
    pub fn append(&self, meta: MetaData) -> Vec<MetaData> {
        let lock_file = self.open_lock_file();
        let _lock = match &lock_file {
            Ok(file) => match lock_file_guard(file, LOCK_TIMEOUT) {
                Ok(guard) => Some(guard),
                Err(e) => {
                    tracing::warn!(
                        "proceeding unlocked on {}: {}",
                        self.dir.display(),
                        e
                    );
                    None
                }
            },
            Err(e) => {
                tracing::warn!(
                    "combined store lock unavailable for {}, proceeding unlocked: {}",
                    self.dir.display(),
                    e
                );
                None
            }
        };

        let mut dataset = self.load_or_empty();
        dataset.push(meta);
        if let Err(e) = self.save(&dataset) {
            tracing::error!("combined store write failed: {}", e);
        }
        dataset
    }

    fn open_lock_file(&self) -> io::Result<File> {
        fs::create_dir_all(&self.dir)?;
        File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path())
    }
}

fn lock_file_guard(file: &File, timeout: Duration) -> Result<LockGuard<'_>, io::Error> {
    let start = Instant::now();
    loop {
        if matches!(FileExt::try_lock_exclusive(file), Ok(true)) {
            return Ok(LockGuard { file });
        }

        if start.elapsed() >= timeout {
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "timed out waiting for the combined store lock",
            ));
        }

        std::thread::sleep(Duration::from_millis(50));
    }
}

#[derive(Debug)]
struct LockGuard<'a> {
    file: &'a File,
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        let _ = FileExt::unlock(self.file);
    }
}
