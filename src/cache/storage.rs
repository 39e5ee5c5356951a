//! Persistence backends for the expiring cache
//!
//! The cache persists its whole table as one JSON blob, so a backend only
//! needs to read and write a single string.

use directories::ProjectDirs;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::atomic_file::write_atomically;

/// Where the cache table is persisted
pub trait CacheStorage {
    /// Returns the stored blob, or `None` if nothing has been written yet
    fn read(&self) -> io::Result<Option<String>>;

    /// Replaces the stored blob
    fn write(&self, blob: &str) -> io::Result<()>;
}

/// Stores the cache table as a JSON file on disk
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Path to the JSON file holding the table
    path: PathBuf,
}

impl FileStorage {
    /// Uses `cache.json` in the XDG cache directory (`~/.cache/neuroease/` on Linux).
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "neuroease")?;
        Some(Self::at(project_dirs.cache_dir().join("cache.json")))
    }

    /// Uses a specific file, useful for tests or a configured location
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheStorage for FileStorage {
    fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, blob: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        write_atomically(&self.path, blob)
    }
}

/// In-memory backend for tests, with switches to simulate a broken store
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blob: Mutex<Option<String>>,
    fail_reads: Mutex<bool>,
    fail_writes: Mutex<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with the given raw blob, which need not be valid JSON
    pub fn with_blob(blob: &str) -> Self {
        let storage = Self::new();
        *lock(&storage.blob) = Some(blob.to_string());
        storage
    }

    /// The raw blob as last written
    pub fn blob(&self) -> Option<String> {
        lock(&self.blob).clone()
    }

    /// Makes every read fail, as an unreadable store would
    pub fn fail_reads(&self, fail: bool) {
        *lock(&self.fail_reads) = fail;
    }

    /// Makes every write fail, as a full store would
    pub fn fail_writes(&self, fail: bool) {
        *lock(&self.fail_writes) = fail;
    }
}

impl CacheStorage for MemoryStorage {
    fn read(&self) -> io::Result<Option<String>> {
        if *lock(&self.fail_reads) {
            return Err(io::Error::new(io::ErrorKind::Other, "read disabled"));
        }
        Ok(lock(&self.blob).clone())
    }

    fn write(&self, blob: &str) -> io::Result<()> {
        if *lock(&self.fail_writes) {
            return Err(io::Error::new(io::ErrorKind::Other, "storage full"));
        }
        *lock(&self.blob) = Some(blob.to_string());
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
