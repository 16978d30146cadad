//! Blob storage for persisted documents.
//!
//! [`FsBlobStore`] keeps each named document as a file in the platform
//! configuration directory. [`MemoryBlobStore`] keeps them in memory and
//! counts reads and writes, which the configuration tests rely on.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::constants::{APP_DIR_NAME, CONFIG_DIR_ENV};

/// Named text-document storage.
pub trait BlobStore {
    /// Returns true if a document with this name exists.
    fn exists(&self, name: &str) -> bool;

    /// Reads a document.
    fn read_text(&self, name: &str) -> Result<String>;

    /// Creates or replaces a document.
    fn write_text(&self, name: &str, content: &str) -> Result<()>;
}

/// Directory-backed blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Creates a store rooted at `root`. The directory is created on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates a store in the application's configuration directory.
    ///
    /// `PIANOKEYS_CONFIG_DIR` overrides the location; otherwise:
    ///
    /// - Linux: `~/.config/PianoKeys/`
    /// - macOS: `~/Library/Application Support/PianoKeys/`
    /// - Windows: `%APPDATA%\PianoKeys\`
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(Self::config_dir()?))
    }

    /// Resolves the configuration directory without touching the filesystem.
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Directory holding the documents.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of a named document.
    #[must_use]
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl BlobStore for FsBlobStore {
    fn exists(&self, name: &str) -> bool {
        self.path_of(name).is_file()
    }

    fn read_text(&self, name: &str) -> Result<String> {
        let path = self.path_of(name);
        fs::read_to_string(&path).context(format!("Failed to read file: {}", path.display()))
    }

    /// Uses temp file + rename so readers never observe a partial document.
    fn write_text(&self, name: &str, content: &str) -> Result<()> {
        fs::create_dir_all(&self.root).context(format!(
            "Failed to create config directory: {}",
            self.root.display()
        ))?;

        let path = self.path_of(name);
        let temp_path = path.with_extension("tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, &path).context(format!(
            "Failed to rename temp file to: {}",
            path.display()
        ))?;

        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    blobs: HashMap<String, String>,
    reads: usize,
    writes: usize,
    fail_reads: bool,
    fail_writes: bool,
}

/// In-memory blob store.
///
/// Clones share the same contents, so a test can hand one clone to a
/// configuration store and inspect another.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBlobStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding one document.
    #[must_use]
    pub fn with_blob(name: &str, content: &str) -> Self {
        let store = Self::new();
        store.lock().blobs.insert(name.to_string(), content.to_string());
        store
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current content of a document, without counting as a read.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.lock().blobs.get(name).cloned()
    }

    /// Number of successful and failed `read_text` calls.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.lock().reads
    }

    /// Number of successful and failed `write_text` calls.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    /// Makes every subsequent read fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    /// Makes every subsequent write fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }
}

impl BlobStore for MemoryBlobStore {
    fn exists(&self, name: &str) -> bool {
        self.lock().blobs.contains_key(name)
    }

    fn read_text(&self, name: &str) -> Result<String> {
        let mut state = self.lock();
        state.reads += 1;
        if state.fail_reads {
            bail!("Simulated read failure for {name}");
        }
        state
            .blobs
            .get(name)
            .cloned()
            .with_context(|| format!("No such document: {name}"))
    }

    fn write_text(&self, name: &str, content: &str) -> Result<()> {
        let mut state = self.lock();
        state.writes += 1;
        if state.fail_writes {
            bail!("Simulated write failure for {name}");
        }
        state.blobs.insert(name.to_string(), content.to_string());
        Ok(())
    }
}
