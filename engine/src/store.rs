//! Snapshot persistence for one game's town square.
//!
//! The snapshot is the serialized [`TownSquare`] aggregate. An absent town
//! square is written as an explicit empty marker (`{}`) so "game ended" and
//! "never set up" survive a restart the same way.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use thiserror::Error;
use townsquare_types::TownSquare;
use townsquare_utils::{WriteOptions, atomic_write_with_options, recover_bak_file};

/// Serialized form of "no town square".
pub const EMPTY_MARKER: &str = "{}";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot IO failed at {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("snapshot at {} is not a valid town square: {source}", path.display())]
    Serde {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("snapshot store rejected the write: {0}")]
    Unavailable(String),
}

/// Durable load/save pair for one game.
pub trait SnapshotStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved or the empty marker was saved.
    fn load(&self) -> Result<Option<TownSquare>, StoreError>;
    fn save(&self, town_square: Option<&TownSquare>) -> Result<(), StoreError>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Arc<S> {
    fn load(&self) -> Result<Option<TownSquare>, StoreError> {
        (**self).load()
    }

    fn save(&self, town_square: Option<&TownSquare>) -> Result<(), StoreError> {
        (**self).save(town_square)
    }
}

fn encode(town_square: Option<&TownSquare>) -> Result<String, serde_json::Error> {
    match town_square {
        Some(ts) => serde_json::to_string_pretty(ts),
        None => Ok(EMPTY_MARKER.to_string()),
    }
}

fn decode(content: &str) -> Result<Option<TownSquare>, serde_json::Error> {
    let trimmed = content.trim();
    if trimmed.is_empty() || trimmed == EMPTY_MARKER {
        return Ok(None);
    }
    serde_json::from_str(trimmed).map(Some)
}

/// JSON file written through [`atomic_write_with_options`].
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    options: WriteOptions,
}

impl JsonFileStore {
    pub const FILENAME: &'static str = "townsquare.json";

    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            options: WriteOptions::private(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: WriteOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<TownSquare>, StoreError> {
        recover_bak_file(&self.path);
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        decode(&content).map_err(|source| StoreError::Serde {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, town_square: Option<&TownSquare>) -> Result<(), StoreError> {
        let json = encode(town_square).map_err(|source| StoreError::Serde {
            path: self.path.clone(),
            source,
        })?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        atomic_write_with_options(&self.path, json.as_bytes(), self.options)
            .map_err(|e| self.io_error(e))?;
        tracing::debug!(path = %self.path.display(), bytes = json.len(), "Saved snapshot");
        Ok(())
    }
}

/// In-process store holding the serialized snapshot, for tests and
/// ephemeral games.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: Mutex<Option<String>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves so far.
    #[must_use]
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Last saved JSON, if any save happened.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Make subsequent saves fail until called again with `false`.
    pub fn set_failing(&self, failing: bool) {
        self.fail_saves.store(failing, Ordering::SeqCst);
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<TownSquare>, StoreError> {
        let guard = self.snapshot.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_deref() {
            Some(content) => decode(content).map_err(|source| StoreError::Serde {
                path: PathBuf::from("<memory>"),
                source,
            }),
            None => Ok(None),
        }
    }

    fn save(&self, town_square: Option<&TownSquare>) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is set to fail".into()));
        }
        let json = encode(town_square).map_err(|source| StoreError::Serde {
            path: PathBuf::from("<memory>"),
            source,
        })?;
        *self.snapshot.lock().unwrap_or_else(PoisonError::into_inner) = Some(json);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
