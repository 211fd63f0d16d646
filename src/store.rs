use log::warn;
use serde::{Serialize, de::DeserializeOwned};
use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::minute_log::FocusMinuteLog;

pub const FOCUS_LOG_KEY: &str = "focus-sessions";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Blob storage keyed by name. Values are opaque strings (JSON in practice).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        // Write-then-rename: readers never see a half-written blob.
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Loads `key`, falling back to `T::default()` when the blob is missing or unreadable.
pub fn load_json<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    try_load_json(store, key).unwrap_or_default()
}

/// Like [`load_json`] but keeps "nothing stored" distinct from a default value.
pub fn try_load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(raw) => raw?,
        Err(err) => {
            warn!("Failed to read {key}: {err}");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("Discarding unreadable {key}: {err}");
            None
        }
    }
}

pub fn save_json<T: Serialize + ?Sized>(
    store: &mut dyn KeyValueStore,
    key: &str,
    data: &T,
) -> StoreResult<()> {
    let serialized = serde_json::to_string_pretty(data)?;
    store.set(key, &serialized)
}

/// Append-only destination for minute log entries.
pub trait FocusLogSink {
    fn add_focus_session(&mut self, entry: FocusMinuteLog);
}

impl FocusLogSink for Vec<FocusMinuteLog> {
    fn add_focus_session(&mut self, entry: FocusMinuteLog) {
        self.push(entry);
    }
}

/// The persisted application log of focus minutes, read back by the analytics views.
#[derive(Debug, Clone, Default)]
pub struct FocusLog {
    entries: Vec<FocusMinuteLog>,
    needs_save: bool,
}

impl FocusLog {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        Self {
            entries: load_json(store, FOCUS_LOG_KEY),
            needs_save: false,
        }
    }

    pub fn entries(&self) -> &[FocusMinuteLog] {
        &self.entries
    }

    pub fn needs_save(&self) -> bool {
        self.needs_save
    }

    pub fn save(&mut self, store: &mut dyn KeyValueStore) -> StoreResult<()> {
        if self.needs_save {
            save_json(store, FOCUS_LOG_KEY, &self.entries)?;
            self.needs_save = false;
        }
        Ok(())
    }
}

impl FocusLogSink for FocusLog {
    fn add_focus_session(&mut self, entry: FocusMinuteLog) {
        self.entries.push(entry);
        self.needs_save = true;
    }
}
