//! Flat key-value persistence for the team and game collections.
//!
//! Each collection is one JSON array stored under a fixed key and rewritten whole on every
//! save. Nothing here reports failure to the caller: reads degrade to an empty collection and
//! writes are logged and dropped, so a broken store never interrupts a match in progress.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

pub const TEAMS_KEY: &str = "waterPoloTeams";
pub const GAMES_KEY: &str = "waterPoloGames";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("cannot encode {key}: {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },
}

pub trait Store {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: Store + ?Sized> Store for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Keeps each key in `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> FileStore {
        FileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs_err::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs_err::create_dir_all(&self.dir)?;
        fs_err::write(self.path(key), value)?;
        Ok(())
    }
}

/// Reads the collection under `key`. Missing or unreadable values, and anything that is not a
/// JSON array, come back as an empty collection. Inside an array, each record that does not
/// decode is logged and skipped on its own; the rest still load.
pub fn load_collection<T, S>(store: &S, key: &str) -> Vec<T>
where
    T: DeserializeOwned,
    S: Store + ?Sized,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            log::warn!("cannot read {}, starting empty: {}", key, err);
            return Vec::new();
        }
    };
    let records: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(records) => records,
        Err(err) => {
            log::warn!("discarding malformed {}: {}", key, err);
            return Vec::new();
        }
    };
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(item) => Some(item),
            Err(err) => {
                log::warn!("skipping record {} of {}: {}", index, key, err);
                None
            }
        })
        .collect()
}

/// Overwrites the collection under `key`. Failures are logged and otherwise ignored.
pub fn save_collection<T, S>(store: &mut S, key: &str, items: &[T])
where
    T: Serialize,
    S: Store + ?Sized,
{
    let result = serde_json::to_string(items)
        .map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })
        .and_then(|raw| store.set(key, &raw));
    if let Err(err) = result {
        log::error!("error saving {}: {}", key, err);
    }
}
