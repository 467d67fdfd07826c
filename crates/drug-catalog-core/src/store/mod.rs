//! Flat-file persistence for drug-catalog.
//!
//! Each entity type lives in one pretty-printed JSON array. A [`Repository`]
//! owns the in-memory collection; every mutation rewrites the whole file
//! through a sibling temp file that is renamed over the target.

mod categories;
mod drugs;
mod reminders;
mod schedules;
mod users;

pub use categories::*;
pub use drugs::*;
pub use reminders::*;
pub use schedules::*;
pub use users::*;

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::models::{Category, Drug, MedicationReminder, MedicationSchedule, User};

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed data file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Duplicate record: {0}")]
    Duplicate(String),

    #[error("Protected record: {0}")]
    Protected(String),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Wrong password for user: {0}")]
    WrongPassword(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A persisted entity with a sequential integer id.
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Name used in log lines and error messages.
    const KIND: &'static str;

    fn id(&self) -> u32;
    fn set_id(&mut self, id: u32);
}

macro_rules! impl_record {
    ($ty:ty, $kind:literal) => {
        impl Record for $ty {
            const KIND: &'static str = $kind;

            fn id(&self) -> u32 {
                self.id
            }

            fn set_id(&mut self, id: u32) {
                self.id = id;
            }
        }
    };
}

impl_record!(Drug, "drug");
impl_record!(Category, "category");
impl_record!(User, "user");
impl_record!(MedicationReminder, "reminder");
impl_record!(MedicationSchedule, "schedule");

/// In-memory collection backed by one JSON file.
#[derive(Debug)]
pub struct Repository<T> {
    path: Option<PathBuf>,
    items: Vec<T>,
}

impl<T: Record> Repository<T> {
    /// Load from `path`; a missing file yields an empty collection.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let items = read_list(&path)?;
        tracing::debug!(kind = T::KIND, count = items.len(), path = %path.display(), "Loaded records");
        Ok(Self {
            path: Some(path),
            items,
        })
    }

    /// Create an unbacked repository (for testing); saves are no-ops.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            items: Vec::new(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Discard in-memory state and read the file again.
    pub fn reload(&mut self) -> StoreResult<()> {
        if let Some(path) = &self.path {
            self.items = read_list(path)?;
        }
        Ok(())
    }

    /// Rewrite the whole file.
    pub fn save(&self) -> StoreResult<()> {
        self.write(&self.items)
    }

    fn write(&self, items: &[T]) -> StoreResult<()> {
        match &self.path {
            Some(path) => write_list(path, items),
            None => Ok(()),
        }
    }

    /// Persist `items`, then adopt them. On a failed write the collection is untouched.
    fn commit(&mut self, items: Vec<T>) -> StoreResult<()> {
        self.write(&items)?;
        self.items = items;
        Ok(())
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// `max(id) + 1`, or 1 for an empty collection.
    pub fn next_id(&self) -> u32 {
        self.items.iter().map(Record::id).max().map_or(1, |max| max + 1)
    }

    /// Assign the next id, append, and save.
    pub fn insert(&mut self, mut item: T) -> StoreResult<T> {
        item.set_id(self.next_id());
        let mut items = self.items.clone();
        items.push(item.clone());
        self.commit(items)?;
        Ok(item)
    }

    /// Mutate the record with `id` and save. `None` if absent.
    pub fn modify<R>(&mut self, id: u32, f: impl FnOnce(&mut T) -> R) -> StoreResult<Option<R>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };
        let mut items = self.items.clone();
        let result = f(&mut items[index]);
        self.commit(items)?;
        Ok(Some(result))
    }

    /// Remove the record with `id` and save. `None` if absent.
    pub fn remove(&mut self, id: u32) -> StoreResult<Option<T>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };
        let mut items = self.items.clone();
        let removed = items.remove(index);
        self.commit(items)?;
        Ok(Some(removed))
    }

    /// Remove every record matching `pred`, saving once if anything changed.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> StoreResult<Vec<T>> {
        let (removed, kept): (Vec<T>, Vec<T>) = self.items.iter().cloned().partition(|item| pred(item));
        if !removed.is_empty() {
            self.commit(kept)?;
        }
        Ok(removed)
    }

    /// Replace the whole collection and save.
    pub fn replace_all(&mut self, items: Vec<T>) -> StoreResult<()> {
        self.commit(items)
    }

    fn position(&self, id: u32) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }
}

/// Read a JSON list; a missing file is an empty list.
pub fn read_list<T: DeserializeOwned>(path: &Path) -> StoreResult<Vec<T>> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if data.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&data).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a JSON list, creating parent directories as needed.
pub fn write_list<T: Serialize>(path: &Path, items: &[T]) -> StoreResult<()> {
    let io_err = |source: std::io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let json = serde_json::to_string_pretty(items)?;
    let tmp = temp_path(path);
    fs::write(&tmp, json).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)?;

    tracing::trace!(count = items.len(), path = %path.display(), "Saved records");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
