//! Durable key/value storage backing the user profile store and the global
//! settings.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use directories_next::BaseDirs;
use indexmap::IndexMap;
use log::warn;

use crate::core::error::{Error, Result};

pub fn config_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|base| base.config_dir().join("Padviz"))
}

/// String key/value store. Writes are synchronous: once `set` returns `Ok`
/// the value is durable.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail, for exercising write-failure paths
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.read_only {
            return Err(Error::Storage(format!(
                "cannot write '{}' to a read-only store",
                key
            )));
        }
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.values.borrow_mut().clear();
        Ok(())
    }
}

/// All keys in one pretty-printed JSON object on disk
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join("storage.json"),
        }
    }

    /// `<config dir>/Padviz/storage.json`
    pub fn in_config_dir() -> Result<Self> {
        config_dir().map(Self::new).ok_or_else(|| {
            Error::Storage("could not determine config directory".to_string())
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<IndexMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Ok(IndexMap::new())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn write_all(&self, values: &IndexMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(values)?;
        if let Some(parent_dir) = self.path.parent() {
            fs::create_dir_all(parent_dir)?;
        }
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.read_all() {
            Ok(mut values) => values.shift_remove(key),
            Err(err) => {
                warn!("Unable to read {}: {}", self.path.display(), err);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_all().unwrap_or_else(|err| {
            warn!("Replacing unreadable {}: {}", self.path.display(), err);
            IndexMap::new()
        });
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
