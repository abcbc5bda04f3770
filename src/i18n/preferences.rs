//! Persisted user preferences: a durable string key-value store.
//!
//! The localization store keeps exactly one entry here, the active locale
//! under [`CURRENT_LANGUAGE_KEY`].

use crate::error::PreferenceError;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, warn};

/// Preference key holding the active locale's programmatic id (`en_US`).
pub const CURRENT_LANGUAGE_KEY: &str = "CurrentLanguage";

/// A durable string key-value store.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

impl<P: PreferenceStore + ?Sized> PreferenceStore for Box<P> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        (**self).set(key, value)
    }
}

/// In-memory preferences.
///
/// Clones share the same map, so a clone handed to a second store instance
/// sees what the first one saved (a simulated restart).
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: &str, value: &str) -> Self {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences stored as a flat JSON object in a single file.
///
/// The file is read once when opened and rewritten in full on every `set`.
#[derive(Debug)]
pub struct JsonFilePreferences {
    path: PathBuf,
    values: RefCell<BTreeMap<String, String>>,
}

impl JsonFilePreferences {
    /// Open the preference file at `path`.
    ///
    /// A missing file starts empty. An unreadable or malformed file also
    /// starts empty (with a warning) and is overwritten on the next `set`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str::<BTreeMap<String, String>>(&text)
                .unwrap_or_else(|e| {
                    warn!("Ignoring malformed preference file {}: {}", path.display(), e);
                    BTreeMap::new()
                }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No preference file at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => {
                warn!("Failed to read preference file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        Self {
            path,
            values: RefCell::new(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &BTreeMap<String, String>) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl PreferenceStore for JsonFilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    /// Write the value through to disk. On failure the stored value is left
    /// unchanged.
    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut updated = self.values.borrow().clone();
        updated.insert(key.to_string(), value.to_string());
        self.flush(&updated)?;
        *self.values.borrow_mut() = updated;
        Ok(())
    }
}
