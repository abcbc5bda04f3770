//! Resource bundle: where the configuration document and the localization
//! table are read from.
//!
//! Resources are addressed by logical, slash-separated paths such as
//! `Config/GameConfig.json`, independent of the storage behind them.

use crate::error::LoadError;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Logical path of the configuration document.
pub const CONFIG_DOCUMENT_PATH: &str = "Config/GameConfig.json";

/// Logical path of the localization table.
pub const LANGUAGE_TABLE_PATH: &str = "Config/LanguageConfig.csv";

/// Source of bundled text resources.
pub trait ResourceBundle {
    /// Read the resource at `logical_path` as UTF-8 text.
    fn load_text(&self, logical_path: &str) -> Result<String, LoadError>;
}

/// Resources stored as files under a root directory.
#[derive(Debug, Clone)]
pub struct DirBundle {
    root: PathBuf,
}

impl DirBundle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, logical_path: &str) -> PathBuf {
        logical_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }
}

impl ResourceBundle for DirBundle {
    fn load_text(&self, logical_path: &str) -> Result<String, LoadError> {
        let path = self.resolve(logical_path);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(strip_bom(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(LoadError::SourceMissing {
                path: logical_path.to_string(),
            }),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => Err(LoadError::ParseFailure {
                path: logical_path.to_string(),
                reason: "resource is not valid UTF-8".to_string(),
            }),
            Err(source) => Err(LoadError::Unreadable {
                path: logical_path.to_string(),
                source,
            }),
        }
    }
}

/// In-memory resources, keyed by logical path.
#[derive(Debug, Clone, Default)]
pub struct MemoryBundle {
    entries: HashMap<String, String>,
}

impl MemoryBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a resource.
    pub fn with(mut self, logical_path: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(logical_path, text);
        self
    }

    pub fn insert(&mut self, logical_path: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(logical_path.into(), text.into());
    }
}

impl ResourceBundle for MemoryBundle {
    fn load_text(&self, logical_path: &str) -> Result<String, LoadError> {
        self.entries
            .get(logical_path)
            .map(|text| strip_bom(text.clone()))
            .ok_or_else(|| LoadError::SourceMissing {
                path: logical_path.to_string(),
            })
    }
}

fn strip_bom(text: String) -> String {
    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}
