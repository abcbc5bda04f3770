//! Configuration store: typed access to the configuration document.

use crate::app_config::entity::{DialogConfig, FieldGroup, GameConfig};
use crate::error::LoadError;
use crate::resources::ResourceBundle;
use std::collections::HashMap;
use tracing::{error, info};

/// Placeholder returned by [`ConfigStore::text`] for an unknown key.
pub fn missing_config_text(key: &str) -> String {
    format!("[config text missing: {}]", key)
}

type FieldMap = HashMap<&'static str, String>;

/// Read-only view over a loaded configuration document.
///
/// Built once; lookups never fail. Unknown text keys resolve to
/// `[config text missing: <key>]`, unknown path keys to `""`.
#[derive(Debug, Default)]
pub struct ConfigStore {
    document: GameConfig,
    audio: FieldMap,
    text: FieldMap,
    resource: FieldMap,
    load_error: Option<LoadError>,
}

impl ConfigStore {
    /// Load and parse the document at `logical_path`.
    ///
    /// A missing or malformed document is logged once and yields an empty
    /// store; the error stays available through [`load_error`].
    ///
    /// [`load_error`]: ConfigStore::load_error
    pub fn load(bundle: &dyn ResourceBundle, logical_path: &str) -> Self {
        let result = bundle.load_text(logical_path).and_then(|text| {
            serde_json::from_str::<GameConfig>(&text).map_err(|e| LoadError::ParseFailure {
                path: logical_path.to_string(),
                reason: e.to_string(),
            })
        });

        match result {
            Ok(document) => {
                let store = Self::from_document(document);
                info!(
                    "Configuration loaded from {}: {} audio, {} text, {} resource fields, dialog {}",
                    logical_path,
                    store.audio.len(),
                    store.text.len(),
                    store.resource.len(),
                    if store.document.dialog_config.is_some() {
                        "present"
                    } else {
                        "absent"
                    }
                );
                store
            }
            Err(e) => {
                error!("Configuration unavailable, using placeholders: {}", e);
                Self {
                    load_error: Some(e),
                    ..Self::default()
                }
            }
        }
    }

    /// Parse a JSON document already in memory.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let document = serde_json::from_str::<GameConfig>(json).map_err(|e| {
            LoadError::ParseFailure {
                path: "<memory>".to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self::from_document(document))
    }

    pub fn from_document(document: GameConfig) -> Self {
        Self {
            audio: field_map(document.audio_config.as_ref()),
            text: field_map(document.text_config.as_ref()),
            resource: field_map(document.resource_config.as_ref()),
            document,
            load_error: None,
        }
    }

    /// Configured text, or `[config text missing: <key>]`.
    pub fn text(&self, key: &str) -> String {
        self.text
            .get(key)
            .cloned()
            .unwrap_or_else(|| missing_config_text(key))
    }

    /// Audio clip path, or `""`.
    pub fn audio_path(&self, key: &str) -> String {
        self.audio.get(key).cloned().unwrap_or_default()
    }

    /// Resource path, or `""`.
    pub fn resource_path(&self, key: &str) -> String {
        self.resource.get(key).cloned().unwrap_or_default()
    }

    /// Dialog parameters; zeroes and empty strings when not configured.
    pub fn dialog(&self) -> DialogConfig {
        self.document.dialog_config.clone().unwrap_or_default()
    }

    pub fn document(&self) -> &GameConfig {
        &self.document
    }

    /// Number of configured `(audio, text, resource)` fields.
    pub fn field_counts(&self) -> (usize, usize, usize) {
        (self.audio.len(), self.text.len(), self.resource.len())
    }

    pub fn is_loaded(&self) -> bool {
        self.load_error.is_none()
    }

    pub fn load_error(&self) -> Option<&LoadError> {
        self.load_error.as_ref()
    }
}

fn field_map<G: FieldGroup>(group: Option<&G>) -> FieldMap {
    group
        .map(|group| {
            group
                .fields()
                .into_iter()
                .filter_map(|(name, value)| value.map(|v| (name, v.to_string())))
                .collect()
        })
        .unwrap_or_default()
}
