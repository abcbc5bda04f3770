//! The application's service object.
//!
//! Construct one `Services` at startup, before any view is bound, and pass
//! it by reference to whatever needs configuration or text. Each store is
//! built on first use and never reloaded.

use crate::app_config::ConfigStore;
use crate::binding::ModelContext;
use crate::config::Config;
use crate::i18n::{
    JsonFilePreferences, LocaleRegistry, LocalizationStore, MemoryPreferences, PreferenceStore,
};
use crate::resources::{DirBundle, ResourceBundle, CONFIG_DOCUMENT_PATH, LANGUAGE_TABLE_PATH};
use std::cell::{OnceCell, RefCell};
use tracing::info;

pub struct Services {
    bundle: Box<dyn ResourceBundle>,
    registry: LocaleRegistry,
    config_document_path: String,
    language_table_path: String,
    // Handed to the localization store when it is built.
    preferences: RefCell<Option<Box<dyn PreferenceStore>>>,
    config: OnceCell<ConfigStore>,
    localization: OnceCell<LocalizationStore>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("config_document_path", &self.config_document_path)
            .field("language_table_path", &self.language_table_path)
            .field("config", &self.config.get())
            .field("localization", &self.localization.get())
            .finish()
    }
}

impl Services {
    pub fn new(
        bundle: impl ResourceBundle + 'static,
        preferences: impl PreferenceStore + 'static,
    ) -> Self {
        Self {
            bundle: Box::new(bundle),
            registry: LocaleRegistry::builtin(),
            config_document_path: CONFIG_DOCUMENT_PATH.to_string(),
            language_table_path: LANGUAGE_TABLE_PATH.to_string(),
            preferences: RefCell::new(Some(Box::new(preferences))),
            config: OnceCell::new(),
            localization: OnceCell::new(),
        }
    }

    /// Services backed by the resource directory and preference file named
    /// in `config`.
    pub fn from_config(config: &Config) -> Self {
        info!(
            "Using resources from {} and preferences at {}",
            config.resource_dir.display(),
            config.preferences_path.display()
        );
        Self::new(
            DirBundle::new(&config.resource_dir),
            JsonFilePreferences::open(&config.preferences_path),
        )
        .with_config_document_path(&config.config_document)
        .with_language_table_path(&config.language_table)
    }

    pub fn with_registry(mut self, registry: LocaleRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_config_document_path(mut self, path: impl Into<String>) -> Self {
        self.config_document_path = path.into();
        self
    }

    pub fn with_language_table_path(mut self, path: impl Into<String>) -> Self {
        self.language_table_path = path.into();
        self
    }

    /// The configuration store, loaded on first call.
    pub fn config(&self) -> &ConfigStore {
        self.config
            .get_or_init(|| ConfigStore::load(self.bundle.as_ref(), &self.config_document_path))
    }

    /// The localization store, loaded on first call.
    pub fn localization(&self) -> &LocalizationStore {
        self.localization.get_or_init(|| {
            let preferences: Box<dyn PreferenceStore> = self
                .preferences
                .borrow_mut()
                .take()
                .unwrap_or_else(|| Box::new(MemoryPreferences::new()));
            LocalizationStore::load(
                self.bundle.as_ref(),
                &self.language_table_path,
                self.registry.clone(),
                preferences,
            )
        })
    }

    /// Shortcut accessors for model-layer code.
    pub fn model(&self) -> ModelContext<'_> {
        ModelContext::new(self)
    }

    pub fn is_config_loaded(&self) -> bool {
        self.config.get().is_some()
    }

    pub fn is_localization_loaded(&self) -> bool {
        self.localization.get().is_some()
    }
}
