//! Application configuration: the grouped key-value document (audio paths,
//! fallback texts, resource paths, dialog presentation) and its store.

mod entity;
mod store;

pub use entity::{AudioConfig, DialogConfig, FieldGroup, GameConfig, ResourceConfig, TextConfig};
pub use store::{missing_config_text, ConfigStore};
