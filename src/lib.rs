pub mod app_config;
pub mod binding;
pub mod config;
pub mod error;
pub mod i18n;
pub mod resources;
pub mod services;
