//! Preview binary - renders every localized text in every locale and checks
//! the table for problems, without touching the saved preferences.
//!
//! Usage:
//!   cargo run --bin preview            # Print the text grid and validation report
//!   cargo run --bin preview -- --json  # Also print the report and lookup metrics as JSON
//!
//! Optional environment variables:
//! - LOCALE_CONFIG_RESOURCE_DIR (defaults to resources)
//! - LOCALE_CONFIG_LANGUAGE_TABLE (defaults to Config/LanguageConfig.csv)
//! - LOCALE_CONFIG_DOCUMENT (defaults to Config/GameConfig.json)

use anyhow::{bail, Result};
use locale_config::config::Config;
use locale_config::i18n::{MemoryPreferences, TableValidator};
use locale_config::resources::DirBundle;
use locale_config::services::Services;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Serialize)]
struct PreviewReport<'a> {
    keys: usize,
    locales: Vec<&'a str>,
    validation: &'a locale_config::i18n::ValidationReport,
    metrics: locale_config::i18n::MetricsReport,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("locale_config=info".parse()?),
        )
        .init();

    // Load environment from .env file
    dotenvy::dotenv().ok();

    let as_json = std::env::args().any(|arg| arg == "--json");

    info!("Loading configuration...");
    let config = Config::from_env()?;
    let services = Services::new(DirBundle::new(&config.resource_dir), MemoryPreferences::new())
        .with_config_document_path(&config.config_document)
        .with_language_table_path(&config.language_table);

    let store = services.localization();
    if let Some(e) = store.load_error() {
        bail!("Cannot preview texts: {}", e);
    }

    let locales = store.locales().to_vec();
    info!("Rendering {} keys in {} locales", store.len(), locales.len());

    println!("\n{}", "=".repeat(60));
    for key in store.keys() {
        println!("{}", key);
        for locale in &locales {
            println!("  {:<8} {}", locale.id(), store.text_in(key, locale));
        }
    }
    println!("{}", "=".repeat(60));

    let reference = store.registry().default_locale();
    let report = TableValidator::validate(store.table(), reference);
    for error in &report.errors {
        println!("ERROR   {}", error);
    }
    for warning in &report.warnings {
        println!("WARNING {}", warning);
    }
    if report.is_clean() {
        println!("No problems found (reference locale {})", reference);
    }

    let config_store = services.config();
    if let Some(e) = config_store.load_error() {
        warn!("Configuration document not loaded: {}", e);
    }

    if as_json {
        let preview = PreviewReport {
            keys: store.len(),
            locales: locales.iter().map(|l| l.id()).collect(),
            validation: &report,
            metrics: store.metrics().report(),
        };
        println!("{}", serde_json::to_string_pretty(&preview)?);
    }

    if report.has_errors() {
        bail!("{} error(s) in the localization table", report.errors.len());
    }
    Ok(())
}
