//! Localization: locale identifiers, the text table, the active locale and
//! its change notification.
//!
//! # Architecture
//!
//! - `csv`: Tabular text parser for the localization source
//! - `locale`: `Locale` identifiers and the registry of declared locales
//! - `store`: The text table and the `LocalizationStore` service
//! - `notify`: Observer list used for locale change notification
//! - `preferences`: Persisted key-value preferences (active locale)
//! - `validator`: Table quality report
//! - `metrics`: Lookup and notification counters
//!
//! # Example
//!
//! ```rust,ignore
//! use locale_config::i18n::{Locale, LocaleRegistry, LocalizationStore, MemoryPreferences};
//!
//! let store = LocalizationStore::from_csv(
//!     "Key,zh-CN,en-US\nLoginSuccess,登录成功,Login OK",
//!     LocaleRegistry::builtin(),
//!     MemoryPreferences::new(),
//! );
//! assert_eq!(store.text("LoginSuccess"), "登录成功");
//!
//! store.set_locale(Locale::EN_US);
//! assert_eq!(store.text("LoginSuccess"), "Login OK");
//! ```

pub mod csv;
mod locale;
mod metrics;
mod notify;
mod preferences;
mod store;
mod validator;

pub use locale::{Locale, LocaleConfig, LocaleRegistry};
pub use metrics::{LookupMetrics, MetricsReport};
pub use notify::{ChangeChannel, Subscription, SubscriptionId, WeakChannel};
pub use preferences::{
    JsonFilePreferences, MemoryPreferences, PreferenceStore, CURRENT_LANGUAGE_KEY,
};
pub use store::{missing_text, LocaleChanged, LocalizationStore, LocalizationTable, TextEntry};
pub use validator::{TableValidator, ValidationReport};
