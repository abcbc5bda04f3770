//! Locale identifiers and the registry of declared locales.
//!
//! Locales use their programmatic form (`zh_CN`) everywhere in code and in
//! persisted preferences. The localization table names its columns with the
//! hyphenated form (`zh-CN`); [`Locale::column_name`] and
//! [`Locale::from_column`] convert between the two.

use crate::error::LocaleError;
use regex::Regex;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::warn;

static LOCALE_REGEX: OnceLock<Regex> = OnceLock::new();

/// A validated locale identifier, e.g. `zh_CN`.
///
/// The set of locales is open: any well-formed identifier can be
/// constructed, whether or not a registry declares it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale {
    id: Cow<'static, str>,
}

impl Locale {
    /// Simplified Chinese. The compiled-in default.
    pub const ZH_CN: Locale = Locale {
        id: Cow::Borrowed("zh_CN"),
    };

    /// US English.
    pub const EN_US: Locale = Locale {
        id: Cow::Borrowed("en_US"),
    };

    /// Japanese.
    pub const JA_JP: Locale = Locale {
        id: Cow::Borrowed("ja_JP"),
    };

    /// Parse a locale identifier in either `zh_CN` or `zh-CN` form.
    ///
    /// Surrounding whitespace is ignored. Hyphens are normalized to
    /// underscores.
    pub fn parse(raw: &str) -> Result<Locale, LocaleError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(LocaleError::Empty);
        }

        let regex = LOCALE_REGEX.get_or_init(|| {
            Regex::new(r"^[A-Za-z]{2,3}([_-][A-Za-z0-9]{2,8})*$").expect("locale regex is valid")
        });
        if !regex.is_match(raw) {
            return Err(LocaleError::Invalid(raw.to_string()));
        }

        Ok(Locale {
            id: Cow::Owned(raw.replace('-', "_")),
        })
    }

    /// Interpret a localization table column header as a locale.
    pub fn from_column(column: &str) -> Result<Locale, LocaleError> {
        Self::parse(column)
    }

    /// Programmatic identifier, e.g. `zh_CN`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Column header used by the localization table, e.g. `zh-CN`.
    pub fn column_name(&self) -> String {
        self.id.replace('_', "-")
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::parse(s)
    }
}

/// Metadata for a declared locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleConfig {
    pub locale: Locale,

    /// English name (e.g., "Japanese")
    pub name: String,

    /// Name in the locale itself (e.g., "日本語")
    pub native_name: String,

    /// Whether this is the fallback locale when no preference is stored
    pub is_default: bool,
}

impl LocaleConfig {
    pub fn new(locale: Locale, name: impl Into<String>, native_name: impl Into<String>) -> Self {
        Self {
            locale,
            name: name.into(),
            native_name: native_name.into(),
            is_default: false,
        }
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }
}

/// The locales an application declares up front.
///
/// Every declared locale gets a cell for every key when the localization
/// table is loaded, even if the table has no column for it. Exactly one
/// entry is the default.
#[derive(Debug, Clone)]
pub struct LocaleRegistry {
    locales: Vec<LocaleConfig>,
}

impl LocaleRegistry {
    /// Build a registry, enforcing a single default.
    ///
    /// If no entry is flagged, the first becomes the default. If several
    /// are flagged, only the first keeps the flag. An empty list yields a
    /// registry holding just [`Locale::ZH_CN`].
    pub fn new(locales: Vec<LocaleConfig>) -> Self {
        let mut locales = if locales.is_empty() {
            vec![LocaleConfig::new(Locale::ZH_CN, "Simplified Chinese", "简体中文")]
        } else {
            locales
        };

        let mut seen_default = false;
        for config in &mut locales {
            if config.is_default {
                if seen_default {
                    warn!(
                        "Locale {} is also flagged as default; keeping the first",
                        config.locale
                    );
                    config.is_default = false;
                }
                seen_default = true;
            }
        }
        if !seen_default {
            locales[0].is_default = true;
        }

        Self { locales }
    }

    /// The locales this application ships with.
    pub fn builtin() -> Self {
        Self::new(builtin_locales())
    }

    pub fn get(&self, locale: &Locale) -> Option<&LocaleConfig> {
        self.locales.iter().find(|config| &config.locale == locale)
    }

    pub fn contains(&self, locale: &Locale) -> bool {
        self.get(locale).is_some()
    }

    /// All declared locales, in declaration order.
    pub fn list(&self) -> &[LocaleConfig] {
        &self.locales
    }

    pub fn locales(&self) -> impl Iterator<Item = &Locale> {
        self.locales.iter().map(|config| &config.locale)
    }

    pub fn default_config(&self) -> &LocaleConfig {
        self.locales
            .iter()
            .find(|config| config.is_default)
            .unwrap_or(&self.locales[0])
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default_config().locale
    }
}

impl Default for LocaleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_locales() -> Vec<LocaleConfig> {
    vec![
        LocaleConfig::new(Locale::ZH_CN, "Simplified Chinese", "简体中文").as_default(),
        LocaleConfig::new(Locale::EN_US, "English", "English"),
        LocaleConfig::new(Locale::JA_JP, "Japanese", "日本語"),
    ]
}
