//! Localization table quality checks.
//!
//! Nothing here affects lookups; the report is for authoring tools and
//! startup diagnostics.

use crate::i18n::locale::Locale;
use crate::i18n::store::LocalizationTable;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Validation report containing errors and warnings about a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Problems that make some text unreachable
    pub errors: Vec<String>,

    /// Gaps and inconsistencies worth fixing
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for localization tables.
pub struct TableValidator;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

impl TableValidator {
    /// Check `table`, comparing interpolation placeholders against
    /// `reference`.
    ///
    /// - Duplicate keys are errors (the earlier rows are unreachable).
    /// - Cells for locales without a column, empty cells, and `{name}`
    ///   placeholder sets that differ from the reference locale are
    ///   warnings.
    ///
    /// Messages are ordered by key, then by the table's locale order.
    pub fn validate(table: &LocalizationTable, reference: &Locale) -> ValidationReport {
        let mut report = ValidationReport::new();

        let duplicates: BTreeSet<&String> = table.duplicate_keys().iter().collect();
        for key in duplicates {
            report
                .errors
                .push(format!("Duplicate key '{}': only the last row is used", key));
        }

        for key in table.keys() {
            let Some(entry) = table.entry(key) else {
                continue;
            };

            let reference_placeholders = entry
                .get(reference)
                .filter(|text| !entry.is_synthesized(reference) && !text.is_empty())
                .map(Self::extract_placeholders);

            for locale in table.locales() {
                if entry.is_synthesized(locale) {
                    report
                        .warnings
                        .push(format!("Key '{}' has no column for {}", key, locale));
                    continue;
                }

                let text = entry.get(locale).unwrap_or_default();
                if text.is_empty() {
                    report
                        .warnings
                        .push(format!("Key '{}' is empty for {}", key, locale));
                    continue;
                }

                if locale == reference {
                    continue;
                }
                if let Some(expected) = &reference_placeholders {
                    let actual = Self::extract_placeholders(text);
                    if &actual != expected {
                        report.warnings.push(format!(
                            "Placeholder mismatch for '{}' in {}: {} has {:?}, {} has {:?}",
                            key, locale, reference, expected, locale, actual
                        ));
                    }
                }
            }
        }

        report
    }

    /// Extract `{name}` interpolation placeholders.
    fn extract_placeholders(text: &str) -> BTreeSet<String> {
        let regex = PLACEHOLDER_REGEX
            .get_or_init(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("placeholder regex is valid"));

        regex
            .captures_iter(text)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
            .collect()
    }
}
