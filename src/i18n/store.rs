//! Localization store: the key → locale → text table, the active locale,
//! and change notification.
//!
//! # Loading
//!
//! The table source is a CSV whose first header is the key column and whose
//! remaining headers are locale columns in hyphenated form (`zh-CN`). Every
//! locale the store knows about (declared in the registry, or found as a
//! column) gets a cell for every key; a locale with no column gets the
//! missing-text placeholder. A source that cannot be loaded is reported once
//! and leaves an empty table behind.
//!
//! # Lookups
//!
//! [`LocalizationStore::text`] and [`LocalizationStore::text_in`] are total:
//! an unknown key or an absent cell yields `[missing text: <key>]`.

use crate::error::LoadError;
use crate::i18n::csv;
use crate::i18n::locale::{Locale, LocaleConfig, LocaleRegistry};
use crate::i18n::metrics::LookupMetrics;
use crate::i18n::notify::{ChangeChannel, Subscription, SubscriptionId, WeakChannel};
use crate::i18n::preferences::{PreferenceStore, CURRENT_LANGUAGE_KEY};
use crate::resources::ResourceBundle;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap, VecDeque};
use tracing::{debug, error, info, warn};

/// Placeholder returned for a key (or key + locale) with no text.
pub fn missing_text(key: &str) -> String {
    format!("[missing text: {}]", key)
}

/// All texts for one key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextEntry {
    texts: HashMap<Locale, String>,
    synthesized: BTreeSet<Locale>,
}

impl TextEntry {
    pub fn get(&self, locale: &Locale) -> Option<&str> {
        self.texts.get(locale).map(String::as_str)
    }

    /// Whether the cell for `locale` is a placeholder because the source had
    /// no column for it.
    pub fn is_synthesized(&self, locale: &Locale) -> bool {
        self.synthesized.contains(locale)
    }

    /// Locales that hold a real cell (including empty cells).
    pub fn sourced_locales(&self) -> impl Iterator<Item = &Locale> {
        self.texts
            .keys()
            .filter(move |locale| !self.synthesized.contains(*locale))
    }
}

/// Immutable key → [`TextEntry`] table built from one load.
#[derive(Debug, Clone, Default)]
pub struct LocalizationTable {
    entries: HashMap<String, TextEntry>,
    locales: Vec<Locale>,
    duplicate_keys: Vec<String>,
}

impl LocalizationTable {
    /// A table with no keys that still knows the declared locales.
    pub fn empty(registry: &LocaleRegistry) -> Self {
        Self {
            entries: HashMap::new(),
            locales: registry.locales().cloned().collect(),
            duplicate_keys: Vec::new(),
        }
    }

    /// Build a table from CSV text.
    pub fn from_csv(text: &str, registry: &LocaleRegistry) -> Self {
        let parsed = csv::parse(text);
        let mut table = Self::empty(registry);

        let Some((key_column, locale_headers)) = parsed.headers().split_first() else {
            return table;
        };

        // Column index per locale; a repeated locale column resolves to the rightmost.
        let mut columns: HashMap<Locale, usize> = HashMap::new();
        for (offset, header) in locale_headers.iter().enumerate() {
            match Locale::from_column(header) {
                Ok(locale) => {
                    if !table.locales.contains(&locale) {
                        table.locales.push(locale.clone());
                    }
                    columns.insert(locale, offset + 1);
                }
                Err(e) => warn!("Ignoring localization column '{}': {}", header, e),
            }
        }

        for record in parsed.records() {
            let key = record.get_index(0).unwrap_or_default();
            if key.is_empty() {
                warn!("Skipping localization row with empty '{}' cell", key_column);
                continue;
            }

            let mut entry = TextEntry::default();
            for locale in &table.locales {
                match columns.get(locale).and_then(|idx| record.get_index(*idx)) {
                    Some(text) => {
                        entry.texts.insert(locale.clone(), text.to_string());
                    }
                    None => {
                        entry.texts.insert(locale.clone(), missing_text(key));
                        entry.synthesized.insert(locale.clone());
                    }
                }
            }

            if table.entries.insert(key.to_string(), entry).is_some() {
                warn!("Duplicate localization key '{}', later row wins", key);
                table.duplicate_keys.push(key.to_string());
            }
        }

        table
    }

    /// Cell for `key` in `locale`, if the key exists and the locale is known.
    pub fn get(&self, key: &str, locale: &Locale) -> Option<&str> {
        self.entries.get(key).and_then(|entry| entry.get(locale))
    }

    pub fn entry(&self, key: &str) -> Option<&TextEntry> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// All keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Known locales: declared ones first, then columns discovered in the
    /// source in header order.
    pub fn locales(&self) -> &[Locale] {
        &self.locales
    }

    pub fn duplicate_keys(&self) -> &[String] {
        &self.duplicate_keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Payload of a locale change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleChanged {
    pub previous: Locale,
    pub current: Locale,
}

/// Owns the localization table and the active locale.
///
/// Single-threaded: construct it once at startup and share it by reference
/// (or `Rc`) with everything that renders text.
pub struct LocalizationStore {
    table: LocalizationTable,
    registry: LocaleRegistry,
    current: RefCell<Locale>,
    preferences: Box<dyn PreferenceStore>,
    channel: ChangeChannel<LocaleChanged>,
    metrics: LookupMetrics,
    load_error: Option<LoadError>,
    // Changes made while a notification is being delivered.
    pending: RefCell<VecDeque<LocaleChanged>>,
    dispatching: Cell<bool>,
}

/// Marks the store as dispatching; resets it even if a handler panics.
struct DispatchGuard<'a> {
    store: &'a LocalizationStore,
}

impl<'a> DispatchGuard<'a> {
    fn enter(store: &'a LocalizationStore) -> Self {
        store.dispatching.set(true);
        Self { store }
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.store.dispatching.set(false);
        self.store.pending.borrow_mut().clear();
    }
}

impl std::fmt::Debug for LocalizationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalizationStore")
            .field("current", &self.current.borrow())
            .field("keys", &self.table.len())
            .field("locales", &self.table.locales())
            .field("subscribers", &self.channel.len())
            .field("load_error", &self.load_error)
            .finish()
    }
}

impl LocalizationStore {
    /// Load the table at `logical_path` from `bundle`.
    ///
    /// A failed load is logged once and yields a usable store with an empty
    /// table; the error stays available through [`load_error`].
    ///
    /// [`load_error`]: LocalizationStore::load_error
    pub fn load(
        bundle: &dyn ResourceBundle,
        logical_path: &str,
        registry: LocaleRegistry,
        preferences: impl PreferenceStore + 'static,
    ) -> Self {
        match bundle.load_text(logical_path) {
            Ok(text) => Self::from_csv(&text, registry, preferences),
            Err(e) => {
                error!("Localization table unavailable, texts will be placeholders: {}", e);
                let table = LocalizationTable::empty(&registry);
                Self::with_table(table, registry, Box::new(preferences), Some(e))
            }
        }
    }

    /// Build a store from CSV text already in memory.
    pub fn from_csv(
        text: &str,
        registry: LocaleRegistry,
        preferences: impl PreferenceStore + 'static,
    ) -> Self {
        let table = LocalizationTable::from_csv(text, &registry);
        info!(
            "Loaded localization table: {} keys, {} locales",
            table.len(),
            table.locales().len()
        );
        Self::with_table(table, registry, Box::new(preferences), None)
    }

    fn with_table(
        table: LocalizationTable,
        registry: LocaleRegistry,
        preferences: Box<dyn PreferenceStore>,
        load_error: Option<LoadError>,
    ) -> Self {
        let current = resolve_startup_locale(&table, &registry, preferences.as_ref());
        debug!("Active locale at startup: {}", current);

        Self {
            table,
            registry,
            current: RefCell::new(current),
            preferences,
            channel: ChangeChannel::new(),
            metrics: LookupMetrics::new(),
            load_error,
            pending: RefCell::new(VecDeque::new()),
            dispatching: Cell::new(false),
        }
    }

    // ==================== Active locale ====================

    pub fn current_locale(&self) -> Locale {
        self.current.borrow().clone()
    }

    /// Switch the active locale.
    ///
    /// Setting the current locale again does nothing. Otherwise the new
    /// locale is stored, persisted, and every subscriber is notified once
    /// before this returns. Returns whether the locale changed.
    ///
    /// Called from inside a change handler, the switch happens immediately
    /// but its notification is queued behind the one being delivered, so
    /// every subscriber sees changes in the order they were made and the
    /// last change it sees names the active locale.
    ///
    /// A failed preference write is logged; the switch still happens.
    pub fn set_locale(&self, locale: Locale) -> bool {
        let previous = {
            let mut current = self.current.borrow_mut();
            if *current == locale {
                return false;
            }
            std::mem::replace(&mut *current, locale.clone())
        };

        if !self.is_known(&locale) {
            warn!("Locale {} has no texts; lookups will return placeholders", locale);
        }
        if let Err(e) = self.preferences.set(CURRENT_LANGUAGE_KEY, locale.id()) {
            warn!("Failed to persist locale {}: {}", locale, e);
        }
        info!("Locale switched from {} to {}", previous, locale);
        self.metrics.record_locale_switch();

        self.pending.borrow_mut().push_back(LocaleChanged {
            previous,
            current: locale,
        });
        if self.dispatching.get() {
            debug!("Locale change queued behind the notification in progress");
            return true;
        }

        let _guard = DispatchGuard::enter(self);
        while let Some(change) = self.next_pending() {
            let delivered = self.channel.dispatch(&change);
            self.metrics.record_notifications(delivered);
        }
        true
    }

    fn next_pending(&self) -> Option<LocaleChanged> {
        self.pending.borrow_mut().pop_front()
    }

    // ==================== Lookups ====================

    /// Text for `key` in the active locale.
    pub fn text(&self, key: &str) -> String {
        let locale = self.current_locale();
        self.text_in(key, &locale)
    }

    /// Text for `key` in an explicit locale, ignoring the active one.
    pub fn text_in(&self, key: &str, locale: &Locale) -> String {
        match self.table.entry(key) {
            Some(entry) if !entry.is_synthesized(locale) => {
                if let Some(text) = entry.get(locale) {
                    self.metrics.record_hit();
                    return text.to_string();
                }
            }
            _ => {}
        }

        self.metrics.record_miss();
        debug!("No text for key '{}' in locale {}", key, locale);
        missing_text(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.table.contains_key(key)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.table.keys()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    // ==================== Locales ====================

    /// Known locales: declared first, then discovered in the source.
    pub fn locales(&self) -> &[Locale] {
        self.table.locales()
    }

    pub fn is_known(&self, locale: &Locale) -> bool {
        self.table.locales().contains(locale)
    }

    pub fn registry(&self) -> &LocaleRegistry {
        &self.registry
    }

    pub fn locale_config(&self, locale: &Locale) -> Option<&LocaleConfig> {
        self.registry.get(locale)
    }

    // ==================== Notification ====================

    /// Register a locale change handler. Call [`unsubscribe`] on teardown.
    ///
    /// [`unsubscribe`]: LocalizationStore::unsubscribe
    pub fn subscribe(&self, handler: impl Fn(&LocaleChanged) + 'static) -> SubscriptionId {
        self.channel.subscribe(handler)
    }

    /// Register a handler that is removed when the guard drops.
    pub fn subscribe_scoped(&self, handler: impl Fn(&LocaleChanged) + 'static) -> Subscription {
        self.channel.subscribe_scoped(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.channel.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.channel.len()
    }

    /// Weak handle to the change channel, for unsubscribing from inside a
    /// handler. Capturing it in a handler does not keep the channel alive.
    pub fn channel(&self) -> WeakChannel<LocaleChanged> {
        self.channel.downgrade()
    }

    // ==================== Diagnostics ====================

    pub fn table(&self) -> &LocalizationTable {
        &self.table
    }

    pub fn load_error(&self) -> Option<&LoadError> {
        self.load_error.as_ref()
    }

    pub fn metrics(&self) -> &LookupMetrics {
        &self.metrics
    }
}

/// Stored preference if it names a known locale, otherwise the registry
/// default.
fn resolve_startup_locale(
    table: &LocalizationTable,
    registry: &LocaleRegistry,
    preferences: &dyn PreferenceStore,
) -> Locale {
    let default = registry.default_locale().clone();

    let Some(stored) = preferences.get(CURRENT_LANGUAGE_KEY) else {
        return default;
    };

    match Locale::parse(&stored) {
        Ok(locale) if table.locales().contains(&locale) => locale,
        Ok(locale) => {
            warn!("Stored locale {} is not known, using {}", locale, default);
            default
        }
        Err(e) => {
            warn!("Stored locale is unusable ({}), using {}", e, default);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::preferences::MemoryPreferences;
    use crate::resources::{MemoryBundle, LANGUAGE_TABLE_PATH};
    use std::cell::Cell;
    use std::rc::Rc;

    const SAMPLE: &str = "Key,zh-CN,en-US\nLoginSuccess,登录成功,Login OK\nLoginFail,登录失败,Login failed";

    fn sample_store() -> LocalizationStore {
        LocalizationStore::from_csv(SAMPLE, LocaleRegistry::builtin(), MemoryPreferences::new())
    }

    // ==================== Table Tests ====================

    #[test]
    fn test_table_declared_locales_always_present() {
        let table = LocalizationTable::from_csv(SAMPLE, &LocaleRegistry::builtin());
        assert_eq!(table.locales(), [Locale::ZH_CN, Locale::EN_US, Locale::JA_JP]);
        let entry = table.entry("LoginSuccess").expect("key loaded");
        assert_eq!(entry.get(&Locale::ZH_CN), Some("登录成功"));
        assert_eq!(entry.get(&Locale::JA_JP), Some("[missing text: LoginSuccess]"));
        assert!(entry.is_synthesized(&Locale::JA_JP));
        assert!(!entry.is_synthesized(&Locale::EN_US));
    }

    #[test]
    fn test_table_discovers_extra_locale_columns() {
        let table = LocalizationTable::from_csv(
            "Key,zh-CN,fr-FR\nHello,你好,Bonjour",
            &LocaleRegistry::builtin(),
        );
        let fr = Locale::parse("fr_FR").unwrap();
        assert_eq!(table.locales().last(), Some(&fr));
        assert_eq!(table.get("Hello", &fr), Some("Bonjour"));
    }

    #[test]
    fn test_table_ignores_non_locale_columns() {
        let table = LocalizationTable::from_csv(
            "Key,zh-CN,Comment text\nHello,你好,shown on login",
            &LocaleRegistry::builtin(),
        );
        assert_eq!(table.locales().len(), 3);
        assert_eq!(table.get("Hello", &Locale::ZH_CN), Some("你好"));
    }

    #[test]
    fn test_table_skips_empty_keys() {
        let table = LocalizationTable::from_csv(
            "Key,en-US\n,orphan\nReal,text",
            &LocaleRegistry::builtin(),
        );
        assert_eq!(table.keys(), vec!["Real"]);
    }

    #[test]
    fn test_table_duplicate_keys_later_wins() {
        let table = LocalizationTable::from_csv(
            "Key,en-US\nA,first\nA,second",
            &LocaleRegistry::builtin(),
        );
        assert_eq!(table.get("A", &Locale::EN_US), Some("second"));
        assert_eq!(table.duplicate_keys(), ["A"]);
    }

    #[test]
    fn test_table_short_row_yields_empty_text() {
        let table = LocalizationTable::from_csv(
            "Key,zh-CN,en-US\nOnlyChinese,中文",
            &LocaleRegistry::builtin(),
        );
        assert_eq!(table.get("OnlyChinese", &Locale::EN_US), Some(""));
        assert!(!table.entry("OnlyChinese").unwrap().is_synthesized(&Locale::EN_US));
    }

    #[test]
    fn test_table_empty_source() {
        let table = LocalizationTable::from_csv("", &LocaleRegistry::builtin());
        assert!(table.is_empty());
        assert_eq!(table.locales().len(), 3);
    }

    #[test]
    fn test_table_key_column_need_not_be_named_key() {
        let table = LocalizationTable::from_csv("Id,en-US\nA,a", &LocaleRegistry::builtin());
        assert_eq!(table.get("A", &Locale::EN_US), Some("a"));
    }

    // ==================== Lookup Tests ====================

    #[test]
    fn test_text_uses_default_locale() {
        let store = sample_store();
        assert_eq!(store.current_locale(), Locale::ZH_CN);
        assert_eq!(store.text("LoginSuccess"), "登录成功");
    }

    #[test]
    fn test_text_in_explicit_locale() {
        let store = sample_store();
        assert_eq!(store.text_in("LoginSuccess", &Locale::EN_US), "Login OK");
        assert_eq!(store.current_locale(), Locale::ZH_CN);
    }

    #[test]
    fn test_text_missing_column_placeholder() {
        let store = sample_store();
        assert_eq!(
            store.text_in("LoginSuccess", &Locale::JA_JP),
            "[missing text: LoginSuccess]"
        );
    }

    #[test]
    fn test_text_unknown_key_is_deterministic() {
        let store = sample_store();
        let first = store.text("NoSuchKey");
        assert_eq!(first, "[missing text: NoSuchKey]");
        assert_eq!(store.text("NoSuchKey"), first);
        for locale in [Locale::ZH_CN, Locale::EN_US, Locale::JA_JP] {
            assert_eq!(store.text_in("NoSuchKey", &locale), first);
        }
    }

    #[test]
    fn test_text_unknown_locale() {
        let store = sample_store();
        let de = Locale::parse("de_DE").unwrap();
        assert_eq!(store.text_in("LoginSuccess", &de), "[missing text: LoginSuccess]");
    }

    #[test]
    fn test_metrics_count_hits_and_misses() {
        let store = sample_store();
        store.text("LoginSuccess");
        store.text_in("LoginSuccess", &Locale::JA_JP);
        store.text("Nope");
        assert_eq!(store.metrics().hits(), 1);
        assert_eq!(store.metrics().misses(), 2);
    }

    // ==================== set_locale Tests ====================

    #[test]
    fn test_set_locale_switches_text() {
        let store = sample_store();
        assert!(store.set_locale(Locale::EN_US));
        assert_eq!(store.text("LoginSuccess"), "Login OK");
    }

    #[test]
    fn test_set_same_locale_is_noop() {
        let store = sample_store();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        store.subscribe(move |_| c.set(c.get() + 1));

        assert!(!store.set_locale(Locale::ZH_CN));
        assert_eq!(count.get(), 0);
        assert_eq!(store.metrics().locale_switches(), 0);
    }

    #[test]
    fn test_set_locale_notifies_each_subscriber_once() {
        let store = sample_store();
        let counts: Vec<Rc<Cell<u32>>> = (0..3).map(|_| Rc::new(Cell::new(0))).collect();
        for count in &counts {
            let c = Rc::clone(count);
            store.subscribe(move |_| c.set(c.get() + 1));
        }

        store.set_locale(Locale::EN_US);
        assert!(counts.iter().all(|c| c.get() == 1));
        assert_eq!(store.metrics().notifications_delivered(), 3);
    }

    #[test]
    fn test_notification_payload_and_ordering() {
        let store = Rc::new(sample_store());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        let weak = Rc::downgrade(&store);
        store.subscribe(move |change| {
            // The new locale is already active when handlers run.
            let text = weak.upgrade().map(|s| s.text("LoginSuccess"));
            sink.borrow_mut().push((change.clone(), text));
        });

        store.set_locale(Locale::EN_US);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0.previous, Locale::ZH_CN);
        assert_eq!(seen[0].0.current, Locale::EN_US);
        assert_eq!(seen[0].1.as_deref(), Some("Login OK"));
    }

    #[test]
    fn test_set_locale_persists() {
        let prefs = MemoryPreferences::new();
        let store = LocalizationStore::from_csv(SAMPLE, LocaleRegistry::builtin(), prefs.clone());
        store.set_locale(Locale::EN_US);
        assert_eq!(prefs.get(CURRENT_LANGUAGE_KEY), Some("en_US".to_string()));
    }

    #[test]
    fn test_unsubscribe_during_dispatch() {
        let store = sample_store();
        let calls = Rc::new(Cell::new(0));
        let own_id: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));

        let channel = store.channel();
        let c = Rc::clone(&calls);
        let slot = Rc::clone(&own_id);
        let id = store.subscribe(move |_| {
            c.set(c.get() + 1);
            if let Some(id) = slot.get() {
                channel.unsubscribe(id);
            }
        });
        own_id.set(Some(id));

        store.set_locale(Locale::EN_US);
        store.set_locale(Locale::JA_JP);
        assert_eq!(calls.get(), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_scoped_subscription() {
        let store = sample_store();
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        let guard = store.subscribe_scoped(move |_| c.set(c.get() + 1));

        store.set_locale(Locale::EN_US);
        drop(guard);
        store.set_locale(Locale::ZH_CN);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_set_locale_from_handler_keeps_order() {
        let store = Rc::new(sample_store());

        let weak = Rc::downgrade(&store);
        let nested = Rc::new(Cell::new(None));
        let nested_result = Rc::clone(&nested);
        store.subscribe(move |change| {
            if change.current == Locale::EN_US {
                if let Some(store) = weak.upgrade() {
                    nested_result.set(Some(store.set_locale(Locale::JA_JP)));
                }
            }
        });

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(move |change| sink.borrow_mut().push(change.current.clone()));

        assert!(store.set_locale(Locale::EN_US));

        assert_eq!(nested.get(), Some(true));
        assert_eq!(store.current_locale(), Locale::JA_JP);
        assert_eq!(*seen.borrow(), vec![Locale::EN_US, Locale::JA_JP]);
        assert_eq!(seen.borrow().last(), Some(&store.current_locale()));
        assert_eq!(store.metrics().locale_switches(), 2);
        assert_eq!(store.metrics().notifications_delivered(), 4);
    }

    #[test]
    fn test_set_locale_after_nested_switch_dispatches_again() {
        let store = Rc::new(sample_store());
        let weak = Rc::downgrade(&store);
        store.subscribe(move |change| {
            if change.current == Locale::EN_US {
                if let Some(store) = weak.upgrade() {
                    store.set_locale(Locale::JA_JP);
                }
            }
        });
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        store.subscribe(move |_| c.set(c.get() + 1));

        store.set_locale(Locale::EN_US);
        store.set_locale(Locale::ZH_CN);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_handler_holding_channel_is_freed_with_store() {
        struct DropFlag(Rc<Cell<bool>>);

        impl DropFlag {
            fn touch(&self) {}
        }

        impl Drop for DropFlag {
            fn drop(&mut self) {
                self.0.set(true);
            }
        }

        let dropped = Rc::new(Cell::new(false));
        {
            let store = sample_store();
            let channel = store.channel();
            let flag = DropFlag(Rc::clone(&dropped));
            let own_id: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));
            let slot = Rc::clone(&own_id);
            let id = store.subscribe(move |change| {
                flag.touch();
                if change.current == Locale::JA_JP {
                    if let Some(id) = slot.get() {
                        channel.unsubscribe(id);
                    }
                }
            });
            own_id.set(Some(id));
            store.set_locale(Locale::EN_US);
            assert!(!dropped.get());
        }

        assert!(dropped.get());
    }

    // ==================== Startup Tests ====================

    #[test]
    fn test_startup_reads_stored_locale() {
        let prefs = MemoryPreferences::new().with(CURRENT_LANGUAGE_KEY, "en_US");
        let store = LocalizationStore::from_csv(SAMPLE, LocaleRegistry::builtin(), prefs);
        assert_eq!(store.current_locale(), Locale::EN_US);
        assert_eq!(store.text("LoginSuccess"), "Login OK");
    }

    #[test]
    fn test_startup_unparseable_stored_locale_falls_back() {
        let prefs = MemoryPreferences::new().with(CURRENT_LANGUAGE_KEY, "not a locale!");
        let store = LocalizationStore::from_csv(SAMPLE, LocaleRegistry::builtin(), prefs);
        assert_eq!(store.current_locale(), Locale::ZH_CN);
    }

    #[test]
    fn test_startup_unknown_stored_locale_falls_back() {
        let prefs = MemoryPreferences::new().with(CURRENT_LANGUAGE_KEY, "ko_KR");
        let store = LocalizationStore::from_csv(SAMPLE, LocaleRegistry::builtin(), prefs);
        assert_eq!(store.current_locale(), Locale::ZH_CN);
    }

    #[test]
    fn test_startup_accepts_discovered_locale() {
        let prefs = MemoryPreferences::new().with(CURRENT_LANGUAGE_KEY, "fr_FR");
        let store = LocalizationStore::from_csv(
            "Key,fr-FR\nHello,Bonjour",
            LocaleRegistry::builtin(),
            prefs,
        );
        assert_eq!(store.current_locale().id(), "fr_FR");
        assert_eq!(store.text("Hello"), "Bonjour");
    }

    #[test]
    fn test_load_missing_source_degrades() {
        let store = LocalizationStore::load(
            &MemoryBundle::new(),
            LANGUAGE_TABLE_PATH,
            LocaleRegistry::builtin(),
            MemoryPreferences::new(),
        );
        assert!(matches!(store.load_error(), Some(LoadError::SourceMissing { .. })));
        assert!(store.is_empty());
        assert_eq!(store.text("LoginSuccess"), "[missing text: LoginSuccess]");
        assert!(store.set_locale(Locale::EN_US));
    }

    #[test]
    fn test_load_from_bundle() {
        let bundle = MemoryBundle::new().with(LANGUAGE_TABLE_PATH, SAMPLE);
        let store = LocalizationStore::load(
            &bundle,
            LANGUAGE_TABLE_PATH,
            LocaleRegistry::builtin(),
            MemoryPreferences::new(),
        );
        assert!(store.load_error().is_none());
        assert_eq!(store.len(), 2);
        assert_eq!(store.keys(), vec!["LoginFail", "LoginSuccess"]);
    }
}
