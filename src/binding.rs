//! Glue between the localization store and presentation code.
//!
//! A view implements [`View`] and is bound with [`LocaleBinding::bind`]. The
//! binding subscribes to locale changes and forwards each one to the view as
//! [`ViewUpdate::LocaleChanged`]; dropping or disposing the binding
//! unsubscribes. Model-layer code reaches configuration and text through
//! [`ModelContext`].

use crate::app_config::DialogConfig;
use crate::i18n::{Locale, LocalizationStore, Subscription, SubscriptionId};
use crate::services::Services;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, warn};

/// What a view is asked to refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewUpdate {
    /// The active locale changed; re-read every localized text.
    LocaleChanged { locale: Locale },
    /// Application data pushed by the view model.
    Business(serde_json::Value),
}

impl ViewUpdate {
    pub fn is_locale_change(&self) -> bool {
        matches!(self, ViewUpdate::LocaleChanged { .. })
    }
}

pub trait View {
    fn update_view(&mut self, update: &ViewUpdate);
}

/// A view bound to locale changes.
///
/// Holds the view weakly; a view dropped elsewhere simply stops receiving
/// updates.
#[must_use = "dropping the binding unsubscribes the view"]
pub struct LocaleBinding<V: View + 'static> {
    view: Weak<RefCell<V>>,
    subscription: Subscription,
}

impl<V: View + 'static> LocaleBinding<V> {
    pub fn bind(store: &LocalizationStore, view: &Rc<RefCell<V>>) -> Self {
        let weak = Rc::downgrade(view);
        let target = weak.clone();
        let subscription = store.subscribe_scoped(move |change| {
            let update = ViewUpdate::LocaleChanged {
                locale: change.current.clone(),
            };
            deliver(&target, &update);
        });
        debug!("Bound view to locale changes ({:?})", subscription.id());

        Self {
            view: weak,
            subscription,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.subscription.id()
    }

    /// Push an update to the bound view directly.
    ///
    /// Returns `false` when the view is gone or currently borrowed.
    pub fn notify(&self, update: &ViewUpdate) -> bool {
        deliver(&self.view, update)
    }

    /// Unsubscribe the view. Equivalent to dropping the binding.
    pub fn dispose(self) {
        debug!("Disposing view binding ({:?})", self.subscription.id());
        self.subscription.unsubscribe();
    }
}

impl<V: View + 'static> std::fmt::Debug for LocaleBinding<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocaleBinding")
            .field("id", &self.subscription.id())
            .field("view_alive", &(self.view.strong_count() > 0))
            .finish()
    }
}

fn deliver<V: View>(view: &Weak<RefCell<V>>, update: &ViewUpdate) -> bool {
    let Some(view) = view.upgrade() else {
        return false;
    };
    let delivered = match view.try_borrow_mut() {
        Ok(mut view) => {
            view.update_view(update);
            true
        }
        Err(_) => {
            // The view triggered this update from inside its own handler.
            warn!("View is busy, skipping update: {:?}", update);
            false
        }
    };
    delivered
}

/// Shortcuts for model-layer code.
#[derive(Debug, Clone, Copy)]
pub struct ModelContext<'a> {
    services: &'a Services,
}

impl<'a> ModelContext<'a> {
    pub fn new(services: &'a Services) -> Self {
        Self { services }
    }

    /// Text for `key` in the active locale.
    pub fn lang_text(&self, key: &str) -> String {
        self.services.localization().text(key)
    }

    pub fn lang_text_in(&self, key: &str, locale: &Locale) -> String {
        self.services.localization().text_in(key, locale)
    }

    pub fn current_locale(&self) -> Locale {
        self.services.localization().current_locale()
    }

    pub fn switch_locale(&self, locale: Locale) -> bool {
        self.services.localization().set_locale(locale)
    }

    pub fn config_text(&self, key: &str) -> String {
        self.services.config().text(key)
    }

    pub fn audio_path(&self, key: &str) -> String {
        self.services.config().audio_path(key)
    }

    pub fn resource_path(&self, key: &str) -> String {
        self.services.config().resource_path(key)
    }

    pub fn dialog(&self) -> DialogConfig {
        self.services.config().dialog()
    }
}
