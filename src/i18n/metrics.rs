//! Lookup and notification metrics for a localization store.
//!
//! Each store owns its own counters, so independent stores (and tests) never
//! see each other's numbers.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for a single localization store.
#[derive(Debug, Default)]
pub struct LookupMetrics {
    /// Lookups that found a real cell for the key and locale
    hits: AtomicUsize,

    /// Lookups that fell back to the missing-text placeholder
    misses: AtomicUsize,

    /// Locale changes that actually happened (no-op switches excluded)
    locale_switches: AtomicUsize,

    /// Handler invocations across all change notifications
    notifications_delivered: AtomicUsize,
}

impl LookupMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_locale_switch(&self) {
        self.locale_switches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_notifications(&self, delivered: usize) {
        self.notifications_delivered
            .fetch_add(delivered, Ordering::Relaxed);
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn locale_switches(&self) -> usize {
        self.locale_switches.load(Ordering::Relaxed)
    }

    pub fn notifications_delivered(&self) -> usize {
        self.notifications_delivered.load(Ordering::Relaxed)
    }

    /// Snapshot the counters.
    pub fn report(&self) -> MetricsReport {
        let hits = self.hits();
        let misses = self.misses();
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            lookup_hits: hits,
            lookup_misses: misses,
            hit_rate,
            locale_switches: self.locale_switches(),
            notifications_delivered: self.notifications_delivered(),
        }
    }
}

/// Point-in-time metrics, serializable for diagnostics output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub lookup_hits: usize,

    pub lookup_misses: usize,

    /// Hit rate as a percentage (0-100)
    pub hit_rate: f64,

    pub locale_switches: usize,

    pub notifications_delivered: usize,
}
