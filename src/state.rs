use crate::config::AppConfig;
use portable_atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// ── Request counters (lock-free) ──

#[derive(Debug, Default)]
pub struct Counters {
    pub evaluations_served: AtomicU64,
    pub evaluations_rejected: AtomicU64,
}

impl Counters {
    #[inline]
    pub fn record(&self, ok: bool) {
        let counter = if ok {
            &self.evaluations_served
        } else {
            &self.evaluations_rejected
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Shared, read-mostly state for the HTTP handlers.
#[derive(Debug)]
pub struct AppState {
    pub config: AppConfig,
    pub counters: Counters,
}

impl AppState {
    pub fn new(config: AppConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            counters: Counters::default(),
        })
    }
}
