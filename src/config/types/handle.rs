//! Global config handle.
//!
//! `arc-swap` gives lock-free reads from request handlers and the render
//! worker.

use crate::config::KilnConfig;
use arc_swap::ArcSwap;
use std::sync::{Arc, LazyLock};

/// Global config storage.
pub static CONFIG: LazyLock<ArcSwap<KilnConfig>> = LazyLock::new(|| ArcSwap::from_pointee(KilnConfig::default()));

#[inline]
pub fn cfg() -> Arc<KilnConfig> {
    CONFIG.load_full()
}

#[inline]
pub fn init_config(config: KilnConfig) -> Arc<KilnConfig> {
    let arc = Arc::new(config);
    CONFIG.store(Arc::clone(&arc));
    arc
}
