//! Render generations.
//!
//! A single monotonically increasing counter shared by the file store and the
//! render pipeline. Every store mutation and every render-pass start advances
//! it; a pass is current only while the clock still reads its generation.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Stamp carried by a render pass and by every report that refers to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderGeneration(u64);

impl RenderGeneration {
    #[inline]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RenderGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shared generation counter (cheap to clone, lock-free).
#[derive(Debug, Clone, Default)]
pub struct GenerationClock(Arc<AtomicU64>);

impl GenerationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation.
    #[inline]
    pub fn current(&self) -> RenderGeneration {
        RenderGeneration(self.0.load(Ordering::Acquire))
    }

    /// Advance and return the new generation.
    #[inline]
    pub fn advance(&self) -> RenderGeneration {
        RenderGeneration(self.0.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Advance only if the clock still reads `expected`.
    ///
    /// Returns `None` when another mutation or pass got there first.
    #[inline]
    pub fn advance_from(&self, expected: RenderGeneration) -> Option<RenderGeneration> {
        self.0
            .compare_exchange(expected.0, expected.0 + 1, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|previous| RenderGeneration(previous + 1))
    }

    /// Whether `generation` is still the latest one.
    #[inline]
    pub fn is_current(&self, generation: RenderGeneration) -> bool {
        self.current() == generation
    }
}
