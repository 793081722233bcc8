//! Host-side bookkeeping for the mounted sandbox.

use serde::Serialize;

use super::{ErrorKind, SandboxReport};
use crate::core::RenderGeneration;

/// Errors kept per mounted generation.
const MAX_ERRORS: usize = 50;

/// A runtime error captured inside the sandbox. Never fatal to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SandboxRuntimeError {
    pub generation: RenderGeneration,
    pub kind: ErrorKind,
    pub message: String,
    pub stack: Option<String>,
}

/// What a report changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// Report for a generation that is not mounted; ignored.
    Discarded,
    /// Runtime error recorded for the mounted generation.
    Recorded,
    /// The mounted generation confirmed it loaded; older blobs may go.
    Loaded(RenderGeneration),
}

/// Tracks which generation is mounted and what it reported.
#[derive(Debug, Default)]
pub struct SandboxMonitor {
    mounted: Option<RenderGeneration>,
    loaded: bool,
    errors: Vec<SandboxRuntimeError>,
}

impl SandboxMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh sandbox replaced the old one; earlier reports no longer apply.
    pub fn mount(&mut self, generation: RenderGeneration) {
        self.mounted = Some(generation);
        self.loaded = false;
        self.errors.clear();
    }

    #[inline]
    pub fn mounted(&self) -> Option<RenderGeneration> {
        self.mounted
    }

    /// Whether the mounted generation has signalled `ready`.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Errors reported by the mounted generation, oldest first.
    #[inline]
    pub fn errors(&self) -> &[SandboxRuntimeError] {
        &self.errors
    }

    /// Apply a report, discarding anything from another generation.
    pub fn receive(&mut self, report: SandboxReport) -> MonitorOutcome {
        if self.mounted != Some(report.generation()) {
            crate::debug!("sandbox"; "discarding report from {}", report.generation());
            return MonitorOutcome::Discarded;
        }

        match report {
            SandboxReport::Ready { generation } => {
                self.loaded = true;
                MonitorOutcome::Loaded(generation)
            }
            SandboxReport::Error {
                generation,
                kind,
                message,
                stack,
            } => {
                if self.errors.len() < MAX_ERRORS {
                    self.errors.push(SandboxRuntimeError {
                        generation,
                        kind,
                        message,
                        stack,
                    });
                }
                MonitorOutcome::Recorded
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(generation: u64, message: &str) -> SandboxReport {
        SandboxReport::Error {
            generation: RenderGeneration::new(generation),
            kind: ErrorKind::Boundary,
            message: message.into(),
            stack: None,
        }
    }

    #[test]
    fn test_stale_reports_are_discarded() {
        let mut monitor = SandboxMonitor::new();
        monitor.mount(RenderGeneration::new(3));

        assert_eq!(monitor.receive(error(2, "old")), MonitorOutcome::Discarded);
        assert_eq!(
            monitor.receive(SandboxReport::Ready { generation: RenderGeneration::new(2) }),
            MonitorOutcome::Discarded
        );
        assert!(monitor.errors().is_empty());
        assert!(!monitor.is_loaded());
    }

    #[test]
    fn test_current_reports_apply() {
        let mut monitor = SandboxMonitor::new();
        monitor.mount(RenderGeneration::new(3));

        assert_eq!(monitor.receive(error(3, "boom")), MonitorOutcome::Recorded);
        assert_eq!(
            monitor.receive(SandboxReport::Ready { generation: RenderGeneration::new(3) }),
            MonitorOutcome::Loaded(RenderGeneration::new(3))
        );
        assert_eq!(monitor.errors()[0].message, "boom");
        assert!(monitor.is_loaded());
    }

    #[test]
    fn test_remount_clears_errors() {
        let mut monitor = SandboxMonitor::new();
        monitor.mount(RenderGeneration::new(1));
        monitor.receive(error(1, "boom"));
        monitor.mount(RenderGeneration::new(2));
        assert!(monitor.errors().is_empty());
        assert_eq!(monitor.mounted(), Some(RenderGeneration::new(2)));
    }

    #[test]
    fn test_error_flood_is_bounded() {
        let mut monitor = SandboxMonitor::new();
        monitor.mount(RenderGeneration::new(1));
        for i in 0..(MAX_ERRORS + 10) {
            monitor.receive(error(1, &i.to_string()));
        }
        assert_eq!(monitor.errors().len(), MAX_ERRORS);
    }
}
