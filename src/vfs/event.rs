//! Store change notifications.
//!
//! Every mutation is broadcast to subscribers over unbounded channels.
//! Receivers that were dropped are pruned on the next send.

use crossbeam::channel::{self, Receiver, Sender};

use crate::core::RenderGeneration;

/// What changed in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    Created(String),
    Updated(String),
    Renamed { from: String, to: String },
    Removed(String),
    /// The whole tree was replaced by `import_flat`.
    Replaced,
}

impl StoreChange {
    /// Primary path affected by the change.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Created(p) | Self::Updated(p) | Self::Removed(p) => Some(p),
            Self::Renamed { to, .. } => Some(to),
            Self::Replaced => None,
        }
    }
}

/// A change stamped with the generation it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent {
    pub generation: RenderGeneration,
    pub change: StoreChange,
}

/// Subscriber list.
#[derive(Debug, Default)]
pub(super) struct Notifier {
    subscribers: Vec<Sender<StoreEvent>>,
}

impl Notifier {
    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn emit(&mut self, event: StoreEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
