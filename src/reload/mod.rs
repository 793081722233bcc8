//! Live reload for `kiln serve`.
//!
//! ```text
//! FileStore -> render worker -> LiveReload -> host page -> fresh iframe
//!  (events)    (pipeline)      (broadcast)
//! ```
//!
//! # Modules
//!
//! - `message` - messages pushed to the host page (render, error)
//! - `server` - WebSocket server and client registry

pub mod message;
pub mod server;

pub use message::ReloadMessage;
pub use server::LiveReload;
