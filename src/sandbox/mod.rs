//! The sandboxed preview frame, seen from the host.
//!
//! The preview document runs in an `<iframe sandbox="allow-scripts">` with
//! an opaque origin. It talks back only through `postMessage`, which the
//! host page relays as `SandboxReport`s. Runtime errors raised there are
//! recorded per generation and never affect the store or the pipeline.
//!
//! # Module Structure
//!
//! - `report` - messages posted by the frame
//! - `monitor` - mounted generation and captured errors
//! - `host` - the host page embedding the frame

mod host;
mod monitor;
mod report;

pub use host::host_page;
pub use monitor::{MonitorOutcome, SandboxMonitor, SandboxRuntimeError};
pub use report::{ErrorKind, SandboxReport};
