//! Core types shared across the codebase.

mod generation;
mod state;

pub use generation::{GenerationClock, RenderGeneration};
pub use state::{is_serving, is_shutdown, register_server, set_serving, setup_shutdown_handler};
