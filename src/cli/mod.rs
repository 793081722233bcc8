//! Command-line interface module.

mod args;
pub mod apply;
pub mod check;
pub mod common;
pub mod render;
pub mod serve;

pub use args::{Cli, Commands, PreviewArgs};
