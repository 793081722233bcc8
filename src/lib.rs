//! Kiln - an in-memory React project store with a sandboxed live preview.
//!
//! A [`FileStore`] holds the project. Every render pass snapshots it,
//! transforms each reachable JSX/TSX module, binds the results into a
//! browser import map and assembles one HTML document that boots the entry
//! component inside a sandboxed frame.
//!
//! ```no_run
//! use kiln::{FileStore, ImportMapBuilder, render_preview};
//!
//! let mut store = FileStore::new();
//! store.create_file("/App.jsx", "export default function App() { return <h1>hi</h1>; }")?;
//! let document = render_preview(&store, ImportMapBuilder::default(), "/App.jsx")?;
//! println!("{}", document.html);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
mod embed;
pub mod freshness;
pub mod importmap;
pub mod logger;
pub mod preview;
pub mod reload;
pub mod resolve;
pub mod sandbox;
pub mod tools;
pub mod transform;
mod utils;
pub mod vfs;

pub use importmap::{ImportMap, ImportMapBuilder, ModuleGraph};
pub use preview::{PreviewDocument, PreviewError, RenderPipeline, render_preview};
pub use tools::{ToolCall, ToolResult};
pub use vfs::{FileStore, FsError};
