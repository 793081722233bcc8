//! Configuration section definitions.
//!
//! | Module    | TOML Section | Purpose                               |
//! |-----------|--------------|---------------------------------------|
//! | `preview` | `[preview]`  | Entry, import alias, probe order      |
//! | `cdn`     | `[cdn]`      | Package CDN and version pins          |
//! | `serve`   | `[serve]`    | Preview server                        |

mod cdn;
mod preview;
mod serve;

pub use cdn::CdnConfig;
pub use preview::PreviewConfig;
pub use serve::ServeConfig;
