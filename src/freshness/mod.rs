//! Freshness detection: blake3 content hashes for in-memory sources.

mod hash;

pub use hash::{ContentHash, hash_str};
