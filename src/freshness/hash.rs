//! Content hashing using blake3.
//!
//! Source text is hashed to decide whether a cached transform is still
//! valid, and compiled output is hashed to derive stable blob identities.

/// A 256-bit content hash (blake3 output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes.
    #[inline]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }

    /// Short hex prefix used in identifiers and logs.
    pub fn short(self) -> String {
        self.to_hex()[..16].to_string()
    }

    /// Create from hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        let arr: [u8; 32] = bytes.try_into().ok()?;
        Some(Self(arr))
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Display first 16 chars of hex for brevity
        write!(f, "{}", self.short())
    }
}

/// Hash a text buffer.
#[inline]
pub fn hash_str(text: &str) -> ContentHash {
    ContentHash::new(*blake3::hash(text.as_bytes()).as_bytes())
}
