//! Blob hosts: turn compiled module bodies into loadable URLs.
//!
//! Identities are content-derived, so identical bodies share one handle and
//! every `issue` adds a reference that a later `release` drops.
//!
//! - `InlineBlobs` encodes each body as a `data:` URL (self-contained
//!   documents, nothing to serve)
//! - `ServedBlobs` keeps bodies in a shared table served by the dev server

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use rustc_hash::FxHashMap;

use crate::freshness::{ContentHash, hash_str};

/// URL path prefix the dev server serves module blobs from.
pub const BLOB_ROUTE: &str = "/__kiln/blob/";

/// Content-derived identity of one module body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlobId(ContentHash);

impl BlobId {
    /// Identity of an arbitrary body.
    pub fn of(body: &str) -> Self {
        Self(hash_str(body))
    }

    /// Parse the hex form used in served URLs.
    pub fn from_hex(hex: &str) -> Option<Self> {
        ContentHash::from_hex(hex).map(Self)
    }

    pub fn to_hex(self) -> String {
        self.0.to_hex()
    }
}

impl From<ContentHash> for BlobId {
    fn from(hash: ContentHash) -> Self {
        Self(hash)
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:{}", self.0)
    }
}

/// Issues and releases module handles.
pub trait BlobHost: Send {
    /// Make `body` loadable and return its URL. Adds one reference.
    fn issue(&mut self, id: BlobId, body: &Arc<str>) -> String;

    /// Drop one reference. The body is freed once none remain.
    fn release(&mut self, id: BlobId);

    /// Number of distinct bodies currently held.
    fn live(&self) -> usize;
}

// =============================================================================
// Inline
// =============================================================================

/// `data:text/javascript` URLs; the "blob" lives inside the document.
#[derive(Debug, Default)]
pub struct InlineBlobs {
    refs: FxHashMap<BlobId, usize>,
}

impl InlineBlobs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobHost for InlineBlobs {
    fn issue(&mut self, id: BlobId, body: &Arc<str>) -> String {
        *self.refs.entry(id).or_default() += 1;
        data_url(body)
    }

    fn release(&mut self, id: BlobId) {
        release_ref(&mut self.refs, id);
    }

    fn live(&self) -> usize {
        self.refs.len()
    }
}

/// Percent-encoded `data:` URL for a JavaScript module body.
pub fn data_url(body: &str) -> String {
    format!(
        "data:text/javascript;charset=utf-8,{}",
        utf8_percent_encode(body, NON_ALPHANUMERIC)
    )
}

// =============================================================================
// Served
// =============================================================================

/// Shared body table, read by HTTP handlers.
pub type BlobTable = Arc<DashMap<BlobId, Arc<str>>>;

/// Bodies served from `BLOB_ROUTE` by the dev server.
#[derive(Debug, Default)]
pub struct ServedBlobs {
    table: BlobTable,
    refs: FxHashMap<BlobId, usize>,
}

impl ServedBlobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for request handlers.
    pub fn table(&self) -> BlobTable {
        Arc::clone(&self.table)
    }

    /// URL a served blob is reachable at.
    pub fn url(id: BlobId) -> String {
        format!("{BLOB_ROUTE}{}.js", id.to_hex())
    }
}

impl BlobHost for ServedBlobs {
    fn issue(&mut self, id: BlobId, body: &Arc<str>) -> String {
        let count = self.refs.entry(id).or_default();
        if *count == 0 {
            self.table.insert(id, Arc::clone(body));
        }
        *count += 1;
        Self::url(id)
    }

    fn release(&mut self, id: BlobId) {
        if release_ref(&mut self.refs, id) {
            self.table.remove(&id);
        }
    }

    fn live(&self) -> usize {
        self.table.len()
    }
}

/// Decrement a refcount; `true` when it reached zero and was removed.
fn release_ref(refs: &mut FxHashMap<BlobId, usize>, id: BlobId) -> bool {
    let Some(count) = refs.get_mut(&id) else {
        return false;
    };
    *count -= 1;
    if *count == 0 {
        refs.remove(&id);
        return true;
    }
    false
}

/// Look up a served blob by its URL file name (`<hex>.js`).
pub fn lookup(table: &BlobTable, file: &str) -> Option<Arc<str>> {
    let id = BlobId::from_hex(file.strip_suffix(".js").unwrap_or(file))?;
    table.get(&id).map(|body| Arc::clone(body.value()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(text: &str) -> (BlobId, Arc<str>) {
        (BlobId::of(text), Arc::from(text))
    }

    #[test]
    fn test_data_url_is_encoded() {
        let url = data_url("export default 1 < 2;");
        assert!(url.starts_with("data:text/javascript;charset=utf-8,"));
        assert!(!url.contains(' '));
        assert!(!url.contains('<'));
    }

    #[test]
    fn test_served_refcounting() {
        let mut host = ServedBlobs::new();
        let (id, text) = body("export const a = 1;");

        let url = host.issue(id, &text);
        host.issue(id, &text);
        assert_eq!(host.live(), 1);

        let file = url.strip_prefix(BLOB_ROUTE).unwrap();
        assert_eq!(lookup(&host.table(), file).as_deref(), Some("export const a = 1;"));

        host.release(id);
        assert_eq!(host.live(), 1);
        host.release(id);
        assert_eq!(host.live(), 0);
        assert!(lookup(&host.table(), file).is_none());
    }

    #[test]
    fn test_inline_tracks_live_handles() {
        let mut host = InlineBlobs::new();
        let (a, a_body) = body("a");
        let (b, b_body) = body("b");
        host.issue(a, &a_body);
        host.issue(b, &b_body);
        assert_eq!(host.live(), 2);
        host.release(a);
        host.release(a);
        assert_eq!(host.live(), 1);
    }
}
