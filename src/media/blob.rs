use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Opaque handle to a registered blob, e.g. `blob:dubframe/3`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlobUrl(String);

impl BlobUrl {
    /// URL text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlobUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable bytes plus their MIME type.
#[derive(Clone, Debug)]
pub struct Blob {
    /// Content MIME type.
    pub mime: String,
    /// Content bytes.
    pub bytes: Arc<[u8]>,
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    live: BTreeMap<BlobUrl, Blob>,
}

/// Shared registry of live blob URLs.
///
/// Clones share the same registry. Every URL handed out must be revoked by its owner once the
/// element playing it is replaced or torn down; [`BlobStore::live_count`] exposes leaks.
#[derive(Clone, Debug, Default)]
pub struct BlobStore {
    inner: Arc<Mutex<Registry>>,
}

impl BlobStore {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register bytes and return a fresh URL for them.
    pub fn create(&self, bytes: impl Into<Arc<[u8]>>, mime: impl Into<String>) -> BlobUrl {
        let mut reg = self.lock();
        reg.next_id += 1;
        let url = BlobUrl(format!("blob:dubframe/{}", reg.next_id));
        reg.live.insert(
            url.clone(),
            Blob {
                mime: mime.into(),
                bytes: bytes.into(),
            },
        );
        tracing::trace!(url = %url, "blob url created");
        url
    }

    /// Resolve a live URL.
    pub fn get(&self, url: &BlobUrl) -> Option<Blob> {
        self.lock().live.get(url).cloned()
    }

    /// Release a URL. Returns `false` when it was already released.
    pub fn revoke(&self, url: &BlobUrl) -> bool {
        let released = self.lock().live.remove(url).is_some();
        if released {
            tracing::trace!(url = %url, "blob url revoked");
        }
        released
    }

    /// Number of URLs that have not been revoked.
    pub fn live_count(&self) -> usize {
        self.lock().live.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/blob.rs"]
mod tests;
