//! In-memory cache of temporary object-access URLs.
//!
//! Explicitly constructed and handed to [`crate::AttachmentRepo`] rather
//! than living as a module-level singleton, so tests and per-session scopes
//! get their own instance.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use cowave_backend::Backend;
use cowave_types::DataResult;
use tracing::debug;

use crate::backend_error;

pub const DEFAULT_TTL_SECS: u32 = 600;

/// Safety margin against clock skew and the request/verify race: entries are
/// stored with this much shaved off the ttl, and are only reused while their
/// expiry is still at least this far away.
const MARGIN: Duration = Duration::from_secs(5);

const DEFAULT_CAPACITY: usize = 512;

struct Entry {
    url: String,
    expires_at: Instant,
}

/// Maps `bucket:path` to a signed URL until shortly before it expires.
/// Clones share the same cache.
#[derive(Clone)]
pub struct SignedUrlCache {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    capacity: usize,
}

impl Default for SignedUrlCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SignedUrlCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Returns a usable signed URL for the object, signing only when the
    /// cached one is missing or about to expire. Failures are never cached.
    pub async fn get_or_sign<B: Backend>(
        &self,
        backend: &B,
        bucket: &str,
        path: &str,
        ttl_secs: u32,
    ) -> DataResult<String> {
        let key = format!("{bucket}:{path}");

        if let Some(url) = self.fresh(&key) {
            return Ok(url);
        }

        let url = backend
            .create_signed_url(bucket, path, ttl_secs)
            .await
            .map_err(|e| backend_error("fetching the attachment link", e))?;

        let expires_at = Instant::now() + Duration::from_secs(u64::from(ttl_secs)).saturating_sub(MARGIN);
        let mut entries = self.entries.lock().expect("url cache lock poisoned");
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            evict(&mut entries, self.capacity);
        }
        entries.insert(key, Entry {
            url: url.clone(),
            expires_at,
        });
        Ok(url)
    }

    fn fresh(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().expect("url cache lock poisoned");
        let entry = entries.get(key)?;
        if entry.expires_at > Instant::now() + MARGIN {
            debug!(key, "signed url cache hit");
            Some(entry.url.clone())
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("url cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drops expired entries first; while still at capacity, drops whichever
/// entry is closest to expiry.
fn evict(entries: &mut HashMap<String, Entry>, capacity: usize) {
    let now = Instant::now();
    entries.retain(|_, e| e.expires_at > now);
    while entries.len() >= capacity {
        let Some(key) = entries
            .iter()
            .min_by_key(|(_, e)| e.expires_at)
            .map(|(k, _)| k.clone())
        else {
            break;
        };
        entries.remove(&key);
    }
}
