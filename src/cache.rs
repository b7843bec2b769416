//! Content-addressed memo of transform results
//!
//! Keys are the blake3 hash of the source, the file identity and every option
//! that affects output, so a hit is always byte-identical to a fresh compile.
//! Failures are cached too.
//!
//! The cache holds at most `capacity` entries. Inserting into a full cache
//! drops every entry first, so memory stays bounded for long-lived watchers.

use std::sync::{Arc, PoisonError, RwLock};

use rustc_hash::FxHashMap;
use tracing::debug;

use common::{Diagnostic, TransformOptions};

use crate::{transform_internal, TransformOutput};

pub type CachedResult = Arc<Result<TransformOutput, Diagnostic>>;

/// Entry limit used by [`TransformCache::new`]
pub const DEFAULT_CAPACITY: usize = 1024;

pub struct TransformCache {
    entries: RwLock<FxHashMap<blake3::Hash, CachedResult>>,
    capacity: usize,
}

impl Default for TransformCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl TransformCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache holding at most `capacity` results (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::default(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn transform(&self, source: &str, options: &TransformOptions) -> CachedResult {
        let key = cache_key(source, options);
        if let Some(hit) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            debug!(file = options.filename, "cache hit");
            return Arc::clone(hit);
        }

        debug!(file = options.filename, "cache miss");
        let result = Arc::new(transform_internal(source, options));
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            debug!(entries = entries.len(), "cache full, evicting");
            entries.clear();
        }
        entries.entry(key).or_insert_with(|| Arc::clone(&result));
        result
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

fn cache_key(source: &str, options: &TransformOptions) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(options.fingerprint().as_bytes());
    hasher.update(&[0xff]);
    hasher.update(source.as_bytes());
    hasher.finalize()
}
