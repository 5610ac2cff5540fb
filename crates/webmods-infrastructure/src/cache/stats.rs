//! Cache counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of cache activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads answered by the local tier
    pub local_hits: u64,
    /// Reads answered by the remote KV
    pub remote_hits: u64,
    /// Reads that found the key nowhere
    pub misses: u64,
    /// Refresh events applied to the local tier
    pub invalidations: u64,
    /// Entries currently held locally
    pub local_entries: u64,
}

#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    local_hits: AtomicU64,
    remote_hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
}

impl CacheCounters {
    pub(crate) fn local_hit(&self) {
        self.local_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn remote_hit(&self) {
        self.remote_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, local_entries: u64) -> CacheStats {
        CacheStats {
            local_hits: self.local_hits.load(Ordering::Relaxed),
            remote_hits: self.remote_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            local_entries,
        }
    }
}
