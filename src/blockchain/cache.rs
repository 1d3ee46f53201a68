use log::{debug, warn};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use super::source::TokenInfoSource;
use crate::error::SlpError;
use crate::metrics::{CACHE_HITS, CACHE_MISSES};
use crate::models::TokenInfo;

pub const DEFAULT_CAPACITY: usize = 100_000;
// A checkpoint is logged every this many accesses
const CHECKPOINT_INTERVAL: u64 = 100;
// Past this many accesses the cache is dropped wholesale and the counter restarts
const RESET_THRESHOLD: u64 = 1_000_000;

struct CacheState {
    entries: LruCache<String, Option<TokenInfo>>,
    access_count: u64,
}

impl CacheState {
    // Counts one successful get and applies the checkpoint and reset rules
    fn record_access(&mut self) {
        self.access_count += 1;
        if self.access_count > RESET_THRESHOLD {
            warn!(
                "Token info cache passed {} accesses, clearing {} entries",
                RESET_THRESHOLD,
                self.entries.len()
            );
            self.entries.clear();
            self.access_count = 0;
        } else if self.access_count % CHECKPOINT_INTERVAL == 0 {
            debug!(
                "Token info cache checkpoint: {} accesses, {} entries",
                self.access_count,
                self.entries.len()
            );
        }
    }
}

// Memoizes token info lookups by TXID, bounded by an LRU capacity
pub struct ResultCache {
    source: Arc<dyn TokenInfoSource>,
    state: Mutex<CacheState>,
}

impl ResultCache {
    pub fn new(source: Arc<dyn TokenInfoSource>, capacity: usize) -> Self {
        // A zero capacity would make every lookup a miss, so it is clamped to one entry
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        ResultCache {
            source,
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                access_count: 0,
            }),
        }
    }

    // Returns the cached token info for txid, asking the source on a miss
    pub async fn get(&self, txid: &str) -> Result<Option<TokenInfo>, SlpError> {
        // The lock is released before the source is awaited
        {
            let mut state = self.state.lock();
            if let Some(hit) = state.entries.get(txid).cloned() {
                CACHE_HITS.inc();
                state.record_access();
                return Ok(hit);
            }
        }

        CACHE_MISSES.inc();
        let info = self.source.get_token_info(txid).await?;

        let mut state = self.state.lock();
        state.entries.put(txid.to_string(), info.clone());
        state.record_access();
        Ok(info)
    }

    pub fn put(&self, key: &str, value: Option<TokenInfo>) -> Result<(), SlpError> {
        if key.trim().is_empty() {
            return Err(SlpError::InvalidKey);
        }
        self.state.lock().entries.put(key.to_string(), value);
        Ok(())
    }

    pub fn delete(&self, key: &str) {
        self.state.lock().entries.pop(key);
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn access_count(&self) -> u64 {
        self.state.lock().access_count
    }
}
