#![allow(dead_code)]

use async_trait::async_trait;
use slpfilter::blockchain::{Blacklist, ResultCache, SlpClassifier, TokenInfoSource};
use slpfilter::retry::{RetryPolicy, RetryWrapper};
use slpfilter::{SlpError, TokenInfo};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// From block 652,276
pub const TXIDS: [&str; 5] = [
    "5d7001c04bfb21a3d45bb084269ce811bf11269bc020eb4146440ebd66057d4a",
    "01b2118775d84a48dec3d31c760fddd8abc44dad6073b26f72d57fbc636d912d",
    "38d5f98dbe7ff2f0205c1a370d5d587d8d98aa65ad60d7026e381e7ba559d5d0",
    "a0b18e78d60b8ead3a5c45a00a964d04c2a8c268d62043fccc644b0efdcf5dd8",
    "e05035a3719559fa4627016fd1edb2cc490092c906a3415394a16b0d0add8178",
];

pub const TOKEN_ID: &str = "a4fb5c2da1aa064e25018a43f9165040071d9e984ba190c222a7f59053af84b2";
pub const SPAM_TOKEN_ID: &str = "dd21be4532d93661e8ffe16db6535af0fb8ee1344d1fef81a193e2b4cfa9fbc9";

pub fn token(token_id: &str) -> TokenInfo {
    TokenInfo {
        token_id: token_id.to_string(),
        token_type: 1,
        tx_type: "SEND".to_string(),
    }
}

// Scripted token info source that counts calls per TXID
#[derive(Default)]
pub struct MockSource {
    tokens: HashMap<String, TokenInfo>,
    // Number of leading calls per TXID that fail before the lookup succeeds
    failures: HashMap<String, usize>,
    always_fail: bool,
    delay: Option<Duration>,
    // Per-TXID delays, taking precedence over the shared one
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
    calls_by_txid: parking_lot::Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    finished: parking_lot::Mutex<HashSet<String>>,
}

impl MockSource {
    pub fn new() -> Self {
        MockSource::default()
    }

    pub fn with_token(mut self, txid: &str, token_id: &str) -> Self {
        self.tokens.insert(txid.to_string(), token(token_id));
        self
    }

    pub fn failing_first(mut self, txid: &str, times: usize) -> Self {
        self.failures.insert(txid.to_string(), times);
        self
    }

    pub fn always_failing(mut self) -> Self {
        self.always_fail = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_delay_for(mut self, txid: &str, delay: Duration) -> Self {
        self.delays.insert(txid.to_string(), delay);
        self
    }

    // Most lookups that were running at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    // Whether a lookup for txid ran to completion, successful or not
    pub fn finished(&self, txid: &str) -> bool {
        self.finished.lock().contains(txid)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, txid: &str) -> usize {
        self.calls_by_txid.lock().get(txid).copied().unwrap_or(0)
    }
}

#[async_trait]
impl TokenInfoSource for MockSource {
    async fn get_token_info(&self, txid: &str) -> Result<Option<TokenInfo>, SlpError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let call_number = {
            let mut by_txid = self.calls_by_txid.lock();
            let count = by_txid.entry(txid.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(txid).copied().or(self.delay) {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.finished.lock().insert(txid.to_string());

        if self.always_fail {
            return Err(SlpError::Provider("test error".to_string()));
        }
        if call_number <= self.failures.get(txid).copied().unwrap_or(0) {
            return Err(SlpError::Provider(format!("node unavailable for {}", txid)));
        }
        Ok(self.tokens.get(txid).cloned())
    }
}

// Retries fast enough for tests
pub fn quick_retry(attempts: u32) -> RetryWrapper {
    RetryWrapper::new(RetryPolicy {
        attempts,
        initial_interval: Duration::from_millis(1),
        max_interval: Duration::from_millis(5),
    })
}

pub fn classifier(source: Arc<MockSource>, blacklist: Blacklist, attempts: u32) -> SlpClassifier {
    classifier_with_workers(source, blacklist, attempts, 20)
}

pub fn classifier_with_workers(
    source: Arc<MockSource>,
    blacklist: Blacklist,
    attempts: u32,
    concurrency: usize,
) -> SlpClassifier {
    let cache = Arc::new(ResultCache::new(source, 1_000));
    SlpClassifier::new(cache, Arc::new(blacklist), quick_retry(attempts), concurrency)
}

pub fn txids() -> Vec<String> {
    TXIDS.iter().map(|s| s.to_string()).collect()
}
