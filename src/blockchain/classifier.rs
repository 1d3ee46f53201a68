use log::{error, info, warn};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;
use super::blacklist::Blacklist;
use super::cache::ResultCache;
use crate::error::SlpError;
use crate::metrics::{BATCH_PROCESS_TIME, FAILED_BATCHES, NON_SLP_TXS, SLP_TXS};
use crate::models::{ClassificationResult, FilterRequest};
use crate::retry::RetryWrapper;

pub const DEFAULT_CONCURRENCY: usize = 20;
pub(crate) const TXIDS_NOT_AN_ARRAY: &str = "txids input to filterAndSortSlpTxs() must be an array of TXIDs.";

// What one worker reports back to the aggregation point
type Outcome = (String, Result<bool, SlpError>);

// Splits the TXIDs of a block into SLP and non-SLP transactions
#[derive(Clone)]
pub struct SlpClassifier {
    cache: Arc<ResultCache>,
    blacklist: Arc<Blacklist>,
    retry: RetryWrapper,
    concurrency: usize,
}

impl SlpClassifier {
    pub fn new(cache: Arc<ResultCache>, blacklist: Arc<Blacklist>, retry: RetryWrapper, concurrency: usize) -> Self {
        SlpClassifier {
            cache,
            blacklist,
            retry,
            // A pool without workers would never drain
            concurrency: concurrency.max(1),
        }
    }

    // Validates a request body, then partitions its TXIDs
    pub async fn filter_and_sort_slp_txs(&self, request: &FilterRequest) -> Result<ClassificationResult, SlpError> {
        let txids = parse_txids(request.txids.as_ref())?;
        let block_height = parse_block_height(request.block_height.as_ref())?;

        info!("Block {}: {} txids before filtering", block_height, txids.len());
        let start_time = Instant::now();

        let result = self.filter_slp_txs(&txids).await.map_err(|e| {
            FAILED_BATCHES.inc();
            error!("Failed to filter txs of block {}: {}", block_height, e);
            e
        })?;

        BATCH_PROCESS_TIME.observe(start_time.elapsed().as_secs_f64());
        info!(
            "Block {}: {} SLP txs and {} non-SLP txs in {:.2}s",
            block_height,
            result.slp_txs.len(),
            result.non_slp_txs.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(result)
    }

    // Runs every TXID through the worker pool; fails as a whole if any TXID runs out of retries
    pub async fn filter_slp_txs(&self, txids: &[String]) -> Result<ClassificationResult, SlpError> {
        // Duplicate TXIDs would otherwise show up twice in the partition
        let mut seen = HashSet::with_capacity(txids.len());
        let unique: Vec<&String> = txids.iter().filter(|txid| seen.insert(txid.as_str())).collect();
        if unique.len() != txids.len() {
            warn!("Dropped {} duplicate txids", txids.len() - unique.len());
        }
        if unique.is_empty() {
            return Ok(ClassificationResult::default());
        }

        let run_id = Uuid::new_v4();

        // The queue holds every TXID up front, so submission never waits on a worker
        let (job_tx, job_rx) = mpsc::channel::<String>(unique.len());
        for txid in unique.iter() {
            job_tx
                .send((*txid).clone())
                .await
                .map_err(|e| SlpError::WorkerPool(format!("job queue closed: {}", e)))?;
        }
        drop(job_tx);

        let jobs = Arc::new(Mutex::new(job_rx));
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<Outcome>();
        let halted = Arc::new(AtomicBool::new(false));

        let worker_count = self.concurrency.min(unique.len());
        let mut workers = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            workers.push(tokio::spawn(self.clone().run_worker(
                Arc::clone(&jobs),
                outcome_tx.clone(),
                Arc::clone(&halted),
            )));
        }
        // Only the workers hold senders now, so the loop below ends once they all exit
        drop(outcome_tx);

        // Single aggregation point for both output sequences
        let mut result = ClassificationResult::default();
        let mut failure: Option<SlpError> = None;
        while let Some((txid, outcome)) = outcome_rx.recv().await {
            match outcome {
                Ok(true) => result.slp_txs.push(txid),
                Ok(false) => result.non_slp_txs.push(txid),
                Err(e) => {
                    error!("[{}] Giving up on {}: {}", run_id, txid, e);
                    failure.get_or_insert(e);
                }
            }
        }

        // Drain barrier: every worker has returned before the result is used
        for worker in workers {
            worker
                .await
                .map_err(|e| SlpError::WorkerPool(format!("worker task failed: {}", e)))?;
        }

        if let Some(e) = failure {
            return Err(SlpError::ClassificationFailed(Box::new(e)));
        }

        SLP_TXS.inc_by(result.slp_txs.len() as f64);
        NON_SLP_TXS.inc_by(result.non_slp_txs.len() as f64);
        info!("[{}] txs in slpTxs: {}", run_id, result.slp_txs.len());
        Ok(result)
    }

    // Pulls TXIDs off the shared queue until it is empty or another worker has failed
    async fn run_worker(
        self,
        jobs: Arc<Mutex<mpsc::Receiver<String>>>,
        outcomes: mpsc::UnboundedSender<Outcome>,
        halted: Arc<AtomicBool>,
    ) {
        loop {
            // Work already started elsewhere still finishes, but nothing new is picked up
            if halted.load(Ordering::Acquire) {
                break;
            }
            let next = jobs.lock().await.recv().await;
            let Some(txid) = next else { break };

            let outcome = self.classify_tx(txid.clone()).await;
            if outcome.is_err() {
                halted.store(true, Ordering::Release);
            }
            if outcomes.send((txid, outcome)).is_err() {
                break;
            }
        }
    }

    // Resolves one TXID with retries and applies the blacklist override
    async fn classify_tx(&self, txid: String) -> Result<bool, SlpError> {
        let cache = Arc::clone(&self.cache);
        let lookup = move |txid: String| {
            let cache = Arc::clone(&cache);
            async move { cache.get(&txid).await }
        };

        let token_info = self.retry.retry_wrapper(Some(lookup), Some(txid.clone())).await?;

        Ok(match token_info {
            Some(info) if self.blacklist.check_blacklist(&info.token_id) => {
                info!("{} belongs to blacklisted token {}, treating as non-SLP", txid, info.token_id);
                false
            }
            Some(_) => true,
            None => false,
        })
    }
}

// txids must be a JSON array of strings
fn parse_txids(txids: Option<&Value>) -> Result<Vec<String>, SlpError> {
    let invalid = || SlpError::InvalidInput(TXIDS_NOT_AN_ARRAY.to_string());
    let array = txids.and_then(Value::as_array).ok_or_else(invalid)?;
    array
        .iter()
        .map(|txid| txid.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}

// blockHeight must be a positive integer
fn parse_block_height(block_height: Option<&Value>) -> Result<u64, SlpError> {
    match block_height.and_then(Value::as_u64) {
        Some(height) if height > 0 => Ok(height),
        _ => Err(SlpError::InvalidInput(format!(
            "blockHeight input to filterAndSortSlpTxs() must contain a non-zero number representing the block height. Received: {}",
            block_height.map(Value::to_string).unwrap_or_else(|| "undefined".to_string())
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_txids_requires_an_array_of_strings() {
        assert_eq!(parse_txids(Some(&json!(["a", "b"]))).unwrap(), vec!["a", "b"]);
        assert!(parse_txids(Some(&json!([]))).unwrap().is_empty());
        for bad in [json!("string"), json!([1, 2]), json!({"txid": "a"})] {
            let err = parse_txids(Some(&bad)).unwrap_err();
            assert!(err.to_string().contains("must be an array of TXIDs"));
        }
        assert!(parse_txids(None).is_err());
        assert_eq!(
            parse_txids(Some(&json!("string"))).unwrap_err().to_string(),
            "txids input to filterAndSortSlpTxs() must be an array of TXIDs."
        );
    }

    #[test]
    fn parse_block_height_rejects_zero_and_non_numbers() {
        assert_eq!(parse_block_height(Some(&json!(543413))).unwrap(), 543413);
        for bad in [json!(0), json!(-5), json!("543413"), json!(1.5), Value::Null] {
            let err = parse_block_height(Some(&bad)).unwrap_err();
            assert!(err.to_string().contains("block height"));
        }
        let err = parse_block_height(None).unwrap_err();
        assert!(err.to_string().ends_with("Received: undefined"));
        assert!(err
            .to_string()
            .starts_with("blockHeight input to filterAndSortSlpTxs() must contain a non-zero number representing the block height."));
    }
}
