use actix_web::HttpResponse;
use prometheus::{register_counter, register_histogram, Counter, Histogram};

// Defines Prometheus metrics for monitoring the SLP filter
lazy_static::lazy_static! {
    // Counter for TXIDs that landed in slpTxs
    pub static ref SLP_TXS: Counter = register_counter!(
        "slpfilter_slp_txs_total",
        "Total transactions classified as SLP"
    ).unwrap();

    // Counter for TXIDs that landed in nonSlpTxs, including blacklisted tokens
    pub static ref NON_SLP_TXS: Counter = register_counter!(
        "slpfilter_non_slp_txs_total",
        "Total transactions classified as non-SLP"
    ).unwrap();

    pub static ref CACHE_HITS: Counter = register_counter!(
        "slpfilter_cache_hits_total",
        "Token info lookups answered from the cache"
    ).unwrap();

    pub static ref CACHE_MISSES: Counter = register_counter!(
        "slpfilter_cache_misses_total",
        "Token info lookups forwarded to the full node"
    ).unwrap();

    // Counter for failed lookup attempts that were retried
    pub static ref RETRIED_ATTEMPTS: Counter = register_counter!(
        "slpfilter_retried_attempts_total",
        "Failed attempts that were scheduled for a retry"
    ).unwrap();

    pub static ref FAILED_BATCHES: Counter = register_counter!(
        "slpfilter_failed_batches_total",
        "Batches discarded because a TXID exhausted its retries"
    ).unwrap();

    // Histogram for measuring batch classification time in seconds
    pub static ref BATCH_PROCESS_TIME: Histogram = register_histogram!(
        "slpfilter_batch_process_seconds",
        "Batch classification time in seconds"
    ).unwrap();
}

// Handles GET /metrics requests to expose Prometheus metrics
pub async fn metrics() -> HttpResponse {
    let encoder = prometheus::TextEncoder::new();
    let metric_families = prometheus::gather();
    // Encode to text, defaulting to empty if encoding fails
    let encoded = encoder.encode_to_string(&metric_families).unwrap_or_default();
    HttpResponse::Ok().body(encoded)
}
