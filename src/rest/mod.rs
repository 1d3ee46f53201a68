// REST module exposing the SLP filter over HTTP
pub mod routes;

pub use routes::{filter_and_sort_slp_txs, get_status};
use std::sync::Arc;
use actix_web::{error::JsonPayloadError, web, HttpRequest};
use super::blockchain::classifier::TXIDS_NOT_AN_ARRAY;
use super::blockchain::SlpClassifier;
use super::error::SlpError;
use super::metrics::metrics;

// Application state shared across REST handlers
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<SlpClassifier>, // Classifier with its long-lived cache and blacklist
}

impl AppState {
    pub fn new(classifier: SlpClassifier) -> Self {
        AppState {
            classifier: Arc::new(classifier),
        }
    }
}

// Bodies that are valid JSON but not a request object get the same 422 as a bad txids field
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    match err {
        JsonPayloadError::Deserialize(e) if e.is_data() => SlpError::InvalidInput(TXIDS_NOT_AN_ARRAY.to_string()).into(),
        other => other.into(),
    }
}

// Registers the /slp routes and the metrics endpoint
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(get_status)
        .service(filter_and_sort_slp_txs)
        .route("/metrics", web::get().to(metrics));
}
