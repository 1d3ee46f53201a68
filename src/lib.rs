pub mod config;
pub mod error;
pub mod models;
pub mod blockchain;
pub mod metrics;
pub mod rest;
pub mod retry;
pub mod utils;

pub use config::Config;
pub use error::SlpError;
pub use models::{ClassificationResult, FilterRequest, TokenInfo};
pub use rest::AppState;
