use std::env;
use std::path::PathBuf;
use std::time::Duration;
use crate::blockchain::cache::DEFAULT_CAPACITY;
use crate::blockchain::classifier::DEFAULT_CONCURRENCY;
use crate::error::SlpError;
use crate::retry::{RetryPolicy, DEFAULT_ATTEMPTS};

// Configuration for the SLP filter service
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_addr: String, // Address for the HTTP server
    pub rpc_url: String, // Full node RPC URL
    pub rpc_user: String, // RPC username
    pub rpc_password: String, // RPC password
    pub concurrency: usize, // Worker pool size per batch
    pub retry: RetryPolicy, // Retry policy for token lookups
    pub cache_capacity: usize, // Max cached token lookups
    pub blacklist: Option<String>, // Comma-separated blacklisted token ids
    pub blacklist_file: Option<PathBuf>, // JSON array of blacklisted token ids
}

impl Config {
    // Loads configuration from environment variables, with defaults for optional fields
    pub fn from_env() -> Result<Self, SlpError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Builds the configuration from any key lookup, so it can be tested without touching the environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SlpError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let initial_ms = parse_or(&lookup, "SLP_RETRY_INITIAL_MS", 1000u64)?;
        let max_ms = parse_or(&lookup, "SLP_RETRY_MAX_MS", 30_000u64)?;

        let config = Config {
            // Optional: bind address (defaults to 0.0.0.0:5010)
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:5010".to_string()),
            // Optional: RPC URL (defaults to a local node)
            rpc_url: lookup("RPC_URL").unwrap_or_else(|| "http://127.0.0.1:8332".to_string()),
            // Required: RPC credentials
            rpc_user: lookup("RPC_USER").unwrap_or_default(),
            rpc_password: lookup("RPC_PASSWORD").unwrap_or_default(),
            concurrency: parse_or(&lookup, "SLP_CONCURRENCY", DEFAULT_CONCURRENCY)?,
            retry: RetryPolicy {
                attempts: parse_or(&lookup, "SLP_RETRY_ATTEMPTS", DEFAULT_ATTEMPTS)?,
                initial_interval: Duration::from_millis(initial_ms),
                max_interval: Duration::from_millis(max_ms),
            },
            cache_capacity: parse_or(&lookup, "CACHE_CAPACITY", DEFAULT_CAPACITY)?,
            blacklist: lookup("SLP_BLACKLIST").filter(|s| !s.trim().is_empty()),
            blacklist_file: lookup("SLP_BLACKLIST_FILE").filter(|s| !s.trim().is_empty()).map(PathBuf::from),
        };

        // Validate required fields
        if config.rpc_url.is_empty() || config.rpc_user.is_empty() || config.rpc_password.is_empty() {
            return Err(SlpError::Config("RPC_URL, RPC_USER and RPC_PASSWORD must be set".to_string()));
        }
        if config.concurrency == 0 {
            return Err(SlpError::Config("SLP_CONCURRENCY must be at least 1".to_string()));
        }

        Ok(config)
    }
}

// Parses an optional numeric setting, rejecting values that are set but unparsable
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, SlpError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| SlpError::Config(format!("{} has invalid value {:?}: {}", key, raw, e))),
        None => Ok(default),
    }
}
