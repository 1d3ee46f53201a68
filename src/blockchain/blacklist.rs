use dashmap::DashSet;
use lazy_static::lazy_static;
use log::{info, warn};
use regex::Regex;
use std::fs;
use std::path::Path;
use crate::error::SlpError;

lazy_static! {
    // Token ids are the 32-byte genesis txid in hex
    static ref TOKEN_ID: Regex = Regex::new(r"^[0-9a-fA-F]{64}$").unwrap();
}

// Token ids whose transactions are always reported as non-SLP
#[derive(Debug, Default)]
pub struct Blacklist {
    tokens: DashSet<String>,
}

impl Blacklist {
    pub fn new<I, S>(token_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let blacklist = Blacklist::default();
        for token_id in token_ids {
            blacklist.add(token_id.as_ref());
        }
        blacklist
    }

    // Parses a comma-separated list of token ids, as used by SLP_BLACKLIST
    pub fn from_list(list: &str) -> Self {
        let blacklist = Blacklist::default();
        blacklist.add_list(list);
        blacklist
    }

    // Loads a JSON file holding an array of token ids
    pub fn from_file(path: &Path) -> Result<Self, SlpError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| SlpError::Config(format!("Cannot read blacklist {}: {}", path.display(), e)))?;
        let token_ids: Vec<String> = serde_json::from_str(&contents)
            .map_err(|e| SlpError::Config(format!("Blacklist {} must be a JSON array of token ids: {}", path.display(), e)))?;
        let blacklist = Blacklist::new(token_ids);
        info!("Loaded {} blacklisted tokens from {}", blacklist.len(), path.display());
        Ok(blacklist)
    }

    // Entries are stored lower-case, so lookups are case-insensitive like add and remove
    pub fn check_blacklist(&self, token_id: &str) -> bool {
        if token_id.bytes().any(|b| b.is_ascii_uppercase()) {
            self.tokens.contains(&token_id.to_ascii_lowercase())
        } else {
            self.tokens.contains(token_id)
        }
    }

    // Adds a token id; returns false if it is malformed or already present
    pub fn add(&self, token_id: &str) -> bool {
        if !TOKEN_ID.is_match(token_id) {
            warn!("Ignoring malformed blacklist token id: {}", token_id);
            return false;
        }
        self.tokens.insert(token_id.to_lowercase())
    }

    // Adds every id of a comma-separated list, returning how many were new
    pub fn add_list(&self, list: &str) -> usize {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter(|token_id| self.add(token_id))
            .count()
    }

    pub fn remove(&self, token_id: &str) -> bool {
        self.tokens.remove(&token_id.to_lowercase()).is_some()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
