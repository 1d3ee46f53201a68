use serde::{Deserialize, Serialize};
use serde_json::Value;

// Token metadata for a transaction carrying an SLP OP_RETURN envelope
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub token_id: String,
    pub token_type: u16,
    pub tx_type: String, // GENESIS, MINT or SEND
}

// Partition of a batch of TXIDs into token and non-token transactions
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub slp_txs: Vec<String>,
    pub non_slp_txs: Vec<String>,
}

impl ClassificationResult {
    // Total number of TXIDs across both sides of the partition
    pub fn len(&self) -> usize {
        self.slp_txs.len() + self.non_slp_txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Body of a filter request, kept loosely typed so malformed input can be reported precisely
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    #[serde(default)]
    pub txids: Option<Value>,
    #[serde(default)]
    pub block_height: Option<Value>,
}

impl FilterRequest {
    // Builds a well-formed request, used by callers that already hold typed input
    pub fn new(txids: Vec<String>, block_height: u64) -> Self {
        FilterRequest {
            txids: Some(Value::from(txids)),
            block_height: Some(Value::from(block_height)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AdapterStatus {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: AdapterStatus,
}
