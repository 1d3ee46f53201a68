use async_trait::async_trait;
use bitcoinsv_rpc::{Auth, Client as RpcClient, RpcApi};
use log::{debug, info};
use serde_json::Value;
use std::io::Cursor;
use std::sync::Arc;
use sv::messages::Tx;
use sv::util::Serializable;
use crate::error::SlpError;
use crate::models::TokenInfo;
use crate::utils::slp_token_info;

// Anything that can tell whether a TXID is a token transaction. Lookups must be idempotent.
#[async_trait]
pub trait TokenInfoSource: Send + Sync {
    // Ok(None) means the transaction is not a token transaction
    async fn get_token_info(&self, txid: &str) -> Result<Option<TokenInfo>, SlpError>;
}

// Token info read from raw transactions served by a full node over JSON-RPC
pub struct RpcTokenInfoSource {
    rpc: Arc<RpcClient>,
}

impl RpcTokenInfoSource {
    pub fn new(rpc_url: &str, rpc_user: &str, rpc_password: &str) -> Result<Self, SlpError> {
        let rpc = RpcClient::new(
            rpc_url,
            Auth::UserPass(rpc_user.to_string(), rpc_password.to_string()),
            None,
        )
        .map_err(|e| SlpError::Config(format!("Cannot create RPC client for {}: {}", rpc_url, e)))?;
        info!("Using full node RPC at {}", rpc_url);
        Ok(RpcTokenInfoSource { rpc: Arc::new(rpc) })
    }

    // Fetches and decodes a raw transaction; blocking, so callers run it off the async runtime
    fn fetch_tx(rpc: &RpcClient, txid: &str) -> Result<Tx, SlpError> {
        let raw: Value = rpc
            .call("getrawtransaction", &[txid.into(), 0.into()])
            .map_err(|e| SlpError::Provider(e.to_string()))?;
        let raw = raw
            .as_str()
            .ok_or_else(|| SlpError::Provider(format!("Expected string for raw transaction {}", txid)))?;
        let bytes = hex::decode(raw).map_err(|e| SlpError::Provider(format!("Invalid hex for {}: {}", txid, e)))?;
        Tx::read(&mut Cursor::new(&bytes))
            .map_err(|e| SlpError::Provider(format!("Cannot decode transaction {}: {}", txid, e)))
    }
}

#[async_trait]
impl TokenInfoSource for RpcTokenInfoSource {
    async fn get_token_info(&self, txid: &str) -> Result<Option<TokenInfo>, SlpError> {
        let rpc = Arc::clone(&self.rpc);
        let owned_txid = txid.to_string();
        let tx = tokio::task::spawn_blocking(move || Self::fetch_tx(&rpc, &owned_txid))
            .await
            .map_err(|e| SlpError::Provider(format!("RPC task for {} failed: {}", txid, e)))??;

        let info = slp_token_info(&tx, txid);
        debug!("Token info for {}: {:?}", txid, info);
        Ok(info)
    }
}
