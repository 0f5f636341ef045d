// reconciler/src/ledger.rs
use std::time::Duration;

use async_trait::async_trait;
use common::models::CertificateRecord;
use common::LedgerConfig;
use serde::Deserialize;
use serde_json::json;

use crate::abi;
use crate::account::AccountId;
use crate::error::ReconcileError;

/// Read access to the certificates a ledger holds for an account
#[async_trait]
pub trait CertificateLedger: Send + Sync {
    /// Full, unordered list of records issued to `account`
    async fn list_certificates(&self, account: &AccountId) -> Result<Vec<CertificateRecord>, ReconcileError>;
}

/// Ledger handle backed by a node's JSON-RPC `eth_call`
pub struct JsonRpcLedger {
    rpc_url: String,
    contract: AccountId,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

impl JsonRpcLedger {
    pub fn new(config: &LedgerConfig) -> Result<Self, ReconcileError> {
        let contract = AccountId::parse(&config.contract_address)
            .map_err(|_| ReconcileError::Configuration(format!(
                "contract address {:?} is not a valid address",
                config.contract_address
            )))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ReconcileError::Configuration(format!("ledger HTTP client: {}", e)))?;

        Ok(Self {
            rpc_url: config.rpc_url.clone(),
            contract,
            http,
        })
    }

    pub fn contract(&self) -> &AccountId {
        &self.contract
    }
}

#[async_trait]
impl CertificateLedger for JsonRpcLedger {
    async fn list_certificates(&self, account: &AccountId) -> Result<Vec<CertificateRecord>, ReconcileError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                {
                    "to": self.contract.as_str(),
                    "data": abi::encode_get_certificates(account),
                },
                "latest"
            ]
        });

        let response = self.http
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ReconcileError::LedgerUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReconcileError::LedgerUnavailable(format!("ledger node answered HTTP {}", status)));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| ReconcileError::LedgerUnavailable(e.to_string()))?;

        if let Some(err) = body.error {
            return Err(ReconcileError::LedgerUnavailable(format!("rpc error {}: {}", err.code, err.message)));
        }

        let result = body.result
            .ok_or_else(|| ReconcileError::MalformedLedgerResponse("missing result".to_string()))?;

        let records = abi::decode_certificates_hex(&result)
            .map_err(|e| ReconcileError::MalformedLedgerResponse(e.to_string()))?;

        tracing::debug!("Ledger returned {} certificate records for {}", records.len(), account);
        Ok(records)
    }
}
