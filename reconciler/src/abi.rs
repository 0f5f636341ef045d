// reconciler/src/abi.rs
//! Contract binding for `getCertificates(address)`.
//!
//! The call returns `(string ipfsHash, uint256 issuedAt)[]`.

use alloy_sol_types::{sol, SolCall};
use common::models::CertificateRecord;
use thiserror::Error;

use crate::account::AccountId;

sol! {
    struct Certificate {
        string ipfsHash;
        uint256 issuedAt;
    }

    function getCertificates(address owner) external view returns (Certificate[] memory);
}

#[derive(Debug, Error)]
pub enum AbiError {
    #[error("return data is not valid hex")]
    InvalidHex,
    #[error("return data does not decode as Certificate[]: {0}")]
    Decode(#[from] alloy_sol_types::Error),
}

/// Calldata for `getCertificates(account)` as a `0x` hex string
pub fn encode_get_certificates(account: &AccountId) -> String {
    let call = getCertificatesCall { owner: account.address() };
    format!("0x{}", hex::encode(call.abi_encode()))
}

/// Decode the hex return value of `getCertificates`
pub fn decode_certificates_hex(result: &str) -> Result<Vec<CertificateRecord>, AbiError> {
    let digits = result.strip_prefix("0x").unwrap_or(result);
    // Accounts with no contract code answer with empty data
    if digits.is_empty() {
        return Ok(Vec::new());
    }
    let data = hex::decode(digits).map_err(|_| AbiError::InvalidHex)?;
    decode_certificates(&data)
}

pub fn decode_certificates(data: &[u8]) -> Result<Vec<CertificateRecord>, AbiError> {
    let decoded = getCertificatesCall::abi_decode_returns(data, true)?;

    // uint256 keeps its full decimal text, values past u64 sort as zero
    Ok(decoded
        ._0
        .into_iter()
        .map(|cert| CertificateRecord::new(cert.ipfsHash, cert.issuedAt.to_string()))
        .collect())
}
