// reconciler/src/account.rs
use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address;

use crate::error::ReconcileError;

/// A ledger account address: `0x` followed by 40 hex digits, stored lower case
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountId {
    text: String,
    address: Address,
}

impl AccountId {
    pub fn parse(input: &str) -> Result<Self, ReconcileError> {
        let invalid = || ReconcileError::InvalidAccount(input.to_string());

        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .filter(|d| d.len() == 40)
            .ok_or_else(invalid)?;

        let address = Address::from_str(digits).map_err(|_| invalid())?;

        Ok(Self {
            text: format!("0x{}", digits.to_ascii_lowercase()),
            address,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

impl FromStr for AccountId {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case() {
        let account = AccountId::parse("0x71C7656EC7ab88b098defB751B7401B5f6d8976F").unwrap();
        assert_eq!(account.as_str(), "0x71c7656ec7ab88b098defb751b7401b5f6d8976f");
        assert_eq!(account.address()[0], 0x71);
        assert_eq!(account.address()[19], 0x6f);
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in [
            "",
            "0x",
            "71C7656EC7ab88b098defB751B7401B5f6d8976F",
            "0x1234",
            "0xZZC7656EC7ab88b098defB751B7401B5f6d8976F",
            "0x0x71C7656EC7ab88b098defB751B7401B5f6d8976F",
        ] {
            assert!(
                matches!(AccountId::parse(bad), Err(ReconcileError::InvalidAccount(_))),
                "accepted {bad:?}"
            );
        }
    }
}
