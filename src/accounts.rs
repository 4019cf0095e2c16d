// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Account store - wallets loaded from a JSON file.

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use serde::Deserialize;
use std::fs;
use tracing::info;

/// On-disk shape of one account.
#[derive(Deserialize)]
struct AccountRecord {
    name: String,
    private_key: String,
    #[serde(default)]
    proxy: Option<String>,
}

/// One farming account. Immutable for the duration of a run.
#[derive(Clone)]
pub struct Account {
    pub name: String,
    pub proxy: Option<String>,
    signer: PrivateKeySigner,
}

impl Account {
    pub fn new(name: &str, private_key: &str, proxy: Option<String>) -> Result<Self, String> {
        let key = private_key.trim();
        let key = key.strip_prefix("0x").unwrap_or(key);
        let signer: PrivateKeySigner = key
            .parse()
            .map_err(|e| format!("Invalid private key for {}: {}", name, e))?;

        Ok(Self {
            name: name.to_string(),
            proxy: proxy.filter(|p| !p.trim().is_empty()),
            signer,
        })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("name", &self.name)
            .field("address", &self.address())
            .field("proxy", &self.proxy)
            .field("signer", &"[REDACTED]")
            .finish()
    }
}

pub fn parse_accounts(json: &str) -> Result<Vec<Account>, String> {
    let records: Vec<AccountRecord> =
        serde_json::from_str(json).map_err(|e| format!("Invalid accounts file: {}", e))?;
    records
        .into_iter()
        .map(|r| Account::new(&r.name, &r.private_key, r.proxy))
        .collect()
}

pub fn load_accounts(path: &str) -> Result<Vec<Account>, String> {
    let contents =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
    let accounts = parse_accounts(&contents)?;
    info!("👛 Loaded {} account(s) from {}", accounts.len(), path);
    Ok(accounts)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn parses_records_with_optional_proxy() {
        let json = format!(
            r#"[
                {{"name": "main", "private_key": "{KEY}", "proxy": "user:pw@1.2.3.4:8080"}},
                {{"name": "alt", "private_key": "{}"}},
                {{"name": "blank", "private_key": "{KEY}", "proxy": ""}}
            ]"#,
            KEY.trim_start_matches("0x")
        );

        let accounts = parse_accounts(&json).unwrap();
        assert_eq!(accounts.len(), 3);
        assert_eq!(
            format!("{:?}", accounts[0].address()).to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
        assert_eq!(accounts[0].proxy.as_deref(), Some("user:pw@1.2.3.4:8080"));
        assert_eq!(accounts[1].address(), accounts[0].address());
        assert!(accounts[1].proxy.is_none());
        assert!(accounts[2].proxy.is_none());
    }

    #[test]
    fn bad_key_names_the_account() {
        let err = parse_accounts(r#"[{"name": "broken", "private_key": "0x1234"}]"#).unwrap_err();
        assert!(err.contains("broken"));
    }

    #[test]
    fn debug_redacts_key() {
        let account = Account::new("main", KEY, None).unwrap();
        let debug = format!("{:?}", account);
        assert!(!debug.contains("ac0974bec"));
        assert!(debug.contains("[REDACTED]"));
    }
}
