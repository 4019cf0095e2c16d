// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Multi-wallet balance report through the on-chain balance reader.

use crate::accounts::load_accounts;
use crate::config::Settings;
use crate::error::{Result, SwapError};
use crate::rpc::{create_provider, RpcConfig};
use crate::tokens::{display_amount, JAI, USDC, WETH, WMON};
use alloy::primitives::{address, Address, U256};
use alloy::providers::Provider;
use alloy::sol;

/// Staked ETH on Monad testnet.
pub const SETH: Address = address!("836047a99e11f376522b447bffb6e3495dd0637c");

/// Columns of the report. The zero address reads the native balance.
pub const REPORT_TOKENS: [(&str, Address, u8); 6] = [
    ("MON", Address::ZERO, 18),
    ("WETH", WETH, 18),
    ("WMON", WMON, 18),
    ("sETH", SETH, 18),
    ("USDC", USDC, 6),
    ("JAI", JAI, 6),
];

sol! {
    #[sol(rpc)]
    interface IBalanceReader {
        function balances(address[] users, address[] tokens) external view returns (uint256[] memory);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceRow {
    pub wallet: Address,
    pub amounts: Vec<U256>,
}

/// One call for every wallet and token.
pub async fn fetch_balances<P: Provider>(
    provider: &P,
    reader: Address,
    wallets: &[Address],
) -> Result<Vec<BalanceRow>> {
    let tokens: Vec<Address> = REPORT_TOKENS.iter().map(|(_, token, _)| *token).collect();
    let flat = IBalanceReader::new(reader, provider)
        .balances(wallets.to_vec(), tokens)
        .call()
        .await
        .map_err(|e| SwapError::Rpc(format!("balances failed: {e}")))?;
    split_rows(wallets, flat)
}

/// Flat reader output is wallet-major, token-minor.
pub fn split_rows(wallets: &[Address], flat: Vec<U256>) -> Result<Vec<BalanceRow>> {
    let width = REPORT_TOKENS.len();
    if flat.len() != wallets.len() * width {
        return Err(SwapError::Rpc(format!(
            "balance reader returned {} values for {} wallets",
            flat.len(),
            wallets.len()
        )));
    }
    Ok(wallets
        .iter()
        .zip(flat.chunks(width))
        .map(|(wallet, amounts)| BalanceRow {
            wallet: *wallet,
            amounts: amounts.to_vec(),
        })
        .collect())
}

/// Balances of every stored account, rendered as a table.
pub async fn balance_report(settings: &Settings) -> std::result::Result<String, String> {
    let accounts = load_accounts(&settings.accounts_file)?;
    let wallets: Vec<Address> = accounts.iter().map(|a| a.address()).collect();
    let provider = create_provider(&RpcConfig {
        rpc_url: settings.rpc_url.clone(),
        proxy: None,
    })?;
    let rows = fetch_balances(&provider, settings.balance_reader, &wallets)
        .await
        .map_err(|e| e.to_string())?;
    Ok(render_table(&rows))
}

pub fn render_table(rows: &[BalanceRow]) -> String {
    let mut header = format!("{:<4} {:<44}", "#", "Wallet");
    for (symbol, _, _) in REPORT_TOKENS {
        header.push_str(&format!(" {:>14}", symbol));
    }

    let mut lines = vec![header];
    for (i, row) in rows.iter().enumerate() {
        let mut line = format!("{:<4} {:<44}", i + 1, row.wallet.to_checksum(None));
        for ((_, _, decimals), amount) in REPORT_TOKENS.iter().zip(&row.amounts) {
            line.push_str(&format!(" {:>14}", display_amount(*amount, *decimals, 4)));
        }
        lines.push(line);
    }
    lines.join("\n")
}
