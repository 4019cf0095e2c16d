// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Chain client: the RPC surface the swap pipeline depends on.

use crate::error::{Result, SwapError};
use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use async_trait::async_trait;

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
    }
}

/// RPC calls used by the planner, builder, approval manager and engine.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn native_balance(&self, owner: Address) -> Result<U256>;

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256>;

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256>;

    async fn nonce(&self, owner: Address) -> Result<u64>;

    /// Base fee of the latest block.
    async fn base_fee(&self) -> Result<u128>;

    /// Network-suggested priority fee.
    async fn max_priority_fee(&self) -> Result<u128>;

    async fn gas_price(&self) -> Result<u128>;

    async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64>;

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256>;

    /// `None` while the transaction has no receipt yet.
    async fn receipt_status(&self, hash: B256) -> Result<Option<bool>>;
}

/// [`ChainClient`] backed by an alloy provider.
pub struct RpcChainClient<P: Provider + Clone> {
    provider: P,
}

impl<P: Provider + Clone> RpcChainClient<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P: Provider + Clone> ChainClient for RpcChainClient<P> {
    async fn native_balance(&self, owner: Address) -> Result<U256> {
        self.provider
            .get_balance(owner)
            .await
            .map_err(|e| SwapError::Rpc(format!("Failed to get balance: {e}")))
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256> {
        IERC20::new(token, &self.provider)
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| SwapError::Rpc(format!("balanceOf failed: {e}")))
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        IERC20::new(token, &self.provider)
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| SwapError::Rpc(format!("allowance failed: {e}")))
    }

    async fn nonce(&self, owner: Address) -> Result<u64> {
        self.provider
            .get_transaction_count(owner)
            .await
            .map_err(|e| SwapError::Rpc(format!("Failed to get nonce: {e}")))
    }

    async fn base_fee(&self) -> Result<u128> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await
            .map_err(|e| SwapError::Rpc(format!("Failed to get block: {e}")))?
            .ok_or_else(|| SwapError::Rpc("No block found".to_string()))?;

        block
            .header
            .base_fee_per_gas
            .map(|fee| fee as u128)
            .ok_or_else(|| SwapError::Rpc("No base fee".to_string()))
    }

    async fn max_priority_fee(&self) -> Result<u128> {
        self.provider
            .get_max_priority_fee_per_gas()
            .await
            .map_err(|e| SwapError::Rpc(format!("Failed to get priority fee: {e}")))
    }

    async fn gas_price(&self) -> Result<u128> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| SwapError::Rpc(format!("Failed to get gas price: {e}")))
    }

    async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64> {
        self.provider
            .estimate_gas(tx)
            .await
            .map_err(|e| SwapError::Estimation(e.to_string()))
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256> {
        let pending = self
            .provider
            .send_raw_transaction(&raw)
            .await
            .map_err(|e| SwapError::Rpc(format!("Failed to send tx: {e}")))?;
        Ok(*pending.tx_hash())
    }

    async fn receipt_status(&self, hash: B256) -> Result<Option<bool>> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| SwapError::Rpc(format!("Failed to get receipt: {e}")))?;
        Ok(receipt.map(|r| r.status()))
    }
}
