// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! ERC-20 allowance management ahead of router swaps.

use crate::error::Result;
use crate::executor::builder::TxBuilder;
use crate::executor::engine::ExecutionEngine;
use crate::rpc::IERC20;
use alloy::primitives::{Address, B256, U256};
use alloy::sol_types::SolCall;
use tracing::{debug, info};

pub struct ApprovalManager<'a> {
    builder: &'a TxBuilder,
    engine: &'a ExecutionEngine,
    gas_limit: u64,
}

impl<'a> ApprovalManager<'a> {
    pub fn new(builder: &'a TxBuilder, engine: &'a ExecutionEngine, gas_limit: u64) -> Self {
        Self {
            builder,
            engine,
            gas_limit,
        }
    }

    /// Approve exactly `amount` unless the current allowance already covers it.
    /// Returns the approval hash when one was sent.
    pub async fn ensure_allowance(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<Option<B256>> {
        let owner = self.builder.owner();
        let current = self.builder.client().allowance(token, owner, spender).await?;
        if current >= amount {
            debug!("Allowance {} of {:?} already covers {}", current, token, amount);
            return Ok(None);
        }

        info!("🔓 Approving {} of {:?} for {:?}", amount, token, spender);
        let input = IERC20::approveCall { spender, amount }.abi_encode();
        let tx = self
            .builder
            .build_call(token, input.into(), U256::ZERO, Some(self.gas_limit))
            .await?;
        let hash = self.engine.execute(tx).await?;
        Ok(Some(hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::mock::MockChain;
    use crate::tokens::USDC;
    use alloy::consensus::{Transaction, TxEnvelope};
    use alloy::eips::eip2718::Decodable2718;
    use alloy::network::EthereumWallet;
    use alloy::signers::local::PrivateKeySigner;
    use std::sync::Arc;
    use std::time::Duration;

    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn parts(chain: Arc<MockChain>) -> (TxBuilder, ExecutionEngine) {
        let signer: PrivateKeySigner = KEY.parse().unwrap();
        let builder = TxBuilder::new(chain.clone(), signer.address(), 10143, 130);
        let engine = ExecutionEngine::new(
            chain,
            EthereumWallet::from(signer),
            Duration::from_millis(100),
            Duration::from_millis(10),
        );
        (builder, engine)
    }

    fn spender() -> Address {
        Address::repeat_byte(0x22)
    }

    #[tokio::test]
    async fn sufficient_allowance_sends_nothing() {
        let chain = Arc::new(
            MockChain::new()
                .with_native(U256::from(10u64).pow(U256::from(18u64)))
                .with_allowance(U256::from(1_000u64)),
        );
        let (builder, engine) = parts(chain.clone());
        let approvals = ApprovalManager::new(&builder, &engine, 100_000);

        let hash = approvals
            .ensure_allowance(USDC, spender(), U256::from(1_000u64))
            .await
            .unwrap();
        assert!(hash.is_none());
        assert!(chain.sent().is_empty());
    }

    #[tokio::test]
    async fn short_allowance_approves_the_exact_amount_once() {
        let chain = Arc::new(
            MockChain::new()
                .with_native(U256::from(10u64).pow(U256::from(18u64)))
                .with_allowance(U256::from(999u64)),
        );
        let (builder, engine) = parts(chain.clone());
        let approvals = ApprovalManager::new(&builder, &engine, 100_000);

        let hash = approvals
            .ensure_allowance(USDC, spender(), U256::from(1_000u64))
            .await
            .unwrap();
        assert!(hash.is_some());

        let sent = chain.sent();
        assert_eq!(sent.len(), 1);
        let envelope = TxEnvelope::decode_2718(&mut sent[0].as_ref()).unwrap();
        assert_eq!(envelope.to(), Some(USDC));
        assert_eq!(envelope.gas_limit(), 100_000);
        let call = IERC20::approveCall::abi_decode(envelope.input()).unwrap();
        assert_eq!(call.spender, spender());
        assert_eq!(call.amount, U256::from(1_000u64));
        assert!(chain.estimates().is_empty());
    }
}
