// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Transaction builder - swap intent to signable transaction.

use crate::error::Result;
use crate::executor::exchange::Exchange;
use crate::executor::gas::{apply_multiplier, FeeParams};
use crate::rpc::ChainClient;
use crate::strategies::SwapIntent;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use std::sync::Arc;
use tracing::debug;

/// Allowance a router swap depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approval {
    pub token: Address,
    pub spender: Address,
    pub amount: U256,
}

/// Encoded swap, not yet priced.
#[derive(Debug, Clone)]
pub struct SwapCall {
    pub intent: SwapIntent,
    pub route: Vec<Address>,
    pub to: Address,
    pub input: Bytes,
    pub value: U256,
    pub approval: Option<Approval>,
}

/// Unsigned EIP-1559 transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub from: Address,
    pub to: Address,
    pub nonce: u64,
    pub gas_limit: u64,
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
    pub value: U256,
    pub input: Bytes,
    pub chain_id: u64,
}

impl PendingTransaction {
    pub fn into_request(self) -> TransactionRequest {
        TransactionRequest::default()
            .from(self.from)
            .to(self.to)
            .nonce(self.nonce)
            .gas_limit(self.gas_limit)
            .max_fee_per_gas(self.max_fee_per_gas)
            .max_priority_fee_per_gas(self.max_priority_fee_per_gas)
            .value(self.value)
            .input(self.input.into())
            .with_chain_id(self.chain_id)
    }
}

#[derive(Clone)]
pub struct TxBuilder {
    client: Arc<dyn ChainClient>,
    owner: Address,
    chain_id: u64,
    gas_multiplier_pct: u64,
}

impl TxBuilder {
    pub fn new(
        client: Arc<dyn ChainClient>,
        owner: Address,
        chain_id: u64,
        gas_multiplier_pct: u64,
    ) -> Self {
        Self {
            client,
            owner,
            chain_id,
            gas_multiplier_pct,
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn client(&self) -> &dyn ChainClient {
        self.client.as_ref()
    }

    /// Route and encode `intent`. Makes no RPC calls.
    pub fn prepare(&self, exchange: &Exchange, intent: &SwapIntent) -> Result<SwapCall> {
        let route = exchange.resolve_route(&intent.token_in, &intent.token_out)?;
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        let encoded = exchange.encode(intent, &route, self.owner, now)?;

        let approval = encoded.spends.map(|token| Approval {
            token,
            spender: encoded.to,
            amount: intent.amount_in,
        });

        Ok(SwapCall {
            intent: intent.clone(),
            route,
            to: encoded.to,
            input: encoded.input,
            value: encoded.value,
            approval,
        })
    }

    /// Estimate gas and attach fresh fees and nonce.
    pub async fn build(&self, call: &SwapCall) -> Result<PendingTransaction> {
        self.build_call(call.to, call.input.clone(), call.value, None)
            .await
    }

    pub async fn build_swap(&self, exchange: &Exchange, intent: &SwapIntent) -> Result<PendingTransaction> {
        let call = self.prepare(exchange, intent)?;
        self.build(&call).await
    }

    /// Price an arbitrary call. A fixed `gas_limit` skips estimation.
    pub async fn build_call(
        &self,
        to: Address,
        input: Bytes,
        value: U256,
        gas_limit: Option<u64>,
    ) -> Result<PendingTransaction> {
        let gas_limit = match gas_limit {
            Some(limit) => limit,
            None => {
                let request = TransactionRequest::default()
                    .from(self.owner)
                    .to(to)
                    .value(value)
                    .input(input.clone().into());
                let estimate = self.client.estimate_gas(request).await?;
                let limit = apply_multiplier(estimate, self.gas_multiplier_pct);
                debug!("Gas estimate {} -> limit {}", estimate, limit);
                limit
            }
        };

        let fees = FeeParams::fetch(self.client.as_ref()).await?;
        let nonce = self.client.nonce(self.owner).await?;

        Ok(PendingTransaction {
            from: self.owner,
            to,
            nonce,
            gas_limit,
            max_fee_per_gas: fees.max_fee_per_gas,
            max_priority_fee_per_gas: fees.max_priority_fee_per_gas,
            value,
            input,
            chain_id: self.chain_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SwapError;
    use crate::rpc::mock::MockChain;
    use crate::tokens::{NATIVE, USDC};
    use alloy::primitives::address;

    const OWNER: Address = address!("00000000000000000000000000000000000000aa");

    fn setup(chain: MockChain) -> (Arc<MockChain>, TxBuilder) {
        let chain = Arc::new(chain);
        let builder = TxBuilder::new(chain.clone(), OWNER, 10143, 130);
        (chain, builder)
    }

    #[tokio::test]
    async fn same_leg_fails_before_any_rpc() {
        let (chain, builder) = setup(MockChain::new());
        let exchange = Exchange::bean(Address::repeat_byte(0x22));
        let intent = SwapIntent::new("usdc", "usdc", U256::from(1u64));

        let err = builder.build_swap(&exchange, &intent).await.unwrap_err();
        assert!(matches!(err, SwapError::SameLeg(_)));
        assert_eq!(chain.calls(), 0);
    }

    #[tokio::test]
    async fn native_input_carries_value_and_scaled_gas() {
        let (chain, builder) = setup(MockChain::new());
        let exchange = Exchange::izumi(Address::repeat_byte(0x11), 3000);
        let amount = U256::from(5u64) * U256::from(10u64).pow(U256::from(18u64));
        let intent = SwapIntent::new(NATIVE, "usdc", amount);

        let call = builder.prepare(&exchange, &intent).unwrap();
        assert!(call.approval.is_none());

        let tx = builder.build(&call).await.unwrap();
        assert_eq!(tx.from, OWNER);
        assert_eq!(tx.to, exchange.router);
        assert_eq!(tx.value, amount);
        assert_eq!(tx.gas_limit, 130_000);
        assert_eq!(tx.max_fee_per_gas, 52_000_000_000);
        assert_eq!(tx.max_priority_fee_per_gas, 2_000_000_000);
        assert_eq!(tx.nonce, 7);
        assert_eq!(tx.chain_id, 10143);

        let estimates = chain.estimates();
        assert_eq!(estimates.len(), 1);
        assert_eq!(estimates[0].from, Some(OWNER));
        assert_eq!(estimates[0].value, Some(amount));
    }

    #[tokio::test]
    async fn token_input_has_zero_value_and_needs_approval() {
        let (_chain, builder) = setup(MockChain::new());
        let exchange = Exchange::bean(Address::repeat_byte(0x22));
        let intent = SwapIntent::new("usdc", "jai", U256::from(1_000_000u64));

        let call = builder.prepare(&exchange, &intent).unwrap();
        assert_eq!(call.route.len(), 3);
        assert_eq!(
            call.approval,
            Some(Approval {
                token: USDC,
                spender: exchange.router,
                amount: U256::from(1_000_000u64),
            })
        );

        let tx = builder.build(&call).await.unwrap();
        assert_eq!(tx.value, U256::ZERO);
    }

    #[tokio::test]
    async fn estimation_failure_abandons_the_swap() {
        let (_chain, builder) = setup(MockChain::new().with_gas_estimate(None));
        let exchange = Exchange::bean(Address::repeat_byte(0x22));
        let intent = SwapIntent::new(NATIVE, "usdc", U256::from(1u64));

        let err = builder.build_swap(&exchange, &intent).await.unwrap_err();
        assert!(matches!(err, SwapError::Estimation(_)));
    }

    #[tokio::test]
    async fn fixed_gas_limit_skips_estimation() {
        let (chain, builder) = setup(MockChain::new().with_gas_estimate(None));
        let tx = builder
            .build_call(USDC, Bytes::new(), U256::ZERO, Some(100_000))
            .await
            .unwrap();
        assert_eq!(tx.gas_limit, 100_000);
        assert!(chain.estimates().is_empty());

        let request = tx.into_request();
        assert_eq!(request.to, Some(USDC.into()));
        assert_eq!(request.chain_id, Some(10143));
        assert_eq!(request.nonce, Some(7));
    }
}
