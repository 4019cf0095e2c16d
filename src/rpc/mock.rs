// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory chain used by unit tests.

use crate::error::{Result, SwapError};
use crate::rpc::ChainClient;
use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub struct MockState {
    pub native: U256,
    pub tokens: HashMap<Address, U256>,
    pub allowance: U256,
    pub nonce: u64,
    pub base_fee: u128,
    pub priority_fee: u128,
    pub gas_price: u128,
    /// `None` makes every estimate fail.
    pub gas_estimate: Option<u64>,
    /// Receipt status returned for every hash; `None` never confirms.
    pub receipt: Option<bool>,
    /// Makes `send_raw_transaction` fail.
    pub send_error: bool,
    /// Makes `receipt_status` fail.
    pub receipt_error: bool,
    pub estimates: Vec<TransactionRequest>,
    pub sent: Vec<Bytes>,
}

pub struct MockChain {
    pub state: Mutex<MockState>,
    calls: AtomicUsize,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                native: U256::ZERO,
                tokens: HashMap::new(),
                allowance: U256::ZERO,
                nonce: 7,
                base_fee: 50_000_000_000,
                priority_fee: 2_000_000_000,
                gas_price: 52_000_000_000,
                gas_estimate: Some(100_000),
                receipt: Some(true),
                send_error: false,
                receipt_error: false,
                estimates: Vec::new(),
                sent: Vec::new(),
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_native(self, amount: U256) -> Self {
        self.state.lock().unwrap().native = amount;
        self
    }

    pub fn with_token(self, token: Address, amount: U256) -> Self {
        self.state.lock().unwrap().tokens.insert(token, amount);
        self
    }

    pub fn with_allowance(self, amount: U256) -> Self {
        self.state.lock().unwrap().allowance = amount;
        self
    }

    pub fn with_gas_estimate(self, estimate: Option<u64>) -> Self {
        self.state.lock().unwrap().gas_estimate = estimate;
        self
    }

    pub fn with_receipt(self, status: Option<bool>) -> Self {
        self.state.lock().unwrap().receipt = status;
        self
    }

    pub fn with_send_error(self) -> Self {
        self.state.lock().unwrap().send_error = true;
        self
    }

    pub fn with_receipt_error(self) -> Self {
        self.state.lock().unwrap().receipt_error = true;
        self
    }

    /// Number of RPC calls of any kind.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<Bytes> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn estimates(&self) -> Vec<TransactionRequest> {
        self.state.lock().unwrap().estimates.clone()
    }

    fn touch(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn native_balance(&self, _owner: Address) -> Result<U256> {
        Ok(self.touch().native)
    }

    async fn token_balance(&self, token: Address, _owner: Address) -> Result<U256> {
        Ok(self.touch().tokens.get(&token).copied().unwrap_or_default())
    }

    async fn allowance(&self, _token: Address, _owner: Address, _spender: Address) -> Result<U256> {
        Ok(self.touch().allowance)
    }

    async fn nonce(&self, _owner: Address) -> Result<u64> {
        Ok(self.touch().nonce)
    }

    async fn base_fee(&self) -> Result<u128> {
        Ok(self.touch().base_fee)
    }

    async fn max_priority_fee(&self) -> Result<u128> {
        Ok(self.touch().priority_fee)
    }

    async fn gas_price(&self) -> Result<u128> {
        Ok(self.touch().gas_price)
    }

    async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64> {
        let mut state = self.touch();
        state.estimates.push(tx);
        state
            .gas_estimate
            .ok_or_else(|| SwapError::Estimation("execution reverted".to_string()))
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256> {
        let mut state = self.touch();
        if state.send_error {
            return Err(SwapError::Rpc("nonce too low".to_string()));
        }
        let hash = keccak256(&raw);
        state.sent.push(raw);
        state.nonce += 1;
        Ok(hash)
    }

    async fn receipt_status(&self, _hash: B256) -> Result<Option<bool>> {
        let state = self.touch();
        if state.receipt_error {
            return Err(SwapError::Rpc("connection reset".to_string()));
        }
        Ok(state.receipt)
    }
}
