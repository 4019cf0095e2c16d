// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Execution engine - balance check, local signing, submission, confirmation.

use crate::error::{Result, SwapError};
use crate::executor::builder::PendingTransaction;
use crate::rpc::ChainClient;
use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Bytes, B256, U256};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info};

pub struct ExecutionEngine {
    client: Arc<dyn ChainClient>,
    wallet: EthereumWallet,
    receipt_timeout: Duration,
    poll_interval: Duration,
}

impl ExecutionEngine {
    pub fn new(
        client: Arc<dyn ChainClient>,
        wallet: EthereumWallet,
        receipt_timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            client,
            wallet,
            receipt_timeout,
            poll_interval,
        }
    }

    /// Check, sign, submit and wait for the receipt.
    pub async fn execute(&self, tx: PendingTransaction) -> Result<B256> {
        self.check_balance(&tx).await?;

        let raw = self.sign(tx).await?;
        let hash = self.client.send_raw_transaction(raw).await?;
        info!("📤 Transaction sent: {:?}", hash);

        self.wait_for_receipt(hash).await
    }

    /// Fails when the sender cannot cover `gas_price * gas_limit + value`.
    pub async fn check_balance(&self, tx: &PendingTransaction) -> Result<()> {
        let gas_price = self.client.gas_price().await?;
        let required = U256::from(gas_price) * U256::from(tx.gas_limit) + tx.value;
        let available = self.client.native_balance(tx.from).await?;

        if available < required {
            error!(
                "❌ Not enough MON for {:?}: need {}, have {}",
                tx.from, required, available
            );
            return Err(SwapError::InsufficientFunds {
                required,
                available,
            });
        }
        Ok(())
    }

    async fn sign(&self, tx: PendingTransaction) -> Result<Bytes> {
        let envelope = tx
            .into_request()
            .build(&self.wallet)
            .await
            .map_err(|e| SwapError::Signing(e.to_string()))?;
        Ok(envelope.encoded_2718().into())
    }

    async fn wait_for_receipt(&self, hash: B256) -> Result<B256> {
        let deadline = Instant::now() + self.receipt_timeout;
        loop {
            match self.client.receipt_status(hash).await {
                Ok(Some(true)) => {
                    info!("✅ Confirmed: {:?}", hash);
                    return Ok(hash);
                }
                Ok(Some(false)) => {
                    error!("❌ Reverted: {:?}", hash);
                    return Err(SwapError::Reverted(hash));
                }
                Ok(None) => {}
                Err(e) => {
                    error!("❌ Receipt poll for {:?} failed: {}", hash, e);
                    return Err(e);
                }
            }

            if Instant::now() >= deadline {
                error!(
                    "⏱️ No receipt for {:?} after {}s",
                    hash,
                    self.receipt_timeout.as_secs()
                );
                return Err(SwapError::Timeout {
                    hash,
                    secs: self.receipt_timeout.as_secs(),
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
