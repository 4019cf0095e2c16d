// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Gas pricing for swap and approval transactions.

use crate::error::Result;
use crate::rpc::ChainClient;
use tracing::debug;

/// EIP-1559 fee fields for one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeParams {
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

impl FeeParams {
    /// max fee = base fee + priority.
    pub fn from_base(base_fee: u128, priority_fee: u128) -> Self {
        Self {
            max_fee_per_gas: base_fee.saturating_add(priority_fee),
            max_priority_fee_per_gas: priority_fee,
        }
    }

    /// Read the latest base fee and the suggested priority fee.
    pub async fn fetch(client: &dyn ChainClient) -> Result<Self> {
        let base_fee = client.base_fee().await?;
        let priority_fee = client.max_priority_fee().await?;
        let fees = Self::from_base(base_fee, priority_fee);
        debug!(
            "Gas: base_fee={}, max_fee={}, priority={}",
            base_fee, fees.max_fee_per_gas, fees.max_priority_fee_per_gas
        );
        Ok(fees)
    }
}

/// Scale a gas estimate by a percentage (130 = ×1.3), truncating.
pub fn apply_multiplier(estimate: u64, multiplier_pct: u64) -> u64 {
    let scaled = estimate as u128 * multiplier_pct as u128 / 100;
    u64::try_from(scaled).unwrap_or(u64::MAX)
}
