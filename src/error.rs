// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error types for the swap pipeline.

use alloy::primitives::{B256, U256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwapError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Token {0} is not in the registry")]
    UnknownToken(String),

    #[error("Cannot swap {0} into itself")]
    SameLeg(String),

    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientFunds { required: U256, available: U256 },

    #[error("Gas estimation failed: {0}")]
    Estimation(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Transaction reverted: {0:?}")]
    Reverted(B256),

    #[error("Transaction {hash:?} not confirmed within {secs}s")]
    Timeout { hash: B256, secs: u64 },
}

impl SwapError {
    /// Hash of the submitted transaction, when the failure happened after submission.
    pub fn tx_hash(&self) -> Option<B256> {
        match self {
            Self::Reverted(hash) | Self::Timeout { hash, .. } => Some(*hash),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SwapError>;
