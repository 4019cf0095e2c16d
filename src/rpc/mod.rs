// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! RPC module for interacting with Monad blockchain.

mod client;
#[cfg(test)]
pub mod mock;
mod provider;

pub use client::{ChainClient, RpcChainClient, IERC20};
pub use provider::{create_provider, RpcConfig};
