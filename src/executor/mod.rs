// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Transaction execution module.

pub mod approval;
pub mod builder;
pub mod engine;
pub mod exchange;
pub mod gas;
pub mod swap;

pub use exchange::{Exchange, ExchangeKind};
pub use swap::{DexSwapper, SwapReport};
