// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Static token tables per exchange and exact unit conversions.

use crate::error::{Result, SwapError};
use alloy::primitives::utils::{format_units, parse_units};
use alloy::primitives::{address, Address, U256};
use lazy_static::lazy_static;

/// Symbol of the chain's base currency (MON).
pub const NATIVE: &str = "native";
/// Symbol of the wrapped-native token, reserved as a routing hop.
pub const WRAPPED: &str = "wmon";
pub const NATIVE_DECIMALS: u8 = 18;

pub const WMON: Address = address!("760afe86e5de5fa0ee542fc7b7b713e1c5425701");
pub const USDC: Address = address!("f817257fed379853cde0fa4f97ab987181b1e5ea");
pub const USDT: Address = address!("88b8e2161dedc77ef4ab7585569d2415a1c1055d");
pub const WETH: Address = address!("b5a30b0fdc5ea94a52fdc42e3e9760cb8449fb37");
pub const BEAN: Address = address!("268e4e24e0051ec27b3d27a95977e71ce6875a05");
pub const JAI: Address = address!("cc5b42f9d6144dfdfb6fb3987a2a916af902f5f8");

/// Token metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenInfo {
    pub symbol: &'static str,
    pub address: Address,
    pub decimals: u8,
}

impl TokenInfo {
    pub const fn new(symbol: &'static str, address: Address, decimals: u8) -> Self {
        Self {
            symbol,
            address,
            decimals,
        }
    }
}

/// Tokens tradable on one exchange. Native is implicit and never listed.
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    tokens: Vec<TokenInfo>,
}

lazy_static! {
    pub static ref IZUMI_TOKENS: TokenRegistry = TokenRegistry::new(vec![
        TokenInfo::new(WRAPPED, WMON, 18),
        TokenInfo::new("usdc", USDC, 6),
        TokenInfo::new("usdt", USDT, 6),
        TokenInfo::new("weth", WETH, 18),
    ]);
    pub static ref BEAN_TOKENS: TokenRegistry = TokenRegistry::new(vec![
        TokenInfo::new(WRAPPED, WMON, 18),
        TokenInfo::new("usdc", USDC, 6),
        TokenInfo::new("usdt", USDT, 6),
        TokenInfo::new("bean", BEAN, 18),
        TokenInfo::new("jai", JAI, 6),
    ]);
}

impl TokenRegistry {
    /// Build a registry. The list must contain the wrapped-native token.
    pub fn new(tokens: Vec<TokenInfo>) -> Self {
        debug_assert!(tokens.iter().any(|t| t.symbol == WRAPPED));
        Self { tokens }
    }

    pub fn get(&self, symbol: &str) -> Option<&TokenInfo> {
        self.tokens.iter().find(|t| t.symbol == symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        symbol == NATIVE || self.get(symbol).is_some()
    }

    pub fn tokens(&self) -> &[TokenInfo] {
        &self.tokens
    }

    /// Address of the wrapped-native token.
    pub fn wrapped(&self) -> Address {
        self.get(WRAPPED).map(|t| t.address).unwrap_or(WMON)
    }

    /// Address used for `symbol` inside a routing path; native maps to wrapped.
    pub fn path_address(&self, symbol: &str) -> Result<Address> {
        if symbol == NATIVE {
            return Ok(self.wrapped());
        }
        self.get(symbol)
            .map(|t| t.address)
            .ok_or_else(|| SwapError::UnknownToken(symbol.to_string()))
    }

    pub fn decimals(&self, symbol: &str) -> Result<u8> {
        if symbol == NATIVE {
            return Ok(NATIVE_DECIMALS);
        }
        self.get(symbol)
            .map(|t| t.decimals)
            .ok_or_else(|| SwapError::UnknownToken(symbol.to_string()))
    }
}

/// Convert a human decimal amount to the smallest unit, truncating digits
/// beyond `decimals`.
pub fn to_smallest_unit(amount: &str, decimals: u8) -> Result<U256> {
    let amount = amount.trim();
    if amount.starts_with('-') {
        return Err(SwapError::Config(format!("Negative amount {amount}")));
    }

    let truncated = match amount.split_once('.') {
        Some((whole, frac)) if frac.len() > decimals as usize => {
            format!("{}.{}", whole, &frac[..decimals as usize])
        }
        _ => amount.to_string(),
    };
    let truncated = truncated.trim_end_matches('.');

    parse_units(truncated, decimals)
        .map(|units| units.get_absolute())
        .map_err(|e| SwapError::Config(format!("Invalid amount {amount}: {e}")))
}

/// Convert a smallest-unit integer to its exact human decimal string.
pub fn from_smallest_unit(raw: U256, decimals: u8) -> String {
    format_units(raw, decimals).unwrap_or_else(|_| raw.to_string())
}

/// Human amount cut (not rounded) to `places` fractional digits, for display.
pub fn display_amount(raw: U256, decimals: u8, places: usize) -> String {
    let full = from_smallest_unit(raw, decimals);
    match full.split_once('.') {
        Some((whole, frac)) => {
            let mut frac = frac.to_string();
            frac.truncate(places);
            while frac.len() < places {
                frac.push('0');
            }
            if places == 0 {
                whole.to_string()
            } else {
                format!("{whole}.{frac}")
            }
        }
        None if places > 0 => format!("{full}.{}", "0".repeat(places)),
        None => full,
    }
}
