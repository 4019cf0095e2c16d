// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Exchange descriptors: router, token table, routing and calldata encoding.

use crate::config::Settings;
use crate::error::{Result, SwapError};
use crate::strategies::SwapIntent;
use crate::tokens::{TokenRegistry, BEAN_TOKENS, IZUMI_TOKENS, NATIVE, WRAPPED};
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

/// Bean swaps expire after 30 minutes.
const BEAN_DEADLINE_SECS: u64 = 30 * 60;
/// Izumi swaps expire after 6 hours.
const IZUMI_DEADLINE_SECS: u64 = 6 * 60 * 60;

sol! {
    interface IUniswapV2Router {
        function swapExactETHForTokens(
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external payable returns (uint256[] memory amounts);

        function swapExactTokensForETH(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external returns (uint256[] memory amounts);

        function swapExactTokensForTokens(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external returns (uint256[] memory amounts);
    }

    interface IIzumiSwap {
        struct SwapAmountParams {
            bytes path;
            address recipient;
            uint128 amount;
            uint256 minAcquired;
            uint256 deadline;
        }

        function swapAmount(SwapAmountParams params)
            external payable returns (uint256 cost, uint256 acquire);

        function unwrapWETH9(uint256 minAmount, address recipient) external payable;

        function refundETH() external payable;

        function multicall(bytes[] data) external payable returns (bytes[] memory results);
    }

    interface IWrappedNative {
        function deposit() external payable;

        function withdraw(uint256 wad) external;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeKind {
    Izumi,
    Bean,
}

/// How swaps reach the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStyle {
    /// iZiSwap periphery: packed path, batched through `multicall`.
    Multicall { fee_tier: u32 },
    /// Uniswap-V2 style: one router call per swap.
    DirectRouter,
}

/// Shape of a swap by its legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegKind {
    Wrap,
    Unwrap,
    NativeIn,
    NativeOut,
    TokenToToken,
}

impl LegKind {
    pub fn of(token_in: &str, token_out: &str) -> Self {
        match (token_in, token_out) {
            (NATIVE, WRAPPED) => Self::Wrap,
            (WRAPPED, NATIVE) => Self::Unwrap,
            (NATIVE, _) => Self::NativeIn,
            (_, NATIVE) => Self::NativeOut,
            _ => Self::TokenToToken,
        }
    }
}

/// Encoded call ready for gas estimation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSwap {
    pub to: Address,
    pub input: Bytes,
    pub value: U256,
    /// Token that the router pulls from the owner, if any.
    pub spends: Option<Address>,
}

#[derive(Debug, Clone)]
pub struct Exchange {
    pub kind: ExchangeKind,
    pub router: Address,
    pub registry: &'static TokenRegistry,
    pub style: CallStyle,
}

impl Exchange {
    pub fn izumi(router: Address, fee_tier: u32) -> Self {
        Self {
            kind: ExchangeKind::Izumi,
            router,
            registry: &IZUMI_TOKENS,
            style: CallStyle::Multicall { fee_tier },
        }
    }

    pub fn bean(router: Address) -> Self {
        Self {
            kind: ExchangeKind::Bean,
            router,
            registry: &BEAN_TOKENS,
            style: CallStyle::DirectRouter,
        }
    }

    pub fn for_kind(kind: ExchangeKind, settings: &Settings) -> Self {
        match kind {
            ExchangeKind::Izumi => Self::izumi(settings.izumi_router, settings.izumi_fee_tier),
            ExchangeKind::Bean => Self::bean(settings.bean_router),
        }
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            ExchangeKind::Izumi => "Izumi",
            ExchangeKind::Bean => "Bean",
        }
    }

    /// Token path for a swap. Native is written as the wrapped token and
    /// anything not touching native or wrapped hops through wrapped.
    pub fn resolve_route(&self, token_in: &str, token_out: &str) -> Result<Vec<Address>> {
        if token_in == token_out {
            return Err(SwapError::SameLeg(token_in.to_string()));
        }
        for symbol in [token_in, token_out] {
            if !self.registry.contains(symbol) {
                return Err(SwapError::UnknownToken(symbol.to_string()));
            }
        }

        let wrapped = self.registry.wrapped();
        let is_base = |s: &str| s == NATIVE || s == WRAPPED;

        let route = match (is_base(token_in), is_base(token_out)) {
            (true, true) => vec![wrapped],
            (true, false) => vec![wrapped, self.registry.path_address(token_out)?],
            (false, true) => vec![self.registry.path_address(token_in)?, wrapped],
            (false, false) => vec![
                self.registry.path_address(token_in)?,
                wrapped,
                self.registry.path_address(token_out)?,
            ],
        };
        Ok(route)
    }

    /// Encode the call for `intent` along `route`, paying out to `owner`.
    pub fn encode(
        &self,
        intent: &SwapIntent,
        route: &[Address],
        owner: Address,
        now: u64,
    ) -> Result<EncodedSwap> {
        let legs = LegKind::of(&intent.token_in, &intent.token_out);
        let value = if intent.token_in == NATIVE {
            intent.amount_in
        } else {
            U256::ZERO
        };

        match legs {
            LegKind::Wrap => {
                return Ok(EncodedSwap {
                    to: self.registry.wrapped(),
                    input: IWrappedNative::depositCall {}.abi_encode().into(),
                    value,
                    spends: None,
                })
            }
            LegKind::Unwrap => {
                return Ok(EncodedSwap {
                    to: self.registry.wrapped(),
                    input: IWrappedNative::withdrawCall {
                        wad: intent.amount_in,
                    }
                    .abi_encode()
                    .into(),
                    value,
                    spends: None,
                })
            }
            _ => {}
        }

        let input = match self.style {
            CallStyle::DirectRouter => encode_v2(intent, route, owner, now + BEAN_DEADLINE_SECS),
            CallStyle::Multicall { fee_tier } => {
                encode_izumi(intent, route, owner, fee_tier, now + IZUMI_DEADLINE_SECS)?
            }
        };
        let spends = match legs {
            LegKind::NativeIn => None,
            _ => Some(self.registry.path_address(&intent.token_in)?),
        };

        Ok(EncodedSwap {
            to: self.router,
            input,
            value,
            spends,
        })
    }
}

fn encode_v2(intent: &SwapIntent, route: &[Address], owner: Address, deadline: u64) -> Bytes {
    let path = route.to_vec();
    let deadline = U256::from(deadline);
    let data = match LegKind::of(&intent.token_in, &intent.token_out) {
        LegKind::NativeIn => IUniswapV2Router::swapExactETHForTokensCall {
            amountOutMin: intent.min_amount_out,
            path,
            to: owner,
            deadline,
        }
        .abi_encode(),
        LegKind::NativeOut => IUniswapV2Router::swapExactTokensForETHCall {
            amountIn: intent.amount_in,
            amountOutMin: intent.min_amount_out,
            path,
            to: owner,
            deadline,
        }
        .abi_encode(),
        _ => IUniswapV2Router::swapExactTokensForTokensCall {
            amountIn: intent.amount_in,
            amountOutMin: intent.min_amount_out,
            path,
            to: owner,
            deadline,
        }
        .abi_encode(),
    };
    data.into()
}

fn encode_izumi(
    intent: &SwapIntent,
    route: &[Address],
    owner: Address,
    fee_tier: u32,
    deadline: u64,
) -> Result<Bytes> {
    if intent.amount_in > U256::from(u128::MAX) {
        return Err(SwapError::Config(format!(
            "Amount {} does not fit uint128",
            intent.amount_in
        )));
    }
    let native_out = intent.token_out == NATIVE;

    // Proceeds stay in the router when they still need unwrapping.
    let recipient = if native_out { Address::ZERO } else { owner };
    let swap = IIzumiSwap::swapAmountCall {
        params: IIzumiSwap::SwapAmountParams {
            path: pack_path(route, fee_tier),
            recipient,
            amount: intent.amount_in.to::<u128>(),
            minAcquired: intent.min_amount_out,
            deadline: U256::from(deadline),
        },
    };

    let mut calls: Vec<Bytes> = vec![swap.abi_encode().into()];
    if native_out {
        calls.push(
            IIzumiSwap::unwrapWETH9Call {
                minAmount: U256::ZERO,
                recipient: owner,
            }
            .abi_encode()
            .into(),
        );
    }
    calls.push(IIzumiSwap::refundETHCall {}.abi_encode().into());

    Ok(IIzumiSwap::multicallCall { data: calls }.abi_encode().into())
}

/// `token ‖ fee(uint24) ‖ token ‖ …`
pub fn pack_path(route: &[Address], fee_tier: u32) -> Bytes {
    let mut packed = Vec::with_capacity(route.len() * 23);
    for (i, token) in route.iter().enumerate() {
        if i > 0 {
            packed.extend_from_slice(&fee_tier.to_be_bytes()[1..]);
        }
        packed.extend_from_slice(token.as_slice());
    }
    packed.into()
}
