// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Swap planner - turns a holdings snapshot into swap intents.
//!
//! Two modes:
//! - `Swap`: random input among funded tokens, random output among the
//!   registry (never the wrapped-native hop), random share of the balance.
//! - `Collect`: sweep every non-native, non-wrapped holding back into native.
//!
//! All amounts are smallest-unit integers; shares are basis points.

use crate::config::SwapSettings;
use crate::strategies::random::{shuffle, RandomSource};
use crate::tokens::{from_smallest_unit, TokenRegistry, NATIVE, WRAPPED};
use alloy::primitives::U256;

const BPS_DENOMINATOR: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapMode {
    Swap,
    Collect,
}

/// Balance of one token at the moment it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holding {
    pub symbol: String,
    pub decimals: u8,
    /// Smallest-unit balance.
    pub balance: U256,
}

impl Holding {
    pub fn new(symbol: &str, decimals: u8, balance: U256) -> Self {
        Self {
            symbol: symbol.to_string(),
            decimals,
            balance,
        }
    }

    pub fn human(&self) -> String {
        from_smallest_unit(self.balance, self.decimals)
    }
}

/// One planned swap. `min_amount_out` is always zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapIntent {
    pub token_in: String,
    pub token_out: String,
    pub amount_in: U256,
    pub min_amount_out: U256,
}

impl SwapIntent {
    pub fn new(token_in: &str, token_out: &str, amount_in: U256) -> Self {
        Self {
            token_in: token_in.to_string(),
            token_out: token_out.to_string(),
            amount_in,
            min_amount_out: U256::ZERO,
        }
    }
}

/// `balance * bps / 10_000`, truncated.
pub fn share_of(balance: U256, bps: u64) -> U256 {
    balance * U256::from(bps) / U256::from(BPS_DENOMINATOR)
}

pub struct SwapPlanner<'a> {
    registry: &'a TokenRegistry,
    settings: &'a SwapSettings,
}

impl<'a> SwapPlanner<'a> {
    pub fn new(registry: &'a TokenRegistry, settings: &'a SwapSettings) -> Self {
        Self { registry, settings }
    }

    /// Plan a whole batch from one snapshot. In swap mode each planned amount
    /// is debited from a local copy of the snapshot before the next draw.
    pub fn plan(
        &self,
        holdings: &[Holding],
        mode: SwapMode,
        rng: &mut dyn RandomSource,
    ) -> Vec<SwapIntent> {
        match mode {
            SwapMode::Collect => self.plan_collect(holdings, rng),
            SwapMode::Swap => {
                let count = self.draw_swap_count(rng);
                let mut snapshot = holdings.to_vec();
                let mut plan = Vec::new();
                for _ in 0..count {
                    if let Some(intent) = self.plan_swap(&snapshot, rng) {
                        debit(&mut snapshot, &intent);
                        plan.push(intent);
                    }
                }
                plan
            }
        }
    }

    pub fn draw_swap_count(&self, rng: &mut dyn RandomSource) -> u64 {
        rng.in_span(self.settings.swap_count)
    }

    /// Plan a single swap. Draw order: input, output, share.
    pub fn plan_swap(&self, holdings: &[Holding], rng: &mut dyn RandomSource) -> Option<SwapIntent> {
        let funded: Vec<&Holding> = holdings.iter().filter(|h| !h.balance.is_zero()).collect();
        if funded.is_empty() {
            return None;
        }
        let input = funded[rng.index(funded.len())];

        let outputs = self.eligible_outputs(&input.symbol);
        if outputs.is_empty() {
            return None;
        }
        let token_out = outputs[rng.index(outputs.len())];

        let bps = rng.in_span(self.settings.swap_share_bps);
        let amount_in = share_of(input.balance, bps);
        if amount_in.is_zero() {
            return None;
        }

        Some(SwapIntent::new(&input.symbol, token_out, amount_in))
    }

    /// Registry tokens other than the input and the wrapped hop, plus native
    /// when the input is not native.
    pub fn eligible_outputs(&self, token_in: &str) -> Vec<&'static str> {
        let mut outputs: Vec<&'static str> = self
            .registry
            .tokens()
            .iter()
            .map(|t| t.symbol)
            .filter(|s| *s != token_in && *s != WRAPPED)
            .collect();
        if token_in != NATIVE {
            outputs.insert(0, NATIVE);
        }
        outputs
    }

    pub fn plan_collect(&self, holdings: &[Holding], rng: &mut dyn RandomSource) -> Vec<SwapIntent> {
        let mut sources: Vec<&Holding> = holdings
            .iter()
            .filter(|h| h.symbol != NATIVE && h.symbol != WRAPPED && !h.balance.is_zero())
            .collect();
        shuffle(&mut sources, rng);

        sources
            .into_iter()
            .filter_map(|h| {
                let amount = share_of(h.balance, self.settings.collect_share_bps);
                (!amount.is_zero()).then(|| SwapIntent::new(&h.symbol, NATIVE, amount))
            })
            .collect()
    }
}

fn debit(snapshot: &mut [Holding], intent: &SwapIntent) {
    if let Some(holding) = snapshot.iter_mut().find(|h| h.symbol == intent.token_in) {
        holding.balance = holding.balance.saturating_sub(intent.amount_in);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Span;
    use crate::strategies::random::Scripted;
    use crate::tokens::{to_smallest_unit, IZUMI_TOKENS};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn units(amount: &str, decimals: u8) -> U256 {
        to_smallest_unit(amount, decimals).unwrap()
    }

    fn settings(count: Span, share_bps: Span) -> SwapSettings {
        SwapSettings {
            swap_count: count,
            swap_share_bps: share_bps,
            ..SwapSettings::default()
        }
    }

    #[test]
    fn half_of_ten_native_is_one_intent_of_five() {
        let settings = settings(Span::fixed(1), Span::fixed(5_000));
        let planner = SwapPlanner::new(&IZUMI_TOKENS, &settings);
        let holdings = vec![
            Holding::new(NATIVE, 18, units("10", 18)),
            Holding::new("usdc", 6, U256::ZERO),
            Holding::new("weth", 18, U256::ZERO),
        ];

        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let plan = planner.plan(&holdings, SwapMode::Swap, &mut rng);
            assert_eq!(plan.len(), 1);
            let intent = &plan[0];
            assert_eq!(intent.token_in, NATIVE);
            assert_eq!(intent.amount_in, units("5", 18));
            assert_eq!(intent.min_amount_out, U256::ZERO);
            assert_ne!(intent.token_out, WRAPPED);
            assert_ne!(intent.token_out, NATIVE);
            assert!(IZUMI_TOKENS.get(&intent.token_out).is_some());
        }
    }

    #[test]
    fn scripted_draws_give_exact_plan() {
        let settings = settings(Span::new(1, 3), Span::new(200, 400));
        let planner = SwapPlanner::new(&IZUMI_TOKENS, &settings);
        let holdings = vec![
            Holding::new(NATIVE, 18, units("10", 18)),
            Holding::new("usdc", 6, units("100", 6)),
        ];
        // count, then (input, output, bps) per swap
        let mut rng = Scripted::new(&[2, 1, 0, 300, 0, 2, 400]);

        let plan = planner.plan(&holdings, SwapMode::Swap, &mut rng);

        assert_eq!(
            plan,
            vec![
                SwapIntent::new("usdc", NATIVE, units("3", 6)),
                SwapIntent::new(NATIVE, "weth", units("0.4", 18)),
            ]
        );
    }

    #[test]
    fn batch_never_spends_more_than_the_snapshot() {
        let settings = settings(Span::fixed(3), Span::fixed(10_000));
        let planner = SwapPlanner::new(&IZUMI_TOKENS, &settings);
        let holdings = vec![Holding::new("usdc", 6, units("100", 6))];
        let mut rng = StdRng::seed_from_u64(3);

        let plan = planner.plan(&holdings, SwapMode::Swap, &mut rng);

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].amount_in, units("100", 6));
    }

    #[test]
    fn outputs_exclude_input_and_wrapped() {
        let settings = SwapSettings::default();
        let planner = SwapPlanner::new(&IZUMI_TOKENS, &settings);

        assert_eq!(planner.eligible_outputs(NATIVE), vec!["usdc", "usdt", "weth"]);
        assert_eq!(planner.eligible_outputs("usdc"), vec![NATIVE, "usdt", "weth"]);
        assert_eq!(planner.eligible_outputs(WRAPPED), vec![NATIVE, "usdc", "usdt", "weth"]);
    }

    #[test]
    fn collect_is_a_permutation_of_plain_tokens() {
        let settings = SwapSettings::default();
        let planner = SwapPlanner::new(&IZUMI_TOKENS, &settings);
        let holdings = vec![
            Holding::new(NATIVE, 18, units("3", 18)),
            Holding::new(WRAPPED, 18, units("1", 18)),
            Holding::new("usdc", 6, units("50", 6)),
            Holding::new("usdt", 6, units("20", 6)),
            Holding::new("weth", 18, units("0.1", 18)),
        ];
        let expected: BTreeSet<&str> = ["usdc", "usdt", "weth"].into_iter().collect();
        let mut orders = BTreeSet::new();

        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let plan = planner.plan(&holdings, SwapMode::Collect, &mut rng);

            assert_eq!(plan.len(), 3);
            let sources: BTreeSet<&str> = plan.iter().map(|i| i.token_in.as_str()).collect();
            assert_eq!(sources, expected);
            for intent in &plan {
                assert_eq!(intent.token_out, NATIVE);
                let held = holdings.iter().find(|h| h.symbol == intent.token_in).unwrap();
                assert_eq!(intent.amount_in, share_of(held.balance, 9_900));
            }
            orders.insert(plan.iter().map(|i| i.token_in.clone()).collect::<Vec<_>>());
        }
        assert!(orders.len() > 1, "collect order never changed");
    }

    #[test]
    fn collect_with_only_native_and_wrapped_is_empty() {
        let settings = SwapSettings::default();
        let planner = SwapPlanner::new(&IZUMI_TOKENS, &settings);
        let holdings = vec![
            Holding::new(NATIVE, 18, units("3", 18)),
            Holding::new(WRAPPED, 18, units("1", 18)),
        ];
        let mut rng = StdRng::seed_from_u64(0);
        assert!(planner.plan(&holdings, SwapMode::Collect, &mut rng).is_empty());
    }

    #[test]
    fn empty_holdings_plan_nothing() {
        let settings = SwapSettings::default();
        let planner = SwapPlanner::new(&IZUMI_TOKENS, &settings);
        let holdings = vec![
            Holding::new(NATIVE, 18, U256::ZERO),
            Holding::new("usdc", 6, U256::ZERO),
        ];
        let mut rng = StdRng::seed_from_u64(0);

        assert!(planner.plan(&holdings, SwapMode::Swap, &mut rng).is_empty());
        assert!(planner.plan(&holdings, SwapMode::Collect, &mut rng).is_empty());
        assert!(planner.plan(&[], SwapMode::Swap, &mut rng).is_empty());
    }
}
