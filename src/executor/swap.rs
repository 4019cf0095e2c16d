// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Swap and collect runs on one exchange for one account.

use crate::config::SwapSettings;
use crate::error::Result;
use crate::executor::approval::ApprovalManager;
use crate::executor::builder::{SwapCall, TxBuilder};
use crate::executor::engine::ExecutionEngine;
use crate::executor::exchange::Exchange;
use crate::rpc::ChainClient;
use crate::strategies::{draw_pause, Holding, RandomSource, SwapIntent, SwapMode, SwapPlanner};
use crate::tokens::{display_amount, NATIVE, NATIVE_DECIMALS};
use alloy::network::EthereumWallet;
use alloy::primitives::{Address, B256};
use std::sync::Arc;
use tracing::{error, info};

/// Outcome of one swap or collect run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwapReport {
    pub planned: usize,
    pub hashes: Vec<B256>,
    pub failures: usize,
}

impl SwapReport {
    pub fn is_empty(&self) -> bool {
        self.planned == 0
    }
}

/// Drives planner, builder, approvals and engine against one exchange.
pub struct DexSwapper {
    label: String,
    exchange: Exchange,
    client: Arc<dyn ChainClient>,
    builder: TxBuilder,
    engine: ExecutionEngine,
    settings: SwapSettings,
}

impl DexSwapper {
    pub fn new(
        label: &str,
        exchange: Exchange,
        client: Arc<dyn ChainClient>,
        wallet: EthereumWallet,
        owner: Address,
        chain_id: u64,
        settings: SwapSettings,
    ) -> Self {
        let builder = TxBuilder::new(client.clone(), owner, chain_id, settings.gas_multiplier_pct);
        let engine = ExecutionEngine::new(
            client.clone(),
            wallet,
            settings.receipt_timeout,
            settings.receipt_poll_interval,
        );
        Self {
            label: label.to_string(),
            exchange,
            client,
            builder,
            engine,
            settings,
        }
    }

    /// Native balance followed by every registry token, read fresh.
    pub async fn holdings(&self) -> Result<Vec<Holding>> {
        let owner = self.builder.owner();
        let mut holdings = vec![Holding::new(
            NATIVE,
            NATIVE_DECIMALS,
            self.client.native_balance(owner).await?,
        )];
        for token in self.exchange.registry.tokens() {
            let balance = self.client.token_balance(token.address, owner).await?;
            holdings.push(Holding::new(token.symbol, token.decimals, balance));
        }
        Ok(holdings)
    }

    pub async fn run(&self, mode: SwapMode, rng: &mut dyn RandomSource) -> Result<SwapReport> {
        if self.settings.dry_run {
            return self.dry_run(mode, rng).await;
        }
        match mode {
            SwapMode::Swap => self.run_swaps(rng).await,
            SwapMode::Collect => self.run_collect(rng).await,
        }
    }

    async fn run_swaps(&self, rng: &mut dyn RandomSource) -> Result<SwapReport> {
        let planner = SwapPlanner::new(self.exchange.registry, &self.settings);
        let count = planner.draw_swap_count(rng);
        info!(
            "[{}] 🎲 {} swap(s) planned on {}",
            self.label,
            count,
            self.exchange.name()
        );

        let mut report = SwapReport::default();
        for i in 0..count {
            // Re-read before each swap so earlier swaps are reflected.
            let holdings = self.holdings().await?;
            let Some(intent) = planner.plan_swap(&holdings, rng) else {
                continue;
            };
            report.planned += 1;
            self.record(&mut report, &intent, rng).await;

            if i + 1 < count {
                tokio::time::sleep(draw_pause(self.settings.pause_between_swaps, rng)).await;
            }
        }
        Ok(report)
    }

    async fn run_collect(&self, rng: &mut dyn RandomSource) -> Result<SwapReport> {
        let planner = SwapPlanner::new(self.exchange.registry, &self.settings);
        let holdings = self.holdings().await?;
        let intents = planner.plan_collect(&holdings, rng);

        let mut report = SwapReport {
            planned: intents.len(),
            ..SwapReport::default()
        };
        for (i, intent) in intents.iter().enumerate() {
            self.record(&mut report, intent, rng).await;
            if i + 1 < intents.len() {
                tokio::time::sleep(draw_pause(self.settings.pause_between_swaps, rng)).await;
            }
        }
        Ok(report)
    }

    /// Plan the whole batch from one snapshot and prepare every call
    /// without sending anything.
    async fn dry_run(&self, mode: SwapMode, rng: &mut dyn RandomSource) -> Result<SwapReport> {
        let planner = SwapPlanner::new(self.exchange.registry, &self.settings);
        let holdings = self.holdings().await?;
        for holding in holdings.iter().filter(|h| !h.balance.is_zero()) {
            info!("[{}] 💰 {} {}", self.label, holding.human(), holding.symbol);
        }
        let intents = planner.plan(&holdings, mode, rng);

        for intent in &intents {
            let call = self.builder.prepare(&self.exchange, intent)?;
            info!(
                "[{}] 🧪 DRY RUN {}: {} -> to {:?}, value {}, {} bytes, approval {}",
                self.label,
                self.exchange.name(),
                self.describe(intent),
                call.to,
                call.value,
                call.input.len(),
                call.approval.is_some()
            );
        }
        Ok(SwapReport {
            planned: intents.len(),
            ..SwapReport::default()
        })
    }

    async fn record(&self, report: &mut SwapReport, intent: &SwapIntent, rng: &mut dyn RandomSource) {
        match self.execute(intent, rng).await {
            Ok(hash) => {
                info!(
                    "[{}] ✅ {} {}: {:?}",
                    self.label,
                    self.exchange.name(),
                    self.describe(intent),
                    hash
                );
                report.hashes.push(hash);
            }
            Err(e) => {
                error!(
                    "[{}] ❌ {} {} failed: {}",
                    self.label,
                    self.exchange.name(),
                    self.describe(intent),
                    e
                );
                if let Some(hash) = e.tx_hash() {
                    error!("[{}] 🔗 Failed tx: {:?}", self.label, hash);
                }
                report.failures += 1;
            }
        }
    }

    /// Prepare, approve if needed, price, then execute.
    pub async fn execute(&self, intent: &SwapIntent, rng: &mut dyn RandomSource) -> Result<B256> {
        let call = self.builder.prepare(&self.exchange, intent)?;
        self.approve_if_needed(&call, rng).await?;
        let tx = self.builder.build(&call).await?;
        self.engine.execute(tx).await
    }

    async fn approve_if_needed(&self, call: &SwapCall, rng: &mut dyn RandomSource) -> Result<()> {
        let Some(approval) = &call.approval else {
            return Ok(());
        };
        let approvals =
            ApprovalManager::new(&self.builder, &self.engine, self.settings.approve_gas_limit);
        let sent = approvals
            .ensure_allowance(approval.token, approval.spender, approval.amount)
            .await?;
        if sent.is_some() {
            tokio::time::sleep(draw_pause(self.settings.pause_after_approve, rng)).await;
        }
        Ok(())
    }

    fn describe(&self, intent: &SwapIntent) -> String {
        let amount = match self.exchange.registry.decimals(&intent.token_in) {
            Ok(decimals) => display_amount(intent.amount_in, decimals, 4),
            Err(_) => intent.amount_in.to_string(),
        };
        format!("{} {} -> {}", amount, intent.token_in, intent.token_out)
    }
}
