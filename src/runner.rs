// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Account runner - executes the configured task list for one account.

use crate::accounts::Account;
use crate::config::Settings;
use crate::error::SwapError;
use crate::executor::{DexSwapper, Exchange, ExchangeKind, SwapReport};
use crate::rpc::ChainClient;
use crate::strategies::{draw_pause, shuffle, RandomSource, SwapMode};
use crate::telegram::TelegramNotifier;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    IzumiSwap,
    BeanSwap,
    IzumiCollect,
    BeanCollect,
}

impl Task {
    pub fn exchange(&self) -> ExchangeKind {
        match self {
            Self::IzumiSwap | Self::IzumiCollect => ExchangeKind::Izumi,
            Self::BeanSwap | Self::BeanCollect => ExchangeKind::Bean,
        }
    }

    pub fn mode(&self) -> SwapMode {
        match self {
            Self::IzumiSwap | Self::BeanSwap => SwapMode::Swap,
            Self::IzumiCollect | Self::BeanCollect => SwapMode::Collect,
        }
    }
}

impl FromStr for Task {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "IzumiDex" => Ok(Self::IzumiSwap),
            "BeanDex" => Ok(Self::BeanSwap),
            "collect_izumi" => Ok(Self::IzumiCollect),
            "collect_bean" => Ok(Self::BeanCollect),
            other => Err(SwapError::Config(format!("Unknown task {}", other))),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::IzumiSwap => "IzumiDex",
            Self::BeanSwap => "BeanDex",
            Self::IzumiCollect => "collect_izumi",
            Self::BeanCollect => "collect_bean",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub enum TaskOutcome {
    Done(SwapReport),
    NoAction,
    Failed(SwapError),
}

#[derive(Debug)]
pub struct TaskRecord {
    pub task: Task,
    pub outcome: TaskOutcome,
}

/// Parse task identifiers, logging and dropping unknown ones.
pub fn parse_tasks(names: &[String]) -> Vec<Task> {
    names
        .iter()
        .filter_map(|name| match name.parse::<Task>() {
            Ok(task) => Some(task),
            Err(e) => {
                error!("❌ {}, skipping", e);
                None
            }
        })
        .collect()
}

pub struct AccountRunner {
    settings: Arc<Settings>,
    client: Arc<dyn ChainClient>,
    account: Account,
    notifier: TelegramNotifier,
    stop: Arc<AtomicBool>,
}

impl AccountRunner {
    pub fn new(
        settings: Arc<Settings>,
        client: Arc<dyn ChainClient>,
        account: Account,
        notifier: TelegramNotifier,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            settings,
            client,
            account,
            notifier,
            stop,
        }
    }

    /// Run every configured task once, in random order.
    pub async fn run(&self, rng: &mut dyn RandomSource) -> Vec<TaskRecord> {
        let mut tasks = parse_tasks(&self.settings.tasks);
        if tasks.is_empty() {
            warn!("[{}] ⚠️ No tasks configured, nothing to do", self.account.name);
            return Vec::new();
        }
        shuffle(&mut tasks, rng);
        info!(
            "[{}] 🚀 Starting {} task(s) for {:?}",
            self.account.name,
            tasks.len(),
            self.account.address()
        );

        let mut records = Vec::with_capacity(tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            if self.stop.load(Ordering::SeqCst) {
                warn!("[{}] 🛑 Stop requested, skipping remaining tasks", self.account.name);
                break;
            }

            let outcome = self.run_task(*task, rng).await;
            self.notifier.notify(self.summary(*task, &outcome));
            records.push(TaskRecord {
                task: *task,
                outcome,
            });

            if i + 1 < tasks.len() {
                let pause = draw_pause(self.settings.pause_between_tasks, rng);
                info!("[{}] 💤 Sleeping {}s before next task", self.account.name, pause.as_secs());
                tokio::time::sleep(pause).await;
            }
        }
        records
    }

    async fn run_task(&self, task: Task, rng: &mut dyn RandomSource) -> TaskOutcome {
        info!("[{}] ▶️ {}", self.account.name, task);
        let swapper = DexSwapper::new(
            &self.account.name,
            Exchange::for_kind(task.exchange(), &self.settings),
            self.client.clone(),
            self.account.wallet(),
            self.account.address(),
            self.settings.chain_id,
            self.settings.swap.clone(),
        );

        match swapper.run(task.mode(), rng).await {
            Ok(report) if report.is_empty() => {
                info!("[{}] 💤 {}: no action", self.account.name, task);
                TaskOutcome::NoAction
            }
            Ok(report) => {
                info!(
                    "[{}] ✅ {} finished: {} planned, {} confirmed, {} failed",
                    self.account.name,
                    task,
                    report.planned,
                    report.hashes.len(),
                    report.failures
                );
                TaskOutcome::Done(report)
            }
            Err(e) => {
                error!("[{}] ❌ {} failed: {}", self.account.name, task, e);
                TaskOutcome::Failed(e)
            }
        }
    }

    fn summary(&self, task: Task, outcome: &TaskOutcome) -> String {
        match outcome {
            TaskOutcome::Done(report) => format!(
                "✅ {} | {}\n{} confirmed, {} failed",
                self.account.name,
                task,
                report.hashes.len(),
                report.failures
            ),
            TaskOutcome::NoAction => format!("💤 {} | {}: no action", self.account.name, task),
            TaskOutcome::Failed(e) => format!("❌ {} | {} failed\n{}", self.account.name, task, e),
        }
    }
}
