// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Account selection and worker lanes.

use crate::accounts::{load_accounts, Account};
use crate::config::{Settings, SoftwareMode};
use crate::rpc::{create_provider, RpcChainClient, RpcConfig};
use crate::runner::AccountRunner;
use crate::strategies::draw_pause;
use crate::telegram::TelegramNotifier;
use futures_util::stream::{self, StreamExt};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Which accounts to work, 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountSelection {
    All,
    Indices(Vec<usize>),
}

impl FromStr for AccountSelection {
    type Err = String;

    /// `0` all, `N` one, `A,B,C` a list, `A-B` an inclusive range.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let index = |part: &str| -> Result<usize, String> {
            match part.trim().parse::<usize>() {
                Ok(0) | Err(_) => Err(format!("Invalid account number '{}' in '{}'", part, s)),
                Ok(n) => Ok(n),
            }
        };

        if s == "0" {
            return Ok(Self::All);
        }
        if let Some((start, end)) = s.split_once('-') {
            let (start, end) = (index(start)?, index(end)?);
            if start > end {
                return Err(format!("Invalid account range '{}'", s));
            }
            return Ok(Self::Indices((start..=end).collect()));
        }
        s.split(',')
            .map(index)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::Indices)
    }
}

impl AccountSelection {
    pub fn select(&self, accounts: &[Account]) -> Result<Vec<Account>, String> {
        match self {
            Self::All => Ok(accounts.to_vec()),
            Self::Indices(indices) => indices
                .iter()
                .map(|&i| {
                    i.checked_sub(1)
                        .and_then(|j| accounts.get(j))
                        .cloned()
                        .ok_or_else(|| {
                            format!("Account {} does not exist ({} loaded)", i, accounts.len())
                        })
                })
                .collect(),
        }
    }
}

pub struct Process {
    settings: Arc<Settings>,
    notifier: TelegramNotifier,
    stop: Arc<AtomicBool>,
}

impl Process {
    pub fn new(settings: Arc<Settings>, notifier: TelegramNotifier, stop: Arc<AtomicBool>) -> Self {
        Self {
            settings,
            notifier,
            stop,
        }
    }

    /// Load the account store, apply the selection and run every lane.
    pub async fn run(&self) -> Result<(), String> {
        let accounts = load_accounts(&self.settings.accounts_file)?;
        let selection: AccountSelection = self.settings.accounts_to_work.parse()?;
        let accounts = selection.select(&accounts)?;
        if accounts.is_empty() {
            warn!("⚠️ No accounts selected");
            return Ok(());
        }

        info!(
            "🚀 Working {} account(s) in {:?} mode",
            accounts.len(),
            self.settings.software_mode
        );
        self.notifier
            .notify(format!("🚀 Farming started for {} account(s)", accounts.len()));

        match self.settings.software_mode {
            SoftwareMode::Sequential => self.run_sequential(accounts).await,
            SoftwareMode::Parallel => self.run_parallel(accounts).await,
        }

        info!("🏁 All accounts finished");
        self.notifier.notify("🏁 Farming finished".to_string());
        Ok(())
    }

    async fn run_sequential(&self, accounts: Vec<Account>) {
        let mut rng = StdRng::from_entropy();
        let total = accounts.len();
        for (i, account) in accounts.into_iter().enumerate() {
            if self.stop.load(Ordering::SeqCst) {
                warn!("🛑 Stop requested, skipping remaining accounts");
                break;
            }
            self.lane(account).await;

            if self.settings.sleep_mode && i + 1 < total {
                let pause = draw_pause(self.settings.pause_between_accounts, &mut rng);
                info!("💤 Sleeping {}s before next account", pause.as_secs());
                tokio::time::sleep(pause).await;
            }
        }
    }

    async fn run_parallel(&self, accounts: Vec<Account>) {
        let limit = match self.settings.accounts_in_stream {
            0 => accounts.len(),
            n => n,
        };
        stream::iter(accounts.into_iter().map(|account| self.lane(account)))
            .buffer_unordered(limit.max(1))
            .collect::<Vec<()>>()
            .await;
    }

    /// One account with its own provider, proxy and client.
    async fn lane(&self, account: Account) {
        if self.stop.load(Ordering::SeqCst) {
            return;
        }
        let provider = match create_provider(&RpcConfig {
            rpc_url: self.settings.rpc_url.clone(),
            proxy: account.proxy.clone(),
        }) {
            Ok(provider) => provider,
            Err(e) => {
                error!("[{}] ❌ Setup failed: {}", account.name, e);
                return;
            }
        };

        let runner = AccountRunner::new(
            self.settings.clone(),
            Arc::new(RpcChainClient::new(provider)),
            account,
            self.notifier.clone(),
            self.stop.clone(),
        );
        let mut rng = StdRng::from_entropy();
        runner.run(&mut rng).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn accounts(n: usize) -> Vec<Account> {
        (1..=n)
            .map(|i| Account::new(&format!("acc-{i}"), KEY, None).unwrap())
            .collect()
    }

    fn names(accounts: &[Account]) -> Vec<String> {
        accounts.iter().map(|a| a.name.clone()).collect()
    }

    #[test]
    fn selection_forms() {
        assert_eq!("0".parse::<AccountSelection>().unwrap(), AccountSelection::All);
        assert_eq!(
            "3".parse::<AccountSelection>().unwrap(),
            AccountSelection::Indices(vec![3])
        );
        assert_eq!(
            "1, 4,2".parse::<AccountSelection>().unwrap(),
            AccountSelection::Indices(vec![1, 4, 2])
        );
        assert_eq!(
            "2-4".parse::<AccountSelection>().unwrap(),
            AccountSelection::Indices(vec![2, 3, 4])
        );
        assert!("4-2".parse::<AccountSelection>().is_err());
        assert!("1,0".parse::<AccountSelection>().is_err());
        assert!("x".parse::<AccountSelection>().is_err());
    }

    #[test]
    fn selection_picks_one_based_accounts() {
        let all = accounts(5);
        let picked = AccountSelection::Indices(vec![2, 5]).select(&all).unwrap();
        assert_eq!(names(&picked), vec!["acc-2", "acc-5"]);
        assert_eq!(AccountSelection::All.select(&all).unwrap().len(), 5);
        assert!(AccountSelection::Indices(vec![6]).select(&all).is_err());
    }

    #[tokio::test]
    async fn bad_proxy_is_contained_to_its_lane() {
        let mut settings = Settings::for_tests();
        settings.tasks = Vec::new();
        let process = Process::new(
            Arc::new(settings),
            TelegramNotifier::disabled(),
            Arc::new(AtomicBool::new(false)),
        );
        let mut broken = Account::new("broken", KEY, None).unwrap();
        broken.proxy = Some("http://[::1".to_string());

        // Neither lane touches the network: one fails setup, the other has no tasks.
        process
            .run_parallel(vec![broken, Account::new("ok", KEY, None).unwrap()])
            .await;
    }
}
