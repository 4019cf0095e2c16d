// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration module - loads settings from environment variables.

use alloy::primitives::Address;
use std::str::FromStr;
use std::time::Duration;

/// Inclusive `min..=max` range, written as `min,max` in the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub min: u64,
    pub max: u64,
}

impl Span {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    pub const fn fixed(value: u64) -> Self {
        Self::new(value, value)
    }
}

impl FromStr for Span {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let (min, max) = match parts.as_slice() {
            [one] => (*one, *one),
            [min, max] => (*min, *max),
            _ => return Err(format!("Invalid range '{}', expected min,max", s)),
        };
        let min: u64 = min.parse().map_err(|_| format!("Invalid range start in '{}'", s))?;
        let max: u64 = max.parse().map_err(|_| format!("Invalid range end in '{}'", s))?;
        if min > max {
            return Err(format!("Range '{}' has min > max", s));
        }
        Ok(Self { min, max })
    }
}

/// How accounts are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftwareMode {
    Sequential,
    Parallel,
}

/// Knobs for one swap/collect run on an exchange.
#[derive(Debug, Clone)]
pub struct SwapSettings {
    pub swap_count: Span,
    /// Share of the input balance per swap, in basis points.
    pub swap_share_bps: Span,
    /// Share of each holding swept by collect, in basis points.
    pub collect_share_bps: u64,
    /// Seconds between swaps.
    pub pause_between_swaps: Span,
    /// Seconds after a confirmed approval.
    pub pause_after_approve: Span,
    /// Gas estimate multiplier, in percent.
    pub gas_multiplier_pct: u64,
    pub approve_gas_limit: u64,
    pub receipt_timeout: Duration,
    pub receipt_poll_interval: Duration,
    pub dry_run: bool,
}

impl Default for SwapSettings {
    fn default() -> Self {
        Self {
            swap_count: Span::new(1, 3),
            swap_share_bps: Span::new(200, 400),
            collect_share_bps: 9_900,
            pause_between_swaps: Span::new(7, 15),
            pause_after_approve: Span::new(2, 5),
            gas_multiplier_pct: 130,
            approve_gas_limit: 100_000,
            receipt_timeout: Duration::from_secs(120),
            receipt_poll_interval: Duration::from_secs(2),
            dry_run: false,
        }
    }
}

/// Main configuration for the farmer.
#[derive(Debug, Clone)]
pub struct Settings {
    // RPC
    pub rpc_url: String,
    pub chain_id: u64,

    // Contracts
    pub izumi_router: Address,
    pub izumi_fee_tier: u32,
    pub bean_router: Address,
    pub balance_reader: Address,

    // Swaps
    pub swap: SwapSettings,

    // Tasks and pacing
    pub tasks: Vec<String>,
    pub sleep_mode: bool,
    pub pause_between_tasks: Span,
    pub pause_between_accounts: Span,

    // Accounts
    pub accounts_file: String,
    pub accounts_to_work: String,
    pub software_mode: SoftwareMode,
    pub accounts_in_stream: usize,

    // Telegram
    pub telegram_notifications: bool,
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub telegram_admin_id: Option<u64>,
}

impl Settings {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let swap = SwapSettings {
            swap_count: env_span("NUMBER_OF_SWAPS", "1,3")?,
            swap_share_bps: percent_span_to_bps(&env_var_or("PERCENTAGE_TO_SWAP", "2,4"))?,
            collect_share_bps: share_to_bps(&env_var_or("COLLECT_PERCENTAGE", "99"))?,
            pause_between_swaps: env_span("PAUSE_BETWEEN_SWAPS", "7,15")?,
            pause_after_approve: env_span("PAUSE_AFTER_APPROVE", "2,5")?,
            gas_multiplier_pct: multiplier_to_pct(&env_var_or("GAS_MULTIPLIER", "1.3"))?,
            approve_gas_limit: env_var_or("APPROVE_GAS_LIMIT", "100000")
                .parse()
                .unwrap_or(100_000),
            receipt_timeout: Duration::from_secs(
                env_var_or("RECEIPT_TIMEOUT_SEC", "120").parse().unwrap_or(120),
            ),
            receipt_poll_interval: Duration::from_secs(parse_poll_secs(&env_var_or(
                "RECEIPT_POLL_SEC",
                "2",
            ))?),
            dry_run: env_bool("DRY_RUN", false),
        };

        let software_mode = match env_var_or("SOFTWARE_MODE", "1").trim() {
            "0" | "sequential" => SoftwareMode::Sequential,
            "1" | "parallel" => SoftwareMode::Parallel,
            other => return Err(format!("Invalid SOFTWARE_MODE {}", other)),
        };

        Ok(Self {
            // RPC
            rpc_url: env_var_or("MONAD_RPC_URL", "https://testnet-rpc.monad.xyz"),
            chain_id: env_var_or("CHAIN_ID", "10143").parse().unwrap_or(10143),

            // Contracts
            izumi_router: parse_address(&env_var_or(
                "IZUMI_ROUTER_ADDRESS",
                "0xf6ffe4f3fdc8bbb7f70ffd48e61f17d1e343ddfd",
            ))?,
            izumi_fee_tier: parse_fee_tier(&env_var_or("IZUMI_FEE_TIER", "3000"))?,
            bean_router: parse_address(&env_var_or(
                "BEAN_ROUTER_ADDRESS",
                "0xCa810D095e90Daae6e867c19DF6D9A8C56db2c89",
            ))?,
            balance_reader: parse_address(&env_var_or(
                "BALANCE_READER_ADDRESS",
                "0xe1bEECa48cA52f9475A27891844022d4C49FFde1",
            ))?,

            swap,

            // Tasks and pacing
            tasks: env_list("TASKS", "IzumiDex"),
            sleep_mode: env_bool("SLEEP_MODE", false),
            pause_between_tasks: env_span("SLEEP_TIME_MODULES", "5,10")?,
            pause_between_accounts: env_span("SLEEP_TIME_ACCOUNTS", "60,120")?,

            // Accounts
            accounts_file: env_var_or("ACCOUNTS_FILE", "data/accounts.json"),
            accounts_to_work: env_var_or("ACCOUNTS_TO_WORK", "0"),
            software_mode,
            accounts_in_stream: env_var_or("ACCOUNTS_IN_STREAM", "0").parse().unwrap_or(0),

            // Telegram
            telegram_notifications: env_bool("TELEGRAM_NOTIFICATIONS", false),
            telegram_token: std::env::var("TELEGRAM_BOT_TOKEN").ok(),
            telegram_chat_id: std::env::var("TELEGRAM_CHAT_ID").ok(),
            telegram_admin_id: std::env::var("TELEGRAM_ADMIN_ID")
                .ok()
                .and_then(|id| id.trim().parse().ok()),
        })
    }
}

fn env_var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_span(name: &str, default: &str) -> Result<Span, String> {
    env_var_or(name, default)
        .parse()
        .map_err(|e| format!("{}: {}", name, e))
}

fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name).ok().map(|s| s.trim().to_lowercase()) {
        Some(v) if ["1", "true", "yes", "on"].contains(&v.as_str()) => true,
        Some(v) if ["0", "false", "no", "off"].contains(&v.as_str()) => false,
        _ => default,
    }
}

fn env_list(name: &str, default: &str) -> Vec<String> {
    env_var_or(name, default)
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_address(s: &str) -> Result<Address, String> {
    Address::from_str(s).map_err(|e| format!("Invalid address {}: {}", s, e))
}

/// `"2.5"` percent → 250 basis points.
fn percent_to_bps(s: &str) -> Result<u64, String> {
    let pct: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid percentage {}", s))?;
    if !pct.is_finite() || pct < 0.0 {
        return Err(format!("Invalid percentage {}", s));
    }
    Ok((pct * 100.0).round() as u64)
}

/// A percentage of one holding, at most 100.
fn share_to_bps(s: &str) -> Result<u64, String> {
    let bps = percent_to_bps(s)?;
    if bps > 10_000 {
        return Err(format!("Percentage {} is above 100", s));
    }
    Ok(bps)
}

/// Fee tiers are packed into the iZi path as 3 bytes.
fn parse_fee_tier(s: &str) -> Result<u32, String> {
    match s.trim().parse::<u32>() {
        Ok(fee) if fee <= 0xFF_FFFF => Ok(fee),
        _ => Err(format!("Invalid IZUMI_FEE_TIER {}", s)),
    }
}

fn parse_poll_secs(s: &str) -> Result<u64, String> {
    match s.trim().parse::<u64>() {
        Ok(secs) if secs >= 1 => Ok(secs),
        _ => Err(format!("Invalid RECEIPT_POLL_SEC {}, expected at least 1", s)),
    }
}

/// `"1.3"` multiplier → 130 percent.
fn multiplier_to_pct(s: &str) -> Result<u64, String> {
    let pct = percent_to_bps(s).map_err(|_| format!("Invalid multiplier {}", s))?;
    if pct < 100 {
        return Err(format!("Gas multiplier {} is below 1.0", s));
    }
    Ok(pct)
}

fn percent_span_to_bps(s: &str) -> Result<Span, String> {
    let parts: Vec<&str> = s.split(',').collect();
    let (min, max) = match parts.as_slice() {
        [one] => (percent_to_bps(one)?, percent_to_bps(one)?),
        [min, max] => (percent_to_bps(min)?, percent_to_bps(max)?),
        _ => return Err(format!("Invalid percentage range {}", s)),
    };
    if min > max || max > 10_000 {
        return Err(format!("Invalid percentage range {}", s));
    }
    Ok(Span::new(min, max))
}

#[cfg(test)]
impl Settings {
    /// Defaults with every pause set to zero and short receipt polling.
    pub fn for_tests() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            chain_id: 10143,
            izumi_router: Address::repeat_byte(0x11),
            izumi_fee_tier: 3000,
            bean_router: Address::repeat_byte(0x22),
            balance_reader: Address::repeat_byte(0x33),
            swap: SwapSettings {
                pause_between_swaps: Span::fixed(0),
                pause_after_approve: Span::fixed(0),
                receipt_timeout: Duration::from_millis(200),
                receipt_poll_interval: Duration::from_millis(10),
                ..SwapSettings::default()
            },
            tasks: vec!["IzumiDex".to_string()],
            sleep_mode: false,
            pause_between_tasks: Span::fixed(0),
            pause_between_accounts: Span::fixed(0),
            accounts_file: "data/accounts.json".to_string(),
            accounts_to_work: "0".to_string(),
            software_mode: SoftwareMode::Sequential,
            accounts_in_stream: 0,
            telegram_notifications: false,
            telegram_token: None,
            telegram_chat_id: None,
            telegram_admin_id: None,
        }
    }
}
