// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Provider setup for Monad RPC, optionally through a per-lane proxy.

use alloy::{
    providers::{Provider, ProviderBuilder},
    rpc::client::RpcClient,
    transports::http::{reqwest::Url, Http},
};
use std::time::Duration;

const HTTP_TIMEOUT_SECS: u64 = 30;

/// Configuration for one RPC connection.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub rpc_url: String,
    pub proxy: Option<String>,
}

/// Create a read/submit provider. Signing happens locally in the execution
/// engine, so no wallet filler is attached.
pub fn create_provider(config: &RpcConfig) -> Result<impl Provider + Clone, String> {
    let url: Url = config
        .rpc_url
        .parse()
        .map_err(|e| format!("Invalid RPC URL: {e}"))?;

    let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(HTTP_TIMEOUT_SECS));
    if let Some(proxy) = config.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
        let proxy = reqwest::Proxy::all(proxy_url(proxy))
            .map_err(|e| format!("Invalid proxy {proxy}: {e}"))?;
        builder = builder.proxy(proxy);
    }
    let http = builder
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {e}"))?;

    let client = RpcClient::new(Http::with_client(http, url), false);

    Ok(ProviderBuilder::new()
        .disable_recommended_fillers()
        .connect_client(client))
}

/// Accept `host:port`, `user:pass@host:port` or a full proxy URL.
pub fn proxy_url(proxy: &str) -> String {
    let proxy = proxy.trim();
    if proxy.contains("://") {
        proxy.to_string()
    } else {
        format!("http://{proxy}")
    }
}
