// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./barbero.toml` > `~/.config/barbero/barbero.toml`
//! > `/etc/barbero/barbero.toml` with environment variable overrides via
//! `BARBERO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::BarberoConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/barbero/barbero.toml` (system-wide)
/// 3. `~/.config/barbero/barbero.toml` (user XDG config)
/// 4. `./barbero.toml` (local directory)
/// 5. `BARBERO_*` environment variables
pub fn load_config() -> Result<BarberoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BarberoConfig::default()))
        .merge(Toml::file("/etc/barbero/barbero.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("barbero/barbero.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("barbero.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and for callers that carry their own config source.
pub fn load_config_from_str(toml_content: &str) -> Result<BarberoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BarberoConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<BarberoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BarberoConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `BARBERO_TELEGRAM_BOT_TOKEN` must map to
/// `telegram.bot_token`, not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("BARBERO_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: BARBERO_GOOGLE_CLIENT_SECRET -> "google_client_secret"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("telegram_", "telegram.", 1)
            .replacen("gemini_", "gemini.", 1)
            .replacen("google_", "google.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("scheduler_", "scheduler.", 1)
            .replacen("callback_", "callback.", 1);
        mapped.into()
    })
}
