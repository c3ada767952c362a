// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Barbero scheduling assistant.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Barbero configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BarberoConfig {
    /// Agent identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Gemini API settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Google Calendar / Sheets / OAuth settings.
    #[serde(default)]
    pub google: GoogleConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Reminder scheduler settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// OAuth callback server settings.
    #[serde(default)]
    pub callback: CallbackConfig,
}

/// Agent identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "barbero".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. `None` disables the Telegram channel.
    #[serde(default)]
    pub bot_token: Option<String>,
}

/// Gemini API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// Gemini API key. `None` requires environment variable override.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model to use for conversation and tool calling.
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_max_output_tokens() -> u32 {
    2048
}

/// Google Calendar / Sheets / OAuth configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GoogleConfig {
    /// Calendar to schedule against.
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,

    /// Spreadsheet receiving the appointment log. `None` disables logging.
    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    /// A1 range the appointment log appends to.
    #[serde(default = "default_sheet_range")]
    pub sheet_range: String,

    /// IANA timezone new events are created in.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// OAuth client id. Required for the `/connect` flow.
    #[serde(default)]
    pub client_id: Option<String>,

    /// OAuth client secret.
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Token exchange endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,

    /// Authorization endpoint the consent link points at.
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,

    /// Redirect URI registered with the OAuth client. Must match the
    /// callback server's public address.
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,

    /// Scopes requested during the consent flow.
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            calendar_id: default_calendar_id(),
            spreadsheet_id: None,
            sheet_range: default_sheet_range(),
            time_zone: default_time_zone(),
            client_id: None,
            client_secret: None,
            token_uri: default_token_uri(),
            auth_uri: default_auth_uri(),
            redirect_uri: default_redirect_uri(),
            scopes: default_scopes(),
        }
    }
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

fn default_sheet_range() -> String {
    "Hoja 1!A:I".to_string()
}

fn default_time_zone() -> String {
    "America/Bogota".to_string()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_auth_uri() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".to_string()
}

fn default_redirect_uri() -> String {
    "http://localhost:8000/auth/callback".to_string()
}

fn default_scopes() -> Vec<String> {
    vec![
        "https://www.googleapis.com/auth/calendar".to_string(),
        "https://www.googleapis.com/auth/spreadsheets".to_string(),
        "openid".to_string(),
        "https://www.googleapis.com/auth/userinfo.email".to_string(),
        "https://www.googleapis.com/auth/userinfo.profile".to_string(),
    ]
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("barbero").join("barbero.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("barbero.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Reminder scheduler configuration.
///
/// The reminder windows are inclusive minute ranges wide enough to tolerate
/// poll jitter: with a 10-minute poll interval, an event crosses each window
/// on at least one tick.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Seconds between reminder poll ticks.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Cron expression (seconds-first, local time) for the daily digest.
    #[serde(default = "default_digest_cron")]
    pub digest_cron: String,

    /// Inclusive minutes-to-start window for the customer reminder.
    #[serde(default = "default_customer_window")]
    pub customer_window_mins: [i64; 2],

    /// Inclusive minutes-to-start window for the admin alert.
    #[serde(default = "default_admin_window")]
    pub admin_window_mins: [i64; 2],

    /// Hours of calendar look-ahead per poll tick.
    #[serde(default = "default_lookahead_hours")]
    pub lookahead_hours: i64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            digest_cron: default_digest_cron(),
            customer_window_mins: default_customer_window(),
            admin_window_mins: default_admin_window(),
            lookahead_hours: default_lookahead_hours(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    600 // 10 minutes
}

fn default_digest_cron() -> String {
    "0 0 8 * * *".to_string()
}

fn default_customer_window() -> [i64; 2] {
    [50, 70]
}

fn default_admin_window() -> [i64; 2] {
    [10, 20]
}

fn default_lookahead_hours() -> i64 {
    2
}

/// OAuth callback server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CallbackConfig {
    /// Address to bind the callback server to.
    #[serde(default = "default_callback_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_callback_port")]
    pub port: u16,
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self {
            host: default_callback_host(),
            port: default_callback_port(),
        }
    }
}

fn default_callback_host() -> String {
    "127.0.0.1".to_string()
}

fn default_callback_port() -> u16 {
    8000
}
