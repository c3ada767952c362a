// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `barbero serve` command implementation.
//!
//! Wires the full assistant: SQLite storage, Telegram channel, Gemini
//! provider, OAuth callback server, the reminder scheduler's two timed
//! jobs, and the agent loop. Supports graceful shutdown via signal
//! handlers.

use std::sync::Arc;
use std::time::Duration;

use barbero_agent::{
    AgentLoop, GatewayHandles, GatewaySuiteFactory, ReminderScheduler, shutdown,
};
use barbero_config::model::BarberoConfig;
use barbero_core::error::BarberoError;
use barbero_core::{AppointmentLog, ChannelAdapter, Notifier, StorageAdapter};
use barbero_gemini::GeminiClient;
use barbero_google::GoogleSuite;
use barbero_oauth::{AuthFlow, CallbackState};
use barbero_storage::SqliteStorage;
use barbero_telegram::TelegramChannel;
use chrono::Local;
use tracing::{error, info, warn};

/// Runs the `barbero serve` command.
pub async fn run_serve(config: BarberoConfig) -> Result<(), BarberoError> {
    init_tracing(&config.agent.log_level);

    info!("starting barbero serve");

    // Initialize storage.
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let storage: Arc<dyn StorageAdapter + Send + Sync> = Arc::new(storage);

    // Initialize the Telegram channel and start long polling.
    let mut telegram = TelegramChannel::new(config.telegram.clone()).map_err(|e| {
        error!(error = %e, "failed to initialize Telegram channel");
        eprintln!(
            "error: Telegram bot token required. Set telegram.bot_token in barbero.toml \
             or the BARBERO_TELEGRAM_BOT_TOKEN environment variable."
        );
        e
    })?;
    telegram.connect().await?;
    let telegram = Arc::new(telegram);
    let channel: Arc<dyn ChannelAdapter> = telegram.clone();
    let notifier: Arc<dyn Notifier> = telegram.clone();

    // Initialize the Gemini provider.
    let api_key = config.gemini.api_key.clone().ok_or_else(|| {
        eprintln!(
            "error: Gemini API key required. Set gemini.api_key in barbero.toml \
             or the BARBERO_GEMINI_API_KEY environment variable."
        );
        BarberoError::Config("gemini.api_key is required".into())
    })?;
    let gemini = Arc::new(GeminiClient::new(
        api_key,
        config.gemini.model.clone(),
        config.gemini.max_output_tokens,
    )?);
    info!(model = config.gemini.model.as_str(), "Gemini provider ready");

    // The OAuth flow is optional: without client credentials the bot still
    // chats, but /connect explains what is missing and the callback server
    // is not started.
    let auth_flow = match AuthFlow::new(config.google.clone()) {
        Ok(flow) => Some(Arc::new(flow)),
        Err(e) => {
            warn!(error = %e, "OAuth flow disabled");
            None
        }
    };

    // One construction path for gateway clients, shared by the agent's
    // booking tools and the reminder scheduler.
    let google_config = config.google.clone();
    let suite: GatewaySuiteFactory = Arc::new(move |credentials| {
        let suite = GoogleSuite::from_credentials(credentials, &google_config)?;
        Ok(GatewayHandles {
            calendar: Arc::new(suite.calendar),
            log: suite
                .sheets
                .map(|s| Arc::new(s) as Arc<dyn AppointmentLog>),
        })
    });

    // Install signal handler.
    let cancel = shutdown::install_signal_handler();

    // Spawn the OAuth callback server.
    if let Some(flow) = &auth_flow {
        let state = CallbackState {
            flow: flow.clone(),
            storage: storage.clone(),
        };
        let host = config.callback.host.clone();
        let port = config.callback.port;
        let cb_cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = barbero_oauth::start_server(&host, port, state, cb_cancel).await {
                error!(error = %e, "callback server terminated");
            }
        });
    } else {
        info!("callback server skipped (no OAuth client configured)");
    }

    // The reminder scheduler and its two timed jobs.
    let scheduler = Arc::new(ReminderScheduler::new(
        storage.clone(),
        notifier,
        suite.clone(),
        config.scheduler.clone(),
        config.google.calendar_id.clone(),
    ));

    spawn_reminder_poll(
        scheduler.clone(),
        config.scheduler.poll_interval_secs,
        cancel.clone(),
    );
    spawn_daily_digest(scheduler, &config.scheduler.digest_cron, cancel.clone())?;

    info!(
        poll_interval_secs = config.scheduler.poll_interval_secs,
        digest_cron = config.scheduler.digest_cron.as_str(),
        "reminder scheduler started"
    );

    // Run the agent loop until shutdown.
    let mut agent_loop = AgentLoop::new(channel, storage, gemini, auth_flow, suite, config);
    agent_loop.run(cancel).await?;

    info!("barbero serve shutdown complete");
    Ok(())
}

/// Spawns the reminder poll job on a fixed interval.
///
/// The first immediate tick is skipped so a freshly restarted process does
/// not double-fire right after a crash loop.
fn spawn_reminder_poll(
    scheduler: Arc<ReminderScheduler>,
    interval_secs: u64,
    cancel: tokio_util::sync::CancellationToken,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = scheduler.check_reminders().await {
                        warn!(error = %e, "reminder tick failed, retrying on next tick");
                    }
                }
                _ = cancel.cancelled() => {
                    info!("reminder poll shutting down");
                    break;
                }
            }
        }
    });
}

/// Spawns the daily digest job on its cron trigger (local time).
fn spawn_daily_digest(
    scheduler: Arc<ReminderScheduler>,
    digest_cron: &str,
    cancel: tokio_util::sync::CancellationToken,
) -> Result<(), BarberoError> {
    use std::str::FromStr;

    let schedule = cron::Schedule::from_str(digest_cron)
        .map_err(|e| BarberoError::Config(format!("scheduler.digest_cron is invalid: {e}")))?;

    tokio::spawn(async move {
        loop {
            let now = Local::now();
            let Some(next) = schedule.upcoming(Local).next() else {
                error!("digest cron has no next occurrence, stopping job");
                break;
            };
            let wait = (next - now).to_std().unwrap_or(Duration::from_secs(1));

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    if let Err(e) = scheduler.send_daily_summary(Local::now()).await {
                        warn!(error = %e, "daily digest failed, retrying tomorrow");
                    }
                }
                _ = cancel.cancelled() => {
                    info!("daily digest shutting down");
                    break;
                }
            }
        }
    });

    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("barbero={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
