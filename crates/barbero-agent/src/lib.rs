// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent loop and scheduling core for the Barbero assistant.
//!
//! The [`AgentLoop`] is the central coordinator that:
//! - Receives messages from the channel adapter
//! - Handles the `/start`, `/setup`, `/connect`, and `/reset` commands
//! - Gates free-text conversation on the tenant state (configured admin
//!   with connected calendar)
//! - Drives the Gemini tool-calling cycle against the booking tools
//! - Alerts the owner when a customer books
//!
//! The [`ReminderScheduler`] runs alongside it on its own timers.

pub mod dedup;
pub mod prompts;
pub mod reminders;
pub mod session;
pub mod shutdown;
pub mod tools;

use std::sync::Arc;

use barbero_config::model::BarberoConfig;
use barbero_core::error::BarberoError;
use barbero_core::types::{
    InboundMessage, MessageContent, OutboundMessage, StoredCredentials, TenantState,
};
use barbero_core::{ChannelAdapter, StorageAdapter};
use barbero_gemini::types::{Content, FunctionCall, Part};
use barbero_gemini::GeminiClient;
use barbero_oauth::AuthFlow;
use chrono::Local;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::session::{Role, SessionStore};
use crate::tools::BookingTools;

pub use crate::dedup::{Audience, NotificationLedger};
pub use crate::reminders::{GatewayHandles, GatewaySuiteFactory, ReminderScheduler};

/// Upper bound on tool rounds within one user turn.
const MAX_TOOL_ROUNDS: usize = 6;

/// Fallback reply when the model or a gateway misbehaves mid-turn.
const APOLOGY: &str = "Lo siento, tuve un problema procesando tu mensaje. Intenta de nuevo.";

/// The main agent loop coordinating channel, model, storage, and gateways.
pub struct AgentLoop {
    channel: Arc<dyn ChannelAdapter>,
    storage: Arc<dyn StorageAdapter + Send + Sync>,
    gemini: Arc<GeminiClient>,
    /// `None` when OAuth client credentials are not configured; `/connect`
    /// then explains what is missing instead of producing a link.
    auth_flow: Option<Arc<AuthFlow>>,
    suite: GatewaySuiteFactory,
    config: BarberoConfig,
    sessions: SessionStore,
}

impl AgentLoop {
    pub fn new(
        channel: Arc<dyn ChannelAdapter>,
        storage: Arc<dyn StorageAdapter + Send + Sync>,
        gemini: Arc<GeminiClient>,
        auth_flow: Option<Arc<AuthFlow>>,
        suite: GatewaySuiteFactory,
        config: BarberoConfig,
    ) -> Self {
        info!(agent_name = config.agent.name.as_str(), "agent loop initialized");
        Self {
            channel,
            storage,
            gemini,
            auth_flow,
            suite,
            config,
            sessions: SessionStore::new(),
        }
    }

    /// Runs the main agent loop until the cancellation token is triggered.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), BarberoError> {
        info!("agent loop running");

        loop {
            tokio::select! {
                msg = self.channel.receive() => {
                    match msg {
                        Ok(inbound) => {
                            if let Err(e) = self.handle_inbound(inbound).await {
                                error!(error = %e, "failed to handle inbound message");
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "channel receive error");
                            if e.to_string().contains("closed") {
                                break;
                            }
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping agent loop");
                    break;
                }
            }
        }

        self.storage.close().await?;
        info!("agent loop stopped");
        Ok(())
    }

    /// Handles a single inbound message: command dispatch or conversation.
    pub async fn handle_inbound(&mut self, inbound: InboundMessage) -> Result<(), BarberoError> {
        debug!(
            sender_id = inbound.sender_id.as_str(),
            chat_id = inbound.chat_id.as_str(),
            "handling inbound message"
        );

        if let MessageContent::Text(text) = &inbound.content
            && let Some(command) = text.trim().split_whitespace().next()
            && command.starts_with('/')
        {
            let command = command.to_string();
            return self.handle_command(&command, &inbound).await;
        }

        if let Err(e) = self.conversation(&inbound).await {
            warn!(error = %e, "conversation turn failed");
            self.reply(&inbound, APOLOGY, false).await;
        }
        Ok(())
    }

    async fn handle_command(
        &mut self,
        command: &str,
        inbound: &InboundMessage,
    ) -> Result<(), BarberoError> {
        info!(command, sender_id = inbound.sender_id.as_str(), "command received");
        match command {
            "/start" => {
                let text = if self.storage.admin_chat_id().await?.is_none() {
                    "👋 ¡Bienvenido!\n\n\
                     Este bot necesita configurarse por primera vez.\n\
                     Si eres el dueño de esta barbería, escribe /setup para comenzar."
                } else {
                    "¡Hola! Soy el asistente virtual de la barbería. ¿En qué puedo ayudarte hoy?"
                };
                self.reply(inbound, text, false).await;
            }
            "/setup" => {
                let registered = self
                    .storage
                    .register_admin(
                        &inbound.sender_id,
                        inbound.sender_username.as_deref(),
                        inbound.sender_first_name.as_deref(),
                        None,
                    )
                    .await?;
                if registered {
                    let name = inbound.sender_first_name.as_deref().unwrap_or("listo");
                    info!(admin = inbound.sender_id.as_str(), "admin registered");
                    let text = format!(
                        "✅ ¡Perfecto, {name}! Ahora eres el administrador de este bot.\n\n\
                         El siguiente paso es conectar tu Google Calendar.\n\
                         Escribe /connect para hacerlo."
                    );
                    self.reply(inbound, &text, false).await;
                } else {
                    self.reply(inbound, "⛔ Este bot ya tiene un dueño configurado.", false)
                        .await;
                }
            }
            "/connect" => {
                let Some(admin) = self.storage.admin_chat_id().await? else {
                    self.reply(inbound, "⚠️ Primero debes configurar el bot con /setup.", false)
                        .await;
                    return Ok(());
                };
                if inbound.sender_id != admin {
                    self.reply(
                        inbound,
                        "⛔ Este comando es solo para el administrador del bot.",
                        false,
                    )
                    .await;
                    return Ok(());
                }
                match &self.auth_flow {
                    Some(flow) => {
                        let url = flow.authorization_url(&inbound.sender_id)?;
                        let text = format!(
                            "Para agendar citas necesito permiso de acceso a tu Google Calendar.\n\n\
                             Autoriza el acceso en este enlace:\n{url}"
                        );
                        self.reply(inbound, &text, false).await;
                    }
                    None => {
                        self.reply(
                            inbound,
                            "❌ Faltan las credenciales OAuth de Google en la configuración \
                             del bot (google.client_id / google.client_secret).",
                            false,
                        )
                        .await;
                    }
                }
            }
            "/reset" => {
                let Some(admin) = self.storage.admin_chat_id().await? else {
                    self.reply(inbound, "No hay nada que reiniciar todavía.", false).await;
                    return Ok(());
                };
                if inbound.sender_id != admin {
                    self.reply(
                        inbound,
                        "⛔ Este comando es solo para el administrador del bot.",
                        false,
                    )
                    .await;
                    return Ok(());
                }
                self.storage.reset_tenant().await?;
                info!("tenant reset by admin");
                self.reply(
                    inbound,
                    "🗑 Configuración eliminada. Usa /setup para registrarte de nuevo.",
                    false,
                )
                .await;
            }
            other => {
                debug!(command = other, "unknown command");
                self.reply(inbound, "No conozco ese comando. Escríbeme normal y te ayudo 💈", false)
                    .await;
            }
        }
        Ok(())
    }

    /// One free-text (or media) conversation turn.
    async fn conversation(&mut self, inbound: &InboundMessage) -> Result<(), BarberoError> {
        match self.storage.resolve_tenant().await? {
            TenantState::Unconfigured => {
                self.reply(
                    inbound,
                    "⚠️ Este bot no está configurado. Pídele al dueño que ejecute /setup.",
                    false,
                )
                .await;
                Ok(())
            }
            TenantState::Uncredentialed { admin_chat_id } => {
                let text = if inbound.sender_id == admin_chat_id {
                    "⚠️ Aún no has conectado tu calendario. Usa /connect para configurarlo."
                } else {
                    "🚧 La barbería está en mantenimiento (calendario no conectado). \
                     Intenta más tarde."
                };
                self.reply(inbound, text, false).await;
                Ok(())
            }
            TenantState::Ready {
                admin_chat_id,
                credentials,
            } => {
                let is_admin = inbound.sender_id == admin_chat_id;
                let reply = self
                    .converse_ready(inbound, &admin_chat_id, is_admin, credentials)
                    .await?;
                self.reply(inbound, &reply, true).await;
                Ok(())
            }
        }
    }

    /// The Gemini tool-calling cycle for a fully configured tenant.
    async fn converse_ready(
        &mut self,
        inbound: &InboundMessage,
        admin_chat_id: &str,
        is_admin: bool,
        credentials: StoredCredentials,
    ) -> Result<String, BarberoError> {
        let role = if is_admin { Role::Admin } else { Role::Customer };
        let handles = (self.suite)(credentials)?;
        let tools = BookingTools::new(
            handles,
            self.config.google.calendar_id.clone(),
            self.config.google.time_zone.clone(),
        );

        if let Err(e) = self.channel.send_typing(&inbound.chat_id).await {
            debug!(error = %e, "failed to send typing indicator");
        }

        let now = Local::now();
        let system_prompt = if is_admin {
            prompts::admin_prompt(now)
        } else {
            prompts::customer_prompt(now)
        };

        let context = format!(
            "[Sistema: hora actual {}, User_ID: {}]",
            now.to_rfc3339(),
            inbound.sender_id
        );
        let user_parts = match &inbound.content {
            MessageContent::Text(text) => {
                vec![Part::text(format!("{context}\nUsuario: {text}"))]
            }
            MessageContent::Photo {
                data,
                mime_type,
                caption,
            } => {
                let caption = caption.as_deref().unwrap_or("(sin texto)");
                vec![
                    Part::text(format!(
                        "{context}\nEl usuario envió una imagen con el texto: {caption}. \
                         Interprétala en el contexto de la barbería (por ejemplo, un corte \
                         deseado) y responde."
                    )),
                    Part::inline_data(mime_type.clone(), data),
                ]
            }
            MessageContent::Voice { data, mime_type } => {
                vec![
                    Part::text(format!(
                        "{context}\nEl usuario envió una nota de voz. Transcríbela y \
                         atiende lo que pide."
                    )),
                    Part::inline_data(mime_type.clone(), data),
                ]
            }
        };

        self.sessions
            .history(role, &inbound.sender_id)
            .push(Content::user(user_parts));

        let declarations = BookingTools::declarations();
        let mut reply_text = None;

        for _round in 0..MAX_TOOL_ROUNDS {
            let history = self.sessions.history(role, &inbound.sender_id).clone();
            let response = self
                .gemini
                .generate(
                    Some(system_prompt.clone()),
                    history,
                    Some(declarations.clone()),
                )
                .await?;

            let Some(content) = response.first_content() else {
                warn!("model returned no candidates");
                break;
            };
            let calls: Vec<FunctionCall> = content
                .parts
                .iter()
                .filter_map(|p| p.function_call.clone())
                .collect();

            self.sessions
                .history(role, &inbound.sender_id)
                .push(content.clone());

            if calls.is_empty() {
                reply_text = Some(response.text());
                break;
            }

            let mut response_parts = Vec::with_capacity(calls.len());
            for call in &calls {
                let outcome = tools.dispatch(call, &inbound.sender_id).await;

                // A fresh customer booking alerts the owner right away.
                if let Some(event) = &outcome.created_event
                    && !is_admin
                {
                    let summary = event.summary.as_deref().unwrap_or("Cita");
                    let start = event
                        .start
                        .date_time
                        .as_deref()
                        .unwrap_or("(sin hora)");
                    let note = format!("🆕 *Nueva cita agendada:*\n{summary}\n📅 Fecha: {start}");
                    if let Err(e) = self
                        .channel
                        .send(OutboundMessage {
                            chat_id: admin_chat_id.to_string(),
                            content: note,
                            markdown: true,
                        })
                        .await
                    {
                        warn!(error = %e, "failed to notify admin of new booking");
                    }
                }

                response_parts.push(Part::function_response(
                    call.name.clone(),
                    outcome.response,
                ));
            }

            self.sessions
                .history(role, &inbound.sender_id)
                .push(Content::user(response_parts));
        }

        self.sessions.trim(role, &inbound.sender_id);
        Ok(reply_text.unwrap_or_else(|| APOLOGY.to_string()))
    }

    /// Best-effort reply to the chat a message came from.
    async fn reply(&self, inbound: &InboundMessage, text: &str, markdown: bool) {
        let out = OutboundMessage {
            chat_id: inbound.chat_id.clone(),
            content: text.to_string(),
            markdown,
        };
        if let Err(e) = self.channel.send(out).await {
            error!(error = %e, "failed to send reply");
        }
    }
}
