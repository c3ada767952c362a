// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for the Barbero scheduling assistant.
//!
//! Implements [`ChannelAdapter`] for the Telegram Bot API via teloxide,
//! providing long polling, message extraction, and Markdown delivery with
//! plain-text fallback when Telegram rejects the entities (titles with
//! stray `*` or `_` still get delivered). The same adapter doubles as the
//! [`Notifier`] the reminder scheduler dispatches through.

pub mod handler;
pub mod media;

use async_trait::async_trait;
use barbero_config::model::TelegramConfig;
use barbero_core::error::BarberoError;
use barbero_core::traits::{ChannelAdapter, Notifier, PluginAdapter};
use barbero_core::types::{
    AdapterType, ChannelCapabilities, HealthStatus, InboundMessage, MessageId, OutboundMessage,
};
use teloxide::prelude::*;
use teloxide::types::{ChatAction, ChatId, ParseMode, Recipient};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Telegram channel adapter implementing [`ChannelAdapter`] and [`Notifier`].
///
/// Connects to Telegram via long polling, filters to private chats, and
/// delivers Markdown responses with a plain-text fallback when the parse
/// is rejected.
pub struct TelegramChannel {
    bot: Bot,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundMessage>>,
    inbound_tx: mpsc::Sender<InboundMessage>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramChannel {
    /// Creates a new Telegram channel adapter.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: TelegramConfig) -> Result<Self, BarberoError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            BarberoError::Config("telegram.bot_token is required for the Telegram channel".into())
        })?;

        if token.is_empty() {
            return Err(BarberoError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            bot,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    fn parse_chat_id(chat_id: &str) -> Result<ChatId, BarberoError> {
        chat_id
            .parse::<i64>()
            .map(ChatId)
            .map_err(|e| BarberoError::Channel {
                message: format!("invalid chat_id `{chat_id}`: {e}"),
                source: None,
            })
    }

    /// Sends text to a chat, trying Markdown first and falling back to
    /// plain text when Telegram rejects the entities.
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        markdown: bool,
    ) -> Result<MessageId, BarberoError> {
        if markdown {
            match self
                .bot
                .send_message(Recipient::Id(chat_id), text)
                .parse_mode(ParseMode::Markdown)
                .await
            {
                Ok(sent) => return Ok(MessageId(sent.id.0.to_string())),
                Err(e) => {
                    warn!(error = %e, "Markdown send failed, retrying as plain text");
                }
            }
        }

        let sent = self
            .bot
            .send_message(Recipient::Id(chat_id), text)
            .await
            .map_err(|e| BarberoError::Channel {
                message: format!("failed to send message: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(MessageId(sent.id.0.to_string()))
    }
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, BarberoError> {
        // Check that the bot token is valid by calling getMe.
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), BarberoError> {
        debug!("Telegram channel shutting down");
        // The polling handle is aborted when TelegramChannel is dropped.
        // For graceful shutdown, the agent loop stops calling receive() first.
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    fn capabilities(&self) -> ChannelCapabilities {
        ChannelCapabilities {
            supports_markdown: true,
            supports_typing: true,
            supports_images: true,
            supports_voice: true,
            max_message_length: Some(4096),
        }
    }

    async fn connect(&mut self) -> Result<(), BarberoError> {
        if self.polling_handle.is_some() {
            return Ok(()); // Already connected
        }

        let bot = self.bot.clone();
        let tx = self.inbound_tx.clone();

        info!("starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let handler = Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
                let tx = tx.clone();
                async move {
                    // Customers and the owner both talk to the bot in DMs.
                    if !handler::is_dm(&msg) {
                        debug!(chat_id = msg.chat.id.0, "ignoring non-DM message");
                        return respond(());
                    }

                    match handler::extract_content(&bot, &msg).await {
                        Ok(Some(content)) => {
                            let inbound = handler::to_inbound_message(&msg, content);
                            if tx.send(inbound).await.is_err() {
                                warn!("inbound channel closed, dropping message");
                            }
                        }
                        Ok(None) => {
                            debug!(msg_id = msg.id.0, "ignoring unsupported message type");
                        }
                        Err(e) => {
                            error!(error = %e, "failed to extract message content");
                        }
                    }

                    respond(())
                }
            });

            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {}) // Silently ignore non-message updates
                .build()
                .dispatch()
                .await;
        });

        self.polling_handle = Some(handle);
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, BarberoError> {
        let chat_id = Self::parse_chat_id(&msg.chat_id)?;
        self.send_text(chat_id, &msg.content, msg.markdown).await
    }

    async fn receive(&self) -> Result<InboundMessage, BarberoError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| BarberoError::Channel {
            message: "Telegram inbound channel closed".into(),
            source: None,
        })
    }

    async fn send_typing(&self, chat_id: &str) -> Result<(), BarberoError> {
        let chat_id = Self::parse_chat_id(chat_id)?;
        self.bot
            .send_chat_action(chat_id, ChatAction::Typing)
            .await
            .map_err(|e| BarberoError::Channel {
                message: format!("failed to send typing indicator: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramChannel {
    async fn notify(
        &self,
        chat_id: &str,
        text: &str,
        markdown: bool,
    ) -> Result<(), BarberoError> {
        let chat_id = Self::parse_chat_id(chat_id)?;
        self.send_text(chat_id, text, markdown).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_requires_bot_token() {
        let config = TelegramConfig { bot_token: None };
        assert!(TelegramChannel::new(config).is_err());
    }

    #[test]
    fn new_rejects_empty_token() {
        let config = TelegramConfig {
            bot_token: Some(String::new()),
        };
        assert!(TelegramChannel::new(config).is_err());
    }

    #[test]
    fn new_accepts_valid_token() {
        let config = TelegramConfig {
            bot_token: Some("123456:ABC-DEF1234ghIkl-zyx57W2v1u123ew11".into()),
        };
        assert!(TelegramChannel::new(config).is_ok());
    }

    #[test]
    fn capabilities_are_correct() {
        let config = TelegramConfig {
            bot_token: Some("test:token".into()),
        };
        let channel = TelegramChannel::new(config).unwrap();
        let caps = channel.capabilities();
        assert!(caps.supports_markdown);
        assert!(caps.supports_typing);
        assert!(caps.supports_images);
        assert!(caps.supports_voice);
        assert_eq!(caps.max_message_length, Some(4096));
    }

    #[test]
    fn parse_chat_id_accepts_numeric() {
        assert_eq!(TelegramChannel::parse_chat_id("12345").unwrap().0, 12345);
    }

    #[test]
    fn parse_chat_id_rejects_garbage() {
        assert!(TelegramChannel::parse_chat_id("not-a-chat").is_err());
    }

    #[test]
    fn plugin_adapter_metadata() {
        let config = TelegramConfig {
            bot_token: Some("test:token".into()),
        };
        let channel = TelegramChannel::new(config).unwrap();
        assert_eq!(channel.name(), "telegram");
        assert_eq!(channel.version(), semver::Version::new(0, 1, 0));
        assert_eq!(channel.adapter_type(), AdapterType::Channel);
    }
}
