// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for the messaging platform integration.

use async_trait::async_trait;

use crate::error::BarberoError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChannelCapabilities, InboundMessage, MessageId, OutboundMessage};

/// Adapter for the bidirectional messaging channel.
///
/// Connects Barbero to the chat platform, handling message ingestion
/// and delivery.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Returns the capabilities supported by this channel.
    fn capabilities(&self) -> ChannelCapabilities;

    /// Establishes a connection to the messaging platform.
    async fn connect(&mut self) -> Result<(), BarberoError>;

    /// Sends a message through the channel.
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, BarberoError>;

    /// Receives the next inbound message from the channel.
    async fn receive(&self) -> Result<InboundMessage, BarberoError>;

    /// Shows a typing indicator in the given chat, where supported.
    async fn send_typing(&self, chat_id: &str) -> Result<(), BarberoError>;
}

/// One-way notification dispatch, as consumed by the reminder scheduler.
///
/// Failures are log-and-continue at the call site: a failed send is never
/// retried within the same tick and never blocks other notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends `text` to the given chat identity. `markdown` indicates whether
    /// lightweight markup should be honored.
    async fn notify(&self, chat_id: &str, text: &str, markdown: bool)
    -> Result<(), BarberoError>;
}
