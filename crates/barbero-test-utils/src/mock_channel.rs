// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic testing.
//!
//! `MockChannel` implements `ChannelAdapter` and `Notifier` with injectable
//! inbound messages and captured outbound messages for assertion in tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use barbero_core::BarberoError;
use barbero_core::traits::{ChannelAdapter, Notifier, PluginAdapter};
use barbero_core::types::{
    AdapterType, ChannelCapabilities, HealthStatus, InboundMessage, MessageId, OutboundMessage,
};

/// A mock messaging channel for testing.
///
/// Provides two queues:
/// - **inbound**: messages injected via `inject_message()` are returned by `receive()`
/// - **sent**: messages passed to `send()`/`notify()` are captured via `sent_messages()`
pub struct MockChannel {
    inbound: Arc<Mutex<VecDeque<InboundMessage>>>,
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    notify: Arc<Notify>,
    fail_sends: AtomicBool,
    counter: Arc<Mutex<u64>>,
}

impl MockChannel {
    /// Create a new mock channel with empty queues.
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
            notify: Arc::new(Notify::new()),
            fail_sends: AtomicBool::new(false),
            counter: Arc::new(Mutex::new(0)),
        }
    }

    /// Inject an inbound message into the receive queue.
    pub async fn inject_message(&self, msg: InboundMessage) {
        self.inbound.lock().await.push_back(msg);
        self.notify.notify_one();
    }

    /// Get all messages that were sent.
    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    /// Get the count of sent messages.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Clear all sent messages.
    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }

    /// Make every subsequent send/notify fail with a channel error.
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    async fn record_send(&self, msg: OutboundMessage) -> Result<MessageId, BarberoError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(BarberoError::Channel {
                message: "mock channel configured to fail sends".into(),
                source: None,
            });
        }
        let mut counter = self.counter.lock().await;
        *counter += 1;
        let id = format!("mock-msg-{counter}");
        self.sent.lock().await.push(msg);
        Ok(MessageId(id))
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, BarberoError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), BarberoError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    fn capabilities(&self) -> ChannelCapabilities {
        ChannelCapabilities {
            supports_markdown: true,
            supports_typing: false,
            supports_images: false,
            supports_voice: false,
            max_message_length: None,
        }
    }

    async fn connect(&mut self) -> Result<(), BarberoError> {
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, BarberoError> {
        self.record_send(msg).await
    }

    async fn receive(&self) -> Result<InboundMessage, BarberoError> {
        loop {
            if let Some(msg) = self.inbound.lock().await.pop_front() {
                return Ok(msg);
            }
            self.notify.notified().await;
        }
    }

    async fn send_typing(&self, _chat_id: &str) -> Result<(), BarberoError> {
        Ok(())
    }
}

#[async_trait]
impl Notifier for MockChannel {
    async fn notify(
        &self,
        chat_id: &str,
        text: &str,
        markdown: bool,
    ) -> Result<(), BarberoError> {
        self.record_send(OutboundMessage {
            chat_id: chat_id.to_string(),
            content: text.to_string(),
            markdown,
        })
        .await?;
        Ok(())
    }
}
