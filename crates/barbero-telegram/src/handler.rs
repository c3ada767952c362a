// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message routing and content extraction.
//!
//! The bot serves a walk-in audience, so there is no allow-list: every
//! private chat is accepted (customers book through it). Group and channel
//! posts are ignored. Extraction converts a Telegram message into a
//! channel-agnostic [`InboundMessage`].

use barbero_core::error::BarberoError;
use barbero_core::types::{InboundMessage, MessageContent};
use teloxide::prelude::*;
use teloxide::types::ChatKind;
use tracing::debug;

use crate::media;

/// Checks whether the message is from a private (DM) chat.
///
/// Group, supergroup, and channel messages return `false`.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// Extracts content from a Telegram message.
///
/// Handles text, photo, voice, and audio message types. Returns `None` for
/// unsupported message types (stickers, locations, etc.).
pub async fn extract_content(
    bot: &Bot,
    msg: &Message,
) -> Result<Option<MessageContent>, BarberoError> {
    if let Some(text) = msg.text() {
        return Ok(Some(MessageContent::Text(text.to_string())));
    }

    if let Some(photos) = msg.photo() {
        let content = media::extract_photo_content(bot, photos, msg.caption()).await?;
        return Ok(Some(content));
    }

    if let Some(voice) = msg.voice() {
        let content = media::extract_voice_content(bot, voice).await?;
        return Ok(Some(content));
    }

    if let Some(audio) = msg.audio() {
        let content = media::extract_audio_content(bot, audio).await?;
        return Ok(Some(content));
    }

    debug!(msg_id = msg.id.0, "ignoring unsupported message type");
    Ok(None)
}

/// Converts a Telegram message and extracted content into an [`InboundMessage`].
pub fn to_inbound_message(msg: &Message, content: MessageContent) -> InboundMessage {
    let (sender_id, sender_username, sender_first_name) = match msg.from.as_ref() {
        Some(user) => (
            user.id.0.to_string(),
            user.username.clone(),
            Some(user.first_name.clone()),
        ),
        None => ("unknown".to_string(), None, None),
    };

    InboundMessage {
        id: msg.id.0.to_string(),
        chat_id: msg.chat.id.0.to_string(),
        sender_id,
        sender_username,
        sender_first_name,
        content,
        timestamp: chrono::DateTime::to_rfc3339(&msg.date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a mock private chat message from JSON, matching Telegram Bot
    /// API structure.
    fn make_private_message(user_id: u64, username: Option<&str>, text: &str) -> Message {
        let from = if let Some(uname) = username {
            serde_json::json!({
                "id": user_id,
                "is_bot": false,
                "first_name": "Test",
                "username": uname,
            })
        } else {
            serde_json::json!({
                "id": user_id,
                "is_bot": false,
                "first_name": "Test",
            })
        };

        let json = serde_json::json!({
            "message_id": 1,
            "date": 1700000000i64,
            "chat": {
                "id": user_id as i64,
                "type": "private",
                "first_name": "Test",
            },
            "from": from,
            "text": text,
        });

        serde_json::from_value(json).expect("failed to deserialize mock message")
    }

    fn make_group_message(user_id: u64, text: &str) -> Message {
        let json = serde_json::json!({
            "message_id": 1,
            "date": 1700000000i64,
            "chat": {
                "id": -100123i64,
                "type": "supergroup",
                "title": "Test Group",
            },
            "from": {
                "id": user_id,
                "is_bot": false,
                "first_name": "Test",
            },
            "text": text,
        });

        serde_json::from_value(json).expect("failed to deserialize mock group message")
    }

    #[test]
    fn is_dm_private_chat() {
        let msg = make_private_message(12345, None, "hola");
        assert!(is_dm(&msg));
    }

    #[test]
    fn is_dm_group_chat() {
        let msg = make_group_message(12345, "hola");
        assert!(!is_dm(&msg));
    }

    #[test]
    fn to_inbound_message_maps_fields() {
        let msg = make_private_message(12345, Some("juanito"), "quiero un corte");
        let content = MessageContent::Text("quiero un corte".into());
        let inbound = to_inbound_message(&msg, content);

        assert_eq!(inbound.id, "1");
        assert_eq!(inbound.chat_id, "12345");
        assert_eq!(inbound.sender_id, "12345");
        assert_eq!(inbound.sender_username.as_deref(), Some("juanito"));
        assert_eq!(inbound.sender_first_name.as_deref(), Some("Test"));
    }

    #[tokio::test]
    async fn extract_text_content() {
        let msg = make_private_message(12345, None, "hola barbero");
        let bot = Bot::new("test:token");
        let content = extract_content(&bot, &msg).await.unwrap();
        match content {
            Some(MessageContent::Text(t)) => assert_eq!(t, "hola barbero"),
            other => panic!("expected Some(Text), got {other:?}"),
        }
    }
}
