// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media content extraction for Telegram messages.
//!
//! Downloads files from Telegram servers and converts them to
//! [`MessageContent`] variants so the agent can hand them to Gemini
//! as inline data.

use barbero_core::error::BarberoError;
use barbero_core::types::MessageContent;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{Audio, FileMeta, PhotoSize, Voice};
use tracing::debug;

/// Downloads a file from Telegram servers by its file metadata.
///
/// Uses the Bot API's `getFile` to resolve the file path, then downloads
/// the file content as bytes.
pub async fn download_file(bot: &Bot, file_meta: &FileMeta) -> Result<Vec<u8>, BarberoError> {
    let file = bot
        .get_file(file_meta.id.clone())
        .await
        .map_err(|e| BarberoError::Channel {
            message: format!("failed to get file info: {e}"),
            source: Some(Box::new(e)),
        })?;

    let mut buf = Vec::new();
    bot.download_file(&file.path, &mut buf)
        .await
        .map_err(|e| BarberoError::Channel {
            message: format!("failed to download file: {e}"),
            source: Some(Box::new(e)),
        })?;

    debug!(
        file_id = %file_meta.id,
        size = buf.len(),
        "downloaded file from Telegram"
    );
    Ok(buf)
}

/// Extracts photo content from a Telegram photo message.
///
/// Downloads the largest available photo variant (last in the array).
pub async fn extract_photo_content(
    bot: &Bot,
    photos: &[PhotoSize],
    caption: Option<&str>,
) -> Result<MessageContent, BarberoError> {
    // Telegram provides multiple sizes; the last one is the largest.
    let largest = photos.last().ok_or_else(|| BarberoError::Channel {
        message: "photo array is empty".into(),
        source: None,
    })?;

    let data = download_file(bot, &largest.file).await?;

    Ok(MessageContent::Photo {
        data,
        mime_type: "image/jpeg".to_string(),
        caption: caption.map(|s| s.to_string()),
    })
}

/// Extracts voice-note content from a Telegram voice message (OGG/Opus).
pub async fn extract_voice_content(
    bot: &Bot,
    voice: &Voice,
) -> Result<MessageContent, BarberoError> {
    let data = download_file(bot, &voice.file).await?;
    Ok(MessageContent::Voice {
        data,
        mime_type: "audio/ogg".to_string(),
    })
}

/// Extracts content from a Telegram audio attachment (music-style upload).
pub async fn extract_audio_content(
    bot: &Bot,
    audio: &Audio,
) -> Result<MessageContent, BarberoError> {
    let data = download_file(bot, &audio.file).await?;
    let mime_type = audio
        .mime_type
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "audio/mpeg".to_string());
    Ok(MessageContent::Voice { data, mime_type })
}
