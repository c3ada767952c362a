// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Barbero workspace.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a message on the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Provider,
    Storage,
    Calendar,
}

// --- Channel types ---

/// Content extracted from an inbound chat message.
#[derive(Debug, Clone)]
pub enum MessageContent {
    /// Plain text.
    Text(String),
    /// A photo, downloaded to bytes, with optional caption.
    Photo {
        data: Vec<u8>,
        mime_type: String,
        caption: Option<String>,
    },
    /// A voice note, downloaded to bytes.
    Voice { data: Vec<u8>, mime_type: String },
}

/// An inbound message received from a channel adapter.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Platform message id.
    pub id: String,
    /// Chat the message arrived in (responses are routed back here).
    pub chat_id: String,
    /// Platform identity of the sender.
    pub sender_id: String,
    /// Sender's username, if the platform exposes one.
    pub sender_username: Option<String>,
    /// Sender's display name.
    pub sender_first_name: Option<String>,
    /// Extracted content.
    pub content: MessageContent,
    /// RFC 3339 receive timestamp.
    pub timestamp: String,
}

/// An outbound message to be sent via a channel adapter.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    /// Destination chat.
    pub chat_id: String,
    /// Message text.
    pub content: String,
    /// Whether lightweight markup (bold/italics) should be honored.
    pub markdown: bool,
}

/// Capabilities reported by a channel adapter.
#[derive(Debug, Clone)]
pub struct ChannelCapabilities {
    pub supports_markdown: bool,
    pub supports_typing: bool,
    pub supports_images: bool,
    pub supports_voice: bool,
    pub max_message_length: Option<usize>,
}

// --- Tenant types ---

/// The single business-owner account the bot is configured for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerProfile {
    /// Chat-platform identity of the owner.
    pub chat_id: String,
    /// Owner display name.
    pub display_name: Option<String>,
    /// Owner username on the chat platform.
    pub username: Option<String>,
    /// Business name shown to customers.
    pub shop_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// OAuth credentials stored per chat-platform identity.
///
/// A record exists only after a completed OAuth exchange; it is read on
/// every scheduling or scheduler operation and deleted only via tenant reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<String>,
}

/// Tenant readiness, resolved at the start of every scheduled job.
///
/// Distinguishes "no tenant configured" from "tenant configured but
/// uncredentialed" from "ready" so callers never have to re-derive the
/// difference from a pair of `Option`s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantState {
    /// No admin has been registered yet.
    Unconfigured,
    /// An admin exists but has not completed the OAuth flow.
    Uncredentialed { admin_chat_id: String },
    /// An admin exists and has stored credentials.
    Ready {
        admin_chat_id: String,
        credentials: StoredCredentials,
    },
}

impl TenantState {
    /// Admin chat id, if an admin is configured at all.
    pub fn admin_chat_id(&self) -> Option<&str> {
        match self {
            TenantState::Unconfigured => None,
            TenantState::Uncredentialed { admin_chat_id }
            | TenantState::Ready { admin_chat_id, .. } => Some(admin_chat_id),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, TenantState::Ready { .. })
    }
}

// --- Calendar types ---

/// Start or end time of a calendar event.
///
/// Timed events carry `date_time` (RFC 3339); all-day events carry only
/// `date` (YYYY-MM-DD).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
    pub time_zone: Option<String>,
}

impl EventTime {
    /// Construct a timed instant from an RFC 3339 string.
    pub fn at(date_time: impl Into<String>) -> Self {
        Self {
            date_time: Some(date_time.into()),
            date: None,
            time_zone: None,
        }
    }

    /// Resolve to a UTC instant.
    ///
    /// Prefers `date_time`; falls back to `date` interpreted as local
    /// midnight UTC. Returns `None` when neither field parses, so callers
    /// can skip the event instead of failing the batch.
    pub fn resolve_utc(&self) -> Option<DateTime<Utc>> {
        if let Some(dt) = &self.date_time
            && let Ok(parsed) = DateTime::parse_from_rfc3339(dt)
        {
            return Some(parsed.with_timezone(&Utc));
        }
        if let Some(d) = &self.date
            && let Ok(parsed) = NaiveDate::parse_from_str(d, "%Y-%m-%d")
        {
            return parsed.and_hms_opt(0, 0, 0).map(|ndt| ndt.and_utc());
        }
        None
    }

    /// Resolve to an instant carrying the calendar's own UTC offset, for
    /// wall-clock display (`HH:MM`) in notifications. All-day events have
    /// no wall-clock time and yield `None`.
    pub fn resolve_fixed(&self) -> Option<DateTime<FixedOffset>> {
        self.date_time
            .as_deref()
            .and_then(|dt| DateTime::parse_from_rfc3339(dt).ok())
    }
}

/// Matches the legacy requester marker embedded in event descriptions.
static REF_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Ref: (\d+)").expect("marker regex is valid"));

/// Key under `extendedProperties.private` carrying the requester chat id.
pub const REQUESTER_PROPERTY: &str = "requester";

/// A calendar event as read through the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    /// `extendedProperties.private` entries, when present.
    pub private_properties: HashMap<String, String>,
}

impl CalendarEvent {
    /// Chat identity of the user who requested this appointment.
    ///
    /// The structured private property is authoritative; the legacy
    /// `Ref: <digits>` description marker is kept as a compatibility
    /// fallback for events created before the side-channel existed.
    pub fn requester_reference(&self) -> Option<String> {
        if let Some(id) = self.private_properties.get(REQUESTER_PROPERTY)
            && !id.is_empty()
        {
            return Some(id.clone());
        }
        self.description
            .as_deref()
            .and_then(|desc| REF_MARKER.captures(desc))
            .map(|caps| caps[1].to_string())
    }
}

/// Fields for a new calendar event, as assembled by the booking tools.
#[derive(Debug, Clone, Default)]
pub struct EventDraft {
    pub summary: String,
    pub description: String,
    /// RFC 3339 start.
    pub start: String,
    /// RFC 3339 end.
    pub end: String,
    pub time_zone: Option<String>,
    /// Chat identity of the requesting user, recorded both as a private
    /// property and as a `Ref:` description line for older tooling.
    pub requester_chat_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_time_prefers_date_time() {
        let t = EventTime {
            date_time: Some("2026-08-07T15:30:00+00:00".into()),
            date: Some("2026-08-07".into()),
            time_zone: None,
        };
        let resolved = t.resolve_utc().unwrap();
        assert_eq!(resolved.format("%H:%M").to_string(), "15:30");
    }

    #[test]
    fn event_time_falls_back_to_date() {
        let t = EventTime {
            date_time: None,
            date: Some("2026-08-07".into()),
            time_zone: None,
        };
        let resolved = t.resolve_utc().unwrap();
        assert_eq!(resolved.format("%Y-%m-%d %H:%M").to_string(), "2026-08-07 00:00");
    }

    #[test]
    fn event_time_keeps_calendar_offset_for_display() {
        let t = EventTime::at("2026-08-07T15:00:00-05:00");
        let fixed = t.resolve_fixed().unwrap();
        assert_eq!(fixed.format("%H:%M").to_string(), "15:00");
        // The same instant in UTC is 20:00.
        assert_eq!(
            t.resolve_utc().unwrap().format("%H:%M").to_string(),
            "20:00"
        );
    }

    #[test]
    fn event_time_unparseable_yields_none() {
        let t = EventTime {
            date_time: Some("not a timestamp".into()),
            date: Some("also wrong".into()),
            time_zone: None,
        };
        assert!(t.resolve_utc().is_none());
    }

    #[test]
    fn empty_event_time_yields_none() {
        assert!(EventTime::default().resolve_utc().is_none());
    }

    #[test]
    fn requester_from_private_property() {
        let mut event = CalendarEvent {
            id: "e1".into(),
            description: Some("Corte con Juan\n\nRef: 999".into()),
            ..Default::default()
        };
        event
            .private_properties
            .insert(REQUESTER_PROPERTY.into(), "12345".into());
        // Structured property wins over the description marker.
        assert_eq!(event.requester_reference().as_deref(), Some("12345"));
    }

    #[test]
    fn requester_falls_back_to_description_marker() {
        let event = CalendarEvent {
            id: "e1".into(),
            description: Some("Corte de pelo\n\nRef: 67890".into()),
            ..Default::default()
        };
        assert_eq!(event.requester_reference().as_deref(), Some("67890"));
    }

    #[test]
    fn requester_missing_everywhere() {
        let event = CalendarEvent {
            id: "e1".into(),
            description: Some("walk-in appointment".into()),
            ..Default::default()
        };
        assert!(event.requester_reference().is_none());
    }

    #[test]
    fn requester_marker_requires_digits() {
        let event = CalendarEvent {
            id: "e1".into(),
            description: Some("Ref: not-a-number".into()),
            ..Default::default()
        };
        assert!(event.requester_reference().is_none());
    }

    #[test]
    fn tenant_state_admin_chat_id() {
        assert!(TenantState::Unconfigured.admin_chat_id().is_none());
        let uncred = TenantState::Uncredentialed {
            admin_chat_id: "42".into(),
        };
        assert_eq!(uncred.admin_chat_id(), Some("42"));
        assert!(!uncred.is_ready());
    }
}
