// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Google Calendar and Sheets REST APIs.

use std::collections::HashMap;

use barbero_core::types::{CalendarEvent, EventTime};
use serde::{Deserialize, Serialize};

/// Start/end time of an event resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventTimeResource {
    #[serde(rename = "dateTime", skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "timeZone", skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl From<EventTimeResource> for EventTime {
    fn from(r: EventTimeResource) -> Self {
        EventTime {
            date_time: r.date_time,
            date: r.date,
            time_zone: r.time_zone,
        }
    }
}

/// `extendedProperties` block carrying the requester side-channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtendedProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<HashMap<String, String>>,
}

/// A calendar event resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<EventTimeResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EventTimeResource>,
    #[serde(rename = "extendedProperties", skip_serializing_if = "Option::is_none")]
    pub extended_properties: Option<ExtendedProperties>,
    /// Fields we do not model (attendees, reminders, ...) are preserved
    /// here so a fetch-then-update round trip does not drop them.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl From<EventResource> for CalendarEvent {
    fn from(r: EventResource) -> Self {
        CalendarEvent {
            id: r.id.unwrap_or_default(),
            summary: r.summary,
            description: r.description,
            start: r.start.map(EventTime::from).unwrap_or_default(),
            end: r.end.map(EventTime::from).unwrap_or_default(),
            private_properties: r
                .extended_properties
                .and_then(|p| p.private)
                .unwrap_or_default(),
        }
    }
}

/// Response body of an events list call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventListResponse {
    #[serde(default)]
    pub items: Vec<EventResource>,
}

/// Request body for a Sheets values append.
#[derive(Debug, Clone, Serialize)]
pub struct AppendValuesRequest {
    pub values: Vec<Vec<String>>,
}

/// Token endpoint response (refresh grant).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_resource_maps_to_calendar_event() {
        let json = serde_json::json!({
            "id": "abc123",
            "summary": "Corte - Juan",
            "description": "Corte de pelo\n\nRef: 12345",
            "start": {"dateTime": "2026-08-07T15:00:00-05:00", "timeZone": "America/Bogota"},
            "end": {"dateTime": "2026-08-07T15:30:00-05:00"},
            "extendedProperties": {"private": {"requester": "12345"}}
        });
        let resource: EventResource = serde_json::from_value(json).unwrap();
        let event: CalendarEvent = resource.into();

        assert_eq!(event.id, "abc123");
        assert_eq!(event.summary.as_deref(), Some("Corte - Juan"));
        assert_eq!(
            event.start.date_time.as_deref(),
            Some("2026-08-07T15:00:00-05:00")
        );
        assert_eq!(event.requester_reference().as_deref(), Some("12345"));
    }

    #[test]
    fn all_day_event_maps_with_date_only() {
        let json = serde_json::json!({
            "id": "allday",
            "summary": "Cerrado por festivo",
            "start": {"date": "2026-08-07"},
            "end": {"date": "2026-08-08"}
        });
        let resource: EventResource = serde_json::from_value(json).unwrap();
        let event: CalendarEvent = resource.into();

        assert!(event.start.date_time.is_none());
        assert_eq!(event.start.date.as_deref(), Some("2026-08-07"));
        assert!(event.start.resolve_utc().is_some());
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let json = serde_json::json!({
            "id": "abc",
            "summary": "Corte",
            "htmlLink": "https://calendar.google.com/event?eid=abc",
            "status": "confirmed"
        });
        let resource: EventResource = serde_json::from_value(json.clone()).unwrap();
        let back = serde_json::to_value(&resource).unwrap();
        assert_eq!(back["htmlLink"], json["htmlLink"]);
        assert_eq!(back["status"], json["status"]);
    }
}
