// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Calendar REST client implementing [`CalendarGateway`].

use std::sync::Arc;

use async_trait::async_trait;
use barbero_core::types::{CalendarEvent, EventDraft, REQUESTER_PROPERTY};
use barbero_core::{BarberoError, CalendarGateway};
use reqwest::{Method, StatusCode};
use tracing::debug;
use url::Url;

use crate::token::TokenBroker;
use crate::types::{EventListResponse, EventResource, EventTimeResource, ExtendedProperties};

/// Base URL for the Calendar v3 API.
const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Calendar gateway over the Google Calendar v3 REST API.
pub struct GoogleCalendar {
    http: reqwest::Client,
    broker: Arc<TokenBroker>,
    base_url: String,
}

impl GoogleCalendar {
    /// Builds a calendar client sharing the given token broker.
    pub fn new(http: reqwest::Client, broker: Arc<TokenBroker>) -> Self {
        Self {
            http,
            broker,
            base_url: CALENDAR_API_BASE.to_string(),
        }
    }

    /// Overrides the base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    fn events_url(&self, calendar_id: &str) -> Result<Url, BarberoError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| BarberoError::Gateway {
            message: format!("invalid calendar base URL: {e}"),
            source: Some(Box::new(e)),
        })?;
        url.path_segments_mut()
            .map_err(|_| BarberoError::Gateway {
                message: "calendar base URL cannot be a base".into(),
                source: None,
            })?
            .extend(["calendars", calendar_id, "events"]);
        Ok(url)
    }

    fn event_url(&self, calendar_id: &str, event_id: &str) -> Result<Url, BarberoError> {
        let mut url = self.events_url(calendar_id)?;
        url.path_segments_mut()
            .map_err(|_| BarberoError::Gateway {
                message: "calendar base URL cannot be a base".into(),
                source: None,
            })?
            .push(event_id);
        Ok(url)
    }

    /// Sends an authorized request, refreshing the access token and retrying
    /// once when the API rejects the cached one.
    async fn request(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, BarberoError> {
        let mut token = self.broker.bearer().await?;

        for attempt in 0..2 {
            let mut req = self.http.request(method.clone(), url.clone()).bearer_auth(&token);
            if let Some(b) = body {
                req = req.json(b);
            }
            let response = req.send().await.map_err(|e| BarberoError::Gateway {
                message: format!("calendar request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

            if response.status() == StatusCode::UNAUTHORIZED && attempt == 0 {
                debug!("access token rejected, refreshing and retrying");
                token = self.broker.refresh().await?;
                continue;
            }
            return Ok(response);
        }
        unreachable!("authorized request loop always returns within two attempts")
    }
}

/// Maps a non-success API response into a gateway error.
async fn reject(context: &str, response: reqwest::Response) -> BarberoError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    BarberoError::Gateway {
        message: format!("{context} returned {status}: {body}"),
        source: None,
    }
}

#[async_trait]
impl CalendarGateway for GoogleCalendar {
    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: &str,
        time_max: &str,
    ) -> Result<Vec<CalendarEvent>, BarberoError> {
        let mut url = self.events_url(calendar_id)?;
        url.query_pairs_mut()
            .append_pair("timeMin", time_min)
            .append_pair("timeMax", time_max)
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime");

        let response = self.request(Method::GET, url, None).await?;
        if !response.status().is_success() {
            return Err(reject("events list", response).await);
        }

        let list: EventListResponse =
            response.json().await.map_err(|e| BarberoError::Gateway {
                message: format!("events list response unparseable: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(list.items.into_iter().map(CalendarEvent::from).collect())
    }

    async fn create_event(
        &self,
        calendar_id: &str,
        draft: EventDraft,
    ) -> Result<CalendarEvent, BarberoError> {
        let mut description = draft.description;
        let mut extended_properties = None;

        // Record the requester both ways: structured private property for
        // the scheduler, legacy `Ref:` line for anything that only sees the
        // free-text description.
        if let Some(requester) = &draft.requester_chat_id {
            description = if description.is_empty() {
                format!("Ref: {requester}")
            } else {
                format!("{description}\n\nRef: {requester}")
            };
            let mut private = std::collections::HashMap::new();
            private.insert(REQUESTER_PROPERTY.to_string(), requester.clone());
            extended_properties = Some(ExtendedProperties {
                private: Some(private),
            });
        }

        let resource = EventResource {
            summary: Some(draft.summary),
            description: Some(description),
            start: Some(EventTimeResource {
                date_time: Some(draft.start),
                time_zone: draft.time_zone.clone(),
                ..Default::default()
            }),
            end: Some(EventTimeResource {
                date_time: Some(draft.end),
                time_zone: draft.time_zone,
                ..Default::default()
            }),
            extended_properties,
            ..Default::default()
        };

        let body = serde_json::to_value(&resource).map_err(|e| BarberoError::Internal(
            format!("event resource serialization failed: {e}"),
        ))?;
        let url = self.events_url(calendar_id)?;
        let response = self.request(Method::POST, url, Some(&body)).await?;
        if !response.status().is_success() {
            return Err(reject("event insert", response).await);
        }

        let created: EventResource =
            response.json().await.map_err(|e| BarberoError::Gateway {
                message: format!("event insert response unparseable: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(created.into())
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), BarberoError> {
        let url = self.event_url(calendar_id, event_id)?;
        let response = self.request(Method::DELETE, url, None).await?;
        if !response.status().is_success() {
            return Err(reject("event delete", response).await);
        }
        Ok(())
    }

    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        start: &str,
        end: &str,
        summary: Option<&str>,
    ) -> Result<CalendarEvent, BarberoError> {
        // Fetch first so fields we do not model survive the update.
        let url = self.event_url(calendar_id, event_id)?;
        let response = self.request(Method::GET, url.clone(), None).await?;
        if !response.status().is_success() {
            return Err(reject("event fetch", response).await);
        }
        let mut resource: EventResource =
            response.json().await.map_err(|e| BarberoError::Gateway {
                message: format!("event fetch response unparseable: {e}"),
                source: Some(Box::new(e)),
            })?;

        let mut start_time = resource.start.unwrap_or_default();
        start_time.date_time = Some(start.to_string());
        start_time.date = None;
        resource.start = Some(start_time);

        let mut end_time = resource.end.unwrap_or_default();
        end_time.date_time = Some(end.to_string());
        end_time.date = None;
        resource.end = Some(end_time);

        if let Some(summary) = summary {
            resource.summary = Some(summary.to_string());
        }

        let body = serde_json::to_value(&resource).map_err(|e| BarberoError::Internal(
            format!("event resource serialization failed: {e}"),
        ))?;
        let response = self.request(Method::PUT, url, Some(&body)).await?;
        if !response.status().is_success() {
            return Err(reject("event update", response).await);
        }

        let updated: EventResource =
            response.json().await.map_err(|e| BarberoError::Gateway {
                message: format!("event update response unparseable: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(updated.into())
    }
}
