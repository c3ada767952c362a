// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway traits for the external calendar and appointment log.

use async_trait::async_trait;

use crate::error::BarberoError;
use crate::types::{CalendarEvent, EventDraft};

/// Read/write access to the tenant's calendar.
///
/// Time bounds are RFC 3339 timestamps with UTC designation. List results
/// come back ordered by start time. Errors from the underlying API surface
/// as [`BarberoError::Gateway`](crate::BarberoError::Gateway) values, never
/// panics; the scheduler treats them as "no data available" for the tick.
#[async_trait]
pub trait CalendarGateway: Send + Sync {
    /// Lists events overlapping `[time_min, time_max]`, recurring events
    /// expanded to single instances, ascending by start.
    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: &str,
        time_max: &str,
    ) -> Result<Vec<CalendarEvent>, BarberoError>;

    /// Creates a new event and returns it as stored.
    async fn create_event(
        &self,
        calendar_id: &str,
        draft: EventDraft,
    ) -> Result<CalendarEvent, BarberoError>;

    /// Deletes an event by id.
    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), BarberoError>;

    /// Reschedules an event, preserving fields not named here.
    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        start: &str,
        end: &str,
        summary: Option<&str>,
    ) -> Result<CalendarEvent, BarberoError>;
}

/// Append-only appointment log (one row per booking action).
#[async_trait]
pub trait AppointmentLog: Send + Sync {
    /// Appends a single row of values.
    async fn append_row(&self, values: Vec<String>) -> Result<(), BarberoError>;
}
