// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Programmable calendar gateway and recording appointment log.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use barbero_core::types::{CalendarEvent, EventDraft, EventTime};
use barbero_core::{AppointmentLog, BarberoError, CalendarGateway};

/// A fake calendar gateway that returns a programmed event list.
///
/// `list_events` ignores the requested range -- tests program exactly the
/// events the tick under test should see. Setting `fail` makes every call
/// degrade to a gateway error, mimicking an unreachable API.
pub struct FakeCalendar {
    events: Arc<Mutex<Vec<CalendarEvent>>>,
    created: Arc<Mutex<Vec<EventDraft>>>,
    deleted: Arc<Mutex<Vec<String>>>,
    fail: AtomicBool,
}

impl FakeCalendar {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            created: Arc::new(Mutex::new(Vec::new())),
            deleted: Arc::new(Mutex::new(Vec::new())),
            fail: AtomicBool::new(false),
        }
    }

    /// Replace the programmed event list.
    pub async fn set_events(&self, events: Vec<CalendarEvent>) {
        *self.events.lock().await = events;
    }

    /// Make every call fail with a gateway error.
    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Drafts passed to `create_event`.
    pub async fn created_drafts(&self) -> Vec<EventDraft> {
        self.created.lock().await.clone()
    }

    /// Event ids passed to `delete_event`.
    pub async fn deleted_ids(&self) -> Vec<String> {
        self.deleted.lock().await.clone()
    }

    fn check_fail(&self) -> Result<(), BarberoError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(BarberoError::Gateway {
                message: "fake calendar configured to fail".into(),
                source: None,
            });
        }
        Ok(())
    }
}

impl Default for FakeCalendar {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CalendarGateway for FakeCalendar {
    async fn list_events(
        &self,
        _calendar_id: &str,
        _time_min: &str,
        _time_max: &str,
    ) -> Result<Vec<CalendarEvent>, BarberoError> {
        self.check_fail()?;
        Ok(self.events.lock().await.clone())
    }

    async fn create_event(
        &self,
        _calendar_id: &str,
        draft: EventDraft,
    ) -> Result<CalendarEvent, BarberoError> {
        self.check_fail()?;
        let mut created = self.created.lock().await;
        created.push(draft.clone());
        Ok(CalendarEvent {
            id: format!("fake-{}", created.len()),
            summary: Some(draft.summary),
            description: Some(draft.description),
            start: EventTime::at(draft.start),
            end: EventTime::at(draft.end),
            private_properties: Default::default(),
        })
    }

    async fn delete_event(&self, _calendar_id: &str, event_id: &str) -> Result<(), BarberoError> {
        self.check_fail()?;
        self.deleted.lock().await.push(event_id.to_string());
        Ok(())
    }

    async fn update_event(
        &self,
        _calendar_id: &str,
        event_id: &str,
        start: &str,
        end: &str,
        summary: Option<&str>,
    ) -> Result<CalendarEvent, BarberoError> {
        self.check_fail()?;
        Ok(CalendarEvent {
            id: event_id.to_string(),
            summary: summary.map(str::to_string),
            description: None,
            start: EventTime::at(start),
            end: EventTime::at(end),
            private_properties: Default::default(),
        })
    }
}

/// An appointment log that records appended rows.
#[derive(Default)]
pub struct RecordingLog {
    rows: Arc<Mutex<Vec<Vec<String>>>>,
}

impl RecordingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().await.clone()
    }
}

#[async_trait]
impl AppointmentLog for RecordingLog {
    async fn append_row(&self, values: Vec<String>) -> Result<(), BarberoError> {
        self.rows.lock().await.push(values);
        Ok(())
    }
}
