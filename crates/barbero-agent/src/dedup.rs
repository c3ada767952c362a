// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification deduplication ledger.
//!
//! Records which `(audience, event)` pairs have already been notified so
//! repeated poll ticks inside a reminder window fire at most once per pair.
//! The ledger lives in memory only: a process restart clears it, and a
//! reminder may repeat across restarts. That trade-off is intentional --
//! the alternative (persisting send state) buys little for a 10-minute
//! poll cycle.
//!
//! Entries carry the event's start time so `prune` can evict pairs whose
//! event has passed, keeping the ledger bounded on long-running processes.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

/// Who a notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Audience {
    /// The customer who requested the appointment.
    Customer,
    /// The shop owner.
    Admin,
}

impl Audience {
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::Customer => "customer",
            Audience::Admin => "admin",
        }
    }
}

/// In-memory set of already-notified `(audience, event)` pairs.
pub struct NotificationLedger {
    entries: HashMap<(Audience, String), DateTime<Utc>>,
    /// How long past an event's start its entries are kept. Must exceed the
    /// widest reminder window so an in-window event can never be evicted
    /// and re-notified.
    retention: Duration,
}

impl NotificationLedger {
    pub fn new(retention: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            retention,
        }
    }

    /// Whether this pair has already been notified.
    pub fn contains(&self, audience: Audience, event_id: &str) -> bool {
        self.entries
            .contains_key(&(audience, event_id.to_string()))
    }

    /// Records a notified pair. The event start drives later eviction.
    pub fn record(&mut self, audience: Audience, event_id: &str, start: DateTime<Utc>) {
        self.entries
            .insert((audience, event_id.to_string()), start);
    }

    /// Evicts pairs whose event start lies more than `retention` in the past.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        let retention = self.retention;
        self.entries.retain(|_, start| *start + retention > now);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().to_utc()
    }

    #[test]
    fn record_and_contains_are_per_audience() {
        let mut ledger = NotificationLedger::new(Duration::hours(2));
        ledger.record(Audience::Customer, "e1", t("2026-08-07T15:00:00Z"));

        assert!(ledger.contains(Audience::Customer, "e1"));
        assert!(!ledger.contains(Audience::Admin, "e1"));
        assert!(!ledger.contains(Audience::Customer, "e2"));
    }

    #[test]
    fn prune_keeps_upcoming_and_recent_events() {
        let mut ledger = NotificationLedger::new(Duration::hours(2));
        ledger.record(Audience::Customer, "past", t("2026-08-07T10:00:00Z"));
        ledger.record(Audience::Admin, "recent", t("2026-08-07T13:30:00Z"));
        ledger.record(Audience::Customer, "upcoming", t("2026-08-07T16:00:00Z"));

        // 14:00: "past" started 4h ago (beyond retention), the others stay.
        ledger.prune(t("2026-08-07T14:00:00Z"));

        assert!(!ledger.contains(Audience::Customer, "past"));
        assert!(ledger.contains(Audience::Admin, "recent"));
        assert!(ledger.contains(Audience::Customer, "upcoming"));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn prune_on_empty_ledger_is_a_noop() {
        let mut ledger = NotificationLedger::new(Duration::hours(2));
        ledger.prune(t("2026-08-07T14:00:00Z"));
        assert!(ledger.is_empty());
    }

    #[test]
    fn audience_labels() {
        assert_eq!(Audience::Customer.as_str(), "customer");
        assert_eq!(Audience::Admin.as_str(), "admin");
    }
}
