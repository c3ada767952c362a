// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The reminder scheduler: time-windowed, deduplicated appointment
//! notifications plus a once-daily agenda digest.
//!
//! Two recurring jobs run against the single configured admin's calendar:
//!
//! - **Reminder poll** (every 10 minutes by default): fetches events in the
//!   next two hours, sends each requesting customer a reminder roughly one
//!   hour before their appointment and the owner an alert roughly fifteen
//!   minutes before. The windows are ±10 minutes wide so the fixed poll
//!   interval cannot step over them.
//! - **Daily digest** (08:00 local by default): sends the owner the day's
//!   agenda, one `HH:MM - title` line per appointment.
//!
//! Both jobs are silent no-ops until an admin is registered and has
//! completed the OAuth flow. A gateway failure aborts the current tick and
//! the job simply runs again on the next trigger.

use std::sync::Arc;

use barbero_config::model::SchedulerConfig;
use barbero_core::types::{CalendarEvent, StoredCredentials, TenantState};
use barbero_core::{AppointmentLog, BarberoError, CalendarGateway, Notifier, StorageAdapter};
use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::dedup::{Audience, NotificationLedger};

/// Gateway clients built from one credential record.
pub struct GatewayHandles {
    pub calendar: Arc<dyn CalendarGateway>,
    pub log: Option<Arc<dyn AppointmentLog>>,
}

/// Builds live gateway clients from stored credentials.
///
/// Shared by the scheduler and the conversational agent so both go through
/// the same construction path.
pub type GatewaySuiteFactory =
    Arc<dyn Fn(StoredCredentials) -> Result<GatewayHandles, BarberoError> + Send + Sync>;

/// Runs the reminder poll and daily digest against the admin's calendar.
pub struct ReminderScheduler {
    storage: Arc<dyn StorageAdapter + Send + Sync>,
    notifier: Arc<dyn Notifier>,
    suite: GatewaySuiteFactory,
    config: SchedulerConfig,
    calendar_id: String,
    ledger: Mutex<NotificationLedger>,
}

impl ReminderScheduler {
    pub fn new(
        storage: Arc<dyn StorageAdapter + Send + Sync>,
        notifier: Arc<dyn Notifier>,
        suite: GatewaySuiteFactory,
        config: SchedulerConfig,
        calendar_id: String,
    ) -> Self {
        // Entries must outlive the widest reminder window; the look-ahead
        // horizon (validated to cover it) is a natural retention bound.
        let retention = Duration::hours(config.lookahead_hours);
        Self {
            storage,
            notifier,
            suite,
            config,
            calendar_id,
            ledger: Mutex::new(NotificationLedger::new(retention)),
        }
    }

    /// One reminder poll tick.
    ///
    /// Not configured or not credentialed is a silent no-op; a gateway
    /// failure aborts the tick with an error the caller logs and forgets.
    pub async fn check_reminders(&self) -> Result<(), BarberoError> {
        self.reminder_pass(Utc::now()).await
    }

    async fn reminder_pass(&self, now: DateTime<Utc>) -> Result<(), BarberoError> {
        let Some((admin_chat_id, calendar)) = self.ready_calendar().await? else {
            return Ok(());
        };

        let time_min = now.to_rfc3339_opts(SecondsFormat::Secs, true);
        let time_max = (now + Duration::hours(self.config.lookahead_hours))
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        let events = calendar
            .list_events(&self.calendar_id, &time_min, &time_max)
            .await?;

        debug!(count = events.len(), "reminder poll fetched events");

        let mut ledger = self.ledger.lock().await;
        ledger.prune(now);

        for event in &events {
            let Some(start) = event.start.resolve_utc() else {
                debug!(event_id = event.id.as_str(), "event has no usable start time, skipping");
                continue;
            };
            let minutes_to_start = (start - now).num_minutes();

            if in_window(minutes_to_start, self.config.customer_window_mins)
                && !ledger.contains(Audience::Customer, &event.id)
            {
                // Events without a requester reference are skipped on the
                // customer path only; walk-ins still alert the owner below.
                if let Some(requester) = event.requester_reference() {
                    let text = customer_reminder_text(event);
                    if let Err(e) = self.notifier.notify(&requester, &text, true).await {
                        warn!(
                            event_id = event.id.as_str(),
                            error = %e,
                            "customer reminder send failed"
                        );
                    } else {
                        info!(
                            event_id = event.id.as_str(),
                            chat_id = requester.as_str(),
                            "customer reminder sent"
                        );
                    }
                    // Recorded even when the send failed: one shot per pair,
                    // no duplicate spam on the next tick.
                    ledger.record(Audience::Customer, &event.id, start);
                }
            }

            if in_window(minutes_to_start, self.config.admin_window_mins)
                && !ledger.contains(Audience::Admin, &event.id)
            {
                let text = admin_alert_text(event);
                if let Err(e) = self.notifier.notify(&admin_chat_id, &text, true).await {
                    warn!(
                        event_id = event.id.as_str(),
                        error = %e,
                        "admin alert send failed"
                    );
                } else {
                    info!(event_id = event.id.as_str(), "admin alert sent");
                }
                ledger.record(Audience::Admin, &event.id, start);
            }
        }

        Ok(())
    }

    /// One daily digest run.
    ///
    /// `now` carries the timezone whose calendar day bounds the query;
    /// production passes `Local::now()`.
    pub async fn send_daily_summary<Tz>(&self, now: DateTime<Tz>) -> Result<(), BarberoError>
    where
        Tz: TimeZone + Send,
        Tz::Offset: Send,
    {
        let Some((admin_chat_id, calendar)) = self.ready_calendar().await? else {
            return Ok(());
        };

        let day = now.date_naive();
        let tz = now.timezone();
        let day_start = tz
            .from_local_datetime(&day.and_hms_opt(0, 0, 0).expect("midnight is valid"))
            .earliest();
        let day_end = tz
            .from_local_datetime(&day.and_hms_opt(23, 59, 59).expect("end of day is valid"))
            .latest();
        let (Some(day_start), Some(day_end)) = (day_start, day_end) else {
            return Err(BarberoError::Internal(
                "could not resolve local day bounds".into(),
            ));
        };

        let time_min = day_start
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        let time_max = day_end
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        let events = calendar
            .list_events(&self.calendar_id, &time_min, &time_max)
            .await?;

        let message = daily_summary_text(&events);
        if let Err(e) = self.notifier.notify(&admin_chat_id, &message, true).await {
            warn!(error = %e, "daily digest send failed");
        } else {
            info!(count = events.len(), "daily digest sent");
        }

        Ok(())
    }

    /// Resolves the tenant and builds a calendar client, or `None` when the
    /// bot is not (fully) configured yet.
    async fn ready_calendar(
        &self,
    ) -> Result<Option<(String, Arc<dyn CalendarGateway>)>, BarberoError> {
        match self.storage.resolve_tenant().await? {
            TenantState::Ready {
                admin_chat_id,
                credentials,
            } => {
                let handles = (self.suite)(credentials)?;
                Ok(Some((admin_chat_id, handles.calendar)))
            }
            TenantState::Uncredentialed { .. } => {
                debug!("admin has not connected a calendar yet, skipping");
                Ok(None)
            }
            TenantState::Unconfigured => {
                debug!("no admin configured, skipping");
                Ok(None)
            }
        }
    }
}

/// Inclusive window membership.
fn in_window(minutes: i64, window: [i64; 2]) -> bool {
    minutes >= window[0] && minutes <= window[1]
}

fn customer_reminder_text(event: &CalendarEvent) -> String {
    match event.start.resolve_fixed() {
        Some(start) => format!(
            "⏰ Recordatorio: tienes una cita en la barbería en 1 hora ({}). ¡Te esperamos!",
            start.format("%H:%M")
        ),
        None => "⏰ Recordatorio: tienes una cita en la barbería en 1 hora. ¡Te esperamos!"
            .to_string(),
    }
}

fn admin_alert_text(event: &CalendarEvent) -> String {
    let title = event.summary.as_deref().unwrap_or("Alguien");
    format!("💈 Próximo cliente: en 15 minutos tienes a *{title}*.")
}

fn daily_summary_text(events: &[CalendarEvent]) -> String {
    // Only timed appointments make the list; all-day blockers carry no
    // useful HH:MM.
    let mut timed: Vec<(chrono::DateTime<chrono::FixedOffset>, &CalendarEvent)> = events
        .iter()
        .filter_map(|e| e.start.resolve_fixed().map(|start| (start, e)))
        .collect();

    if timed.is_empty() {
        return "📅 ¡Buenos días! Hoy no tienes citas agendadas.".to_string();
    }

    timed.sort_by_key(|(start, _)| *start);

    let mut message = String::from("📅 *Agenda de hoy:*\n\n");
    for (start, event) in timed {
        let title = event.summary.as_deref().unwrap_or("Cita");
        message.push_str(&format!("• {} - {title}\n", start.format("%H:%M")));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use barbero_core::types::{EventTime, REQUESTER_PROPERTY};
    use barbero_test_utils::{FakeCalendar, MemoryStorage, MockChannel};
    use chrono::FixedOffset;

    const NOW: &str = "2026-08-07T12:00:00Z";

    fn t(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().to_utc()
    }

    fn event(id: &str, summary: &str, start: &str, requester: Option<&str>) -> CalendarEvent {
        let mut event = CalendarEvent {
            id: id.into(),
            summary: Some(summary.into()),
            description: None,
            start: EventTime::at(start),
            end: EventTime::default(),
            private_properties: Default::default(),
        };
        if let Some(requester) = requester {
            event
                .private_properties
                .insert(REQUESTER_PROPERTY.into(), requester.into());
        }
        event
    }

    struct Rig {
        scheduler: ReminderScheduler,
        calendar: Arc<FakeCalendar>,
        channel: Arc<MockChannel>,
    }

    async fn rig(storage: MemoryStorage) -> Rig {
        let calendar = Arc::new(FakeCalendar::new());
        let channel = Arc::new(MockChannel::new());
        let cal = calendar.clone();
        let suite: GatewaySuiteFactory = Arc::new(move |_creds| {
            Ok(GatewayHandles {
                calendar: cal.clone(),
                log: None,
            })
        });
        let scheduler = ReminderScheduler::new(
            Arc::new(storage),
            channel.clone(),
            suite,
            SchedulerConfig::default(),
            "primary".into(),
        );
        Rig {
            scheduler,
            calendar,
            channel,
        }
    }

    async fn ready_rig() -> Rig {
        rig(MemoryStorage::new().with_ready_tenant("999").await).await
    }

    #[tokio::test]
    async fn customer_reminder_fires_once_across_repeated_ticks() {
        let rig = ready_rig().await;
        // 13:00 start, 60 minutes out at NOW.
        rig.calendar
            .set_events(vec![event(
                "e1",
                "Corte - Juan",
                "2026-08-07T13:00:00Z",
                Some("12345"),
            )])
            .await;

        // Three consecutive ticks inside the window.
        for offset in ["12:00:00", "12:05:00", "12:08:00"] {
            rig.scheduler
                .reminder_pass(t(&format!("2026-08-07T{offset}Z")))
                .await
                .unwrap();
        }

        let sent = rig.channel.sent_messages().await;
        assert_eq!(sent.len(), 1, "expected exactly one reminder, got {sent:?}");
        assert_eq!(sent[0].chat_id, "12345");
        assert!(sent[0].content.contains("1 hora"));
        assert!(sent[0].content.contains("13:00"));
    }

    #[tokio::test]
    async fn admin_alert_fires_once_per_event() {
        let rig = ready_rig().await;
        // Two events both 15 minutes out: two distinct alerts, keyed per id.
        rig.calendar
            .set_events(vec![
                event("e1", "Corte - Juan", "2026-08-07T12:15:00Z", None),
                event("e2", "Barba - Pedro", "2026-08-07T12:15:00Z", None),
            ])
            .await;

        rig.scheduler.reminder_pass(t(NOW)).await.unwrap();
        rig.scheduler.reminder_pass(t(NOW)).await.unwrap();

        let sent = rig.channel.sent_messages().await;
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|m| m.chat_id == "999"));
        assert!(sent.iter().any(|m| m.content.contains("Corte - Juan")));
        assert!(sent.iter().any(|m| m.content.contains("Barba - Pedro")));
    }

    #[tokio::test]
    async fn event_without_marker_skips_customer_but_alerts_admin() {
        let rig = ready_rig().await;
        // 15 minutes out with no requester reference anywhere.
        rig.calendar
            .set_events(vec![event("e1", "Walk-in", "2026-08-07T12:15:00Z", None)])
            .await;

        rig.scheduler.reminder_pass(t(NOW)).await.unwrap();

        let sent = rig.channel.sent_messages().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].chat_id, "999");
        assert!(sent[0].content.contains("Walk-in"));
    }

    #[tokio::test]
    async fn legacy_description_marker_is_honored() {
        let rig = ready_rig().await;
        let mut e = event("e1", "Corte", "2026-08-07T13:00:00Z", None);
        e.description = Some("Corte de pelo\n\nRef: 777".into());
        rig.calendar.set_events(vec![e]).await;

        rig.scheduler.reminder_pass(t(NOW)).await.unwrap();

        let sent = rig.channel.sent_messages().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].chat_id, "777");
    }

    #[tokio::test]
    async fn polling_after_window_never_notifies_retroactively() {
        let rig = ready_rig().await;
        // Event starts in 5 minutes; both windows were missed.
        rig.calendar
            .set_events(vec![event(
                "e1",
                "Corte - Juan",
                "2026-08-07T12:05:00Z",
                Some("12345"),
            )])
            .await;

        rig.scheduler.reminder_pass(t(NOW)).await.unwrap();

        assert_eq!(rig.channel.sent_count().await, 0);
    }

    #[tokio::test]
    async fn unconfigured_tenant_is_a_silent_noop() {
        let rig = rig(MemoryStorage::new()).await;
        rig.calendar
            .set_events(vec![event(
                "e1",
                "Corte",
                "2026-08-07T12:15:00Z",
                Some("12345"),
            )])
            .await;

        rig.scheduler.reminder_pass(t(NOW)).await.unwrap();
        rig.scheduler
            .send_daily_summary(t(NOW).with_timezone(&FixedOffset::west_opt(5 * 3600).unwrap()))
            .await
            .unwrap();

        assert_eq!(rig.channel.sent_count().await, 0);
    }

    #[tokio::test]
    async fn uncredentialed_tenant_is_a_silent_noop() {
        let storage = MemoryStorage::new();
        storage
            .register_admin("999", None, Some("Carlos"), None)
            .await
            .unwrap();
        let rig = rig(storage).await;
        rig.calendar
            .set_events(vec![event("e1", "Corte", "2026-08-07T12:15:00Z", None)])
            .await;

        rig.scheduler.reminder_pass(t(NOW)).await.unwrap();

        assert_eq!(rig.channel.sent_count().await, 0);
    }

    #[tokio::test]
    async fn gateway_failure_aborts_tick_and_recovers_next_tick() {
        let rig = ready_rig().await;
        rig.calendar
            .set_events(vec![event("e1", "Corte", "2026-08-07T12:15:00Z", None)])
            .await;

        rig.calendar.fail(true);
        assert!(rig.scheduler.reminder_pass(t(NOW)).await.is_err());
        assert_eq!(rig.channel.sent_count().await, 0);

        rig.calendar.fail(false);
        rig.scheduler
            .reminder_pass(t("2026-08-07T12:02:00Z"))
            .await
            .unwrap();
        assert_eq!(rig.channel.sent_count().await, 1);
    }

    #[tokio::test]
    async fn failed_send_is_not_retried_on_later_ticks() {
        let rig = ready_rig().await;
        rig.calendar
            .set_events(vec![event(
                "e1",
                "Corte - Juan",
                "2026-08-07T13:00:00Z",
                Some("12345"),
            )])
            .await;

        rig.channel.fail_sends(true);
        rig.scheduler.reminder_pass(t(NOW)).await.unwrap();
        assert_eq!(rig.channel.sent_count().await, 0);

        // The dedup key was recorded despite the failure; no duplicate spam.
        rig.channel.fail_sends(false);
        rig.scheduler
            .reminder_pass(t("2026-08-07T12:05:00Z"))
            .await
            .unwrap();
        assert_eq!(rig.channel.sent_count().await, 0);
    }

    #[tokio::test]
    async fn unparseable_start_skips_event_but_not_the_batch() {
        let rig = ready_rig().await;
        let broken = CalendarEvent {
            id: "broken".into(),
            summary: Some("??".into()),
            ..Default::default()
        };
        rig.calendar
            .set_events(vec![
                broken,
                event("ok", "Corte - Juan", "2026-08-07T12:15:00Z", None),
            ])
            .await;

        rig.scheduler.reminder_pass(t(NOW)).await.unwrap();

        let sent = rig.channel.sent_messages().await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].content.contains("Corte - Juan"));
    }

    #[tokio::test]
    async fn all_day_event_does_not_crash_classification() {
        let rig = ready_rig().await;
        let all_day = CalendarEvent {
            id: "allday".into(),
            summary: Some("Festivo".into()),
            start: EventTime {
                date: Some("2026-08-07".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        rig.calendar.set_events(vec![all_day]).await;

        // Midnight start is hours in the past; neither window matches.
        rig.scheduler.reminder_pass(t(NOW)).await.unwrap();
        assert_eq!(rig.channel.sent_count().await, 0);
    }

    #[tokio::test]
    async fn daily_summary_with_no_events_sends_friendly_message() {
        let rig = ready_rig().await;
        rig.calendar.set_events(vec![]).await;

        let local_now = t(NOW).with_timezone(&FixedOffset::west_opt(5 * 3600).unwrap());
        rig.scheduler.send_daily_summary(local_now).await.unwrap();

        let sent = rig.channel.sent_messages().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].chat_id, "999");
        assert!(sent[0].content.contains("no tienes citas"));
    }

    #[tokio::test]
    async fn daily_summary_lists_events_ascending() {
        let rig = ready_rig().await;
        // Programmed out of order on purpose.
        rig.calendar
            .set_events(vec![
                event("e2", "Barba - Pedro", "2026-08-07T15:30:00-05:00", None),
                event("e1", "Corte - Juan", "2026-08-07T09:00:00-05:00", None),
                event("e3", "Tinte - Luis", "2026-08-07T11:15:00-05:00", None),
            ])
            .await;

        let local_now = t(NOW).with_timezone(&FixedOffset::west_opt(5 * 3600).unwrap());
        rig.scheduler.send_daily_summary(local_now).await.unwrap();

        let sent = rig.channel.sent_messages().await;
        assert_eq!(sent.len(), 1);
        let lines: Vec<&str> = sent[0]
            .content
            .lines()
            .filter(|l| l.starts_with('•'))
            .collect();
        assert_eq!(
            lines,
            vec![
                "• 09:00 - Corte - Juan",
                "• 11:15 - Tinte - Luis",
                "• 15:30 - Barba - Pedro",
            ]
        );
    }

    #[test]
    fn window_bounds_are_inclusive() {
        assert!(in_window(50, [50, 70]));
        assert!(in_window(70, [50, 70]));
        assert!(!in_window(49, [50, 70]));
        assert!(!in_window(71, [50, 70]));
    }
}
