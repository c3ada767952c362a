// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Booking tools exposed to the model.
//!
//! Four tools cover the whole booking surface: availability lookup, event
//! creation, cancellation, and the spreadsheet action log. Tool failures
//! are returned to the model as `{"error": ...}` results so it can apologize
//! or retry -- they never abort the conversation turn.

use std::sync::Arc;

use barbero_core::types::{CalendarEvent, EventDraft};
use barbero_core::{AppointmentLog, CalendarGateway};
use barbero_gemini::types::{FunctionCall, FunctionDeclaration, Tool};
use tracing::{info, warn};

use crate::reminders::GatewayHandles;

/// Marker appended as the last column of every logged row.
const LOG_SOURCE: &str = "barbero-bot";

/// Result of dispatching one tool call.
pub struct ToolOutcome {
    /// Value handed back to the model as the function response.
    pub response: serde_json::Value,
    /// Set when a new appointment was created, so the agent loop can alert
    /// the owner immediately.
    pub created_event: Option<CalendarEvent>,
}

impl ToolOutcome {
    fn ok(response: serde_json::Value) -> Self {
        Self {
            response,
            created_event: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self::ok(serde_json::json!({ "error": message.into() }))
    }
}

/// Dispatches model tool calls against the calendar and appointment log.
pub struct BookingTools {
    calendar: Arc<dyn CalendarGateway>,
    log: Option<Arc<dyn AppointmentLog>>,
    calendar_id: String,
    time_zone: String,
}

impl BookingTools {
    pub fn new(handles: GatewayHandles, calendar_id: String, time_zone: String) -> Self {
        Self {
            calendar: handles.calendar,
            log: handles.log,
            calendar_id,
            time_zone,
        }
    }

    /// Tool declarations sent with every model request.
    pub fn declarations() -> Vec<Tool> {
        vec![Tool {
            function_declarations: vec![
                FunctionDeclaration {
                    name: "check_availability".into(),
                    description: "Lista las citas del calendario entre dos instantes \
                                  para revisar disponibilidad."
                        .into(),
                    parameters: serde_json::json!({
                        "type": "object",
                        "properties": {
                            "time_min": {
                                "type": "string",
                                "description": "Inicio del rango, ISO 8601"
                            },
                            "time_max": {
                                "type": "string",
                                "description": "Fin del rango, ISO 8601"
                            }
                        },
                        "required": ["time_min", "time_max"]
                    }),
                },
                FunctionDeclaration {
                    name: "create_event".into(),
                    description: "Crea una cita en el calendario.".into(),
                    parameters: serde_json::json!({
                        "type": "object",
                        "properties": {
                            "summary": {
                                "type": "string",
                                "description": "Título de la cita, ej. 'Corte - Juan'"
                            },
                            "description": {
                                "type": "string",
                                "description": "Detalles de la cita"
                            },
                            "start_time": {
                                "type": "string",
                                "description": "Inicio, ISO 8601 (YYYY-MM-DDTHH:MM:SS)"
                            },
                            "end_time": {
                                "type": "string",
                                "description": "Fin, ISO 8601"
                            }
                        },
                        "required": ["summary", "start_time", "end_time"]
                    }),
                },
                FunctionDeclaration {
                    name: "delete_event".into(),
                    description: "Cancela una cita por su identificador.".into(),
                    parameters: serde_json::json!({
                        "type": "object",
                        "properties": {
                            "event_id": {
                                "type": "string",
                                "description": "Identificador del evento a cancelar"
                            }
                        },
                        "required": ["event_id"]
                    }),
                },
                FunctionDeclaration {
                    name: "log_to_sheet".into(),
                    description: "Registra una acción (agendado, eliminado, actualizado) \
                                  en la hoja de control del dueño."
                        .into(),
                    parameters: serde_json::json!({
                        "type": "object",
                        "properties": {
                            "nombre": {"type": "string", "description": "Nombre del cliente"},
                            "servicio": {"type": "string", "description": "Servicio"},
                            "precio": {"type": "string", "description": "Precio"},
                            "hora": {"type": "string", "description": "Hora (HH:MM:SS)"},
                            "estatus": {
                                "type": "string",
                                "description": "'agendado', 'eliminado' o 'actualizado'"
                            },
                            "dia": {"type": "string", "description": "Fecha (YYYY-MM-DD)"},
                            "celular": {
                                "type": "string",
                                "description": "ID de chat del cliente"
                            },
                            "event_id": {"type": "string", "description": "ID del evento"}
                        },
                        "required": ["nombre", "servicio", "estatus"]
                    }),
                },
            ],
        }]
    }

    /// Executes one tool call on behalf of `requester_chat_id`.
    pub async fn dispatch(&self, call: &FunctionCall, requester_chat_id: &str) -> ToolOutcome {
        info!(tool = call.name.as_str(), "tool call");
        match call.name.as_str() {
            "check_availability" => self.check_availability(&call.args).await,
            "create_event" => self.create_event(&call.args, requester_chat_id).await,
            "delete_event" => self.delete_event(&call.args).await,
            "log_to_sheet" => self.log_to_sheet(&call.args).await,
            other => {
                warn!(tool = other, "model requested an unknown tool");
                ToolOutcome::error(format!("unknown tool `{other}`"))
            }
        }
    }

    async fn check_availability(&self, args: &serde_json::Value) -> ToolOutcome {
        let Some(time_min) = str_arg(args, "time_min") else {
            return ToolOutcome::error("time_min is required");
        };
        let Some(time_max) = str_arg(args, "time_max") else {
            return ToolOutcome::error("time_max is required");
        };

        match self
            .calendar
            .list_events(&self.calendar_id, time_min, time_max)
            .await
        {
            Ok(events) => {
                let events: Vec<_> = events.iter().map(event_to_json).collect();
                ToolOutcome::ok(serde_json::json!({ "events": events }))
            }
            Err(e) => {
                warn!(error = %e, "check_availability failed");
                ToolOutcome::error(format!("could not read the calendar: {e}"))
            }
        }
    }

    async fn create_event(&self, args: &serde_json::Value, requester: &str) -> ToolOutcome {
        let Some(summary) = str_arg(args, "summary") else {
            return ToolOutcome::error("summary is required");
        };
        let Some(start) = str_arg(args, "start_time") else {
            return ToolOutcome::error("start_time is required");
        };
        let Some(end) = str_arg(args, "end_time") else {
            return ToolOutcome::error("end_time is required");
        };
        let description = str_arg(args, "description").unwrap_or_default();

        let draft = EventDraft {
            summary: summary.to_string(),
            description: description.to_string(),
            start: start.to_string(),
            end: end.to_string(),
            time_zone: Some(self.time_zone.clone()),
            requester_chat_id: Some(requester.to_string()),
        };

        match self.calendar.create_event(&self.calendar_id, draft).await {
            Ok(event) => {
                let response = event_to_json(&event);
                ToolOutcome {
                    response,
                    created_event: Some(event),
                }
            }
            Err(e) => {
                warn!(error = %e, "create_event failed");
                ToolOutcome::error(format!("could not create the event: {e}"))
            }
        }
    }

    async fn delete_event(&self, args: &serde_json::Value) -> ToolOutcome {
        let Some(event_id) = str_arg(args, "event_id") else {
            return ToolOutcome::error("event_id is required");
        };

        match self.calendar.delete_event(&self.calendar_id, event_id).await {
            Ok(()) => ToolOutcome::ok(serde_json::json!({ "deleted": event_id })),
            Err(e) => {
                warn!(error = %e, "delete_event failed");
                ToolOutcome::error(format!("could not delete the event: {e}"))
            }
        }
    }

    async fn log_to_sheet(&self, args: &serde_json::Value) -> ToolOutcome {
        let Some(log) = &self.log else {
            return ToolOutcome::error("no spreadsheet is configured");
        };

        let field = |name: &str| str_arg(args, name).unwrap_or_default().to_string();
        let row = vec![
            field("nombre"),
            field("servicio"),
            field("precio"),
            field("hora"),
            field("estatus"),
            field("dia"),
            field("celular"),
            field("event_id"),
            LOG_SOURCE.to_string(),
        ];

        match log.append_row(row).await {
            Ok(()) => ToolOutcome::ok(serde_json::json!({ "logged": true })),
            Err(e) => {
                warn!(error = %e, "log_to_sheet failed");
                ToolOutcome::error(format!("could not write to the sheet: {e}"))
            }
        }
    }
}

fn str_arg<'a>(args: &'a serde_json::Value, name: &str) -> Option<&'a str> {
    args.get(name)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}

/// Compact JSON view of an event for tool responses.
fn event_to_json(event: &CalendarEvent) -> serde_json::Value {
    serde_json::json!({
        "id": event.id,
        "summary": event.summary,
        "description": event.description,
        "start": { "dateTime": event.start.date_time, "date": event.start.date },
        "end": { "dateTime": event.end.date_time, "date": event.end.date },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use barbero_core::types::EventTime;
    use barbero_test_utils::{FakeCalendar, RecordingLog};

    fn tools_with(
        calendar: Arc<FakeCalendar>,
        log: Option<Arc<RecordingLog>>,
    ) -> BookingTools {
        BookingTools::new(
            GatewayHandles {
                calendar,
                log: log.map(|l| l as Arc<dyn AppointmentLog>),
            },
            "primary".into(),
            "America/Bogota".into(),
        )
    }

    fn call(name: &str, args: serde_json::Value) -> FunctionCall {
        FunctionCall {
            name: name.into(),
            args,
        }
    }

    #[tokio::test]
    async fn check_availability_returns_events() {
        let calendar = Arc::new(FakeCalendar::new());
        calendar
            .set_events(vec![CalendarEvent {
                id: "e1".into(),
                summary: Some("Corte - Juan".into()),
                start: EventTime::at("2026-08-07T15:00:00-05:00"),
                ..Default::default()
            }])
            .await;
        let tools = tools_with(calendar, None);

        let outcome = tools
            .dispatch(
                &call(
                    "check_availability",
                    serde_json::json!({
                        "time_min": "2026-08-07T14:00:00-05:00",
                        "time_max": "2026-08-07T18:00:00-05:00"
                    }),
                ),
                "12345",
            )
            .await;

        assert_eq!(outcome.response["events"][0]["id"], "e1");
        assert!(outcome.created_event.is_none());
    }

    #[tokio::test]
    async fn create_event_threads_requester_and_flags_creation() {
        let calendar = Arc::new(FakeCalendar::new());
        let tools = tools_with(calendar.clone(), None);

        let outcome = tools
            .dispatch(
                &call(
                    "create_event",
                    serde_json::json!({
                        "summary": "Corte - Juan",
                        "description": "Corte y barba",
                        "start_time": "2026-08-08T10:00:00-05:00",
                        "end_time": "2026-08-08T10:30:00-05:00"
                    }),
                ),
                "12345",
            )
            .await;

        assert!(outcome.created_event.is_some());
        let drafts = calendar.created_drafts().await;
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].requester_chat_id.as_deref(), Some("12345"));
        assert_eq!(drafts[0].time_zone.as_deref(), Some("America/Bogota"));
    }

    #[tokio::test]
    async fn create_event_requires_times() {
        let tools = tools_with(Arc::new(FakeCalendar::new()), None);
        let outcome = tools
            .dispatch(
                &call("create_event", serde_json::json!({"summary": "Corte"})),
                "12345",
            )
            .await;
        assert!(outcome.response["error"].is_string());
        assert!(outcome.created_event.is_none());
    }

    #[tokio::test]
    async fn delete_event_reports_deleted_id() {
        let calendar = Arc::new(FakeCalendar::new());
        let tools = tools_with(calendar.clone(), None);

        let outcome = tools
            .dispatch(
                &call("delete_event", serde_json::json!({"event_id": "e9"})),
                "12345",
            )
            .await;

        assert_eq!(outcome.response["deleted"], "e9");
        assert_eq!(calendar.deleted_ids().await, vec!["e9".to_string()]);
    }

    #[tokio::test]
    async fn log_to_sheet_appends_row_with_source_marker() {
        let log = Arc::new(RecordingLog::new());
        let tools = tools_with(Arc::new(FakeCalendar::new()), Some(log.clone()));

        let outcome = tools
            .dispatch(
                &call(
                    "log_to_sheet",
                    serde_json::json!({
                        "nombre": "Juan",
                        "servicio": "Corte",
                        "precio": "17000",
                        "hora": "10:00:00",
                        "estatus": "agendado",
                        "dia": "2026-08-08",
                        "celular": "12345",
                        "event_id": "e1"
                    }),
                ),
                "12345",
            )
            .await;

        assert_eq!(outcome.response["logged"], true);
        let rows = log.rows().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "Juan");
        assert_eq!(rows[0][4], "agendado");
        assert_eq!(rows[0][8], LOG_SOURCE);
    }

    #[tokio::test]
    async fn log_to_sheet_without_spreadsheet_is_a_tool_error() {
        let tools = tools_with(Arc::new(FakeCalendar::new()), None);
        let outcome = tools
            .dispatch(
                &call("log_to_sheet", serde_json::json!({"nombre": "Juan"})),
                "12345",
            )
            .await;
        assert!(outcome.response["error"].is_string());
    }

    #[tokio::test]
    async fn unknown_tool_is_a_tool_error() {
        let tools = tools_with(Arc::new(FakeCalendar::new()), None);
        let outcome = tools
            .dispatch(&call("reboot_shop", serde_json::json!({})), "12345")
            .await;
        assert!(outcome.response["error"].is_string());
    }

    #[tokio::test]
    async fn gateway_failure_becomes_a_tool_error_not_a_fault() {
        let calendar = Arc::new(FakeCalendar::new());
        calendar.fail(true);
        let tools = tools_with(calendar, None);

        let outcome = tools
            .dispatch(
                &call(
                    "check_availability",
                    serde_json::json!({
                        "time_min": "2026-08-07T14:00:00Z",
                        "time_max": "2026-08-07T18:00:00Z"
                    }),
                ),
                "12345",
            )
            .await;

        assert!(outcome.response["error"].is_string());
    }
}
