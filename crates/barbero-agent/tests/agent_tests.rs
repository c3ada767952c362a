// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the agent loop: commands, tenant gating, and the
//! tool-calling conversation cycle against a mock Gemini server.

use std::sync::Arc;

use barbero_agent::{AgentLoop, GatewayHandles, GatewaySuiteFactory};
use barbero_config::model::{BarberoConfig, GoogleConfig};
use barbero_core::types::{InboundMessage, MessageContent};
use barbero_core::{ChannelAdapter, StorageAdapter};
use barbero_gemini::GeminiClient;
use barbero_oauth::AuthFlow;
use barbero_test_utils::{FakeCalendar, MemoryStorage, MockChannel};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Rig {
    agent: AgentLoop,
    channel: Arc<MockChannel>,
    calendar: Arc<FakeCalendar>,
    storage: Arc<MemoryStorage>,
}

async fn rig(server: &MockServer, storage: MemoryStorage) -> Rig {
    let channel = Arc::new(MockChannel::new());
    let calendar = Arc::new(FakeCalendar::new());
    let storage = Arc::new(storage);

    let gemini = Arc::new(
        GeminiClient::new("test-key".into(), "gemini-1.5-flash".into(), 256)
            .unwrap()
            .with_base_url(server.uri()),
    );

    let google = GoogleConfig {
        client_id: Some("client-1".into()),
        client_secret: Some("secret-1".into()),
        ..Default::default()
    };
    let auth_flow = Some(Arc::new(AuthFlow::new(google.clone()).unwrap()));

    let cal = calendar.clone();
    let suite: GatewaySuiteFactory = Arc::new(move |_creds| {
        Ok(GatewayHandles {
            calendar: cal.clone(),
            log: None,
        })
    });

    let config = BarberoConfig {
        google,
        ..Default::default()
    };

    let agent = AgentLoop::new(
        channel.clone() as Arc<dyn ChannelAdapter>,
        storage.clone(),
        gemini,
        auth_flow,
        suite,
        config,
    );

    Rig {
        agent,
        channel,
        calendar,
        storage,
    }
}

fn text_from(sender_id: &str, first_name: &str, text: &str) -> InboundMessage {
    InboundMessage {
        id: "1".into(),
        chat_id: sender_id.into(),
        sender_id: sender_id.into(),
        sender_username: None,
        sender_first_name: Some(first_name.into()),
        content: MessageContent::Text(text.into()),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}

#[tokio::test]
async fn setup_registers_only_the_first_user() {
    let server = MockServer::start().await;
    let mut rig = rig(&server, MemoryStorage::new()).await;

    rig.agent
        .handle_inbound(text_from("111", "Carlos", "/setup"))
        .await
        .unwrap();
    rig.agent
        .handle_inbound(text_from("222", "Eva", "/setup"))
        .await
        .unwrap();

    let sent = rig.channel.sent_messages().await;
    assert_eq!(sent.len(), 2);
    assert!(sent[0].content.contains("administrador"));
    assert!(sent[1].content.contains("dueño"));
    assert_eq!(
        rig.storage.admin_chat_id().await.unwrap().as_deref(),
        Some("111")
    );
}

#[tokio::test]
async fn free_text_when_unconfigured_points_to_setup() {
    let server = MockServer::start().await;
    let mut rig = rig(&server, MemoryStorage::new()).await;

    rig.agent
        .handle_inbound(text_from("555", "Juan", "quiero un corte"))
        .await
        .unwrap();

    let sent = rig.channel.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].content.contains("/setup"));
}

#[tokio::test]
async fn uncredentialed_tenant_gates_by_role() {
    let server = MockServer::start().await;
    let storage = MemoryStorage::new();
    storage
        .register_admin("111", None, Some("Carlos"), None)
        .await
        .unwrap();
    let mut rig = rig(&server, storage).await;

    rig.agent
        .handle_inbound(text_from("555", "Juan", "quiero un corte"))
        .await
        .unwrap();
    rig.agent
        .handle_inbound(text_from("111", "Carlos", "¿qué tengo hoy?"))
        .await
        .unwrap();

    let sent = rig.channel.sent_messages().await;
    assert_eq!(sent.len(), 2);
    assert!(sent[0].content.contains("mantenimiento"));
    assert!(sent[1].content.contains("/connect"));
}

#[tokio::test]
async fn connect_is_admin_only_and_produces_consent_link() {
    let server = MockServer::start().await;
    let storage = MemoryStorage::new();
    storage
        .register_admin("111", None, Some("Carlos"), None)
        .await
        .unwrap();
    let mut rig = rig(&server, storage).await;

    rig.agent
        .handle_inbound(text_from("555", "Juan", "/connect"))
        .await
        .unwrap();
    rig.agent
        .handle_inbound(text_from("111", "Carlos", "/connect"))
        .await
        .unwrap();

    let sent = rig.channel.sent_messages().await;
    assert_eq!(sent.len(), 2);
    assert!(sent[0].content.contains("solo para el administrador"));
    assert!(sent[1].content.contains("accounts.google.com"));
    assert!(sent[1].content.contains("state=111"));
}

#[tokio::test]
async fn booking_round_trip_notifies_owner_and_threads_requester() {
    let server = MockServer::start().await;

    // First model turn asks for a booking tool call...
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{
                        "functionCall": {
                            "name": "create_event",
                            "args": {
                                "summary": "Corte - Juan",
                                "description": "Corte de pelo",
                                "start_time": "2026-08-08T10:00:00-05:00",
                                "end_time": "2026-08-08T10:30:00-05:00"
                            }
                        }
                    }]
                }
            }]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    // ...the second confirms in text.
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "¡Listo! Tu cita quedó para mañana a las 10:00 💈"}]
                }
            }]
        })))
        .mount(&server)
        .await;

    let storage = MemoryStorage::new().with_ready_tenant("111").await;
    let mut rig = rig(&server, storage).await;

    rig.agent
        .handle_inbound(text_from("555", "Juan", "agéndame un corte mañana a las 10"))
        .await
        .unwrap();

    let sent = rig.channel.sent_messages().await;
    // Owner alert plus customer confirmation.
    assert_eq!(sent.len(), 2, "got: {sent:?}");
    let owner_note = sent.iter().find(|m| m.chat_id == "111").unwrap();
    assert!(owner_note.content.contains("Nueva cita"));
    assert!(owner_note.content.contains("Corte - Juan"));
    let customer_reply = sent.iter().find(|m| m.chat_id == "555").unwrap();
    assert!(customer_reply.content.contains("¡Listo!"));

    let drafts = rig.calendar.created_drafts().await;
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].requester_chat_id.as_deref(), Some("555"));
}

#[tokio::test]
async fn admin_booking_does_not_self_notify() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{
                        "functionCall": {
                            "name": "create_event",
                            "args": {
                                "summary": "Bloqueo - almuerzo",
                                "start_time": "2026-08-08T12:00:00-05:00",
                                "end_time": "2026-08-08T13:00:00-05:00"
                            }
                        }
                    }]
                }
            }]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Bloqueado el almuerzo."}]}
            }]
        })))
        .mount(&server)
        .await;

    let storage = MemoryStorage::new().with_ready_tenant("111").await;
    let mut rig = rig(&server, storage).await;

    rig.agent
        .handle_inbound(text_from("111", "Carlos", "bloquéame el almuerzo de mañana"))
        .await
        .unwrap();

    let sent = rig.channel.sent_messages().await;
    // Only the conversational reply; no separate booking alert.
    assert_eq!(sent.len(), 1, "got: {sent:?}");
    assert!(sent[0].content.contains("Bloqueado"));
}

#[tokio::test]
async fn model_failure_yields_apology_not_silence() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {"code": 400, "message": "bad request", "status": "INVALID_ARGUMENT"}
        })))
        .mount(&server)
        .await;

    let storage = MemoryStorage::new().with_ready_tenant("111").await;
    let mut rig = rig(&server, storage).await;

    rig.agent
        .handle_inbound(text_from("555", "Juan", "hola"))
        .await
        .unwrap();

    let sent = rig.channel.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].content.contains("Lo siento"));
}

#[tokio::test]
async fn reset_clears_tenant_and_allows_setup_again() {
    let server = MockServer::start().await;
    let storage = MemoryStorage::new().with_ready_tenant("111").await;
    let mut rig = rig(&server, storage).await;

    rig.agent
        .handle_inbound(text_from("111", "Carlos", "/reset"))
        .await
        .unwrap();

    assert!(rig.storage.admin_chat_id().await.unwrap().is_none());
    assert!(rig.storage.credentials_for("111").await.unwrap().is_none());

    rig.agent
        .handle_inbound(text_from("222", "Marta", "/setup"))
        .await
        .unwrap();
    assert_eq!(
        rig.storage.admin_chat_id().await.unwrap().as_deref(),
        Some("222")
    );
}
