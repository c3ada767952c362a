// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OAuth callback HTTP server built on axum.
//!
//! Serves the redirect target of the consent flow: exchanges the one-time
//! code, persists the credentials under the chat id carried in `state`, and
//! renders a small result page the user sees in their browser.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use barbero_core::{BarberoError, StorageAdapter};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::flow::AuthFlow;

/// Shared state for callback handlers.
#[derive(Clone)]
pub struct CallbackState {
    pub flow: Arc<AuthFlow>,
    pub storage: Arc<dyn StorageAdapter + Send + Sync>,
}

/// Query parameters Google appends to the redirect.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    /// Chat id of the user who initiated the consent flow.
    pub state: String,
    /// One-time authorization code.
    pub code: String,
}

/// Builds the callback router. Exposed separately for testing.
pub fn router(state: CallbackState) -> Router {
    Router::new()
        .route("/", get(get_status))
        .route("/auth/callback", get(get_auth_callback))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Start the callback server, shutting down when the token is cancelled.
pub async fn start_server(
    host: &str,
    port: u16,
    state: CallbackState,
    cancel: CancellationToken,
) -> Result<(), BarberoError> {
    let app = router(state);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| BarberoError::Channel {
            message: format!("failed to bind callback server to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    info!("callback server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| BarberoError::Channel {
            message: format!("callback server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}

/// Liveness endpoint, also used by hosting healthchecks.
async fn get_status() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "barbero-auth",
    }))
}

async fn get_auth_callback(
    State(state): State<CallbackState>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, Html<&'static str>) {
    info!(chat_id = params.state.as_str(), "OAuth callback received");

    let credentials = match state.flow.exchange_code(&params.code).await {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "authorization code exchange failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(FAILURE_PAGE));
        }
    };

    if let Err(e) = state
        .storage
        .save_credentials(&params.state, &credentials)
        .await
    {
        error!(error = %e, "failed to persist credentials");
        return (StatusCode::INTERNAL_SERVER_ERROR, Html(FAILURE_PAGE));
    }

    info!(chat_id = params.state.as_str(), "credentials stored");
    (StatusCode::OK, Html(SUCCESS_PAGE))
}

const SUCCESS_PAGE: &str = r#"<html>
    <body style="font-family: sans-serif; text-align: center; padding: 50px;">
        <h1 style="color: green;">&#9989; &iexcl;Conexi&oacute;n exitosa!</h1>
        <p>Tu calendario de Google qued&oacute; vinculado con el bot.</p>
        <p>Ya puedes cerrar esta ventana y volver a Telegram.</p>
    </body>
</html>"#;

const FAILURE_PAGE: &str = r#"<html>
    <body style="font-family: sans-serif; text-align: center; padding: 50px;">
        <h1 style="color: red;">&#10060; Error al conectar</h1>
        <p>Hubo un problema guardando tus credenciales. Por favor intenta de nuevo.</p>
    </body>
</html>"#;
