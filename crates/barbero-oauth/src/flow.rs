// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OAuth consent URL construction and authorization-code exchange.
//!
//! The `state` parameter carries the requesting chat id through the consent
//! round trip, so the callback knows which user just authorized.

use barbero_config::model::GoogleConfig;
use barbero_core::BarberoError;
use barbero_core::types::StoredCredentials;
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

/// Token endpoint response for the authorization-code grant.
#[derive(Debug, Deserialize)]
struct CodeExchangeResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

/// Builds consent URLs and exchanges authorization codes for tokens.
pub struct AuthFlow {
    http: reqwest::Client,
    config: GoogleConfig,
    client_id: String,
    client_secret: String,
}

impl AuthFlow {
    /// Creates the flow. Requires `google.client_id` and
    /// `google.client_secret` to be configured.
    pub fn new(config: GoogleConfig) -> Result<Self, BarberoError> {
        let client_id = config
            .client_id
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                BarberoError::Config("google.client_id is required for the OAuth flow".into())
            })?;
        let client_secret = config
            .client_secret
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                BarberoError::Config("google.client_secret is required for the OAuth flow".into())
            })?;

        Ok(Self {
            http: reqwest::Client::new(),
            config,
            client_id,
            client_secret,
        })
    }

    /// Consent URL for the given chat identity.
    ///
    /// Requests offline access with forced consent so a refresh token is
    /// always issued.
    pub fn authorization_url(&self, chat_id: &str) -> Result<String, BarberoError> {
        let mut url = Url::parse(&self.config.auth_uri).map_err(|e| {
            BarberoError::Config(format!("google.auth_uri is not a valid URL: {e}"))
        })?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scopes.join(" "))
            .append_pair("access_type", "offline")
            .append_pair("include_granted_scopes", "true")
            .append_pair("prompt", "consent")
            .append_pair("state", chat_id);
        Ok(url.into())
    }

    /// Exchanges a one-time authorization code for stored credentials.
    pub async fn exchange_code(&self, code: &str) -> Result<StoredCredentials, BarberoError> {
        let params = [
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http
            .post(&self.config.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| BarberoError::Gateway {
                message: format!("token exchange request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "token exchange rejected");
            return Err(BarberoError::Gateway {
                message: format!("token exchange returned {status}: {body}"),
                source: None,
            });
        }

        let tokens: CodeExchangeResponse =
            response.json().await.map_err(|e| BarberoError::Gateway {
                message: format!("token exchange response unparseable: {e}"),
                source: Some(Box::new(e)),
            })?;

        let scopes = tokens
            .scope
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        info!("authorization code exchanged");
        Ok(StoredCredentials {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_uri: self.config.token_uri.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            scopes,
        })
    }
}
