// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Access token management with refresh-on-expiry.
//!
//! The broker starts from the stored access token and exchanges the refresh
//! token at the token endpoint when the cached token is expired or rejected.
//! A failed refresh degrades to a [`BarberoError::Gateway`] value -- callers
//! interpret it as "no data available", never as a fault to propagate.

use barbero_core::BarberoError;
use barbero_core::types::StoredCredentials;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::types::TokenResponse;

/// Refresh slightly before the reported expiry to absorb clock skew.
const EXPIRY_MARGIN_SECS: i64 = 60;

struct CachedToken {
    access_token: String,
    /// `None` for the initially stored token, whose expiry is unknown;
    /// it is used optimistically until the API rejects it.
    expires_at: Option<DateTime<Utc>>,
}

/// Caches the current access token and refreshes it on demand.
pub struct TokenBroker {
    http: reqwest::Client,
    credentials: StoredCredentials,
    cached: Mutex<CachedToken>,
}

impl TokenBroker {
    pub fn new(http: reqwest::Client, credentials: StoredCredentials) -> Self {
        let cached = CachedToken {
            access_token: credentials.access_token.clone(),
            expires_at: None,
        };
        Self {
            http,
            credentials,
            cached: Mutex::new(cached),
        }
    }

    /// Returns a bearer token believed to be valid, refreshing first when
    /// the cached one is known to be expired.
    pub async fn bearer(&self) -> Result<String, BarberoError> {
        let cached = self.cached.lock().await;
        let expired = cached
            .expires_at
            .is_some_and(|at| Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) >= at);
        if !expired {
            return Ok(cached.access_token.clone());
        }
        drop(cached);
        self.refresh().await
    }

    /// Exchanges the refresh token for a new access token and caches it.
    ///
    /// Called by clients after a 401 response as well as on known expiry.
    pub async fn refresh(&self) -> Result<String, BarberoError> {
        let Some(refresh_token) = self.credentials.refresh_token.as_deref() else {
            return Err(BarberoError::Gateway {
                message: "access token rejected and no refresh token is stored".into(),
                source: None,
            });
        };

        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http
            .post(&self.credentials.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| BarberoError::Gateway {
                message: format!("token refresh request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "token refresh rejected");
            return Err(BarberoError::Gateway {
                message: format!("token refresh returned {status}: {body}"),
                source: None,
            });
        }

        let token: TokenResponse =
            response.json().await.map_err(|e| BarberoError::Gateway {
                message: format!("token refresh response unparseable: {e}"),
                source: Some(Box::new(e)),
            })?;

        let expires_at = token
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs));
        let mut cached = self.cached.lock().await;
        cached.access_token = token.access_token.clone();
        cached.expires_at = expires_at;

        debug!("access token refreshed");
        Ok(token.access_token)
    }
}
