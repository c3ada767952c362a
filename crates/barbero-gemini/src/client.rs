// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini `generateContent` API.
//!
//! Handles request construction, authentication, and transient error retry.

use std::time::Duration;

use barbero_core::BarberoError;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::types::{
    ApiErrorResponse, Content, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, SystemInstruction, Tool,
};

/// Base URL for the Gemini API.
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// HTTP client for Gemini API communication.
///
/// Manages the API key header, connection pooling, and retry logic for
/// transient errors (429, 500, 503).
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    model: String,
    max_output_tokens: u32,
    max_retries: u32,
    base_url: String,
}

impl GeminiClient {
    /// Creates a new Gemini API client.
    pub fn new(
        api_key: String,
        model: String,
        max_output_tokens: u32,
    ) -> Result<Self, BarberoError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&api_key).map_err(|e| {
                BarberoError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| BarberoError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            model,
            max_output_tokens,
            max_retries: 1,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Returns the configured model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Overrides the base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Sends one `generateContent` request.
    ///
    /// On transient errors (429, 500, 503), retries once after a 1-second
    /// delay.
    pub async fn generate(
        &self,
        system_instruction: Option<String>,
        contents: Vec<Content>,
        tools: Option<Vec<Tool>>,
    ) -> Result<GenerateContentResponse, BarberoError> {
        let request = GenerateContentRequest {
            system_instruction: system_instruction.map(SystemInstruction::text),
            contents,
            tools,
            generation_config: Some(GenerationConfig {
                max_output_tokens: Some(self.max_output_tokens),
            }),
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying generate request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(|e| BarberoError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "generate response received");

            if status.is_success() {
                return response.json().await.map_err(|e| BarberoError::Provider {
                    message: format!("generate response unparseable: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(BarberoError::Provider {
                    message: format!("API returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            // Non-transient error or exhausted retries.
            let body = response.text().await.unwrap_or_default();
            let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                format!(
                    "Gemini API error ({}): {}",
                    api_err.error.status, api_err.error.message
                )
            } else {
                format!("API returned {status}: {body}")
            };
            return Err(BarberoError::Provider {
                message,
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| BarberoError::Provider {
            message: "generate request failed with no recorded error".into(),
            source: None,
        }))
    }
}

/// Transient statuses worth one retry.
fn is_transient_error(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::SERVICE_UNAVAILABLE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_statuses() {
        assert!(is_transient_error(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_transient_error(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_transient_error(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!is_transient_error(StatusCode::BAD_REQUEST));
        assert!(!is_transient_error(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn new_rejects_unprintable_api_key() {
        assert!(GeminiClient::new("bad\nkey".into(), "gemini-1.5-flash".into(), 256).is_err());
    }
}
