// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Sheets append client implementing [`AppointmentLog`].

use std::sync::Arc;

use async_trait::async_trait;
use barbero_core::{AppointmentLog, BarberoError};
use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use crate::token::TokenBroker;
use crate::types::AppendValuesRequest;

/// Base URL for the Sheets v4 API.
const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";

/// Appointment log backed by a Google Sheets values append.
pub struct GoogleSheets {
    http: reqwest::Client,
    broker: Arc<TokenBroker>,
    base_url: String,
    spreadsheet_id: String,
    range: String,
}

impl GoogleSheets {
    pub fn new(
        http: reqwest::Client,
        broker: Arc<TokenBroker>,
        spreadsheet_id: String,
        range: String,
    ) -> Self {
        Self {
            http,
            broker,
            base_url: SHEETS_API_BASE.to_string(),
            spreadsheet_id,
            range,
        }
    }

    /// Overrides the base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    fn append_url(&self) -> Result<Url, BarberoError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| BarberoError::Gateway {
            message: format!("invalid sheets base URL: {e}"),
            source: Some(Box::new(e)),
        })?;
        url.path_segments_mut()
            .map_err(|_| BarberoError::Gateway {
                message: "sheets base URL cannot be a base".into(),
                source: None,
            })?
            .extend([
                "spreadsheets",
                self.spreadsheet_id.as_str(),
                "values",
                &format!("{}:append", self.range),
            ]);
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");
        Ok(url)
    }
}

#[async_trait]
impl AppointmentLog for GoogleSheets {
    async fn append_row(&self, values: Vec<String>) -> Result<(), BarberoError> {
        let url = self.append_url()?;
        let body = AppendValuesRequest {
            values: vec![values],
        };

        let mut token = self.broker.bearer().await?;
        for attempt in 0..2 {
            let response = self
                .http
                .post(url.clone())
                .bearer_auth(&token)
                .json(&body)
                .send()
                .await
                .map_err(|e| BarberoError::Gateway {
                    message: format!("sheets append failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            if response.status() == StatusCode::UNAUTHORIZED && attempt == 0 {
                debug!("access token rejected, refreshing and retrying");
                token = self.broker.refresh().await?;
                continue;
            }

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(BarberoError::Gateway {
                    message: format!("sheets append returned {status}: {body}"),
                    source: None,
                });
            }
            debug!("appointment row appended");
            return Ok(());
        }
        unreachable!("append loop always returns within two attempts")
    }
}
