// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Calendar and Sheets gateway for the Barbero scheduling assistant.
//!
//! Both clients share one [`TokenBroker`], so a refreshed access token is
//! immediately visible to calendar and sheet calls alike. Every failure
//! surfaces as a [`BarberoError::Gateway`](barbero_core::BarberoError::Gateway)
//! value -- callers decide whether that means "abort the tick" (scheduler)
//! or "tell the user something went wrong" (agent tools).

pub mod calendar;
pub mod sheets;
pub mod token;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use barbero_config::model::GoogleConfig;
use barbero_core::BarberoError;
use barbero_core::types::StoredCredentials;

pub use calendar::GoogleCalendar;
pub use sheets::GoogleSheets;
pub use token::TokenBroker;

/// The calendar and (optional) sheet clients built from one credential record.
pub struct GoogleSuite {
    pub calendar: GoogleCalendar,
    pub sheets: Option<GoogleSheets>,
}

impl GoogleSuite {
    /// Builds clients from stored credentials and the Google configuration.
    ///
    /// The sheet client is only constructed when a spreadsheet id is
    /// configured.
    pub fn from_credentials(
        credentials: StoredCredentials,
        config: &GoogleConfig,
    ) -> Result<Self, BarberoError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BarberoError::Gateway {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        let broker = Arc::new(TokenBroker::new(http.clone(), credentials));
        let calendar = GoogleCalendar::new(http.clone(), broker.clone());
        let sheets = config.spreadsheet_id.as_ref().map(|id| {
            GoogleSheets::new(http, broker, id.clone(), config.sheet_range.clone())
        });

        Ok(Self { calendar, sheets })
    }
}
