// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user OAuth credential operations.

use barbero_core::BarberoError;
use rusqlite::params;
use tracing::warn;

use crate::database::Database;
use crate::models::StoredCredentials;

/// Persists credentials for a chat identity, overwriting any prior record.
pub async fn save_credentials(
    db: &Database,
    chat_id: &str,
    credentials: &StoredCredentials,
) -> Result<(), BarberoError> {
    let chat_id = chat_id.to_string();
    let json = serde_json::to_string(credentials).map_err(|e| BarberoError::Storage {
        source: Box::new(e),
    })?;
    let now = chrono::Utc::now().to_rfc3339();

    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (chat_id, credentials_json, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(chat_id) DO UPDATE SET
                     credentials_json = excluded.credentials_json,
                     updated_at = excluded.updated_at",
                params![chat_id, json, now],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Stored credentials for a chat identity, if present.
///
/// A row with a NULL or unparseable credentials column yields `None` --
/// the tenant then resolves as uncredentialed rather than failing jobs.
pub async fn credentials_for(
    db: &Database,
    chat_id: &str,
) -> Result<Option<StoredCredentials>, BarberoError> {
    let chat_id = chat_id.to_string();
    let json: Option<String> = db
        .connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT credentials_json FROM users WHERE chat_id = ?1")?;
            let result = stmt.query_row(params![chat_id], |row| row.get::<_, Option<String>>(0));
            match result {
                Ok(value) => Ok(value),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    let Some(json) = json else {
        return Ok(None);
    };

    match serde_json::from_str(&json) {
        Ok(creds) => Ok(Some(creds)),
        Err(e) => {
            warn!(error = %e, "stored credentials are unparseable, treating as absent");
            Ok(None)
        }
    }
}
