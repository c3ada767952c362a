// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use std::path::Path;

use barbero_core::BarberoError;
use tracing::debug;

use crate::migrations;

/// Handle to the SQLite database backing the tenant and credential store.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path`, applies PRAGMAs,
    /// and runs all pending migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, BarberoError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| BarberoError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| BarberoError::Storage {
                source: Box::new(e),
            })?;

        conn.call(move |conn| -> Result<(), BarberoError> {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")
                    .map_err(|e| BarberoError::Storage { source: Box::new(e) })?;
            }
            conn.pragma_update(None, "foreign_keys", "ON")
                .map_err(|e| BarberoError::Storage { source: Box::new(e) })?;
            conn.pragma_update(None, "busy_timeout", 5000)
                .map_err(|e| BarberoError::Storage { source: Box::new(e) })?;
            migrations::run_migrations(conn)
                .map_err(|e| BarberoError::Storage { source: Box::new(e) })?;
            Ok(())
        })
        .await
        .map_err(|e| BarberoError::Storage {
            source: Box::new(e),
        })?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }
}

/// Maps a tokio-rusqlite error into the crate-wide storage error.
pub fn map_tr_err(e: tokio_rusqlite::Error) -> BarberoError {
    BarberoError::Storage {
        source: Box::new(e),
    }
}
