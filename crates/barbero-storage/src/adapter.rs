// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use barbero_config::model::StorageConfig;
use barbero_core::types::{OwnerProfile, StoredCredentials};
use barbero_core::{AdapterType, BarberoError, HealthStatus, PluginAdapter, StorageAdapter};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`StorageAdapter::initialize`]
    /// is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, BarberoError> {
        self.db.get().ok_or_else(|| BarberoError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, BarberoError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), BarberoError> {
        if let Some(db) = self.db.get() {
            db.connection()
                .call(|conn| {
                    conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                    Ok(())
                })
                .await
                .map_err(crate::database::map_tr_err)?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), BarberoError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| BarberoError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), BarberoError> {
        self.shutdown().await
    }

    async fn admin_chat_id(&self) -> Result<Option<String>, BarberoError> {
        queries::tenant::admin_chat_id(self.db()?).await
    }

    async fn register_admin(
        &self,
        chat_id: &str,
        username: Option<&str>,
        first_name: Option<&str>,
        shop_name: Option<&str>,
    ) -> Result<bool, BarberoError> {
        queries::tenant::register_admin(self.db()?, chat_id, username, first_name, shop_name)
            .await
    }

    async fn owner_profile(&self) -> Result<Option<OwnerProfile>, BarberoError> {
        queries::tenant::owner_profile(self.db()?).await
    }

    async fn update_owner_profile(
        &self,
        shop_name: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<(), BarberoError> {
        queries::tenant::update_owner_profile(self.db()?, shop_name, phone, address).await
    }

    async fn reset_tenant(&self) -> Result<(), BarberoError> {
        queries::tenant::reset_tenant(self.db()?).await
    }

    async fn save_credentials(
        &self,
        chat_id: &str,
        credentials: &StoredCredentials,
    ) -> Result<(), BarberoError> {
        queries::credentials::save_credentials(self.db()?, chat_id, credentials).await
    }

    async fn credentials_for(
        &self,
        chat_id: &str,
    ) -> Result<Option<StoredCredentials>, BarberoError> {
        queries::credentials::credentials_for(self.db()?, chat_id).await
    }
}
