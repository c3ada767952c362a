// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the tenant and credential store.

use async_trait::async_trait;

use crate::error::BarberoError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{OwnerProfile, StoredCredentials, TenantState};

/// Adapter for tenant and credential persistence.
///
/// Owns all mutation of admin/credential state; the scheduler and agent
/// loop only ever read through it.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, PRAGMAs).
    async fn initialize(&self) -> Result<(), BarberoError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), BarberoError>;

    /// Chat id of the configured admin, if any.
    async fn admin_chat_id(&self) -> Result<Option<String>, BarberoError>;

    /// Registers the admin (tenant owner). At most one admin may ever be
    /// set: returns `Ok(false)` without mutating anything when an admin
    /// already exists, `Ok(true)` when registration succeeded.
    async fn register_admin(
        &self,
        chat_id: &str,
        username: Option<&str>,
        first_name: Option<&str>,
        shop_name: Option<&str>,
    ) -> Result<bool, BarberoError>;

    /// The owner profile, if an admin is configured.
    async fn owner_profile(&self) -> Result<Option<OwnerProfile>, BarberoError>;

    /// Updates mutable owner profile fields. `None` fields are left unchanged.
    async fn update_owner_profile(
        &self,
        shop_name: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<(), BarberoError>;

    /// Clears the admin registration, the owner profile, and the admin's
    /// stored credentials. After this, `register_admin` succeeds again.
    async fn reset_tenant(&self) -> Result<(), BarberoError>;

    /// Persists credentials for a chat identity, overwriting any prior record.
    async fn save_credentials(
        &self,
        chat_id: &str,
        credentials: &StoredCredentials,
    ) -> Result<(), BarberoError>;

    /// Stored credentials for a chat identity, if present.
    async fn credentials_for(
        &self,
        chat_id: &str,
    ) -> Result<Option<StoredCredentials>, BarberoError>;

    /// Resolves the tenant readiness state in one pass: admin lookup, then
    /// credential lookup for that admin.
    async fn resolve_tenant(&self) -> Result<TenantState, BarberoError> {
        let Some(admin_chat_id) = self.admin_chat_id().await? else {
            return Ok(TenantState::Unconfigured);
        };
        match self.credentials_for(&admin_chat_id).await? {
            Some(credentials) => Ok(TenantState::Ready {
                admin_chat_id,
                credentials,
            }),
            None => Ok(TenantState::Uncredentialed { admin_chat_id }),
        }
    }
}
