// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory storage adapter for deterministic testing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use barbero_core::BarberoError;
use barbero_core::traits::{PluginAdapter, StorageAdapter};
use barbero_core::types::{AdapterType, HealthStatus, OwnerProfile, StoredCredentials};

#[derive(Default)]
struct State {
    admin_chat_id: Option<String>,
    owner: Option<OwnerProfile>,
    credentials: HashMap<String, StoredCredentials>,
}

/// An in-memory tenant/credential store with the same semantics as the
/// SQLite adapter: single admin, reset cascade, overwrite-on-save.
#[derive(Default)]
pub struct MemoryStorage {
    state: Arc<Mutex<State>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience: pre-configure an admin with stored credentials.
    pub async fn with_ready_tenant(self, admin_chat_id: &str) -> Self {
        {
            let mut state = self.state.lock().await;
            state.admin_chat_id = Some(admin_chat_id.to_string());
            state.owner = Some(OwnerProfile {
                chat_id: admin_chat_id.to_string(),
                display_name: Some("Owner".into()),
                username: None,
                shop_name: Some("Test Shop".into()),
                phone: None,
                address: None,
                created_at: chrono::Utc::now().to_rfc3339(),
            });
            state.credentials.insert(
                admin_chat_id.to_string(),
                StoredCredentials {
                    access_token: "test-access".into(),
                    refresh_token: Some("test-refresh".into()),
                    token_uri: "https://oauth2.googleapis.com/token".into(),
                    client_id: "test-client".into(),
                    client_secret: "test-secret".into(),
                    scopes: vec![],
                },
            );
        }
        self
    }
}

#[async_trait]
impl PluginAdapter for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, BarberoError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), BarberoError> {
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    async fn initialize(&self) -> Result<(), BarberoError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), BarberoError> {
        Ok(())
    }

    async fn admin_chat_id(&self) -> Result<Option<String>, BarberoError> {
        Ok(self.state.lock().await.admin_chat_id.clone())
    }

    async fn register_admin(
        &self,
        chat_id: &str,
        username: Option<&str>,
        first_name: Option<&str>,
        shop_name: Option<&str>,
    ) -> Result<bool, BarberoError> {
        let mut state = self.state.lock().await;
        if state.admin_chat_id.is_some() {
            return Ok(false);
        }
        state.admin_chat_id = Some(chat_id.to_string());
        state.owner = Some(OwnerProfile {
            chat_id: chat_id.to_string(),
            display_name: first_name.map(str::to_string),
            username: username.map(str::to_string),
            shop_name: shop_name.map(str::to_string),
            phone: None,
            address: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        });
        Ok(true)
    }

    async fn owner_profile(&self) -> Result<Option<OwnerProfile>, BarberoError> {
        Ok(self.state.lock().await.owner.clone())
    }

    async fn update_owner_profile(
        &self,
        shop_name: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<(), BarberoError> {
        let mut state = self.state.lock().await;
        if let Some(owner) = state.owner.as_mut() {
            if let Some(shop) = shop_name {
                owner.shop_name = Some(shop.to_string());
            }
            if let Some(phone) = phone {
                owner.phone = Some(phone.to_string());
            }
            if let Some(address) = address {
                owner.address = Some(address.to_string());
            }
        }
        Ok(())
    }

    async fn reset_tenant(&self) -> Result<(), BarberoError> {
        let mut state = self.state.lock().await;
        if let Some(admin) = state.admin_chat_id.take() {
            state.credentials.remove(&admin);
        }
        state.owner = None;
        Ok(())
    }

    async fn save_credentials(
        &self,
        chat_id: &str,
        credentials: &StoredCredentials,
    ) -> Result<(), BarberoError> {
        self.state
            .lock()
            .await
            .credentials
            .insert(chat_id.to_string(), credentials.clone());
        Ok(())
    }

    async fn credentials_for(
        &self,
        chat_id: &str,
    ) -> Result<Option<StoredCredentials>, BarberoError> {
        Ok(self.state.lock().await.credentials.get(chat_id).cloned())
    }
}
