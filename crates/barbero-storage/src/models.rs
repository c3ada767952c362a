// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `barbero-core::types` for use across
//! adapter trait boundaries. This module re-exports them for convenience
//! within the storage crate.

pub use barbero_core::types::{OwnerProfile, StoredCredentials, TenantState};

/// Config-table key under which the admin chat id is stored.
pub const ADMIN_KEY: &str = "admin_chat_id";
