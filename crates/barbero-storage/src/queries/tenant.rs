// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tenant (admin / owner profile) operations.

use barbero_core::BarberoError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{ADMIN_KEY, OwnerProfile};

/// Chat id of the configured admin, if any.
pub async fn admin_chat_id(db: &Database) -> Result<Option<String>, BarberoError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare("SELECT value FROM config WHERE key = ?1")?;
            let result = stmt.query_row(params![ADMIN_KEY], |row| row.get::<_, String>(0));
            match result {
                Ok(value) => Ok(Some(value)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Registers the admin. Returns `Ok(false)` without mutating anything when
/// an admin is already configured.
///
/// Runs inside a single transaction so a concurrent `/setup` race cannot
/// produce two admins.
pub async fn register_admin(
    db: &Database,
    chat_id: &str,
    username: Option<&str>,
    first_name: Option<&str>,
    shop_name: Option<&str>,
) -> Result<bool, BarberoError> {
    let chat_id = chat_id.to_string();
    let username = username.map(str::to_string);
    let first_name = first_name.map(str::to_string);
    let shop_name = shop_name.map(str::to_string);
    let now = chrono::Utc::now().to_rfc3339();

    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let existing: Option<String> = {
                let mut stmt = tx.prepare("SELECT value FROM config WHERE key = ?1")?;
                match stmt.query_row(params![ADMIN_KEY], |row| row.get(0)) {
                    Ok(v) => Some(v),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e.into()),
                }
            };
            if existing.is_some() {
                return Ok(false);
            }

            tx.execute(
                "INSERT INTO config (key, value) VALUES (?1, ?2)",
                params![ADMIN_KEY, chat_id],
            )?;
            tx.execute(
                "INSERT INTO users (chat_id, username, first_name, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(chat_id) DO UPDATE SET
                     username = excluded.username,
                     first_name = excluded.first_name,
                     updated_at = excluded.updated_at",
                params![chat_id, username, first_name, now],
            )?;
            tx.execute(
                "INSERT INTO owner_profile
                     (chat_id, display_name, username, shop_name, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![chat_id, first_name, username, shop_name, now],
            )?;

            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The most recently created owner profile, if any.
pub async fn owner_profile(db: &Database) -> Result<Option<OwnerProfile>, BarberoError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT chat_id, display_name, username, shop_name, phone, address, created_at
                 FROM owner_profile ORDER BY created_at DESC, id DESC LIMIT 1",
            )?;
            let result = stmt.query_row([], |row| {
                Ok(OwnerProfile {
                    chat_id: row.get(0)?,
                    display_name: row.get(1)?,
                    username: row.get(2)?,
                    shop_name: row.get(3)?,
                    phone: row.get(4)?,
                    address: row.get(5)?,
                    created_at: row.get(6)?,
                })
            });
            match result {
                Ok(profile) => Ok(Some(profile)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Updates mutable owner profile fields; `None` fields are left unchanged.
pub async fn update_owner_profile(
    db: &Database,
    shop_name: Option<&str>,
    phone: Option<&str>,
    address: Option<&str>,
) -> Result<(), BarberoError> {
    let shop_name = shop_name.map(str::to_string);
    let phone = phone.map(str::to_string);
    let address = address.map(str::to_string);

    db.connection()
        .call(move |conn| {
            if let Some(shop) = &shop_name {
                conn.execute("UPDATE owner_profile SET shop_name = ?1", params![shop])?;
            }
            if let Some(phone) = &phone {
                conn.execute("UPDATE owner_profile SET phone = ?1", params![phone])?;
            }
            if let Some(address) = &address {
                conn.execute("UPDATE owner_profile SET address = ?1", params![address])?;
            }
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Clears the admin registration, owner profile rows, and the admin's
/// stored credentials, all in one transaction.
pub async fn reset_tenant(db: &Database) -> Result<(), BarberoError> {
    db.connection()
        .call(|conn| {
            let tx = conn.transaction()?;

            let admin: Option<String> = {
                let mut stmt = tx.prepare("SELECT value FROM config WHERE key = ?1")?;
                match stmt.query_row(params![ADMIN_KEY], |row| row.get(0)) {
                    Ok(v) => Some(v),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e.into()),
                }
            };

            tx.execute("DELETE FROM config WHERE key = ?1", params![ADMIN_KEY])?;
            tx.execute("DELETE FROM owner_profile", [])?;
            if let Some(admin) = admin {
                tx.execute(
                    "UPDATE users SET credentials_json = NULL WHERE chat_id = ?1",
                    params![admin],
                )?;
            }

            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
