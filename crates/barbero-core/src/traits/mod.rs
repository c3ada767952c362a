// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for Barbero's pluggable components.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod calendar;
pub mod channel;
pub mod storage;

pub use adapter::PluginAdapter;
pub use calendar::{AppointmentLog, CalendarGateway};
pub use channel::{ChannelAdapter, Notifier};
pub use storage::StorageAdapter;
