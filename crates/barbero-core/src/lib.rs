// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Barbero scheduling assistant.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the Barbero workspace. All adapters
//! implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::BarberoError;
pub use types::{AdapterType, HealthStatus, MessageId, TenantState};

// Re-export all adapter traits at crate root.
pub use traits::{
    AppointmentLog, CalendarGateway, ChannelAdapter, Notifier, PluginAdapter, StorageAdapter,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_construct() {
        let _config = BarberoError::Config("test".into());
        let _storage = BarberoError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _channel = BarberoError::Channel {
            message: "test".into(),
            source: None,
        };
        let _gateway = BarberoError::Gateway {
            message: "test".into(),
            source: None,
        };
        let _provider = BarberoError::Provider {
            message: "test".into(),
            source: None,
        };
        let _timeout = BarberoError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = BarberoError::Internal("test".into());
    }

    #[test]
    fn adapter_type_round_trips() {
        use std::str::FromStr;

        for variant in [
            AdapterType::Channel,
            AdapterType::Provider,
            AdapterType::Storage,
            AdapterType::Calendar,
        ] {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        assert_ne!(HealthStatus::Degraded("slow".into()), healthy);
        assert_ne!(HealthStatus::Unhealthy("down".into()), healthy);
    }
}
