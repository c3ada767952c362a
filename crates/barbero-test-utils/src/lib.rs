// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Barbero integration tests.
//!
//! Provides in-memory fakes for fast, deterministic, CI-runnable tests
//! without external services.
//!
//! # Components
//!
//! - [`MemoryStorage`] - in-memory tenant/credential store
//! - [`MockChannel`] - messaging channel with injection and capture
//! - [`FakeCalendar`] - programmable calendar gateway
//! - [`RecordingLog`] - appointment log that captures appended rows

pub mod fake_calendar;
pub mod memory_storage;
pub mod mock_channel;

pub use fake_calendar::{FakeCalendar, RecordingLog};
pub use memory_storage::MemoryStorage;
pub use mock_channel::MockChannel;
