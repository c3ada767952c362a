// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OAuth consent flow and callback server for the Barbero scheduling
//! assistant.
//!
//! The admin runs `/connect` in Telegram, follows the consent URL built by
//! [`AuthFlow`], and lands on the axum callback server, which exchanges the
//! code and persists the credentials keyed by the chat id carried in
//! `state`.

pub mod flow;
pub mod server;

pub use flow::AuthFlow;
pub use server::{CallbackState, start_server};
