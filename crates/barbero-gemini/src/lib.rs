// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini provider client for the Barbero scheduling assistant.
//!
//! Provides [`GeminiClient`] for `generateContent` calls with function
//! calling, as consumed by the agent loop's tool-dispatch cycle.

pub mod client;
pub mod types;

pub use client::GeminiClient;
pub use types::{
    Content, FunctionCall, FunctionDeclaration, FunctionResponse, GenerateContentResponse, Part,
    Tool,
};
