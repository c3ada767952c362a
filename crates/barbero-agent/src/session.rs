// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user conversation sessions.
//!
//! Histories are keyed by role and chat id so the owner's management
//! conversation never leaks into a customer booking flow. Histories are
//! capped; trimming drops whole leading turns and never strands a tool
//! response without its preceding tool call.

use std::collections::HashMap;

use barbero_gemini::Content;

/// Role the sender plays in this deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Customer,
}

impl Role {
    fn key_prefix(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Customer => "customer",
        }
    }
}

/// Maximum retained turns per session after trimming.
const MAX_TURNS: usize = 30;

/// In-memory conversation histories, keyed by `(role, chat_id)`.
#[derive(Default)]
pub struct SessionStore {
    sessions: HashMap<String, Vec<Content>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable history for the given sender, created on first use.
    pub fn history(&mut self, role: Role, chat_id: &str) -> &mut Vec<Content> {
        let key = format!("{}:{}", role.key_prefix(), chat_id);
        self.sessions.entry(key).or_default()
    }

    /// Trims a session to the retention cap.
    ///
    /// Leading turns carrying tool responses are dropped too: a
    /// `functionResponse` whose `functionCall` turn was trimmed away would
    /// be rejected by the API.
    pub fn trim(&mut self, role: Role, chat_id: &str) {
        let history = self.history(role, chat_id);
        if history.len() > MAX_TURNS {
            let excess = history.len() - MAX_TURNS;
            history.drain(..excess);
        }
        while history
            .first()
            .is_some_and(|c| c.parts.iter().any(|p| p.function_response.is_some()))
        {
            history.remove(0);
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barbero_gemini::Part;

    #[test]
    fn sessions_are_isolated_by_role() {
        let mut store = SessionStore::new();
        store
            .history(Role::Customer, "123")
            .push(Content::user(vec![Part::text("quiero un corte")]));
        store
            .history(Role::Admin, "123")
            .push(Content::user(vec![Part::text("¿qué tengo hoy?")]));

        assert_eq!(store.session_count(), 2);
        assert_eq!(store.history(Role::Customer, "123").len(), 1);
        assert_eq!(store.history(Role::Admin, "123").len(), 1);
    }

    #[test]
    fn trim_caps_history_length() {
        let mut store = SessionStore::new();
        for i in 0..50 {
            store
                .history(Role::Customer, "123")
                .push(Content::user(vec![Part::text(format!("msg {i}"))]));
        }
        store.trim(Role::Customer, "123");
        let history = store.history(Role::Customer, "123");
        assert_eq!(history.len(), MAX_TURNS);
        // Oldest turns were dropped.
        assert_eq!(history[0].parts[0].text.as_deref(), Some("msg 20"));
    }

    #[test]
    fn trim_never_strands_a_tool_response() {
        let mut store = SessionStore::new();
        {
            let history = store.history(Role::Customer, "123");
            // A tool round at the very front, sized so trimming cuts right
            // between the call and its response.
            history.push(Content::model(vec![Part::default()]));
            history.push(Content::user(vec![Part::function_response(
                "check_availability",
                serde_json::json!({"events": []}),
            )]));
            for i in 0..MAX_TURNS - 1 {
                history.push(Content::user(vec![Part::text(format!("filler {i}"))]));
            }
        }
        store.trim(Role::Customer, "123");
        let history = store.history(Role::Customer, "123");
        assert!(
            history
                .first()
                .is_none_or(|c| c.parts.iter().all(|p| p.function_response.is_none())),
            "history must not start with a stranded tool response"
        );
        assert_eq!(history.len(), MAX_TURNS - 1);
    }
}
