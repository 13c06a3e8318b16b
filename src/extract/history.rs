//! Conversation history and evidence selection

use serde::{Deserialize, Serialize};

use super::patterns::count_numbers;

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "User"),
            Role::Assistant => write!(f, "Assistant"),
        }
    }
}

/// One message of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Format the last `window` messages as `User: ...` / `Assistant: ...` lines
pub fn conversation_context(history: &[ChatMessage], window: usize) -> String {
    let start = history.len().saturating_sub(window);
    history[start..]
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pick the text data should be extracted from.
///
/// The newest user message among the last `window` messages that carries at
/// least `min_numbers` numeric tokens wins; otherwise the query itself.
pub fn select_evidence<'a>(
    query: &'a str,
    history: &'a [ChatMessage],
    window: usize,
    min_numbers: usize,
) -> &'a str {
    let start = history.len().saturating_sub(window);
    history[start..]
        .iter()
        .rev()
        .filter(|m| m.role == Role::User)
        .find(|m| count_numbers(&m.content) >= min_numbers)
        .map(|m| m.content.as_str())
        .unwrap_or(query)
}
