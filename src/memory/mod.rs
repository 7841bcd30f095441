// src/memory/mod.rs

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "Human"),
            Role::Assistant => write!(f, "AI"),
        }
    }
}

/// One side of a question/answer exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: &str) -> Self {
        Self {
            role: Role::User,
            content: content.to_string(),
        }
    }

    pub fn assistant(content: &str) -> Self {
        Self {
            role: Role::Assistant,
            content: content.to_string(),
        }
    }
}

/// A trait for conversation memory replayed into every planning request.
pub trait Memory {
    fn append(&mut self, turn: Turn);
    fn turns(&self) -> &[Turn];
    fn clear(&mut self);

    /// Transcript as `Human: ...` / `AI: ...` lines.
    fn render(&self) -> String {
        self.turns()
            .iter()
            .map(|turn| format!("{}: {}", turn.role, turn.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Unbounded, append-only in-memory transcript.
#[derive(Default, Debug, Clone)]
pub struct ConversationMemory {
    turns: Vec<Turn>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Record a completed exchange.
    pub fn record_exchange(&mut self, question: &str, answer: &str) {
        self.append(Turn::user(question));
        self.append(Turn::assistant(answer));
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl Memory for ConversationMemory {
    fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    fn turns(&self) -> &[Turn] {
        &self.turns
    }

    fn clear(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_appends_user_then_assistant() {
        let mut memory = ConversationMemory::new();
        memory.record_exchange("Who wrote Dune?", "Frank Herbert");

        assert_eq!(
            memory.turns(),
            &[Turn::user("Who wrote Dune?"), Turn::assistant("Frank Herbert")]
        );
    }

    #[test]
    fn render_uses_human_and_ai_labels() {
        let mut memory = ConversationMemory::new();
        memory.record_exchange("What is 2 + 2?", "4");
        memory.record_exchange("And doubled?", "8");

        assert_eq!(
            memory.render(),
            "Human: What is 2 + 2?\nAI: 4\nHuman: And doubled?\nAI: 8"
        );
    }

    #[test]
    fn clear_empties_the_transcript() {
        let mut memory = ConversationMemory::new();
        memory.record_exchange("q", "a");
        memory.clear();

        assert!(memory.is_empty());
        assert_eq!(memory.render(), "");
    }
}
