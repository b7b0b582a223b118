//! The exchange between the agent loop and the oracle.

use crate::tools::ToolResult;
use serde_json::{Map, Value};

/// An operation the oracle asked for, with its named arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub args: Map<String, Value>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// One reply from the oracle: free text, requested operations, or both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OracleTurn {
    pub text: Option<String>,
    pub calls: Vec<ToolCall>,
    /// Provider-native form of this turn, replayed verbatim in later requests
    /// when present (it may carry fields the typed view drops).
    pub raw: Option<Value>,
}

impl OracleTurn {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn calls(calls: Vec<ToolCall>) -> Self {
        Self {
            calls,
            ..Default::default()
        }
    }
}

/// The result of one dispatched call, as sent back to the oracle.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub name: String,
    pub result: ToolResult,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Turn {
    /// Outbound task prompt
    Prompt(String),
    /// Inbound oracle reply
    Oracle(OracleTurn),
    /// Outbound results for the calls of the preceding oracle turn
    ToolResults(Vec<ToolOutcome>),
}

/// Append-only log of turns, owned by the caller of the agent loop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// A conversation opened with a single task prompt.
    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        let mut conversation = Self::new();
        conversation.push(Turn::Prompt(prompt.into()));
        conversation
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Number of oracle replies recorded so far.
    pub fn oracle_turns(&self) -> usize {
        self.turns
            .iter()
            .filter(|t| matches!(t, Turn::Oracle(_)))
            .count()
    }
}
