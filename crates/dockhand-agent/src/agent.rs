//! The bounded tool-calling loop.
//!
//! ```text
//! for turn in 1..=max_turns:
//!     reply = oracle.converse(system, schema, conversation)
//!     no calls            → Finished(text)
//!     write_dockerfile ok → Submitted(path)   (remaining calls dropped)
//!     otherwise           → append results, continue
//! budget spent            → Exhausted
//! ```

use crate::conversation::{Conversation, ToolCall, ToolOutcome, Turn};
use crate::oracle::{Oracle, OracleError, ToolSchema};
use crate::prompt::SYSTEM_PROMPT;
use crate::schema::tool_schemas;
use crate::tools::{ToolOutput, ToolSurface};
use serde_json::Value;
use std::path::PathBuf;

/// Default upper bound on oracle round-trips.
pub const DEFAULT_MAX_TURNS: u32 = 15;

/// How a loop run ended without an oracle failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentOutcome {
    /// The recipe was written.
    Submitted { path: PathBuf, turns: u32 },
    /// The oracle replied without requesting any operation.
    ///
    /// This covers both giving up and explaining without submitting; the
    /// two are indistinguishable, so the caller decides what it means.
    Finished { text: String, turns: u32 },
    /// The turn budget ran out before a submission.
    Exhausted { turns: u32 },
}

impl AgentOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("oracle call failed on turn {turn}")]
    Oracle { turn: u32, source: OracleError },
}

/// Drives an [`Oracle`] against a [`ToolSurface`] until it submits a recipe.
pub struct DockerfileAgent<O: Oracle> {
    oracle: O,
    max_turns: u32,
    system_prompt: String,
    schemas: Vec<ToolSchema>,
}

impl<O: Oracle> DockerfileAgent<O> {
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            max_turns: DEFAULT_MAX_TURNS,
            system_prompt: SYSTEM_PROMPT.to_owned(),
            schemas: tool_schemas(),
        }
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    /// Run a fresh conversation opened with `prompt`.
    pub async fn run(
        &self,
        surface: &ToolSurface,
        prompt: impl Into<String>,
    ) -> Result<AgentOutcome, AgentError> {
        let mut conversation = Conversation::with_prompt(prompt);
        self.run_conversation(surface, &mut conversation).await
    }

    /// Continue `conversation`, appending every turn exchanged.
    ///
    /// Nothing is appended after a successful submission.
    pub async fn run_conversation(
        &self,
        surface: &ToolSurface,
        conversation: &mut Conversation,
    ) -> Result<AgentOutcome, AgentError> {
        for turn in 1..=self.max_turns {
            let reply = self
                .oracle
                .converse(&self.system_prompt, &self.schemas, conversation)
                .await
                .map_err(|source| AgentError::Oracle { turn, source })?;

            tracing::info!(turn, calls = reply.calls.len(), "oracle replied");
            let calls = reply.calls.clone();
            let text = reply.text.clone();
            conversation.push(Turn::Oracle(reply));

            if calls.is_empty() {
                return Ok(AgentOutcome::Finished {
                    text: text.unwrap_or_default(),
                    turns: turn,
                });
            }

            let mut outcomes = Vec::with_capacity(calls.len());
            for call in calls {
                let label = call_label(&call);
                tracing::info!("[Tool] {label}");
                let result = surface.dispatch(&call);
                if let Ok(ToolOutput::Written(path)) = result {
                    tracing::info!(path = %path.display(), turn, "recipe submitted");
                    return Ok(AgentOutcome::Submitted { path, turns: turn });
                }
                if let Err(e) = &result {
                    tracing::debug!(tool = %call.name, error = %e, "tool call failed");
                }
                outcomes.push(ToolOutcome {
                    name: call.name,
                    result,
                });
            }
            conversation.push(Turn::ToolResults(outcomes));
        }

        tracing::warn!(max_turns = self.max_turns, "turn budget exhausted");
        Ok(AgentOutcome::Exhausted {
            turns: self.max_turns,
        })
    }
}

/// `name(args)`, as shown in the dispatch log.
fn call_label(call: &ToolCall) -> String {
    format!("{}({})", call.name, Value::Object(call.args.clone()))
}
