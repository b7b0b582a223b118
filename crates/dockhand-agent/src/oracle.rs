//! The decision-making service consulted on every agent turn.

use crate::conversation::{Conversation, OracleTurn};
use serde::Serialize;
use serde_json::Value;

/// Declaration of one operation the oracle may call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSchema {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON-schema object describing the arguments
    pub parameters: Value,
}

/// Abstraction over the oracle for testability.
///
/// Production code uses [`GeminiOracle`](crate::gemini::GeminiOracle), tests
/// use mockall-generated mocks or scripted stubs.
#[allow(async_fn_in_trait)]
pub trait Oracle: Send + Sync {
    /// Send the whole conversation and receive the next turn.
    async fn converse(
        &self,
        system: &str,
        tools: &[ToolSchema],
        history: &Conversation,
    ) -> Result<OracleTurn, OracleError>;
}

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("request to oracle failed")]
    Http { source: reqwest::Error },

    #[error("oracle returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode oracle response")]
    Decode { source: serde_json::Error },

    #[error("oracle response contained no candidates")]
    EmptyResponse,
}
