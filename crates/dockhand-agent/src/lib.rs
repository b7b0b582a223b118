//! Agentic Dockerfile generation for dockhand.
//!
//! # Agent loop
//!
//! ```text
//! dockhand generate
//!   1. Prompt     ── opening_prompt() (optionally primed with a ProjectContext)
//!   2. Converse   ── Oracle::converse(system prompt, tool schema, conversation)
//!   3. Dispatch   ── ToolSurface: list_directory / read_file / check_file_exists
//!   4. Submit     ── write_dockerfile → <root>/Dockerfile, loop ends
//! ```
//!
//! # Sandbox
//!
//! Every path an operation touches is resolved through
//! [`dockhand_core::PathSandbox`]; anything resolving outside the project
//! root is refused with an error payload rather than read.
//!
//! # Termination
//!
//! The loop ends on a successful submission, on a reply without tool calls
//! ([`AgentOutcome::Finished`]), or when the turn budget runs out
//! ([`AgentOutcome::Exhausted`]). Only an oracle failure is an `Err`.

pub mod agent;
pub mod conversation;
pub mod credentials;
pub mod gemini;
pub mod oracle;
pub mod prompt;
pub mod schema;
pub mod tools;

pub use agent::{AgentError, AgentOutcome, DockerfileAgent};
pub use conversation::{Conversation, OracleTurn, ToolCall, ToolOutcome, Turn};
pub use credentials::{ApiKey, CredentialsError};
pub use gemini::GeminiOracle;
pub use oracle::{Oracle, OracleError, ToolSchema};
pub use tools::{ToolError, ToolErrorKind, ToolOutput, ToolResult, ToolSurface};
