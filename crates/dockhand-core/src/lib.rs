//! Core types for dockhand.
//!
//! This crate defines the `dockhand.toml` schema ([`DockhandConfig`]),
//! the project scanner ([`ProjectScanner`] / [`ProjectContext`]) with its
//! ignore rules ([`IgnoreMatcher`]), the root-confined path resolver
//! ([`PathSandbox`]), and shared error types.

pub mod config;
pub mod error;
pub mod ignore;
pub mod sandbox;
pub mod scanner;

pub use config::{AgentConfig, BuildConfig, CONFIG_FILE_NAME, DockhandConfig, RECIPE_FILE_NAME};
pub use error::{Error, Result};
pub use ignore::IgnoreMatcher;
pub use sandbox::{PathSandbox, SandboxViolation};
pub use scanner::{ProjectContext, ProjectScanner};
