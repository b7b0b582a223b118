//! Container image builds for dockhand.
//!
//! [`BuildRunner`] shells out to the configured build tool (`docker` by
//! default) through a [`BuildExecutor`], optionally streaming its output, and
//! recovers the image id from the tool or from the captured output.

pub mod docker;
pub mod executor;
pub mod runner;

pub use docker::{CommandOutput, DockerError};
pub use executor::{BuildExecutor, RealExecutor};
pub use runner::{BuildResult, BuildRunner, image_id_from_output};
