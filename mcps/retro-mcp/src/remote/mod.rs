//! Remote command execution
//!
//! The repository only needs one capability from the managed host: run a
//! shell command and hand back its exit code and output.

mod error;
#[cfg(any(test, feature = "test-support"))]
mod scripted;
mod ssh;

pub use error::{TransportError, TransportResult};
#[cfg(any(test, feature = "test-support"))]
pub use scripted::{RecordedCall, ScriptedClient};
pub use ssh::SshClient;

use async_trait::async_trait;

use crate::types::CommandResult;

/// Runs shell commands on the managed host
#[async_trait]
pub trait RemoteCommandClient: Send + Sync {
    /// Execute `command`, escalating with sudo when `use_sudo` is set
    ///
    /// A command that runs and exits non-zero is `Ok` with
    /// `success == false`. `Err` means the host could not be reached.
    async fn execute_command(&self, command: &str, use_sudo: bool) -> TransportResult<CommandResult>;
}
