//! Transport-level failures

use thiserror::Error;

/// The remote host could not be asked at all
///
/// Distinct from a command that ran and exited non-zero, which is reported
/// through [`CommandResult`](crate::types::CommandResult).
#[derive(Error, Debug)]
pub enum TransportError {
    /// The ssh binary is not installed or not in PATH
    #[error("ssh binary not found: {0}")]
    BinaryNotFound(String),

    /// Failed to spawn or talk to the ssh process
    #[error("failed to spawn ssh process: {0}")]
    Spawn(#[from] std::io::Error),

    /// The command did not finish in time
    #[error("remote command timed out after {0} seconds")]
    Timeout(u64),

    /// ssh could not connect or authenticate
    #[error("connection to {host} failed: {message}")]
    Connection { host: String, message: String },
}

pub type TransportResult<T> = Result<T, TransportError>;
