//! Failures of privileged mutation operations

use serde::Serialize;
use thiserror::Error;

use crate::remote::TransportError;
use crate::types::CommandResult;

/// Which targets of a bulk operation went through
///
/// `unchanged` holds targets that exist but were not confirmed to be in the
/// requested state after the command failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetBreakdown {
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
    pub unchanged: Vec<String>,
    pub total: usize,
}

#[derive(Error, Debug)]
pub enum MutationError {
    #[error("remote host unreachable: {0}")]
    Unreachable(#[from] TransportError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Targets were reported as nonexistent and none of the others took effect
    #[error("not found: {}", .missing.join(", "))]
    NotFound {
        missing: Vec<String>,
        result: CommandResult,
    },

    /// Some targets were reported as nonexistent, others took effect
    #[error(
        "{} of {} targets failed: {}",
        .breakdown.failed.len(),
        .breakdown.total,
        .breakdown.failed.join(", ")
    )]
    PartialFailure {
        breakdown: TargetBreakdown,
        result: CommandResult,
    },

    #[error("command failed with exit code {}: {}", .result.exit_code, .result.stderr.trim())]
    CommandFailed { result: CommandResult },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationErrorKind {
    Unreachable,
    InvalidArgument,
    NotFound,
    PartialFailure,
    CommandFailed,
}

/// Serializable form of a [`MutationError`] for tool responses
#[derive(Debug, Clone, Serialize)]
pub struct MutationReport {
    pub kind: MutationErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<TargetBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<CommandResult>,
}

impl MutationError {
    pub fn kind(&self) -> MutationErrorKind {
        match self {
            MutationError::Unreachable(_) => MutationErrorKind::Unreachable,
            MutationError::InvalidArgument(_) => MutationErrorKind::InvalidArgument,
            MutationError::NotFound { .. } => MutationErrorKind::NotFound,
            MutationError::PartialFailure { .. } => MutationErrorKind::PartialFailure,
            MutationError::CommandFailed { .. } => MutationErrorKind::CommandFailed,
        }
    }

    /// The executed command, when the host was reached at all
    pub fn command_result(&self) -> Option<&CommandResult> {
        match self {
            MutationError::NotFound { result, .. }
            | MutationError::PartialFailure { result, .. }
            | MutationError::CommandFailed { result } => Some(result),
            MutationError::Unreachable(_) | MutationError::InvalidArgument(_) => None,
        }
    }

    pub fn report(&self) -> MutationReport {
        let (missing, breakdown) = match self {
            MutationError::NotFound { missing, .. } => (Some(missing.clone()), None),
            MutationError::PartialFailure { breakdown, .. } => (None, Some(breakdown.clone())),
            _ => (None, None),
        };
        MutationReport {
            kind: self.kind(),
            message: self.to_string(),
            missing,
            breakdown,
            result: self.command_result().cloned(),
        }
    }
}

/// Turn a finished mutation into `Ok` or the most specific error
///
/// `missing` are the names the remote tool reported as nonexistent and
/// `applied` the names confirmed to be in the requested state afterwards.
/// Only requested names count, and each is counted once.
pub fn classify(
    targets: &[String],
    missing: Vec<String>,
    applied: &[String],
    result: CommandResult,
) -> Result<CommandResult, MutationError> {
    if result.success {
        return Ok(result);
    }

    let mut unique: Vec<&String> = Vec::with_capacity(targets.len());
    for name in targets {
        if !unique.contains(&name) {
            unique.push(name);
        }
    }

    let failed: Vec<String> = unique
        .iter()
        .filter(|name| missing.contains(name))
        .map(|name| name.to_string())
        .collect();

    if failed.is_empty() {
        return Err(MutationError::CommandFailed { result });
    }

    let (succeeded, unchanged): (Vec<String>, Vec<String>) = unique
        .iter()
        .filter(|name| !failed.contains(name))
        .map(|name| name.to_string())
        .partition(|name| applied.contains(name));

    if succeeded.is_empty() {
        return Err(MutationError::NotFound {
            missing: failed,
            result,
        });
    }

    Err(MutationError::PartialFailure {
        breakdown: TargetBreakdown {
            succeeded,
            failed,
            unchanged,
            total: unique.len(),
        },
        result,
    })
}
