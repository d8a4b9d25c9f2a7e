//! Scripted in-memory client for tests
//!
//! Compiled for this crate's own tests and, outside them, only with the
//! `test-support` feature.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{RemoteCommandClient, TransportError, TransportResult};
use crate::types::CommandResult;

/// Exit code returned for commands nobody scripted
const COMMAND_NOT_FOUND_EXIT: i32 = 127;

/// One call received by a [`ScriptedClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub command: String,
    pub use_sudo: bool,
}

#[derive(Default)]
struct Script {
    responses: HashMap<String, (i32, String, String)>,
    unreachable: bool,
    calls: Vec<RecordedCall>,
}

/// Answers commands from a fixed table and records every call
#[derive(Default)]
pub struct ScriptedClient {
    script: Mutex<Script>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client whose every call fails at the transport level
    pub fn unreachable() -> Self {
        let client = Self::new();
        client.set_unreachable(true);
        client
    }

    /// Answer `command` with exit 0 and `stdout`
    pub fn respond(self, command: impl Into<String>, stdout: impl Into<String>) -> Self {
        self.respond_with(command, 0, stdout, "")
    }

    pub fn respond_with(
        self,
        command: impl Into<String>,
        exit_code: i32,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        self.script
            .lock()
            .responses
            .insert(command.into(), (exit_code, stdout.into(), stderr.into()));
        self
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.script.lock().unreachable = unreachable;
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.script.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.script.lock().calls.len()
    }
}

#[async_trait]
impl RemoteCommandClient for ScriptedClient {
    async fn execute_command(&self, command: &str, use_sudo: bool) -> TransportResult<CommandResult> {
        let mut script = self.script.lock();
        script.calls.push(RecordedCall {
            command: command.to_string(),
            use_sudo,
        });

        if script.unreachable {
            return Err(TransportError::Connection {
                host: "scripted".to_string(),
                message: "host unreachable".to_string(),
            });
        }

        let result = match script.responses.get(command) {
            Some((exit_code, stdout, stderr)) => {
                CommandResult::new(command, *exit_code, stdout.clone(), stderr.clone(), 0.0)
            }
            None => CommandResult::new(
                command,
                COMMAND_NOT_FOUND_EXIT,
                "",
                format!("{command}: command not found"),
                0.0,
            ),
        };
        Ok(result)
    }
}
