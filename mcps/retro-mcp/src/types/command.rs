//! Remote command execution record

use serde::{Deserialize, Serialize};

/// One command as executed on the managed host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    /// Command text as sent, including any `sudo` prefix
    pub command: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    /// Wall-clock seconds between dispatch and completion
    pub execution_time: f64,
}

impl CommandResult {
    pub fn new(
        command: impl Into<String>,
        exit_code: i32,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
        execution_time: f64,
    ) -> Self {
        Self {
            command: command.into(),
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
            success: exit_code == 0,
            execution_time,
        }
    }

    /// Result for a request that needed no remote call at all
    pub fn no_op(message: impl Into<String>) -> Self {
        Self::new("", 0, message, "", 0.0)
    }

    /// Stdout of a successful command, empty otherwise
    pub fn success_stdout(&self) -> &str {
        if self.success {
            &self.stdout
        } else {
            ""
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_follows_exit_code() {
        assert!(CommandResult::new("true", 0, "", "", 0.01).success);
        assert!(!CommandResult::new("false", 1, "", "", 0.01).success);
    }

    #[test]
    fn test_success_stdout_hides_failed_output() {
        let failed = CommandResult::new("vcgencmd measure_temp", 127, "garbage", "not found", 0.0);
        assert_eq!(failed.success_stdout(), "");

        let ok = CommandResult::new("hostname", 0, "retropie\n", "", 0.0);
        assert_eq!(ok.success_stdout(), "retropie\n");
    }
}
