//! `RemoteCommandClient` backed by the system ssh binary

use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use super::{RemoteCommandClient, TransportError, TransportResult};
use crate::config::ConnectionConfig;
use crate::types::CommandResult;

/// Exit status ssh reserves for its own errors
const SSH_ERROR_EXIT: i32 = 255;

pub struct SshClient {
    config: ConnectionConfig,
}

impl SshClient {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Prefix with `sudo -n` unless the command already escalates itself
    fn remote_command(command: &str, use_sudo: bool) -> String {
        if use_sudo && !command.starts_with("sudo ") {
            format!("sudo -n {command}")
        } else {
            command.to_string()
        }
    }

    fn build_command(&self, remote_command: &str) -> Command {
        let mut cmd = Command::new(&self.config.ssh_binary);
        cmd.arg("-o")
            .arg("BatchMode=yes")
            .arg("-o")
            .arg(format!("ConnectTimeout={}", self.config.connect_timeout_secs))
            .arg("-p")
            .arg(self.config.port.to_string());

        if let Some(key_path) = &self.config.key_path {
            cmd.arg("-i").arg(key_path);
        }

        cmd.arg(format!("{}@{}", self.config.username, self.config.host))
            .arg("--")
            .arg(remote_command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl RemoteCommandClient for SshClient {
    #[instrument(skip(self), fields(host = %self.config.host))]
    async fn execute_command(&self, command: &str, use_sudo: bool) -> TransportResult<CommandResult> {
        let remote_command = Self::remote_command(command, use_sudo);
        debug!("executing: {remote_command}");

        let mut cmd = self.build_command(&remote_command);
        let timeout_secs = self.config.command_timeout_secs;
        let started = Instant::now();

        let output = match tokio::time::timeout(Duration::from_secs(timeout_secs), cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TransportError::BinaryNotFound(self.config.ssh_binary.clone()));
            }
            Ok(Err(e)) => return Err(TransportError::Spawn(e)),
            Err(_) => {
                warn!(timeout_secs, "remote command timed out");
                return Err(TransportError::Timeout(timeout_secs));
            }
        };

        let execution_time = started.elapsed().as_secs_f64();
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let exit_code = output.status.code().unwrap_or(-1);

        if exit_code == SSH_ERROR_EXIT {
            warn!(stderr = %stderr.trim(), "ssh connection failed");
            return Err(TransportError::Connection {
                host: self.config.host.clone(),
                message: stderr.trim().to_string(),
            });
        }

        debug!(exit_code, execution_time, "remote command finished");
        Ok(CommandResult::new(
            remote_command,
            exit_code,
            stdout,
            stderr,
            execution_time,
        ))
    }
}
