//! # Command Shutdown Adapter
//!
//! Runs an external command (for example `systemctl stop validator`) as the
//! shutdown action.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{info, warn};

use crate::domain::MonitorError;
use crate::ports::ShutdownPort;

/// Shutdown action backed by an external program.
///
/// The configured command line is split on whitespace into a program and its
/// arguments. No shell is involved, so quoting and pipes are not interpreted.
#[derive(Debug, Clone)]
pub struct CommandShutdown {
    program: String,
    args: Vec<String>,
}

impl CommandShutdown {
    /// Parse a command line. Empty or blank input is rejected.
    pub fn new(command_line: &str) -> Result<Self, MonitorError> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(MonitorError::EmptyShutdownCommand)?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

#[async_trait]
impl ShutdownPort for CommandShutdown {
    async fn execute(&self) -> Result<Vec<u8>, MonitorError> {
        info!(command = %self.describe(), "Executing shutdown command");

        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| MonitorError::ShutdownFailed(format!("{}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            warn!(status = %output.status, "Shutdown command exited unsuccessfully");
            return Err(MonitorError::ShutdownFailed(format!(
                "{} exited with {}: {}{}",
                self.program,
                output.status,
                stderr.trim(),
                stdout.trim()
            )));
        }

        Ok(output.stdout)
    }

    fn describe(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
