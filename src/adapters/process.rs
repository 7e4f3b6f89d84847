use crate::domain::model::{CommandOutcome, Invocation, StdioMode};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{DevstartError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

/// 以 `tokio::process` 啟動真實子行程
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutcome> {
        tracing::debug!("▶️ Running: {}", invocation);

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args).kill_on_drop(true);

        let spawn_error = |source| DevstartError::SpawnError {
            program: invocation.program.clone(),
            source,
        };

        match invocation.stdio {
            StdioMode::Inherit => {
                let status = command
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()
                    .await
                    .map_err(spawn_error)?;

                Ok(CommandOutcome {
                    exit_code: status.code(),
                    ..CommandOutcome::default()
                })
            }
            StdioMode::Capture => {
                let output = command
                    .stdin(Stdio::null())
                    .output()
                    .await
                    .map_err(spawn_error)?;

                let outcome = CommandOutcome {
                    exit_code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                };

                if !outcome.stderr.trim().is_empty() {
                    tracing::debug!("{} stderr: {}", invocation.program, outcome.stderr.trim());
                }

                Ok(outcome)
            }
        }
    }
}
