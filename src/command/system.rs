//! Runner backed by real subprocesses

use async_trait::async_trait;
use tokio::process::Command;

use super::{CommandRunner, RunnerError, RunnerResult, ShellCommand};

/// Spawns commands with `tokio::process`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, command: &ShellCommand) -> RunnerResult<String> {
        tracing::info!("Running: {}", command);

        let output = Command::new(&command.program)
            .args(&command.args)
            .output()
            .await
            .map_err(|source| RunnerError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(RunnerError::Failed {
                program: command.program.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout)
            .map_err(|_| RunnerError::InvalidOutput(command.program.clone()))
    }
}
