//! Scripted runner for tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{CommandRunner, RunnerResult, ShellCommand};

/// Records every command and replies with queued outputs
#[derive(Debug, Default)]
pub struct FakeRunner {
    replies: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<ShellCommand>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, output: &str) -> Self {
        self.replies.lock().unwrap().push_back(output.to_string());
        self
    }

    pub fn calls(&self) -> Vec<ShellCommand> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, command: &ShellCommand) -> RunnerResult<String> {
        self.calls.lock().unwrap().push(command.clone());
        Ok(self.replies.lock().unwrap().pop_front().unwrap_or_default())
    }
}
