//! Shell completion output

use std::io::Write;
use std::path::Path;

use clap::Command;
use clap_complete::Shell;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Unsupported shell '{0}'")]
    UnsupportedShell(String),
}

/// Pick the shell from a `$SHELL`-style path, defaulting to bash
pub fn detect_shell(shell_path: Option<&str>) -> Result<Shell, CompletionError> {
    let path = shell_path.unwrap_or("/bin/bash");
    Shell::from_shell_path(path).ok_or_else(|| {
        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string());
        CompletionError::UnsupportedShell(name)
    })
}

/// Write the completion script for `shell`
pub fn write_completions(shell: Shell, command: &mut Command, out: &mut dyn Write) {
    let name = command.get_name().to_string();
    clap_complete::generate(shell, command, name, out);
}
