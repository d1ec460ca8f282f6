//! Runner trait and shell command rendering

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Errors at the boundary with the environment
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {code:?}: {stderr}")]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{0} produced output that is not valid UTF-8")]
    InvalidOutput(String),

    #[error("xrandr did not report any connected display")]
    NoDisplays,
}

pub type RunnerResult<T> = Result<T, RunnerError>;

/// A program invocation, renderable as a shell line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ShellCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

/// Double-quote an argument when a shell would otherwise split or expand it
fn quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=+,@%".contains(c));
    if plain {
        return arg.to_string();
    }

    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Executes external programs and captures their stdout
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion and return its stdout
    async fn run(&self, command: &ShellCommand) -> RunnerResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_plain_args() {
        let cmd = ShellCommand::new("gsettings")
            .arg("set")
            .args(["org.gnome.desktop.interface", "scaling-factor", "2"]);
        assert_eq!(
            cmd.to_string(),
            "gsettings set org.gnome.desktop.interface scaling-factor 2"
        );
    }

    #[test]
    fn test_render_quotes_special_args() {
        let cmd = ShellCommand::new("echo").arg("[{'Gdk', <2>}]").arg("$HOME").arg("");
        assert_eq!(cmd.to_string(), r#"echo "[{'Gdk', <2>}]" "\$HOME" """#);
    }
}
