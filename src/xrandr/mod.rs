//! xrandr module - Talking to the X display configuration tool
//!
//! Provides:
//! - Rendering a resolved layout into xrandr arguments
//! - Parsing xrandr status output
//! - Querying connected outputs and applying a layout

mod args;
mod status;

pub use args::{layout_tokens, render_command};
pub use status::{connected_displays, parse_status, verify, OutputStatus};

use tracing::{info, warn};

use crate::command::{CommandRunner, RunnerError, RunnerResult, ShellCommand};
use crate::layout::Layout;

/// Name of the external tool
pub const XRANDR: &str = "xrandr";

/// Query the names of all connected outputs
pub async fn list_connected(runner: &dyn CommandRunner) -> RunnerResult<Vec<String>> {
    let output = runner.run(&ShellCommand::new(XRANDR)).await?;
    let names = connected_displays(&output);
    if names.is_empty() {
        return Err(RunnerError::NoDisplays);
    }
    Ok(names)
}

/// Query the current state of the named outputs
pub async fn query_status(
    runner: &dyn CommandRunner,
    names: &[&str],
) -> RunnerResult<Vec<OutputStatus>> {
    let output = runner.run(&ShellCommand::new(XRANDR)).await?;
    Ok(parse_status(names, &output))
}

/// Apply the layout and report what xrandr says afterwards
///
/// Returns the mismatches between the computed and the reported geometry.
pub async fn apply(runner: &dyn CommandRunner, layout: &Layout) -> RunnerResult<Vec<String>> {
    let command = ShellCommand::new(XRANDR).args(layout_tokens(layout));
    runner.run(&command).await?;

    let names: Vec<&str> = layout
        .displays
        .iter()
        .map(|p| p.display.name.as_str())
        .collect();
    let statuses = query_status(runner, &names).await?;
    for status in &statuses {
        info!("Applied: {}", status);
    }

    let mismatches = verify(layout, &statuses);
    for mismatch in &mismatches {
        warn!("{}", mismatch);
    }
    Ok(mismatches)
}
