//! Desktop scale settings
//!
//! GNOME and GTK only understand whole scale factors, so these overrides
//! are only issued when the desktop scale is an integer.

use crate::command::{CommandRunner, RunnerResult, ShellCommand};

const GSETTINGS: &str = "gsettings";

/// The `gsettings` calls that set an integer UI scale
pub fn scale_commands(scale: u32) -> Vec<ShellCommand> {
    vec![
        ShellCommand::new(GSETTINGS)
            .arg("set")
            .arg("org.gnome.settings-daemon.plugins.xsettings")
            .arg("overrides")
            .arg(format!("[{{'Gdk/WindowScalingFactor', <{}>}}]", scale)),
        ShellCommand::new(GSETTINGS)
            .args(["set", "org.gnome.desktop.interface", "scaling-factor"])
            .arg(scale.to_string()),
    ]
}

/// Run every scale command in order, stopping at the first failure
pub async fn apply_scale(runner: &dyn CommandRunner, scale: u32) -> RunnerResult<()> {
    for command in scale_commands(scale) {
        runner.run(&command).await?;
    }
    tracing::info!("Desktop scaling factor set to {}", scale);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::fake::FakeRunner;

    #[test]
    fn test_scale_commands() {
        let lines: Vec<String> = scale_commands(2).iter().map(|c| c.to_string()).collect();
        assert_eq!(
            lines,
            vec![
                r#"gsettings set org.gnome.settings-daemon.plugins.xsettings overrides "[{'Gdk/WindowScalingFactor', <2>}]""#,
                "gsettings set org.gnome.desktop.interface scaling-factor 2",
            ]
        );
    }

    #[tokio::test]
    async fn test_apply_scale_runs_both() {
        let runner = FakeRunner::new();
        apply_scale(&runner, 3).await.unwrap();
        let calls = runner.calls();
        assert_eq!(calls, scale_commands(3));
    }
}
