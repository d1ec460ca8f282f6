//! Argument rendering
//!
//! Token order matters: xrandr applies `--output`-scoped flags to the most
//! recently named output.

use crate::layout::{Layout, PositionedDisplay, Rotation};

use super::XRANDR;

/// Global xrandr flag that computes everything without applying it
pub const DRY_RUN_FLAG: &str = "--dryrun";

const LINE_CONTINUATION: &str = " \\\n\t";

/// Shortest round-trip form, keeping a `.0` on whole numbers
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Tokens configuring one output
pub fn display_args(resolved: &PositionedDisplay) -> Vec<String> {
    let display = &resolved.display;
    let mut args = vec!["--output".to_string(), display.name.clone()];

    if display.off {
        args.push("-off".to_string());
        return args;
    }

    args.push("--mode".to_string());
    args.push(display.res.to_string());

    if display.rotation != Rotation::Normal {
        args.push("--rotate".to_string());
        args.push(display.rotation.to_string());
    }

    args.push("--scale".to_string());
    args.push(format_float(display.viewport_ratio()));

    args.push("--pos".to_string());
    args.push(format!("{}x{}", resolved.position.x, resolved.position.y));

    args.push("--gamma".to_string());
    args.push(format_float(display.gamma));

    if display.primary {
        args.push("--primary".to_string());
    }

    args
}

/// Every display's tokens, in declaration order
pub fn layout_tokens(layout: &Layout) -> Vec<String> {
    layout.displays.iter().flat_map(display_args).collect()
}

/// Full shell line, one output per continued line
///
/// Without `apply` the line ends in `--dryrun` so piping it to a shell
/// changes nothing.
pub fn render_command(layout: &Layout, apply: bool) -> String {
    let mut lines = vec![XRANDR.to_string()];
    lines.extend(layout.displays.iter().map(|d| display_args(d).join(" ")));
    if !apply {
        lines.push(DRY_RUN_FLAG.to_string());
    }
    lines.join(LINE_CONTINUATION)
}
