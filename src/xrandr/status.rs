//! xrandr status output parsing
//!
//! Output header lines look like:
//!
//! ```text
//! DP-1 connected primary 2560x1440+0+0 (normal left inverted right x axis y axis) 597mm x 336mm
//! HDMI-1 connected (normal left inverted right x axis y axis)
//! DP-2 disconnected (normal left inverted right x axis y axis)
//! ```
//!
//! Mode lines below each header are indented and never match.

use std::fmt;

use regex::{Captures, Regex};

use crate::layout::Layout;

/// Framebuffer area an output currently covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: i64,
    pub height: i64,
    pub x: i64,
    pub y: i64,
}

/// Parsed header line of one output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputStatus {
    pub name: String,
    pub connected: bool,
    pub primary: bool,
    /// `None` when the output is not driving any CRTC
    pub geometry: Option<Geometry>,
}

impl fmt::Display for OutputStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.connected { "connected" } else { "disconnected" };
        write!(f, "{} {}", self.name, state)?;
        if self.primary {
            f.write_str(" primary")?;
        }
        match self.geometry {
            Some(g) => write!(f, " {}x{}+{}+{}", g.width, g.height, g.x, g.y),
            None => f.write_str(" (off)"),
        }
    }
}

const HEADER_TAIL: &str = r"\s+(?P<state>connected|disconnected)(?P<primary>\s+primary)?(?:\s+(?P<width>\d+)x(?P<height>\d+)\+(?P<x>\d+)\+(?P<y>\d+))?";

/// Header pattern restricted to the given output names
pub fn display_line_pattern(names: &[&str]) -> Regex {
    let options = names
        .iter()
        .map(|name| regex::escape(name))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r"(?m)^(?P<display>{}){}", options, HEADER_TAIL);
    // Every name is escaped, so the pattern is always valid
    Regex::new(&pattern).expect("escaped display pattern")
}

fn any_display_pattern() -> Regex {
    Regex::new(&format!(r"(?m)^(?P<display>\S+){}", HEADER_TAIL)).expect("static display pattern")
}

fn status_from(caps: &Captures<'_>) -> OutputStatus {
    let number = |name: &str| {
        caps.name(name)
            .and_then(|m| m.as_str().parse::<i64>().ok())
    };
    let geometry = match (number("width"), number("height"), number("x"), number("y")) {
        (Some(width), Some(height), Some(x), Some(y)) => Some(Geometry {
            width,
            height,
            x,
            y,
        }),
        _ => None,
    };

    OutputStatus {
        name: caps["display"].to_string(),
        connected: &caps["state"] == "connected",
        primary: caps.name("primary").is_some(),
        geometry,
    }
}

/// Names of connected outputs, in the order xrandr lists them
pub fn connected_displays(output: &str) -> Vec<String> {
    any_display_pattern()
        .captures_iter(output)
        .map(|caps| status_from(&caps))
        .filter(|status| status.connected)
        .map(|status| status.name)
        .collect()
}

/// Status of each named output found in `output`
pub fn parse_status(names: &[&str], output: &str) -> Vec<OutputStatus> {
    if names.is_empty() {
        return any_display_pattern()
            .captures_iter(output)
            .map(|caps| status_from(&caps))
            .collect();
    }
    display_line_pattern(names)
        .captures_iter(output)
        .map(|caps| status_from(&caps))
        .collect()
}

/// Compare reported geometry with the computed layout
pub fn verify(layout: &Layout, statuses: &[OutputStatus]) -> Vec<String> {
    let mut mismatches = Vec::new();

    for resolved in &layout.displays {
        let display = &resolved.display;
        let Some(status) = statuses.iter().find(|s| s.name == display.name) else {
            mismatches.push(format!("{}: not reported by xrandr", display.name));
            continue;
        };

        let expected = (!display.off).then(|| Geometry {
            width: display.size_x(),
            height: display.size_y(),
            x: resolved.position.x,
            y: resolved.position.y,
        });

        if status.geometry != expected {
            let describe = |g: Option<Geometry>| match g {
                Some(g) => format!("{}x{}+{}+{}", g.width, g.height, g.x, g.y),
                None => "off".to_string(),
            };
            mismatches.push(format!(
                "{}: expected {}, xrandr reports {}",
                display.name,
                describe(expected),
                describe(status.geometry)
            ));
        }
    }

    mismatches
}
