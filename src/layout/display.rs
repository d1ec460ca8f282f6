//! Display entity
//!
//! Holds the physical and logical properties of one monitor together with
//! the derived density model used for cross-monitor equalization.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{LayoutError, LayoutResult, Resolution};

/// Output rotation as understood by `xrandr --rotate`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    #[default]
    Normal,
    Inverted,
    Left,
    Right,
}

impl Rotation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::Normal => "normal",
            Rotation::Inverted => "inverted",
            Rotation::Left => "left",
            Rotation::Right => "right",
        }
    }

    /// Whether width and height trade places on screen
    pub fn is_sideways(&self) -> bool {
        matches!(self, Rotation::Left | Rotation::Right)
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rotation {
    type Err = LayoutError;

    fn from_str(s: &str) -> LayoutResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "" | "normal" => Ok(Rotation::Normal),
            "inverted" => Ok(Rotation::Inverted),
            "left" => Ok(Rotation::Left),
            "right" => Ok(Rotation::Right),
            other => Err(LayoutError::Format(format!("unknown rotation '{}'", other))),
        }
    }
}

/// Where a display sits relative to a previously declared one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    /// Pinned at the origin
    #[default]
    Anchored,
    Above(String),
    Below(String),
    LeftOf(String),
    RightOf(String),
}

impl Placement {
    /// Name of the referenced display, if any
    pub fn reference(&self) -> Option<&str> {
        match self {
            Placement::Anchored => None,
            Placement::Above(name)
            | Placement::Below(name)
            | Placement::LeftOf(name)
            | Placement::RightOf(name) => Some(name),
        }
    }
}

/// A monitor declaration plus its scaling state
#[derive(Debug, Clone, PartialEq)]
pub struct Display {
    pub name: String,
    /// Physical diagonal in inches
    pub inches: f64,
    /// Native pixel resolution
    pub res: Resolution,
    pub gamma: f64,
    pub zoom: f64,
    pub rotation: Rotation,
    pub primary: bool,
    pub default_ppi: bool,
    pub off: bool,
    pub placement: Placement,
    /// Accumulated factor of every `scale` applied so far
    scale_factor: f64,
}

impl Display {
    pub fn new(name: impl Into<String>, inches: f64, res: Resolution) -> LayoutResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(LayoutError::Validation("display name must not be empty".into()));
        }
        if !(inches.is_finite() && inches > 0.0) {
            return Err(LayoutError::Validation(format!(
                "{}: diagonal must be positive, got {}",
                name, inches
            )));
        }

        Ok(Self {
            name,
            inches,
            res,
            gamma: 1.0,
            zoom: 1.0,
            rotation: Rotation::Normal,
            primary: false,
            default_ppi: false,
            off: false,
            placement: Placement::Anchored,
            scale_factor: 1.0,
        })
    }

    pub fn with_zoom(mut self, zoom: f64) -> LayoutResult<Self> {
        if !(zoom.is_finite() && zoom > 0.0) {
            return Err(LayoutError::Validation(format!(
                "{}: zoom must be positive, got {}",
                self.name, zoom
            )));
        }
        self.zoom = zoom;
        Ok(self)
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    pub fn default_ppi(mut self, default_ppi: bool) -> Self {
        self.default_ppi = default_ppi;
        self
    }

    pub fn off(mut self, off: bool) -> Self {
        self.off = off;
        self
    }

    /// Native pixel density along the diagonal
    pub fn ppi(&self) -> f64 {
        self.res.diagonal() / self.inches
    }

    /// Resolution after every applied scale
    pub fn virtual_res(&self) -> Resolution {
        self.res.scaled(self.scale_factor)
    }

    /// Density of the virtual resolution on the same physical panel
    pub fn virtual_ppi(&self) -> f64 {
        self.virtual_res().diagonal() / self.inches
    }

    /// Value handed to `xrandr --scale`
    pub fn viewport_ratio(&self) -> f64 {
        (self.virtual_res().height / self.res.height) / self.zoom
    }

    /// Returns a copy whose virtual resolution is multiplied by `factor`
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            scale_factor: self.scale_factor * factor,
            ..self.clone()
        }
    }

    /// Width of the rendered footprint in absolute pixels
    pub fn size_x(&self) -> i64 {
        let native = if self.rotation.is_sideways() {
            self.res.height
        } else {
            self.res.width
        };
        (native * self.viewport_ratio()).round_ties_even() as i64
    }

    /// Height of the rendered footprint in absolute pixels
    pub fn size_y(&self) -> i64 {
        let native = if self.rotation.is_sideways() {
            self.res.width
        } else {
            self.res.height
        };
        (native * self.viewport_ratio()).round_ties_even() as i64
    }
}

/// Parses `NAME,inches=27,res=2560x1440,rotate=left,primary,right-of=DP-1`
impl FromStr for Display {
    type Err = LayoutError;

    fn from_str(s: &str) -> LayoutResult<Self> {
        let mut name = None;
        let mut inches = None;
        let mut res = None;
        let mut zoom = None;
        let mut gamma = None;
        let mut rotation = Rotation::Normal;
        let mut primary = false;
        let mut default_ppi = false;
        let mut off = false;
        let mut placement = Placement::Anchored;

        let mut seen = HashSet::new();

        let items = s.split(',').map(str::trim).filter(|item| !item.is_empty());
        for (index, item) in items.enumerate() {
            let (key, value) = match item.split_once('=') {
                Some((key, value)) => (key.trim(), Some(value.trim())),
                None if index == 0 => ("name", Some(item)),
                None => (item, None),
            };

            let canonical = match key {
                "resolution" => "res",
                "rotate" => "rotation",
                "above" | "below" | "left-of" | "right-of" => "placement",
                other => other,
            };
            // Placement conflicts get their own error below
            if canonical != "placement" && !seen.insert(canonical) {
                return Err(LayoutError::Format(format!(
                    "'{}': key '{}' given more than once",
                    s, key
                )));
            }

            let number = |value: Option<&str>| -> LayoutResult<f64> {
                let value = value
                    .ok_or_else(|| LayoutError::Format(format!("'{}' needs a value", key)))?;
                value
                    .parse()
                    .map_err(|e| LayoutError::Format(format!("{}={}: {}", key, value, e)))
            };
            let required = |value: Option<&str>| -> LayoutResult<String> {
                value
                    .map(str::to_string)
                    .ok_or_else(|| LayoutError::Format(format!("'{}' needs a value", key)))
            };

            match key {
                "name" => name = Some(required(value)?),
                "inches" => inches = Some(number(value)?),
                "res" | "resolution" => res = Some(required(value)?.parse::<Resolution>()?),
                "zoom" => zoom = Some(number(value)?),
                "gamma" => gamma = Some(number(value)?),
                "rotate" | "rotation" => rotation = required(value)?.parse()?,
                "primary" => primary = parse_flag(key, value)?,
                "default-ppi" => default_ppi = parse_flag(key, value)?,
                "off" => off = parse_flag(key, value)?,
                "above" | "below" | "left-of" | "right-of" => {
                    if placement != Placement::Anchored {
                        return Err(LayoutError::Validation(format!(
                            "'{}': above, below, left-of and right-of cannot be combined",
                            s
                        )));
                    }
                    let target = required(value)?;
                    placement = match key {
                        "above" => Placement::Above(target),
                        "below" => Placement::Below(target),
                        "left-of" => Placement::LeftOf(target),
                        _ => Placement::RightOf(target),
                    };
                }
                other => {
                    return Err(LayoutError::Format(format!(
                        "'{}': unknown display key '{}'",
                        s, other
                    )))
                }
            }
        }

        let name = name.ok_or_else(|| LayoutError::Format(format!("'{}': missing name", s)))?;
        let inches =
            inches.ok_or_else(|| LayoutError::Format(format!("{}: missing inches", name)))?;
        let res = res.ok_or_else(|| LayoutError::Format(format!("{}: missing res", name)))?;

        Ok(Display::new(name, inches, res)?
            .with_zoom(zoom.unwrap_or(1.0))?
            .with_gamma(gamma.unwrap_or(1.0))
            .with_rotation(rotation)
            .with_placement(placement)
            .primary(primary)
            .default_ppi(default_ppi)
            .off(off))
    }
}

fn parse_flag(key: &str, value: Option<&str>) -> LayoutResult<bool> {
    match value.map(str::to_ascii_lowercase).as_deref() {
        None | Some("true") | Some("yes") | Some("1") => Ok(true),
        Some("false") | Some("no") | Some("0") => Ok(false),
        Some(other) => Err(LayoutError::Format(format!(
            "{}: expected a boolean, got '{}'",
            key, other
        ))),
    }
}
