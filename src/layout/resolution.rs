//! Pixel resolution value type

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{LayoutError, LayoutResult};

/// A width/height pair in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub width: f64,
    pub height: f64,
}

impl Resolution {
    pub fn new(width: f64, height: f64) -> LayoutResult<Self> {
        if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
            return Err(LayoutError::Format(format!(
                "resolution components must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self { width, height })
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    /// Scale both components by the same factor
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }

    /// Diagonal length in pixels
    pub fn diagonal(&self) -> f64 {
        self.height * (1.0 + self.aspect_ratio().powi(2)).sqrt()
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}x{:.0}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = LayoutError;

    fn from_str(s: &str) -> LayoutResult<Self> {
        let (width, height) = s
            .split_once('x')
            .ok_or_else(|| LayoutError::Format(format!("'{}': 'x' separator not found", s)))?;

        let parse = |part: &str| {
            part.trim().parse::<f64>().map_err(|e| {
                LayoutError::Format(format!("'{}': invalid component '{}' ({})", s, part, e))
            })
        };

        Self::new(parse(width)?, parse(height)?)
    }
}

impl Serialize for Resolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Resolution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
