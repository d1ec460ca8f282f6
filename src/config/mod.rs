//! Configuration module
//!
//! Handles loading exrandr layout profiles. Profiles are plain TOML files
//! the user writes; the tool only ever reads them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::layout::{
    Display, LayoutError, NormalizeOptions, Placement, PpiTarget, Resolution, Rotation,
};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// A layout profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Uniform desktop scale (1.0 = 100%)
    #[serde(default = "default_one")]
    pub desktop_scale: f64,

    /// Target density; `<= 0` disables density normalization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ppi: Option<f64>,

    /// Run xrandr instead of printing the command
    #[serde(default)]
    pub apply: bool,

    /// Displays in declaration order
    #[serde(default, rename = "display")]
    pub displays: Vec<DisplayEntry>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            desktop_scale: default_one(),
            ppi: None,
            apply: false,
            displays: Vec::new(),
        }
    }
}

/// One `[[display]]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayEntry {
    pub name: String,
    /// Physical diagonal in inches
    pub inches: f64,
    /// Native resolution, `WIDTHxHEIGHT`
    pub res: Resolution,
    #[serde(default = "default_one")]
    pub gamma: f64,
    #[serde(default = "default_one")]
    pub zoom: f64,
    #[serde(default)]
    pub rotation: Rotation,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub default_ppi: bool,
    #[serde(default)]
    pub off: bool,
    #[serde(default)]
    pub placement: Placement,
}

fn default_one() -> f64 {
    1.0
}

impl DisplayEntry {
    pub fn to_display(&self) -> ConfigResult<Display> {
        Ok(Display::new(self.name.clone(), self.inches, self.res)?
            .with_zoom(self.zoom)?
            .with_gamma(self.gamma)
            .with_rotation(self.rotation)
            .with_placement(self.placement.clone())
            .primary(self.primary)
            .default_ppi(self.default_ppi)
            .off(self.off))
    }
}

impl From<Display> for DisplayEntry {
    fn from(display: Display) -> Self {
        Self {
            name: display.name,
            inches: display.inches,
            res: display.res,
            gamma: display.gamma,
            zoom: display.zoom,
            rotation: display.rotation,
            primary: display.primary,
            default_ppi: display.default_ppi,
            off: display.off,
            placement: display.placement,
        }
    }
}

impl LayoutConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: LayoutConfig = toml::from_str(&contents)?;
        tracing::debug!(
            "Loaded {} display(s) from {}",
            config.displays.len(),
            path.display()
        );
        Ok(config)
    }

    /// Load configuration from the default location
    pub fn load_default() -> ConfigResult<Self> {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("exrandr/layout.toml")),
            Some(PathBuf::from("./exrandr.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                return Self::load(path);
            }
        }

        // No profile: everything comes from the command line
        Ok(Self::default())
    }

    /// Build the declared displays, in order
    pub fn displays(&self) -> ConfigResult<Vec<Display>> {
        self.displays.iter().map(DisplayEntry::to_display).collect()
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            desktop_scale: self.desktop_scale,
            ppi: PpiTarget::from_override(self.ppi),
        }
    }

    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Generate a sample configuration file
pub fn generate_sample_config() -> ConfigResult<String> {
    let laptop = Display::new("eDP-1", 14.0, Resolution::new(2880.0, 1800.0)?)?
        .primary(true)
        .default_ppi(true);
    let external = Display::new("DP-1", 27.0, Resolution::new(2560.0, 1600.0)?)?
        .with_placement(Placement::RightOf("eDP-1".to_string()));
    let portrait = Display::new("HDMI-1", 24.0, Resolution::new(1920.0, 1200.0)?)?
        .with_rotation(Rotation::Left)
        .with_placement(Placement::RightOf("DP-1".to_string()));

    let config = LayoutConfig {
        displays: vec![laptop.into(), external.into(), portrait.into()],
        ..Default::default()
    };

    config.to_toml()
}
