//! Layout module - Display geometry and scaling resolution
//!
//! Turns a list of declared monitors into absolute xrandr geometry:
//! - Native and virtual resolutions
//! - Pixel density (ppi) and density equalization
//! - Relative placement chains resolved into absolute positions

mod display;
mod pipeline;
mod position;
mod resolution;

pub use display::{Display, Placement, Rotation};
pub use pipeline::{normalize, Layout, NormalizeOptions, PpiTarget};
pub use position::PositionedDisplay;
#[cfg(test)]
pub use position::Position;
pub use resolution::Resolution;

use thiserror::Error;

/// Errors raised while building or resolving a layout
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Format error: {0}")]
    Format(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Lookup error: display '{name}' referenced by '{referrer}' has not been declared before it")]
    Lookup { name: String, referrer: String },
}

pub type LayoutResult<T> = Result<T, LayoutError>;

/// Relative tolerance used when comparing aspect ratios
pub const ASPECT_RATIO_TOLERANCE: f64 = 1e-9;
