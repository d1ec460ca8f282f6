//! Command module - Running external programs
//!
//! Everything the tool does outside of its own process goes through the
//! [`CommandRunner`] trait:
//! - `xrandr` queries and layout application
//! - `gsettings` desktop scale overrides

mod system;
mod traits;

pub use system::SystemRunner;
pub use traits::*;

#[cfg(test)]
pub mod fake;
