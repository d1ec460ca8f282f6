//! Relative position resolution
//!
//! Displays are resolved in declaration order. Each one is placed against
//! the already resolved footprint of the display it references, so a chain
//! like `C right-of B right-of A` is a single forward fold.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use super::{Display, LayoutError, LayoutResult, Placement};

/// Absolute top-left corner of a display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

impl Position {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// A display together with its resolved position
#[derive(Debug, Clone)]
pub struct PositionedDisplay {
    pub display: Display,
    pub position: Position,
}

/// Name-keyed arena of resolved displays
///
/// Entries are write-once: a name can only be registered a single time and
/// only entries registered earlier can be looked up by later displays.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<PositionedDisplay>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the position of `entry` against the registry and add it
    pub fn register(&mut self, entry: Display) -> LayoutResult<Position> {
        if self.index.contains_key(&entry.name) {
            return Err(LayoutError::Validation(format!(
                "display '{}' is declared more than once",
                entry.name
            )));
        }

        let position = self.resolve(&entry)?;
        if position.x < 0 || position.y < 0 {
            return Err(LayoutError::Validation(format!(
                "display '{}' resolves to negative position {}x{}; \
                 declare the leftmost/topmost display first",
                entry.name, position.x, position.y
            )));
        }

        debug!(
            "Resolved {} at {}x{} (footprint {}x{})",
            entry.name,
            position.x,
            position.y,
            entry.size_x(),
            entry.size_y()
        );

        self.index.insert(entry.name.clone(), self.entries.len());
        self.entries.push(PositionedDisplay {
            display: entry,
            position,
        });
        Ok(position)
    }

    /// Position `entry` would get, without registering it
    pub fn resolve(&self, entry: &Display) -> LayoutResult<Position> {
        let Some(reference) = entry.placement.reference() else {
            return Ok(Position::default());
        };

        let anchor = self.get(reference).ok_or_else(|| LayoutError::Lookup {
            name: reference.to_string(),
            referrer: entry.name.clone(),
        })?;
        let Position { x, y } = anchor.position;
        let other = &anchor.display;

        let position = match entry.placement {
            Placement::Anchored => Some(Position::default()),
            Placement::Above(_) => y.checked_sub(other.size_y()).map(|y| Position::new(x, y)),
            Placement::Below(_) => y.checked_add(other.size_y()).map(|y| Position::new(x, y)),
            Placement::LeftOf(_) => x.checked_sub(other.size_x()).map(|x| Position::new(x, y)),
            Placement::RightOf(_) => x.checked_add(other.size_x()).map(|x| Position::new(x, y)),
        };

        position.ok_or_else(|| {
            LayoutError::Validation(format!(
                "position of display '{}' next to '{}' is out of range",
                entry.name, reference
            ))
        })
    }

    pub fn get(&self, name: &str) -> Option<&PositionedDisplay> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// Resolved displays in registration order
    pub fn into_displays(self) -> Vec<PositionedDisplay> {
        self.entries
    }
}

/// Resolve every display's absolute position in declaration order
pub fn resolve_positions(displays: Vec<Display>) -> LayoutResult<Vec<PositionedDisplay>> {
    let mut registry = Registry::new();
    for display in displays {
        registry.register(display)?;
    }
    Ok(registry.into_displays())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Resolution, Rotation};

    fn make_display(name: &str, res: &str, placement: Placement) -> Display {
        let res: Resolution = res.parse().unwrap();
        Display::new(name, 24.0, res)
            .unwrap()
            .with_placement(placement)
    }

    fn positions(displays: Vec<Display>) -> Vec<(String, i64, i64)> {
        resolve_positions(displays)
            .unwrap()
            .into_iter()
            .map(|p| (p.display.name, p.position.x, p.position.y))
            .collect()
    }

    #[test]
    fn test_linear_chain() {
        let resolved = positions(vec![
            make_display("A", "1000x600", Placement::Anchored),
            make_display("B", "1000x600", Placement::RightOf("A".into())),
            make_display("C", "1000x600", Placement::RightOf("B".into())),
        ]);

        assert_eq!(
            resolved,
            vec![
                ("A".to_string(), 0, 0),
                ("B".to_string(), 1000, 0),
                ("C".to_string(), 2000, 0),
            ]
        );
    }

    #[test]
    fn test_below_uses_reference_height() {
        let resolved = positions(vec![
            make_display("top", "1920x1080", Placement::Anchored),
            make_display("bottom", "1280x720", Placement::Below("top".into())),
        ]);
        assert_eq!(resolved[1], ("bottom".to_string(), 0, 1080));
    }

    #[test]
    fn test_rotated_reference_swaps_footprint() {
        let tall = make_display("tall", "1920x1080", Placement::Anchored)
            .with_rotation(Rotation::Left);
        let resolved = positions(vec![
            tall,
            make_display("wide", "1920x1080", Placement::RightOf("tall".into())),
            make_display("under", "1920x1080", Placement::Below("tall".into())),
        ]);
        assert_eq!(resolved[1], ("wide".to_string(), 1080, 0));
        assert_eq!(resolved[2], ("under".to_string(), 0, 1920));
    }

    #[test]
    fn test_scaled_reference_footprint() {
        let a = make_display("A", "1920x1080", Placement::Anchored).scale(1.5);
        let resolved = positions(vec![
            a,
            make_display("B", "1920x1080", Placement::RightOf("A".into())),
        ]);
        assert_eq!(resolved[1], ("B".to_string(), 2880, 0));
    }

    #[test]
    fn test_negative_position_rejected() {
        let result = resolve_positions(vec![
            make_display("A", "1920x1080", Placement::Anchored),
            make_display("B", "1920x1080", Placement::LeftOf("A".into())),
        ]);
        assert!(matches!(result, Err(LayoutError::Validation(_))));

        let result = resolve_positions(vec![
            make_display("A", "1920x1080", Placement::Anchored),
            make_display("B", "1920x1080", Placement::Above("A".into())),
        ]);
        assert!(matches!(result, Err(LayoutError::Validation(_))));
    }

    #[test]
    fn test_forward_reference_is_lookup_error() {
        let result = resolve_positions(vec![
            make_display("A", "1920x1080", Placement::RightOf("B".into())),
            make_display("B", "1920x1080", Placement::Anchored),
        ]);
        assert_eq!(
            result.unwrap_err(),
            LayoutError::Lookup {
                name: "B".into(),
                referrer: "A".into()
            }
        );
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = Registry::new();
        registry
            .register(make_display("A", "1920x1080", Placement::Anchored))
            .unwrap();
        let err = registry
            .register(make_display("A", "1920x1080", Placement::Anchored))
            .unwrap_err();
        assert!(matches!(err, LayoutError::Validation(_)));
        assert_eq!(registry.into_displays().len(), 1);
    }

    #[test]
    fn test_register_returns_position() {
        let mut registry = Registry::new();
        let a = registry
            .register(make_display("A", "1920x1080", Placement::Anchored))
            .unwrap();
        let b = registry
            .register(make_display("B", "1920x1080", Placement::Below("A".into())))
            .unwrap();
        assert_eq!(a, Position::new(0, 0));
        assert_eq!(b, Position::new(0, 1080));
        assert_eq!(registry.get("B").unwrap().position, b);
    }

    #[test]
    fn test_huge_footprint_chain_is_rejected() {
        let result = resolve_positions(vec![
            make_display("A", "1e300x1e300", Placement::Anchored),
            make_display("B", "1e300x1e300", Placement::RightOf("A".into())),
            make_display("C", "1e300x1e300", Placement::RightOf("B".into())),
        ]);
        assert!(matches!(result, Err(LayoutError::Validation(_))));
    }
}
