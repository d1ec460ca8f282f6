//! Normalization pipeline
//!
//! Validates a full display set, applies the desktop scale and the
//! density-equalizing scale, then resolves positions in declaration order.

use serde::Serialize;
use tracing::{debug, info};

use super::position::{resolve_positions, PositionedDisplay};
use super::{Display, LayoutError, LayoutResult, ASPECT_RATIO_TOLERANCE};

/// How the density normalization pass picks its target
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum PpiTarget {
    /// The `default_ppi` display if flagged, else the least dense display
    #[default]
    Auto,
    /// Explicit target density
    Fixed(f64),
    /// Skip density normalization entirely
    Disabled,
}

impl PpiTarget {
    /// Map a user supplied override: values `<= 0` disable the pass
    pub fn from_override(ppi: Option<f64>) -> Self {
        match ppi {
            None => PpiTarget::Auto,
            Some(ppi) if ppi > 0.0 => PpiTarget::Fixed(ppi),
            Some(_) => PpiTarget::Disabled,
        }
    }
}

/// Options for [`normalize`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeOptions {
    /// Uniform desktop scale (1.0 = 100%)
    pub desktop_scale: f64,
    pub ppi: PpiTarget,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            desktop_scale: 1.0,
            ppi: PpiTarget::Auto,
        }
    }
}

/// Fully resolved display set
#[derive(Debug, Clone)]
pub struct Layout {
    /// Displays in declaration order
    pub displays: Vec<PositionedDisplay>,
    /// Density every display was normalized to, if the pass ran
    pub target_ppi: Option<f64>,
    /// Desktop scale when it is a whole number
    pub integer_desktop_scale: Option<u32>,
}

/// Run the whole pipeline over displays in declaration order
pub fn normalize(displays: Vec<Display>, options: NormalizeOptions) -> LayoutResult<Layout> {
    validate(&displays)?;

    let scale = options.desktop_scale;
    if !(scale.is_finite() && scale > 0.0) {
        return Err(LayoutError::Validation(format!(
            "desktop scale must be positive, got {}",
            scale
        )));
    }

    info!("Applying desktop scale {}", scale);
    let displays: Vec<Display> = displays.iter().map(|d| d.scale(scale)).collect();

    let target_ppi = match options.ppi {
        PpiTarget::Disabled => None,
        PpiTarget::Fixed(ppi) => Some(ppi),
        PpiTarget::Auto => Some(auto_target(&displays)),
    };

    let displays: Vec<Display> = match target_ppi {
        Some(target) => {
            info!("Normalizing displays to {:.2} ppi", target);
            displays
                .iter()
                .map(|d| {
                    let factor = target / d.ppi();
                    debug!("{}: {:.2} ppi, density factor {}", d.name, d.ppi(), factor);
                    d.scale(factor)
                })
                .collect()
        }
        None => {
            info!("Density normalization disabled");
            displays
        }
    };

    Ok(Layout {
        displays: resolve_positions(displays)?,
        target_ppi,
        integer_desktop_scale: whole_number(scale),
    })
}

/// Set-wide invariants that no single display can check on its own
fn validate(displays: &[Display]) -> LayoutResult<()> {
    let first = displays
        .first()
        .ok_or_else(|| LayoutError::Validation("no displays declared".into()))?;

    let aspect = first.res.aspect_ratio();
    if let Some(other) = displays.iter().find(|d| {
        (d.res.aspect_ratio() - aspect).abs() > ASPECT_RATIO_TOLERANCE * aspect
    }) {
        return Err(LayoutError::Validation(format!(
            "aspect ratio of {} ({}) differs from {} ({})",
            other.name, other.res, first.name, first.res
        )));
    }

    let primaries: Vec<&str> = displays
        .iter()
        .filter(|d| d.primary)
        .map(|d| d.name.as_str())
        .collect();
    if primaries.len() != 1 {
        return Err(LayoutError::Validation(format!(
            "exactly one display must be primary, found {} {:?}",
            primaries.len(),
            primaries
        )));
    }

    let defaults = displays.iter().filter(|d| d.default_ppi).count();
    if defaults > 1 {
        return Err(LayoutError::Validation(format!(
            "at most one display can set default-ppi, found {}",
            defaults
        )));
    }

    Ok(())
}

fn auto_target(displays: &[Display]) -> f64 {
    match displays.iter().find(|d| d.default_ppi) {
        Some(display) => display.ppi(),
        None => displays
            .iter()
            .map(Display::ppi)
            .fold(f64::INFINITY, f64::min),
    }
}

fn whole_number(value: f64) -> Option<u32> {
    (value.fract() == 0.0 && value >= 1.0 && value <= u32::MAX as f64).then(|| value as u32)
}

#[derive(Serialize)]
struct DisplayReport<'a> {
    name: &'a str,
    off: bool,
    mode: String,
    virtual_res: String,
    ppi: f64,
    virtual_ppi: f64,
    viewport_ratio: f64,
    x: i64,
    y: i64,
    width: i64,
    height: i64,
}

#[derive(Serialize)]
struct LayoutReport<'a> {
    target_ppi: Option<f64>,
    integer_desktop_scale: Option<u32>,
    displays: Vec<DisplayReport<'a>>,
}

impl Layout {
    /// Machine readable summary of the resolved geometry
    pub fn to_json(&self) -> serde_json::Result<String> {
        let report = LayoutReport {
            target_ppi: self.target_ppi,
            integer_desktop_scale: self.integer_desktop_scale,
            displays: self
                .displays
                .iter()
                .map(|p| DisplayReport {
                    name: &p.display.name,
                    off: p.display.off,
                    mode: p.display.res.to_string(),
                    virtual_res: p.display.virtual_res().to_string(),
                    ppi: p.display.ppi(),
                    virtual_ppi: p.display.virtual_ppi(),
                    viewport_ratio: p.display.viewport_ratio(),
                    x: p.position.x,
                    y: p.position.y,
                    width: p.display.size_x(),
                    height: p.display.size_y(),
                })
                .collect(),
        };
        serde_json::to_string_pretty(&report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Placement, Position, Resolution};

    fn make_display(name: &str, inches: f64, res: &str) -> Display {
        let res: Resolution = res.parse().unwrap();
        Display::new(name, inches, res).unwrap()
    }

    fn pair() -> Vec<Display> {
        vec![
            make_display("DP-1", 24.0, "1920x1080").primary(true),
            make_display("DP-2", 27.0, "2560x1440").with_placement(Placement::RightOf("DP-1".into())),
        ]
    }

    #[test]
    fn test_min_ppi_target() {
        let layout = normalize(pair(), NormalizeOptions::default()).unwrap();
        let small = &layout.displays[0].display;
        let large = &layout.displays[1].display;

        // 24" 1080p is the less dense panel
        let target = layout.target_ppi.unwrap();
        assert!((target - small.ppi()).abs() < 1e-9);
        assert_eq!(small.virtual_res(), small.res);
        assert!(large.virtual_res().width < large.res.width);
        assert!((large.viewport_ratio() - small.ppi() / large.ppi()).abs() < 1e-12);

        for p in &layout.displays {
            assert!((p.display.virtual_ppi() - target).abs() < 1e-9);
        }
        assert_eq!(layout.displays[1].position, Position::new(1920, 0));
    }

    #[test]
    fn test_default_ppi_target() {
        let mut displays = pair();
        displays[1].default_ppi = true;
        let layout = normalize(displays, NormalizeOptions::default()).unwrap();

        let target = layout.target_ppi.unwrap();
        assert!((target - layout.displays[1].display.ppi()).abs() < 1e-9);
        assert_eq!(layout.displays[1].display.viewport_ratio(), 1.0);
        assert!(layout.displays[0].display.viewport_ratio() > 1.0);
    }

    #[test]
    fn test_fixed_target_with_desktop_scale() {
        let options = NormalizeOptions {
            desktop_scale: 2.0,
            ppi: PpiTarget::Fixed(100.0),
        };
        let layout = normalize(pair(), options).unwrap();
        assert_eq!(layout.integer_desktop_scale, Some(2));
        for p in &layout.displays {
            let effective = p.display.virtual_ppi() / options.desktop_scale;
            assert!((effective - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_disabled_density_keeps_desktop_scale() {
        let options = NormalizeOptions {
            desktop_scale: 1.5,
            ppi: PpiTarget::from_override(Some(0.0)),
        };
        let layout = normalize(pair(), options).unwrap();
        assert_eq!(layout.target_ppi, None);
        assert_eq!(layout.integer_desktop_scale, None);
        for p in &layout.displays {
            assert_eq!(p.display.viewport_ratio(), 1.5);
        }
        assert_eq!(layout.displays[1].position, Position::new(2880, 0));
    }

    #[test]
    fn test_ppi_override_mapping() {
        assert_eq!(PpiTarget::from_override(None), PpiTarget::Auto);
        assert_eq!(PpiTarget::from_override(Some(96.0)), PpiTarget::Fixed(96.0));
        assert_eq!(PpiTarget::from_override(Some(-1.0)), PpiTarget::Disabled);
    }

    #[test]
    fn test_aspect_mismatch() {
        let displays = vec![
            make_display("A", 24.0, "1920x1080").primary(true),
            make_display("B", 24.0, "1920x1200"),
        ];
        let err = normalize(displays, NormalizeOptions::default()).unwrap_err();
        assert!(matches!(err, LayoutError::Validation(_)));
    }

    #[test]
    fn test_primary_count() {
        let none = vec![make_display("A", 24.0, "1920x1080")];
        assert!(matches!(
            normalize(none, NormalizeOptions::default()),
            Err(LayoutError::Validation(_))
        ));

        let two = vec![
            make_display("A", 24.0, "1920x1080").primary(true),
            make_display("B", 24.0, "1920x1080").primary(true),
        ];
        assert!(matches!(
            normalize(two, NormalizeOptions::default()),
            Err(LayoutError::Validation(_))
        ));
    }

    #[test]
    fn test_multiple_default_ppi() {
        let displays = vec![
            make_display("A", 24.0, "1920x1080").primary(true).default_ppi(true),
            make_display("B", 27.0, "2560x1440").default_ppi(true),
        ];
        assert!(matches!(
            normalize(displays, NormalizeOptions::default()),
            Err(LayoutError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_and_bad_scale() {
        assert!(normalize(vec![], NormalizeOptions::default()).is_err());

        let options = NormalizeOptions {
            desktop_scale: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            normalize(pair(), options),
            Err(LayoutError::Validation(_))
        ));
    }

    #[test]
    fn test_undeclared_reference() {
        let displays = vec![
            make_display("A", 24.0, "1920x1080")
                .primary(true)
                .with_placement(Placement::Below("ghost".into())),
        ];
        assert!(matches!(
            normalize(displays, NormalizeOptions::default()),
            Err(LayoutError::Lookup { .. })
        ));
    }

    #[test]
    fn test_json_report() {
        let layout = normalize(pair(), NormalizeOptions::default()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&layout.to_json().unwrap()).unwrap();
        assert_eq!(json["displays"][0]["name"], "DP-1");
        assert_eq!(json["displays"][1]["x"], 1920);
        assert_eq!(json["integer_desktop_scale"], 1);

        let target = layout.target_ppi.unwrap();
        for display in json["displays"].as_array().unwrap() {
            let virtual_ppi = display["virtual_ppi"].as_f64().unwrap();
            assert!((virtual_ppi - target).abs() < 1e-9);
        }
    }
}
