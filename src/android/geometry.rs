//! Screen orientation and resolution from `dumpsys` output
//!
//! The raw display frame is reported in the panel's natural axis order, so
//! the resolver swaps axes to match the current orientation: the longer side
//! is the width in landscape and the height in portrait.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Line marker in `dumpsys input` carrying the internal viewport
pub const ORIENTATION_MARKER: &str = "Viewport INTERNAL";

/// Line marker in `dumpsys window` carrying the display frame
pub const DISPLAY_FRAME_MARKER: &str = "mDisplayFrame";

static ORIENTATION_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"orientation=(\d+)").expect("orientation pattern is valid"));

/// `(x, y)` or `[x,y]`
static COORDINATE_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\(\[]\s*(\d+)\s*,\s*(\d+)\s*[\)\]]").expect("coordinate pattern is valid")
});

/// Screen orientation as reported by the input subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Map a raw rotation value. Only 0 is portrait; 1, 2 and 3 all count
    /// as landscape.
    pub fn from_raw(value: u32) -> Self {
        if value == 0 {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Portrait => write!(f, "portrait"),
            Orientation::Landscape => write!(f, "landscape"),
        }
    }
}

/// Effective display size for the current orientation.
///
/// `(0, 0)` means the resolution has not been resolved yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScreenGeometry {
    pub width: u32,
    pub height: u32,
    pub orientation: Orientation,
}

impl ScreenGeometry {
    pub fn new(width: u32, height: u32, orientation: Orientation) -> Self {
        Self {
            width,
            height,
            orientation,
        }
    }

    /// Whether a display frame has been found
    pub fn is_resolved(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Inclusive bounds check: `x == width` and `y == height` are accepted
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x <= self.width && y <= self.height
    }

    /// Build geometry from a `dumpsys window` dump, falling back to `(0, 0)`
    /// when no display frame is present
    pub fn from_window_dump<S: AsRef<str>>(lines: &[S], orientation: Orientation) -> Self {
        let (width, height) = resolve_resolution(lines, orientation).unwrap_or((0, 0));
        Self::new(width, height, orientation)
    }
}

/// Find the orientation in a `dumpsys input` dump.
///
/// Every viewport line is considered and the last one wins. Returns `None`
/// when no line carries the marker with a readable value.
pub fn resolve_orientation<S: AsRef<str>>(lines: &[S]) -> Option<Orientation> {
    lines
        .iter()
        .map(AsRef::as_ref)
        .filter(|line| line.contains(ORIENTATION_MARKER))
        .filter_map(|line| ORIENTATION_VALUE.captures(line)?[1].parse::<u32>().ok())
        .last()
        .map(Orientation::from_raw)
}

/// Find `(width, height)` in a `dumpsys window` dump.
///
/// Scanning stops at the first display-frame line that parses. Returns
/// `None` when there is no such line.
pub fn resolve_resolution<S: AsRef<str>>(
    lines: &[S],
    orientation: Orientation,
) -> Option<(u32, u32)> {
    lines
        .iter()
        .find_map(|line| display_frame_extent(line.as_ref()))
        .map(|(a, b)| order_axes(a, b, orientation))
}

/// Second coordinate pair of a display-frame line.
///
/// Handles both `(x1, y1) - (x2, y2)` and the compact `[x1,y1][x2,y2]` form.
fn display_frame_extent(line: &str) -> Option<(u32, u32)> {
    let (_, rest) = line.split_once(DISPLAY_FRAME_MARKER)?;
    let pair = match rest.rsplit_once(" - ") {
        Some((_, tail)) => COORDINATE_PAIR.captures_iter(tail).next()?,
        None => COORDINATE_PAIR.captures_iter(rest).nth(1)?,
    };
    Some((pair[1].parse().ok()?, pair[2].parse().ok()?))
}

fn order_axes(a: u32, b: u32, orientation: Orientation) -> (u32, u32) {
    let (long, short) = if a >= b { (a, b) } else { (b, a) };
    match orientation {
        Orientation::Landscape => (long, short),
        Orientation::Portrait => (short, long),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT_DUMP: &str = "\
INPUT MANAGER (dumpsys input)
  Viewports:
    Viewport INTERNAL: displayId=0, uniqueId=local:0, port=0, orientation=1, logicalFrame=[0, 0, 2400, 1080], physicalFrame=[0, 0, 2400, 1080]
  Input Dispatcher State:";

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(|l| l.trim().to_string()).collect()
    }

    #[test]
    fn test_orientation_binary_mapping() {
        for raw in 0..8u32 {
            let line = format!("Viewport INTERNAL: displayId=0, orientation={}, valid=true", raw);
            let expected = if raw == 0 {
                Orientation::Portrait
            } else {
                Orientation::Landscape
            };
            assert_eq!(resolve_orientation(&[line]), Some(expected));
        }
    }

    #[test]
    fn test_orientation_from_dump() {
        assert_eq!(
            resolve_orientation(&lines(INPUT_DUMP)),
            Some(Orientation::Landscape)
        );
    }

    #[test]
    fn test_orientation_missing_marker() {
        let dump = lines("Viewport EXTERNAL: orientation=1\nnothing here");
        assert_eq!(resolve_orientation(&dump), None);
    }

    #[test]
    fn test_resolution_assigns_long_axis() {
        let samples = [(1080, 2400), (2400, 1080), (720, 720), (1, 5000), (1440, 3200)];
        for (x, y) in samples {
            let line = format!("mDisplayFrame=(0, 0) - ({}, {})", x, y);
            let long = x.max(y);
            let short = x.min(y);

            let (w, h) = resolve_resolution(&[line.clone()], Orientation::Landscape).unwrap();
            assert_eq!((w, h), (long, short));

            let (w, h) = resolve_resolution(&[line], Orientation::Portrait).unwrap();
            assert_eq!((w, h), (short, long));
        }
    }

    #[test]
    fn test_resolution_first_match_wins() {
        let dump = lines(
            "WINDOW MANAGER\n\
             mDisplayFrame=(0, 0) - (1080, 2400)\n\
             mDisplayFrame=(0, 0) - (720, 1280)",
        );
        assert_eq!(
            resolve_resolution(&dump, Orientation::Portrait),
            Some((1080, 2400))
        );
    }

    #[test]
    fn test_resolution_compact_frame_form() {
        let dump = ["mDisplayFrame=[0,0][1080,2400] mContentFrame=[0,0][1080,2200]"];
        assert_eq!(
            resolve_resolution(&dump, Orientation::Landscape),
            Some((2400, 1080))
        );
    }

    #[test]
    fn test_missing_frame_defaults_to_zero() {
        let dump = lines("WINDOW MANAGER\nmCurrentFocus=null");
        assert_eq!(resolve_resolution(&dump, Orientation::Portrait), None);

        let geometry = ScreenGeometry::from_window_dump(&dump, Orientation::Portrait);
        assert_eq!((geometry.width, geometry.height), (0, 0));
        assert!(!geometry.is_resolved());
    }

    #[test]
    fn test_contains_is_inclusive() {
        let geometry = ScreenGeometry::new(2400, 1080, Orientation::Landscape);
        assert!(geometry.contains(2400, 1080));
        assert!(geometry.contains(0, 0));
        assert!(!geometry.contains(2401, 1080));
        assert!(!geometry.contains(2400, 1081));
    }
}
