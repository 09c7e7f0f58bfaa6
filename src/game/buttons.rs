//! Battle buttons and their on-screen positions
//!
//! Positions are stored as fractions of the screen so one layout serves
//! every resolution. A [`ButtonMap`] is the layout scaled against a concrete
//! geometry and must be rebuilt whenever the geometry is re-queried.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::android::{Point, ScreenGeometry};

/// KOF Symphony battle button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Button {
    LightPunch,
    HeavyPunch,
    LightKick,
    HeavyKick,
    /// Another Force / MAX
    AnotherForce,
}

impl Button {
    pub const ALL: [Button; 5] = [
        Button::LightPunch,
        Button::HeavyPunch,
        Button::LightKick,
        Button::HeavyKick,
        Button::AnotherForce,
    ];

    /// Token used in command tables
    pub fn name(&self) -> &'static str {
        match self {
            Button::LightPunch => "LP",
            Button::HeavyPunch => "HP",
            Button::LightKick => "LK",
            Button::HeavyKick => "HK",
            Button::AnotherForce => "AF",
        }
    }

    /// Legacy numeric codes: 1=LP, 2=HP, 3=LK, 4=HK
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(Button::LightPunch),
            2 => Some(Button::HeavyPunch),
            3 => Some(Button::LightKick),
            4 => Some(Button::HeavyKick),
            _ => None,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Button {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(button) = Self::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(s))
        {
            return Ok(button);
        }
        s.parse::<u64>()
            .ok()
            .and_then(Button::from_code)
            .ok_or_else(|| format!("unknown button `{}` (expected LP, HP, LK, HK, AF or 1-4)", s))
    }
}

impl Serialize for Button {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawButton {
    Code(u64),
    Name(String),
}

impl<'de> Deserialize<'de> for Button {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawButton::deserialize(deserializer)? {
            RawButton::Name(name) => name.parse().map_err(de::Error::custom),
            RawButton::Code(code) => Button::from_code(code)
                .ok_or_else(|| de::Error::custom(format!("unknown button code {}", code))),
        }
    }
}

/// Screen position as fractions of width and height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FractionalPoint {
    pub x: f64,
    pub y: f64,
}

impl FractionalPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both fractions fall within the screen
    pub fn is_on_screen(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }

    /// Scale against `geometry`, truncating toward zero
    pub fn scale(&self, geometry: ScreenGeometry) -> Point {
        Point::new(
            (geometry.width as f64 * self.x) as u32,
            (geometry.height as f64 * self.y) as u32,
        )
    }
}

/// Fractional positions of the KOF battle buttons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KofLayout {
    pub lp: FractionalPoint,
    pub hp: FractionalPoint,
    pub lk: FractionalPoint,
    pub hk: FractionalPoint,
    pub af: FractionalPoint,
}

impl Default for KofLayout {
    fn default() -> Self {
        Self {
            lp: FractionalPoint::new(0.35, 0.75),
            hp: FractionalPoint::new(0.50, 0.75),
            lk: FractionalPoint::new(0.65, 0.75),
            hk: FractionalPoint::new(0.85, 0.75),
            af: FractionalPoint::new(0.87, 0.15),
        }
    }
}

impl KofLayout {
    pub fn fraction(&self, button: Button) -> FractionalPoint {
        match button {
            Button::LightPunch => self.lp,
            Button::HeavyPunch => self.hp,
            Button::LightKick => self.lk,
            Button::HeavyKick => self.hk,
            Button::AnotherForce => self.af,
        }
    }
}

/// Absolute button positions for one geometry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonMap {
    geometry: ScreenGeometry,
    points: [Point; 5],
}

impl ButtonMap {
    /// Scale every button in `layout` against `geometry`
    pub fn derive(layout: &KofLayout, geometry: ScreenGeometry) -> Self {
        Self {
            geometry,
            points: Button::ALL.map(|b| layout.fraction(b).scale(geometry)),
        }
    }

    pub fn point(&self, button: Button) -> Point {
        self.points[button.index()]
    }

    pub fn geometry(&self) -> ScreenGeometry {
        self.geometry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::android::Orientation;

    #[test]
    fn test_button_tokens() {
        assert_eq!("LP".parse::<Button>().unwrap(), Button::LightPunch);
        assert_eq!("af".parse::<Button>().unwrap(), Button::AnotherForce);
        assert_eq!("4".parse::<Button>().unwrap(), Button::HeavyKick);
        assert!("5".parse::<Button>().is_err());
        assert!("XX".parse::<Button>().is_err());
    }

    #[test]
    fn test_button_serde_accepts_names_and_codes() {
        let buttons: Vec<Button> = serde_json::from_str(r#"["LP", 2, "lk", 4, "AF"]"#).unwrap();
        assert_eq!(buttons, Button::ALL.to_vec());

        assert_eq!(serde_json::to_string(&Button::HeavyPunch).unwrap(), "\"HP\"");
        assert!(serde_json::from_str::<Button>("9").is_err());
    }

    #[test]
    fn test_button_map_scaling() {
        let geometry = ScreenGeometry::new(2400, 1080, Orientation::Landscape);
        let map = ButtonMap::derive(&KofLayout::default(), geometry);

        assert_eq!(map.point(Button::LightPunch), Point::new(840, 810));
        assert_eq!(map.point(Button::HeavyPunch), Point::new(1200, 810));
        assert_eq!(map.point(Button::AnotherForce), Point::new(2088, 162));
        for button in Button::ALL {
            let p = map.point(button);
            assert!(geometry.contains(p.x, p.y));
        }
    }

    #[test]
    fn test_button_map_is_deterministic() {
        let layout = KofLayout::default();
        let geometry = ScreenGeometry::new(1920, 1080, Orientation::Landscape);

        let first = ButtonMap::derive(&layout, geometry);
        let second = ButtonMap::derive(&layout, geometry);
        assert_eq!(first, second);
    }

    #[test]
    fn test_fraction_bounds() {
        assert!(FractionalPoint::new(0.0, 1.0).is_on_screen());
        assert!(!FractionalPoint::new(1.2, 0.5).is_on_screen());
        assert!(!FractionalPoint::new(0.5, -0.1).is_on_screen());
    }
}
