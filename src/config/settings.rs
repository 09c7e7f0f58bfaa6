//! User settings and timing configuration
//!
//! Defines all configurable options for the automation. Every field has a
//! default, so a settings file only needs the values it changes.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::android::input::SCREENSHOT_DIR;
use crate::game::buttons::{Button, FractionalPoint, KofLayout};

/// Main settings structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Bridge tool settings
    pub bridge: BridgeSettings,
    /// Overworld farming loop
    pub farm: FarmSettings,
    /// KOF Symphony battle menu
    pub kof: KofSettings,
}

impl Settings {
    /// Parse settings from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Reject layout fractions that would land off screen
    pub fn validate(&self) -> Result<(), ConfigError> {
        let farm = &self.farm.layout;
        let positions = [
            ("farm.swipe_left".to_string(), farm.swipe_left),
            ("farm.swipe_right".to_string(), farm.swipe_right),
            ("farm.attack".to_string(), farm.attack),
        ]
        .into_iter()
        .chain(
            Button::ALL
                .into_iter()
                .map(|b| (format!("kof.{}", b.name()), self.kof.layout.fraction(b))),
        );

        for (name, point) in positions {
            if !point.is_on_screen() {
                return Err(ConfigError::OffScreen {
                    name,
                    x: point.x,
                    y: point.y,
                });
            }
        }
        Ok(())
    }
}

/// Bridge tool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    /// Program to invoke, `adb` or a full path
    pub program: String,
    /// On-device directory for screenshots
    pub screenshot_dir: String,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            program: "adb".to_string(),
            screenshot_dir: SCREENSHOT_DIR.to_string(),
        }
    }
}

/// Fractional positions used by the overworld farmer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmLayout {
    pub swipe_left: FractionalPoint,
    pub swipe_right: FractionalPoint,
    /// Attack button, also tapped to dismiss the result screen
    pub attack: FractionalPoint,
}

impl Default for FarmLayout {
    fn default() -> Self {
        Self {
            swipe_left: FractionalPoint::new(0.25, 0.50),
            swipe_right: FractionalPoint::new(0.75, 0.50),
            attack: FractionalPoint::new(0.80, 0.80),
        }
    }
}

/// Overworld farming loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmSettings {
    /// Wait after walking for the encounter to start (ms)
    pub battle_start_wait_ms: u64,
    /// Wait after attacking for the battle to finish (ms)
    pub battle_end_wait_ms: u64,
    /// Wait after the result screen to be back on the field (ms)
    pub return_to_battlefield_wait_ms: u64,
    /// Length of each walking swipe (ms)
    pub swipe_duration_ms: u32,
    /// Walking swipes per round, alternating direction
    pub swipe_passes: u32,
    /// Attack taps per battle
    pub attack_taps: u32,
    /// Delay between attack taps (ms)
    pub attack_tap_interval_ms: u64,
    /// Maximum battles (0 = unlimited)
    pub max_loops: u32,
    /// Wait for ENTER before starting
    pub wait_for_enter: bool,
    pub layout: FarmLayout,
}

impl Default for FarmSettings {
    fn default() -> Self {
        Self {
            battle_start_wait_ms: 4000,
            battle_end_wait_ms: 5000,
            return_to_battlefield_wait_ms: 4000,
            swipe_duration_ms: 3000,
            swipe_passes: 3,
            attack_taps: 2,
            attack_tap_interval_ms: 1000,
            max_loops: 0,
            wait_for_enter: true,
            layout: FarmLayout::default(),
        }
    }
}

/// KOF Symphony battle menu settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KofSettings {
    /// Wait for the Another Force animation (ms)
    pub another_force_wait_ms: u64,
    /// Delay between button presses (ms)
    pub button_press_delay_ms: u64,
    /// Command table file
    pub command_list: PathBuf,
    pub layout: KofLayout,
}

impl Default for KofSettings {
    fn default() -> Self {
        Self {
            another_force_wait_ms: 1500,
            button_press_delay_ms: 750,
            command_list: PathBuf::from("data/kof_symphony_command_list.yaml"),
            layout: KofLayout::default(),
        }
    }
}

/// Convert a CLI timing override in seconds to milliseconds.
///
/// Negative and non-finite values clamp to zero.
pub fn seconds_to_ms(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    }
}
