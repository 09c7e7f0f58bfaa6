//! Eden Macro - ADB-driven automation for Another Eden on Android
//!
//! This library drives a USB-attached Android device through the `adb`
//! command-line tool: it reads the device identity and screen geometry,
//! sends taps, swipes, key events and text, and moves screenshots off the
//! device. On top of that it runs two macros:
//!
//! - the overworld farmer, which walks the field and clears encounters
//! - the KOF Symphony battle menu, which taps out combos and validated
//!   chains from a per-fighter command table
//!
//! Device errors inside the macro loops are logged and the loop carries on;
//! only setup failures are returned to the caller.

pub mod android;
pub mod config;
pub mod game;

pub use android::{AdbBridge, AndroidError, Bridge, DeviceSession, GestureDriver};
pub use config::{ConfigError, Settings};
pub use game::{run_farm, run_kof, validate_chain, ChainResult, CommandTable};
