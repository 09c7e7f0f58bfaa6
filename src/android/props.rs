//! `getprop` parsing and device identity

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const PROP_BUILD_ID: &str = "ro.vendor.build.id";
pub const PROP_BUILD_INCREMENTAL: &str = "ro.vendor.build.version.incremental";
pub const PROP_MANUFACTURER: &str = "ro.product.manufacturer";
pub const PROP_MODEL: &str = "ro.product.model";
pub const PROP_NAME: &str = "ro.product.name";

static PROP_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([^\]]+)\]:\s*\[(.*)\]$").expect("getprop pattern is valid"));

/// Split a `[key]: [value]` line. Returns `None` for anything else.
pub fn parse_prop_line(line: &str) -> Option<(&str, &str)> {
    let caps = PROP_LINE.captures(line.trim())?;
    let key = caps.get(1)?.as_str();
    let value = caps.get(2)?.as_str();
    Some((key.trim(), value.trim()))
}

/// Who the device is. Populated once when the session opens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Serial number as listed by `adb devices`
    pub serial: String,
    pub manufacturer: String,
    /// Product name with the marketing model, e.g. `panther (Pixel 7)`
    pub model: String,
    /// Vendor build id with its incremental number
    pub firmware: String,
}

impl DeviceIdentity {
    /// Build an identity from `getprop` output.
    ///
    /// Missing properties leave their part empty; this never fails.
    pub fn from_getprop<S: AsRef<str>>(serial: &str, lines: &[S]) -> Self {
        let mut build_id = "";
        let mut build_incremental = "";
        let mut manufacturer = "";
        let mut model = "";
        let mut name = "";

        for (key, value) in lines.iter().filter_map(|l| parse_prop_line(l.as_ref())) {
            match key {
                PROP_BUILD_ID => build_id = value,
                PROP_BUILD_INCREMENTAL => build_incremental = value,
                PROP_MANUFACTURER => manufacturer = value,
                PROP_MODEL => model = value,
                PROP_NAME => name = value,
                _ => {}
            }
        }

        Self {
            serial: serial.to_string(),
            manufacturer: manufacturer.to_string(),
            model: with_detail(name, model),
            firmware: with_detail(build_id, build_incremental),
        }
    }
}

/// `primary (detail)`, dropping whichever side is empty
fn with_detail(primary: &str, detail: &str) -> String {
    match (primary.is_empty(), detail.is_empty()) {
        (_, true) => primary.to_string(),
        (true, false) => detail.to_string(),
        (false, false) => format!("{} ({})", primary, detail),
    }
}
