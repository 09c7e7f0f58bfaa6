//! Synthetic input and file transfer
//!
//! Translates taps, swipes, key events, text entry and screenshots into
//! `adb shell input` style commands. Coordinates are checked against the
//! session's last-resolved geometry before anything is sent.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::bridge::Bridge;
use super::session::DeviceSession;
use super::AndroidError;

/// On-device directory screenshots are written to
pub const SCREENSHOT_DIR: &str = "/sdcard/Pictures";

/// Default spacing between repeated taps
pub const DEFAULT_TAP_INTERVAL: Duration = Duration::from_millis(1000);

/// Default swipe length
pub const DEFAULT_SWIPE_MS: u32 = 3000;

/// Absolute screen coordinate in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Key events that can be sent by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedEvent {
    Back,
    Menu,
    Home,
    MuteVolume,
    VolumeUp,
    VolumeDown,
    Pause,
    StopPlayback,
    Wakeup,
    Lock,
    EndCall,
}

impl NamedEvent {
    pub const ALL: [NamedEvent; 11] = [
        NamedEvent::Back,
        NamedEvent::Menu,
        NamedEvent::Home,
        NamedEvent::MuteVolume,
        NamedEvent::VolumeUp,
        NamedEvent::VolumeDown,
        NamedEvent::Pause,
        NamedEvent::StopPlayback,
        NamedEvent::Wakeup,
        NamedEvent::Lock,
        NamedEvent::EndCall,
    ];

    /// Name accepted on input
    pub fn name(&self) -> &'static str {
        match self {
            NamedEvent::Back => "back",
            NamedEvent::Menu => "menu",
            NamedEvent::Home => "home",
            NamedEvent::MuteVolume => "mute_volume",
            NamedEvent::VolumeUp => "vol_up",
            NamedEvent::VolumeDown => "vol_down",
            NamedEvent::Pause => "pause",
            NamedEvent::StopPlayback => "stop_playback",
            NamedEvent::Wakeup => "wakeup",
            NamedEvent::Lock => "lock",
            NamedEvent::EndCall => "end_call",
        }
    }

    /// Android keycode constant sent to `input keyevent`
    pub fn keycode(&self) -> &'static str {
        match self {
            NamedEvent::Back => "KEYCODE_BACK",
            NamedEvent::Menu => "KEYCODE_MENU",
            NamedEvent::Home => "KEYCODE_HOME",
            NamedEvent::MuteVolume => "KEYCODE_MUTE",
            NamedEvent::VolumeUp => "KEYCODE_VOLUME_UP",
            NamedEvent::VolumeDown => "KEYCODE_VOLUME_DOWN",
            NamedEvent::Pause => "KEYCODE_MEDIA_PLAY_PAUSE",
            NamedEvent::StopPlayback => "KEYCODE_MEDIA_STOP",
            NamedEvent::Wakeup => "KEYCODE_WAKEUP",
            NamedEvent::Lock => "KEYCODE_SOFT_SLEEP",
            NamedEvent::EndCall => "KEYCODE_ENDCALL",
        }
    }

    pub fn supported_names() -> Vec<&'static str> {
        Self::ALL.iter().map(NamedEvent::name).collect()
    }
}

impl FromStr for NamedEvent {
    type Err = AndroidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event| event.name() == s)
            .ok_or_else(|| AndroidError::UnsupportedEvent {
                name: s.to_string(),
                supported: Self::supported_names(),
            })
    }
}

/// Replace spaces with the `%s` token `input text` expects.
///
/// Nothing else is escaped, so shell metacharacters pass through as-is.
pub fn escape_text(text: &str) -> String {
    text.replace(' ', "%s")
}

/// Issues input gestures through a device session
pub struct GestureDriver<'a, B: Bridge> {
    session: &'a DeviceSession<B>,
    screenshot_dir: String,
}

impl<'a, B: Bridge> GestureDriver<'a, B> {
    pub fn new(session: &'a DeviceSession<B>) -> Self {
        Self {
            session,
            screenshot_dir: SCREENSHOT_DIR.to_string(),
        }
    }

    /// Use a different on-device screenshot directory
    pub fn with_screenshot_dir(mut self, dir: impl Into<String>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }

    fn check_bounds(&self, point: Point) -> Result<(), AndroidError> {
        let geometry = self.session.geometry();
        if geometry.contains(point.x, point.y) {
            Ok(())
        } else {
            Err(AndroidError::OutOfBounds {
                x: point.x,
                y: point.y,
                width: geometry.width,
                height: geometry.height,
            })
        }
    }

    /// Tap once at `point`
    pub fn tap_once(&self, point: Point) -> Result<(), AndroidError> {
        self.tap(point, 1, DEFAULT_TAP_INTERVAL)
    }

    /// Tap `repeat_count` times, sleeping `interval` between taps but not
    /// after the last one. Out-of-range points send nothing.
    pub fn tap(&self, point: Point, repeat_count: u32, interval: Duration) -> Result<(), AndroidError> {
        if let Err(e) = self.check_bounds(point) {
            log::error!("Tap rejected: {}", e);
            return Err(e);
        }

        let (x, y) = (point.x.to_string(), point.y.to_string());
        for i in 0..repeat_count {
            log::info!("Performing screen tap at (X,Y) = {}", point);
            self.session.run(&["shell", "input", "tap", &x, &y])?;

            if i + 1 < repeat_count {
                log::debug!("Waiting {} ms before tapping again", interval.as_millis());
                thread::sleep(interval);
            }
        }
        Ok(())
    }

    /// Single timed swipe from `from` to `to`
    pub fn swipe(&self, from: Point, to: Point, duration_ms: u32) -> Result<(), AndroidError> {
        if let Err(e) = self.check_bounds(from).and_then(|_| self.check_bounds(to)) {
            log::error!("Swipe rejected: {}", e);
            return Err(e);
        }

        log::info!("Performing swipe from {} to {}", from, to);
        self.session.run(&[
            "shell",
            "input",
            "swipe",
            &from.x.to_string(),
            &from.y.to_string(),
            &to.x.to_string(),
            &to.y.to_string(),
            &duration_ms.to_string(),
        ])?;
        Ok(())
    }

    /// Send a raw keycode, e.g. `KEYCODE_HOME` or `3`
    pub fn send_keycode(&self, code: &str) -> Result<(), AndroidError> {
        self.session.run(&["shell", "input", "keyevent", code])?;
        Ok(())
    }

    /// Send a key event by its supported name
    pub fn send_event(&self, name: &str) -> Result<(), AndroidError> {
        let event = match name.parse::<NamedEvent>() {
            Ok(event) => event,
            Err(e) => {
                log::error!("{}", e);
                return Err(e);
            }
        };
        self.send_keycode(event.keycode())
    }

    /// Type `text` into the focused field
    pub fn type_text(&self, text: &str) -> Result<(), AndroidError> {
        log::info!("Sending text: {}", text);
        let escaped = escape_text(text);
        self.session.run(&["shell", "input", "text", &escaped])?;
        Ok(())
    }

    fn device_path(&self, name: &str) -> String {
        format!("{}/{}", self.screenshot_dir.trim_end_matches('/'), name)
    }

    /// Capture the screen to the on-device screenshot directory.
    ///
    /// Returns the on-device path.
    pub fn screenshot(&self, name: &str) -> Result<String, AndroidError> {
        let path = self.device_path(name);
        log::info!("Taking screenshot: {}", path);
        self.session.run(&["shell", "screencap", &path])?;
        Ok(path)
    }

    /// Copy a screenshot to `destination` on the host, then delete it from
    /// the device.
    ///
    /// Not transactional: a failed delete leaves the file on the device and
    /// is only logged. A failed pull skips the delete and is returned.
    pub fn pull_and_delete(&self, name: &str, destination: impl AsRef<Path>) -> Result<(), AndroidError> {
        let path = self.device_path(name);
        let destination = destination.as_ref().to_string_lossy();

        log::info!("Pulling image file: {}", path);
        self.session.run(&["pull", &path, &destination])?;

        log::info!("Removing image file: {}", path);
        if let Err(e) = self.session.run(&["shell", &format!("rm {}", path)]) {
            log::warn!("Screenshot left on device: {}", e);
        }
        Ok(())
    }
}
