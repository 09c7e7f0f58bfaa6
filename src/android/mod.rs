//! Android device bridge module
//!
//! Drives a device over USB through the `adb` command-line tool: session
//! setup, device queries, display geometry and synthetic input.

pub mod bridge;
pub mod geometry;
pub mod input;
pub mod props;
pub mod session;

pub use bridge::{AdbBridge, Bridge};
pub use geometry::{Orientation, ScreenGeometry};
pub use input::{GestureDriver, NamedEvent, Point};
pub use props::DeviceIdentity;
pub use session::{CommandOutput, DeviceSession};

/// Errors raised while talking to the device
#[derive(Debug, thiserror::Error)]
pub enum AndroidError {
    /// The bridge binary could not be started at all
    #[error("failed to launch bridge `{program}`: {source}")]
    BridgeUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The bridge reported that the target device is not attached
    #[error("device not found: {message}")]
    DeviceNotFound { message: String },

    /// The bridge ran but exited unsuccessfully
    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// Expected marker line was absent from a dump
    #[error("no line containing `{marker}` in bridge output")]
    MarkerNotFound { marker: &'static str },

    /// A marker line was present but could not be parsed
    #[error("could not parse {what} from line: {line}")]
    Parse { what: &'static str, line: String },

    /// Coordinates fall outside the last-resolved screen geometry
    #[error("coordinate ({x}, {y}) is outside the screen ({width}x{height})")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// Named key event is not in the supported table
    #[error("event `{name}` is not supported (supported: {})", supported.join(", "))]
    UnsupportedEvent {
        name: String,
        supported: Vec<&'static str>,
    },
}

impl AndroidError {
    /// Whether the error came from user input rather than the device
    pub fn is_rejected_input(&self) -> bool {
        matches!(
            self,
            AndroidError::OutOfBounds { .. } | AndroidError::UnsupportedEvent { .. }
        )
    }
}
