//! Device session over the bridge
//!
//! A session owns the bridge handle, the device identity read at open time
//! and the last-resolved screen geometry. It is single-owner: every query
//! and gesture goes through the thread holding it.

use super::bridge::{AdbBridge, Bridge};
use super::geometry::{
    resolve_orientation, resolve_resolution, Orientation, ScreenGeometry, DISPLAY_FRAME_MARKER,
    ORIENTATION_MARKER,
};
use super::props::DeviceIdentity;
use super::AndroidError;

/// Output of a device command, shaped by how it was requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Whole stdout captured after the process exited
    Text(String),
    /// Trimmed lines read as the process streamed them
    Lines(Vec<String>),
}

impl CommandOutput {
    pub fn into_lines(self) -> Vec<String> {
        match self {
            CommandOutput::Text(text) => text.lines().map(|l| l.trim().to_string()).collect(),
            CommandOutput::Lines(lines) => lines,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            CommandOutput::Text(text) => text,
            CommandOutput::Lines(lines) => lines.join("\n"),
        }
    }
}

/// Connection to one device, addressed by serial number
pub struct DeviceSession<B: Bridge = AdbBridge> {
    bridge: B,
    identity: DeviceIdentity,
    geometry: ScreenGeometry,
    verbose: bool,
}

impl<B: Bridge> DeviceSession<B> {
    /// Create a session for `serial` without talking to the device yet
    pub fn new(bridge: B, serial: impl Into<String>) -> Self {
        Self {
            bridge,
            identity: DeviceIdentity {
                serial: serial.into(),
                ..Default::default()
            },
            geometry: ScreenGeometry::default(),
            verbose: false,
        }
    }

    /// Echo every issued command at info level
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Read the device identity, optionally restarting the bridge daemon first.
    ///
    /// Properties missing from `getprop` leave their field empty. Bridge
    /// failures are returned as errors.
    pub fn open(&mut self, restart_bridge: bool) -> Result<&DeviceIdentity, AndroidError> {
        if restart_bridge {
            log::info!(
                "Restarting {} and connecting to device {}",
                self.bridge.program(),
                self.serial()
            );
            self.restart_bridge();
        }

        log::info!("Pulling basic system information about the device...");
        let props = self.run_lines(&["shell", "getprop"])?;
        self.identity = DeviceIdentity::from_getprop(self.serial(), &props);

        log::info!("Manufacturer: {}", self.identity.manufacturer);
        log::info!("Model: {}", self.identity.model);
        log::info!("Serial Number: {}", self.identity.serial);
        log::info!("Image Version: {}", self.identity.firmware);

        Ok(&self.identity)
    }

    pub fn serial(&self) -> &str {
        &self.identity.serial
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Last-resolved geometry; `(0, 0)` until [`refresh_geometry`](Self::refresh_geometry) succeeds
    pub fn geometry(&self) -> ScreenGeometry {
        self.geometry
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    /// Run a sub-command against this device.
    ///
    /// With `parsable` the output is streamed line by line until the bridge
    /// closes it, which suits dumps and readers that do not terminate
    /// promptly; otherwise stdout is captured whole.
    pub fn run_command(&self, args: &[&str], parsable: bool) -> Result<CommandOutput, AndroidError> {
        if parsable {
            self.run_lines(args).map(CommandOutput::Lines)
        } else {
            self.run(args).map(CommandOutput::Text)
        }
    }

    /// Captured-output form of [`run_command`](Self::run_command)
    pub fn run(&self, args: &[&str]) -> Result<String, AndroidError> {
        let args = self.device_args(args);
        self.echo(&args);
        self.bridge.output(&args)
    }

    /// Streaming form of [`run_command`](Self::run_command)
    pub fn run_lines(&self, args: &[&str]) -> Result<Vec<String>, AndroidError> {
        let args = self.device_args(args);
        self.echo(&args);
        self.bridge.lines(&args)
    }

    /// Stop the bridge daemon and re-enumerate devices.
    ///
    /// Best effort, unchecked: output and failures are ignored.
    pub fn restart_bridge(&self) {
        for command in ["kill-server", "devices"] {
            let args = vec![command.to_string()];
            self.echo(&args);
            if let Err(e) = self.bridge.output(&args) {
                log::debug!("Ignoring `{}` failure: {}", command, e);
            }
        }
    }

    /// Restart adbd as root and remount system partitions read-write.
    ///
    /// Best effort, unchecked: neither step is validated or retried.
    pub fn root_and_remount_unchecked(&self) {
        for command in ["root", "remount"] {
            if let Err(e) = self.run(&[command]) {
                log::debug!("Ignoring `{}` failure: {}", command, e);
            }
        }
    }

    /// Ask the input subsystem for the current orientation
    pub fn query_orientation(&self) -> Result<Orientation, AndroidError> {
        let lines = self.run_lines(&["shell", "dumpsys", "input"])?;
        resolve_orientation(&lines).ok_or_else(|| miss(&lines, ORIENTATION_MARKER, "orientation"))
    }

    /// Ask the window manager for the display size in `orientation`
    pub fn query_resolution(&self, orientation: Orientation) -> Result<(u32, u32), AndroidError> {
        let lines = self.run_lines(&["shell", "dumpsys", "window"])?;
        resolve_resolution(&lines, orientation)
            .ok_or_else(|| miss(&lines, DISPLAY_FRAME_MARKER, "display frame"))
    }

    /// Re-query orientation and resolution and store them on the session.
    ///
    /// A missing viewport line falls back to portrait and a missing display
    /// frame leaves the size at `(0, 0)`; both are logged, neither is an
    /// error. Bridge failures are.
    pub fn refresh_geometry(&mut self) -> Result<ScreenGeometry, AndroidError> {
        let orientation = match self.query_orientation() {
            Ok(orientation) => orientation,
            Err(e @ (AndroidError::MarkerNotFound { .. } | AndroidError::Parse { .. })) => {
                log::warn!("{}, assuming portrait", e);
                Orientation::Portrait
            }
            Err(e) => return Err(e),
        };
        log::info!("Screen Orientation = {}", orientation.to_string().to_uppercase());

        let (width, height) = match self.query_resolution(orientation) {
            Ok(size) => size,
            Err(e @ (AndroidError::MarkerNotFound { .. } | AndroidError::Parse { .. })) => {
                log::warn!("{}, screen size unresolved", e);
                (0, 0)
            }
            Err(e) => return Err(e),
        };
        log::info!("Screen Size = (X,Y) = ({}, {})", width, height);

        self.geometry = ScreenGeometry::new(width, height, orientation);
        Ok(self.geometry)
    }

    fn device_args(&self, args: &[&str]) -> Vec<String> {
        ["-s", self.serial()]
            .into_iter()
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect()
    }

    fn echo(&self, args: &[String]) {
        if self.verbose {
            log::info!("Sending command: {} {}", self.bridge.program(), args.join(" "));
        } else {
            log::debug!("Sending command: {} {}", self.bridge.program(), args.join(" "));
        }
    }
}

/// Tell an absent marker apart from one whose line could not be read
fn miss(lines: &[String], marker: &'static str, what: &'static str) -> AndroidError {
    match lines.iter().find(|line| line.contains(marker)) {
        Some(line) => AndroidError::Parse {
            what,
            line: line.clone(),
        },
        None => AndroidError::MarkerNotFound { marker },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::android::bridge::fake::FakeBridge;

    const GETPROP: &str = "\
[ro.product.manufacturer]: [samsung]
[ro.product.model]: [SM-G991B]
[ro.product.name]: [o1sxeea]
[ro.vendor.build.id]: [TP1A.220624.014]
[ro.vendor.build.version.incremental]: [G991BXXU5DVK1]";

    const DUMPSYS_INPUT: &str =
        "Viewport INTERNAL: displayId=0, uniqueId=local:0, port=0, orientation=1, isActive=true";
    const DUMPSYS_WINDOW: &str = "mDisplayFrame=(0, 0) - (1080, 2400)";

    fn device() -> FakeBridge {
        FakeBridge::new()
            .respond("getprop", GETPROP)
            .respond("dumpsys input", DUMPSYS_INPUT)
            .respond("dumpsys window", DUMPSYS_WINDOW)
    }

    #[test]
    fn test_open_reads_identity() {
        let mut session = DeviceSession::new(device(), "R5CR10ABCDE");
        let identity = session.open(false).unwrap().clone();

        assert_eq!(identity.serial, "R5CR10ABCDE");
        assert_eq!(identity.manufacturer, "samsung");
        assert_eq!(identity.model, "o1sxeea (SM-G991B)");
        assert_eq!(identity.firmware, "TP1A.220624.014 (G991BXXU5DVK1)");
        assert_eq!(
            session.bridge().calls(),
            vec!["-s R5CR10ABCDE shell getprop".to_string()]
        );
    }

    #[test]
    fn test_open_with_restart() {
        let mut session = DeviceSession::new(device(), "SERIAL");
        session.open(true).unwrap();

        assert_eq!(
            session.bridge().calls(),
            vec![
                "kill-server".to_string(),
                "devices".to_string(),
                "-s SERIAL shell getprop".to_string(),
            ]
        );
    }

    #[test]
    fn test_restart_failures_are_ignored() {
        let bridge = device().fail("kill-server").fail("devices");
        let mut session = DeviceSession::new(bridge, "SERIAL");
        assert!(session.open(true).is_ok());
    }

    #[test]
    fn test_open_surfaces_bridge_failure() {
        // A failed getprop is an error, not an empty identity
        let bridge = FakeBridge::new().fail("getprop");
        let mut session = DeviceSession::new(bridge, "SERIAL");
        assert!(matches!(
            session.open(false),
            Err(AndroidError::CommandFailed { .. })
        ));
    }

    #[test]
    fn test_empty_output_is_not_an_error() {
        let session = DeviceSession::new(FakeBridge::new(), "SERIAL");
        let output = session.run_command(&["shell", "true"], false).unwrap();
        assert_eq!(output, CommandOutput::Text(String::new()));

        let output = session.run_command(&["shell", "true"], true).unwrap();
        assert_eq!(output, CommandOutput::Lines(Vec::new()));
    }

    #[test]
    fn test_parsable_output_is_trimmed_lines() {
        let bridge = FakeBridge::new().respond("ls", "  a  \nb\n");
        let session = DeviceSession::new(bridge, "SERIAL");
        let lines = session.run_command(&["shell", "ls"], true).unwrap().into_lines();
        assert_eq!(lines, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_refresh_geometry() {
        let mut session = DeviceSession::new(device(), "SERIAL");
        assert!(!session.geometry().is_resolved());

        let geometry = session.refresh_geometry().unwrap();
        assert_eq!(geometry, ScreenGeometry::new(2400, 1080, Orientation::Landscape));
        assert_eq!(session.geometry(), geometry);
    }

    #[test]
    fn test_refresh_geometry_defaults_on_parse_miss() {
        let mut session = DeviceSession::new(FakeBridge::new(), "SERIAL");
        let geometry = session.refresh_geometry().unwrap();

        assert_eq!(geometry.orientation, Orientation::Portrait);
        assert_eq!((geometry.width, geometry.height), (0, 0));
    }

    #[test]
    fn test_query_reports_missing_marker() {
        let session = DeviceSession::new(FakeBridge::new(), "SERIAL");
        assert!(matches!(
            session.query_orientation(),
            Err(AndroidError::MarkerNotFound { .. })
        ));
        assert!(matches!(
            session.query_resolution(Orientation::Portrait),
            Err(AndroidError::MarkerNotFound { .. })
        ));
    }

    #[test]
    fn test_unreadable_marker_line_is_a_parse_error() {
        let bridge = FakeBridge::new()
            .respond("dumpsys input", "Viewport INTERNAL: displayId=0, orientation=?")
            .respond("dumpsys window", "mDisplayFrame=garbled");
        let mut session = DeviceSession::new(bridge, "SERIAL");

        assert!(matches!(
            session.query_orientation(),
            Err(AndroidError::Parse { what: "orientation", .. })
        ));
        assert!(matches!(
            session.query_resolution(Orientation::Landscape),
            Err(AndroidError::Parse { what: "display frame", .. })
        ));

        let geometry = session.refresh_geometry().unwrap();
        assert_eq!(geometry, ScreenGeometry::new(0, 0, Orientation::Portrait));
    }

    #[test]
    fn test_root_and_remount_is_unchecked() {
        let bridge = FakeBridge::new().fail("root").fail("remount");
        let session = DeviceSession::new(bridge, "SERIAL");
        session.root_and_remount_unchecked();

        assert_eq!(
            session.bridge().calls(),
            vec!["-s SERIAL root".to_string(), "-s SERIAL remount".to_string()]
        );
    }
}
