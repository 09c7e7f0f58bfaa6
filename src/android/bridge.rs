//! Subprocess seam for the `adb` command-line tool
//!
//! The bridge is treated as an opaque text-producing process. Everything
//! above this module works on argument lists and the text they return, so
//! tests substitute a recording fake for the real binary.

use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::thread;

use once_cell::sync::Lazy;
use regex::Regex;

use super::AndroidError;

/// adb's wording for a missing target device
static MISSING_DEVICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bdevice (?:'[^']*' )?not found|no devices/emulators found")
        .expect("missing-device pattern is valid")
});

/// Something that can run bridge invocations and hand back their output
pub trait Bridge {
    /// Name used when echoing commands
    fn program(&self) -> &str {
        "adb"
    }

    /// Run to completion and return stdout as a single blob
    fn output(&self, args: &[String]) -> Result<String, AndroidError>;

    /// Run and read stdout line by line until the stream closes.
    ///
    /// Lines are trimmed. There is no read timeout: a bridge process that
    /// never closes its output blocks the caller.
    fn lines(&self, args: &[String]) -> Result<Vec<String>, AndroidError>;
}

/// The real `adb` binary
#[derive(Debug, Clone)]
pub struct AdbBridge {
    program: String,
}

impl AdbBridge {
    /// Create a bridge that invokes `program` (usually `adb`, or a full path)
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn describe(&self, args: &[String]) -> String {
        std::iter::once(self.program.as_str())
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Kill and reap a child whose stdout could not be read
    fn abort_read(&self, child: &mut Child, args: &[String], source: std::io::Error) -> AndroidError {
        if let Err(e) = child.kill() {
            log::debug!("Failed to kill bridge process: {}", e);
        }
        let status = match child.wait() {
            Ok(status) => match status.code() {
                Some(code) => format!("exit code {}", code),
                None => "killed after read error".to_string(),
            },
            Err(e) => format!("not reaped: {}", e),
        };
        AndroidError::CommandFailed {
            command: self.describe(args),
            status,
            stderr: source.to_string(),
        }
    }

    fn unavailable(&self, source: std::io::Error) -> AndroidError {
        AndroidError::BridgeUnavailable {
            program: self.program.clone(),
            source,
        }
    }
}

impl Default for AdbBridge {
    fn default() -> Self {
        Self::new("adb")
    }
}

impl Bridge for AdbBridge {
    fn program(&self) -> &str {
        &self.program
    }

    fn output(&self, args: &[String]) -> Result<String, AndroidError> {
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.unavailable(e))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(classify_failure(
                &self.describe(args),
                output.status.code(),
                &String::from_utf8_lossy(&output.stderr),
            ))
        }
    }

    fn lines(&self, args: &[String]) -> Result<Vec<String>, AndroidError> {
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.unavailable(e))?;

        // Drained on its own thread so a noisy stderr cannot stall stdout
        let stderr_reader = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                if let Err(e) = pipe.read_to_end(&mut buf) {
                    log::debug!("Failed to read bridge stderr: {}", e);
                }
                buf
            })
        });

        let mut lines = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            let mut reader = BufReader::new(stdout);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) => break,
                    Ok(_) => lines.push(String::from_utf8_lossy(&buf).trim().to_string()),
                    Err(e) => return Err(self.abort_read(&mut child, args, e)),
                }
            }
        }

        let status = child.wait().map_err(|e| self.unavailable(e))?;
        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        if status.success() {
            Ok(lines)
        } else {
            Err(classify_failure(
                &self.describe(args),
                status.code(),
                &String::from_utf8_lossy(&stderr),
            ))
        }
    }
}

/// Turn a non-zero bridge exit into a typed error
pub(crate) fn classify_failure(command: &str, code: Option<i32>, stderr: &str) -> AndroidError {
    let stderr = stderr.trim();
    if MISSING_DEVICE.is_match(stderr) {
        return AndroidError::DeviceNotFound {
            message: stderr.to_string(),
        };
    }

    AndroidError::CommandFailed {
        command: command.to_string(),
        status: match code {
            Some(code) => format!("exit code {}", code),
            None => "no exit code (terminated by signal)".to_string(),
        },
        stderr: stderr.to_string(),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_device_is_classified() {
        let err = classify_failure(
            "adb -s ABC shell getprop",
            Some(1),
            "error: device 'ABC' not found\n",
        );
        assert!(matches!(err, AndroidError::DeviceNotFound { .. }));

        let err = classify_failure("adb shell getprop", Some(1), "adb: no devices/emulators found");
        assert!(matches!(err, AndroidError::DeviceNotFound { .. }));

        let err = classify_failure("adb shell getprop", Some(1), "error: device not found");
        assert!(matches!(err, AndroidError::DeviceNotFound { .. }));
    }

    #[test]
    fn test_device_words_in_paths_are_not_missing_device() {
        let err = classify_failure(
            "adb -s ABC pull /sdcard/device.txt",
            Some(1),
            "adb: error: remote object '/sdcard/device.txt' not found",
        );
        assert!(matches!(err, AndroidError::CommandFailed { .. }));

        let err = classify_failure("adb -s ABC shell ls", Some(1), "ls: /dev/input/device3: not found");
        assert!(matches!(err, AndroidError::CommandFailed { .. }));
    }

    #[test]
    fn test_other_failures_keep_status() {
        let err = classify_failure("adb -s ABC pull /x", Some(1), "remote object '/x' does not exist");
        match err {
            AndroidError::CommandFailed {
                command, status, ..
            } => {
                assert_eq!(command, "adb -s ABC pull /x");
                assert_eq!(status, "exit code 1");
            }
            other => panic!("Expected CommandFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let bridge = AdbBridge::new("definitely-not-a-real-bridge-binary");
        let err = bridge.output(&["devices".to_string()]).unwrap_err();
        assert!(matches!(err, AndroidError::BridgeUnavailable { .. }));

        let err = bridge.lines(&["devices".to_string()]).unwrap_err();
        assert!(matches!(err, AndroidError::BridgeUnavailable { .. }));
    }

    #[test]
    fn test_describe_joins_program_and_args() {
        let bridge = AdbBridge::default();
        let args = vec!["-s".to_string(), "ABC".to_string(), "devices".to_string()];
        assert_eq!(bridge.describe(&args), "adb -s ABC devices");
    }

    #[cfg(unix)]
    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[cfg(unix)]
    #[test]
    fn test_real_process_output() {
        let bridge = AdbBridge::new("sh");
        assert_eq!(bridge.output(&sh("printf '  a \\nb\\n'")).unwrap(), "  a \nb\n");
        assert_eq!(bridge.output(&sh("true")).unwrap(), "");
    }

    #[cfg(unix)]
    #[test]
    fn test_real_process_lines_are_trimmed() {
        let bridge = AdbBridge::new("sh");
        let lines = bridge.lines(&sh("printf '  a \\nb\\n'")).unwrap();
        assert_eq!(lines, vec!["a".to_string(), "b".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_real_process_failure_is_classified() {
        let bridge = AdbBridge::new("sh");
        for result in [
            bridge.output(&sh("echo boom >&2; exit 3")).map(|_| ()),
            bridge.lines(&sh("echo boom >&2; exit 3")).map(|_| ()),
        ] {
            let err = result.unwrap_err();
            assert!(matches!(err, AndroidError::CommandFailed { .. }));
            assert!(err.to_string().contains("exit code 3: boom"));
        }

        let err = bridge
            .lines(&sh("echo \"error: device 'XYZ' not found\" >&2; exit 1"))
            .unwrap_err();
        assert!(matches!(err, AndroidError::DeviceNotFound { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_streaming_survives_large_stderr() {
        use std::sync::mpsc;
        use std::time::Duration;

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let bridge = AdbBridge::new("sh");
            let result = bridge.lines(&sh("head -c 200000 /dev/zero >&2; echo done"));
            let _ = tx.send(result);
        });

        let lines = rx
            .recv_timeout(Duration::from_secs(10))
            .expect("streaming read stalled on stderr")
            .unwrap();
        assert_eq!(lines, vec!["done".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_read_error_kills_and_reaps_child() {
        let bridge = AdbBridge::new("sh");
        let args = sh("sleep 30");
        let mut child = Command::new("sh").args(&args).spawn().unwrap();

        let err = bridge.abort_read(
            &mut child,
            &args,
            std::io::Error::new(std::io::ErrorKind::InvalidData, "stream broke"),
        );

        match err {
            AndroidError::CommandFailed {
                command, stderr, ..
            } => {
                assert_eq!(command, "sh -c sleep 30");
                assert_eq!(stderr, "stream broke");
            }
            other => panic!("Expected CommandFailed, got {:?}", other),
        }
        assert!(child.try_wait().unwrap().is_some());
    }
}
