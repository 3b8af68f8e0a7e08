//! Startup capability report and color decision.
//!
//! Collects what each standard stream is attached to and whether ANSI
//! processing could be switched on for stdout, then decides whether output
//! should be colored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::probe::{Capability, CapabilityError, Probe, PtyKind};
use crate::sys::{Backend, Fd, STANDARD_STREAMS};

/// When to emit colored output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorMode::Auto),
            "always" => Ok(ColorMode::Always),
            "never" => Ok(ColorMode::Never),
            other => Err(format!("Unknown color mode: {}", other)),
        }
    }
}

/// Outcome of enabling ANSI processing on stdout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "status", content = "reason")]
pub enum AnsiStatus {
    Enabled,
    /// Not attempted
    Skipped,
    Failed(String),
}

impl From<Result<(), CapabilityError>> for AnsiStatus {
    fn from(result: Result<(), CapabilityError>) -> Self {
        match result {
            Ok(()) => AnsiStatus::Enabled,
            Err(e) => AnsiStatus::Failed(e.to_string()),
        }
    }
}

/// One standard stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamReport {
    pub fd: Fd,
    pub name: String,
    /// `tty`, `cygwin-pty`, `msys-pty` or `none`
    pub attached_to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pty: Option<PtyKind>,
    #[serde(skip)]
    pub capability: Option<Capability>,
}

impl StreamReport {
    fn new(fd: Fd, capability: Capability) -> Self {
        let pty = match capability {
            Capability::EmulatedPty(kind) => Some(kind),
            _ => None,
        };
        Self {
            fd,
            name: stream_name(fd).to_string(),
            attached_to: capability.label().to_string(),
            pty,
            capability: Some(capability),
        }
    }
}

/// Capability snapshot of the standard streams
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub any_emulated_pty: bool,
    pub ansi: AnsiStatus,
    /// Whether escapes need a console mode switch before they render
    #[serde(default)]
    pub console_api: bool,
    pub streams: Vec<StreamReport>,
}

impl Report {
    /// Probe stdin, stdout and stderr, optionally enabling ANSI on stdout
    pub fn collect<B: Backend>(probe: &Probe<B>, enable_ansi: bool) -> Self {
        let streams: Vec<StreamReport> = STANDARD_STREAMS
            .iter()
            .map(|&fd| StreamReport::new(fd, probe.classify(fd)))
            .collect();
        let any_emulated_pty = streams.iter().any(|s| s.pty.is_some());

        let ansi = if enable_ansi {
            AnsiStatus::from(probe.enable_ansi_sequences(1))
        } else {
            AnsiStatus::Skipped
        };

        Self {
            any_emulated_pty,
            ansi,
            console_api: probe.backend().has_console_api(),
            streams,
        }
    }

    pub fn stream(&self, fd: Fd) -> Option<&StreamReport> {
        self.streams.iter().find(|s| s.fd == fd)
    }

    fn stdout_capability(&self) -> Capability {
        self.stream(1)
            .and_then(|s| s.capability)
            .unwrap_or(Capability::Neither)
    }

    /// Decide whether stdout output should carry ANSI color.
    ///
    /// A console that needs a mode switch only gets color once the switch
    /// succeeded; when it was skipped the escapes would print raw.
    pub fn use_color(&self, mode: ColorMode) -> bool {
        match mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => match self.stdout_capability() {
                Capability::EmulatedPty(_) => true,
                Capability::RealTty => match self.ansi {
                    AnsiStatus::Enabled => true,
                    AnsiStatus::Skipped => !self.console_api,
                    AnsiStatus::Failed(_) => false,
                },
                Capability::Neither => false,
            },
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stream in &self.streams {
            writeln!(f, "{:<6} (fd {}): {}", stream.name, stream.fd, stream.attached_to)?;
        }
        writeln!(f, "emulated pty on any stream: {}", self.any_emulated_pty)?;
        match &self.ansi {
            AnsiStatus::Enabled => write!(f, "ansi: enabled"),
            AnsiStatus::Skipped => write!(f, "ansi: skipped"),
            AnsiStatus::Failed(reason) => write!(f, "ansi: failed ({})", reason),
        }
    }
}

fn stream_name(fd: Fd) -> &'static str {
    match fd {
        0 => "stdin",
        1 => "stdout",
        2 => "stderr",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::tests::{FakeBackend, FakeStream};

    const MSYS_PTY: &str = "\\msys-0123456789abcdef-pty0-to-master";

    #[test]
    fn test_color_mode_from_str() {
        assert_eq!("AUTO".parse::<ColorMode>(), Ok(ColorMode::Auto));
        assert_eq!("never".parse::<ColorMode>(), Ok(ColorMode::Never));
        assert!("rainbow".parse::<ColorMode>().is_err());
    }

    #[test]
    fn test_collect_console_session() {
        let probe = Probe::with_backend(
            FakeBackend::new()
                .with(0, FakeStream::console(0x1f7))
                .with(1, FakeStream::console(0x3))
                .with(2, FakeStream::console(0x3)),
        );
        let report = Report::collect(&probe, true);

        assert_eq!(report.streams.len(), 3);
        assert_eq!(report.stream(1).unwrap().attached_to, "tty");
        assert!(!report.any_emulated_pty);
        assert_eq!(report.ansi, AnsiStatus::Enabled);
        assert!(report.use_color(ColorMode::Auto));
    }

    #[test]
    fn test_collect_mintty_session() {
        let probe = Probe::with_backend(
            FakeBackend::new()
                .with(0, FakeStream::pipe(MSYS_PTY))
                .with(1, FakeStream::pipe(MSYS_PTY))
                .with(2, FakeStream::disk()),
        );
        let report = Report::collect(&probe, true);

        assert!(report.any_emulated_pty);
        assert_eq!(report.stream(1).unwrap().pty, Some(PtyKind::Msys));
        assert_eq!(report.stream(2).unwrap().attached_to, "none");
        assert_eq!(report.ansi, AnsiStatus::Enabled);
        assert!(report.use_color(ColorMode::Auto));
    }

    #[test]
    fn test_redirected_stdout() {
        let probe = Probe::with_backend(
            FakeBackend::new()
                .with(0, FakeStream::console(0))
                .with(1, FakeStream::disk()),
        );
        let report = Report::collect(&probe, true);

        assert!(matches!(report.ansi, AnsiStatus::Failed(_)));
        assert!(!report.use_color(ColorMode::Auto));
        assert!(report.use_color(ColorMode::Always));
    }

    #[test]
    fn test_skipped_ansi_on_console() {
        // VT bit clear and never switched on
        let probe = Probe::with_backend(FakeBackend::new().with(1, FakeStream::console(0x3)));
        let report = Report::collect(&probe, false);

        assert_eq!(report.ansi, AnsiStatus::Skipped);
        assert!(report.console_api);
        assert!(!report.use_color(ColorMode::Auto));
        assert!(report.use_color(ColorMode::Always));
        assert!(!report.use_color(ColorMode::Never));
    }

    #[test]
    fn test_skipped_ansi_without_console_api() {
        let probe = Probe::with_backend(
            FakeBackend::new()
                .with(1, FakeStream::console(0x3))
                .without_console_api(),
        );
        let report = Report::collect(&probe, false);

        assert_eq!(report.ansi, AnsiStatus::Skipped);
        assert!(!report.console_api);
        assert!(report.use_color(ColorMode::Auto));
    }

    #[test]
    fn test_skipped_ansi_on_emulated_pty() {
        let probe = Probe::with_backend(FakeBackend::new().with(1, FakeStream::pipe(MSYS_PTY)));
        let report = Report::collect(&probe, false);

        assert!(report.console_api);
        assert!(report.use_color(ColorMode::Auto));
    }

    #[test]
    fn test_display() {
        let probe = Probe::with_backend(FakeBackend::new().with(1, FakeStream::console(0x3)));
        let text = Report::collect(&probe, false).to_string();
        assert!(text.contains("stdout (fd 1): tty"));
        assert!(text.contains("stdin  (fd 0): none"));
        assert!(text.ends_with("ansi: skipped"));
    }

    #[test]
    fn test_serializes_to_toml() {
        let probe = Probe::with_backend(FakeBackend::new().with(0, FakeStream::pipe(MSYS_PTY)));
        let report = Report::collect(&probe, false);
        let text = toml::to_string_pretty(&report).unwrap();
        assert!(text.contains("any_emulated_pty = true"));
        assert!(text.contains("pty = \"msys\""));
    }
}
