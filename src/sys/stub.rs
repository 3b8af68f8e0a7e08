//! Fallback backend for targets without a console-mode API
//!
//! Pipe names are never reported, so pty detection always answers `false`,
//! and mode changes are refused with `Unsupported`. The probe treats the
//! missing API as "nothing to enable".

use std::io::{self, IsTerminal};

use super::{Backend, Fd, FileKind, OutputMode};

#[derive(Debug, Default, Clone, Copy)]
pub struct StubBackend;

impl StubBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for StubBackend {
    fn has_console_api(&self) -> bool {
        false
    }

    fn file_kind(&self, _fd: Fd) -> FileKind {
        FileKind::Unknown
    }

    fn pipe_name(&self, _fd: Fd) -> Option<String> {
        None
    }

    fn is_terminal(&self, fd: Fd) -> bool {
        match fd {
            0 => io::stdin().is_terminal(),
            1 => io::stdout().is_terminal(),
            2 => io::stderr().is_terminal(),
            _ => false,
        }
    }

    fn output_mode(&self, _fd: Fd) -> io::Result<OutputMode> {
        Err(io::Error::from(io::ErrorKind::Unsupported))
    }

    fn set_output_mode(&self, _fd: Fd, _mode: OutputMode) -> io::Result<()> {
        Err(io::Error::from(io::ErrorKind::Unsupported))
    }
}
