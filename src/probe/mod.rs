//! Terminal capability probe
//!
//! Answers three questions about a standard stream:
//!
//! - is it a cygwin/msys emulated pty (a named pipe with a known name)?
//! - is it a real interactive console?
//! - can ANSI escape processing be switched on for it?
//!
//! Detection never fails: any OS error degrades to "not a pty". Only
//! [`Probe::enable_ansi_sequences`] reports errors, so the caller can fall
//! back to plain output.
//!
//! # Example
//!
//! ```no_run
//! use pastel_term::probe;
//!
//! if probe::is_any_standard_stream_emulated_pty() {
//!     // mintty and friends: treat the session as interactive
//! }
//! let color = probe::enable_ansi_sequences(1).is_ok();
//! ```

pub mod pipe_name;

use std::io;

use thiserror::Error;
use tracing::{debug, warn};

use crate::sys::{Backend, Fd, FileKind, NativeBackend, OutputMode, STANDARD_STREAMS};

pub use pipe_name::{Direction, PipeNameToken, PtyKind};

#[derive(Error, Debug)]
pub enum CapabilityError {
    #[error("Descriptor {fd} is not a console: {source}")]
    InvalidHandle {
        fd: Fd,
        #[source]
        source: io::Error,
    },

    #[error("Failed to set console mode on descriptor {fd}: {source}")]
    ModeSetFailed {
        fd: Fd,
        #[source]
        source: io::Error,
    },
}

impl CapabilityError {
    /// OS error code behind the failure, if the OS reported one
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            CapabilityError::InvalidHandle { source, .. }
            | CapabilityError::ModeSetFailed { source, .. } => source.raw_os_error(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CapabilityError>;

/// Win32 ERROR_INVALID_HANDLE, reported for descriptors that do not resolve
const ERROR_INVALID_HANDLE: i32 = 6;

/// What a stream is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Native console or terminal
    RealTty,
    /// Pipe-based pty from a POSIX layer (mintty, MSYS2 terminals)
    EmulatedPty(PtyKind),
    /// File, plain pipe, or nothing at all
    Neither,
}

impl Capability {
    /// Whether a user is likely typing into / reading from this stream
    pub fn is_interactive(&self) -> bool {
        !matches!(self, Capability::Neither)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Capability::RealTty => "tty",
            Capability::EmulatedPty(PtyKind::Cygwin) => "cygwin-pty",
            Capability::EmulatedPty(PtyKind::Msys) => "msys-pty",
            Capability::Neither => "none",
        }
    }
}

/// Capability probe over a platform backend
#[derive(Debug, Default, Clone)]
pub struct Probe<B = NativeBackend> {
    backend: B,
}

impl Probe<NativeBackend> {
    /// Probe using the backend selected for this target
    pub fn native() -> Self {
        Self {
            backend: NativeBackend::new(),
        }
    }
}

impl<B: Backend> Probe<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Which POSIX layer owns the pty behind `fd`, if any
    pub fn emulated_pty_kind(&self, fd: Fd) -> Option<PtyKind> {
        // Cygwin/msys ptys are always pipes
        if self.backend.file_kind(fd) != FileKind::Pipe {
            return None;
        }

        let name = self.backend.pipe_name(fd)?;
        match pipe_name::parse(&name) {
            Some(token) => {
                debug!("fd {}: {} pty {} ({:?})", fd, token.kind, token.pty_index, token.direction);
                Some(token.kind)
            }
            None => {
                debug!("fd {}: pipe {:?} is not a pty", fd, name);
                None
            }
        }
    }

    /// Check if `fd` is a cygwin/msys emulated pty.
    ///
    /// With the native Windows backend only descriptors 0, 1 and 2
    /// resolve; any other descriptor answers `false`.
    pub fn is_emulated_pty(&self, fd: Fd) -> bool {
        self.emulated_pty_kind(fd).is_some()
    }

    /// Check if at least one of stdin, stdout and stderr is an emulated pty
    pub fn is_any_standard_stream_emulated_pty(&self) -> bool {
        // No short-circuit: every stream gets queried
        STANDARD_STREAMS
            .iter()
            .fold(false, |any, &fd| self.is_emulated_pty(fd) | any)
    }

    /// Classify what `fd` is attached to
    pub fn classify(&self, fd: Fd) -> Capability {
        if let Some(kind) = self.emulated_pty_kind(fd) {
            Capability::EmulatedPty(kind)
        } else if self.backend.is_terminal(fd) {
            Capability::RealTty
        } else {
            Capability::Neither
        }
    }

    /// Turn on virtual-terminal processing for the console behind `fd`.
    ///
    /// Succeeds without doing anything when the target has no console-mode
    /// API, when the bit is already set, and when `fd` is an emulated pty
    /// (those interpret escapes natively). A descriptor that does not
    /// resolve is an `InvalidHandle` error.
    pub fn enable_ansi_sequences(&self, fd: Fd) -> Result<()> {
        if !self.backend.has_console_api() {
            debug!("fd {}: no console mode API, nothing to enable", fd);
            return Ok(());
        }

        if self.backend.file_kind(fd) == FileKind::Invalid {
            return Err(CapabilityError::InvalidHandle {
                fd,
                source: io::Error::from_raw_os_error(ERROR_INVALID_HANDLE),
            });
        }

        let mode = match self.backend.output_mode(fd) {
            Ok(mode) => mode,
            Err(source) => {
                if let Some(kind) = self.emulated_pty_kind(fd) {
                    debug!("fd {}: {} pty handles escapes itself", fd, kind);
                    return Ok(());
                }
                return Err(CapabilityError::InvalidHandle { fd, source });
            }
        };

        if mode.contains(OutputMode::VIRTUAL_TERMINAL_PROCESSING) {
            debug!("fd {}: virtual terminal processing already on", fd);
            return Ok(());
        }

        let new_mode = mode | OutputMode::VIRTUAL_TERMINAL_PROCESSING;
        if let Err(source) = self.backend.set_output_mode(fd, new_mode) {
            warn!("fd {}: SetConsoleMode(0x{:08X}) failed: {}", fd, new_mode.bits(), source);
            return Err(CapabilityError::ModeSetFailed { fd, source });
        }

        debug!("fd {}: console mode 0x{:08X} -> 0x{:08X}", fd, mode.bits(), new_mode.bits());
        Ok(())
    }
}

/// Check if `fd` is a cygwin/msys emulated pty.
///
/// Only the standard descriptors (0, 1, 2) resolve on Windows, so any
/// other `fd` answers `false`.
pub fn is_emulated_pty(fd: Fd) -> bool {
    Probe::native().is_emulated_pty(fd)
}

/// Check if any standard stream is a cygwin/msys emulated pty
pub fn is_any_standard_stream_emulated_pty() -> bool {
    Probe::native().is_any_standard_stream_emulated_pty()
}

/// Classify what `fd` is attached to
pub fn classify(fd: Fd) -> Capability {
    Probe::native().classify(fd)
}

/// Turn on ANSI escape processing for the console behind `fd`
pub fn enable_ansi_sequences(fd: Fd) -> Result<()> {
    Probe::native().enable_ansi_sequences(fd)
}
