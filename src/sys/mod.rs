//! Platform backends for console and pipe queries.
//!
//! Every OS call the probe makes goes through the [`Backend`] trait. Two
//! implementations exist and one is picked at build time:
//!
//! - **win32**: native console-mode and pipe-name queries via Win32
//! - **stub**: conservative answers for targets without those APIs
//!
//! # Module Hierarchy
//!
//! ```text
//! sys/
//! ├── mod.rs      - Backend trait, FileKind, OutputMode
//! ├── win32.rs    - WindowsBackend (cfg(windows))
//! └── stub.rs     - StubBackend (everything else)
//! ```

use std::io;

use bitflags::bitflags;

#[cfg(windows)]
pub mod win32;
#[cfg(not(windows))]
pub mod stub;

#[cfg(windows)]
pub use self::win32::WindowsBackend as NativeBackend;
#[cfg(not(windows))]
pub use self::stub::StubBackend as NativeBackend;

/// C-runtime style file descriptor (0 = stdin, 1 = stdout, 2 = stderr).
///
/// On Windows only these three resolve. Other values are reported as
/// [`FileKind::Invalid`]: looking up arbitrary C runtime slots runs its
/// invalid-parameter handler, which terminates the process.
pub type Fd = i32;

/// Standard stream descriptors, in probe order
pub const STANDARD_STREAMS: [Fd; 3] = [0, 1, 2];

/// Object type behind a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Descriptor did not resolve to a live OS object
    Invalid,
    /// Regular file
    Disk,
    /// Character device (console, serial line, NUL)
    Char,
    /// Anonymous or named pipe
    Pipe,
    /// Resolved, but the OS would not say what it is
    Unknown,
}

bitflags! {
    /// Console output mode word.
    ///
    /// Bits not named here are kept as-is when a mode is read, modified
    /// and written back.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OutputMode: u32 {
        const PROCESSED_OUTPUT = 0x0001;
        const WRAP_AT_EOL_OUTPUT = 0x0002;
        const VIRTUAL_TERMINAL_PROCESSING = 0x0004;
        const DISABLE_NEWLINE_AUTO_RETURN = 0x0008;
        const LVB_GRID_WORLDWIDE = 0x0010;

        const _ = !0;
    }
}

/// OS facilities the capability probe depends on.
///
/// Implementations must tolerate any descriptor value, including closed
/// or never-opened ones, and must not block.
pub trait Backend {
    /// Whether this target has a console-mode API at all
    fn has_console_api(&self) -> bool;

    /// Type of the object behind `fd`
    fn file_kind(&self, fd: Fd) -> FileKind;

    /// Name of the pipe behind `fd`, if it is a pipe and has one
    fn pipe_name(&self, fd: Fd) -> Option<String>;

    /// Whether `fd` is attached to an interactive console or terminal
    fn is_terminal(&self, fd: Fd) -> bool;

    /// Current console output mode of `fd`
    fn output_mode(&self, fd: Fd) -> io::Result<OutputMode>;

    /// Replace the console output mode of `fd`
    fn set_output_mode(&self, fd: Fd, mode: OutputMode) -> io::Result<()>;
}

impl<B: Backend + ?Sized> Backend for &B {
    fn has_console_api(&self) -> bool {
        (**self).has_console_api()
    }

    fn file_kind(&self, fd: Fd) -> FileKind {
        (**self).file_kind(fd)
    }

    fn pipe_name(&self, fd: Fd) -> Option<String> {
        (**self).pipe_name(fd)
    }

    fn is_terminal(&self, fd: Fd) -> bool {
        (**self).is_terminal(fd)
    }

    fn output_mode(&self, fd: Fd) -> io::Result<OutputMode> {
        (**self).output_mode(fd)
    }

    fn set_output_mode(&self, fd: Fd, mode: OutputMode) -> io::Result<()> {
        (**self).set_output_mode(fd, mode)
    }
}
