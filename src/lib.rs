//! pastel-term - terminal capability detection for console tools
//!
//! Works out at startup what the standard streams are attached to, so a
//! console layer can decide whether to treat the session as interactive and
//! whether to emit ANSI color.
//!
//! # Features
//!
//! - **Pty detection**: recognizes the pipe-based ptys of Cygwin and MSYS2
//!   (mintty, Git Bash), which Windows otherwise reports as plain pipes
//! - **ANSI enabling**: switches on virtual-terminal processing for a
//!   Windows console
//! - **Console channels**: log/debug/warn/error text output
//! - **Special folders**: well-known folder lookup on Windows
//!
//! Every function has the same signature on every target. Where the OS has
//! no console-mode or pipe-name API the answers degrade to "not a pty" and
//! "nothing to enable".
//!
//! # Architecture
//!
//! ```text
//! probe (Probe<B>)
//! ├── pipe_name (cygwin/msys name grammar)
//! └── sys::Backend
//!     ├── WindowsBackend (cfg(windows))
//!     └── StubBackend (everything else)
//! ```

pub mod config;
pub mod console;
pub mod folders;
pub mod probe;
pub mod report;
pub mod sys;

pub use console::{Channel, Console, StreamConsole};
pub use folders::{is_macos, special_folder_path, FolderFlag, SpecialFolder};
pub use probe::{
    classify, enable_ansi_sequences, is_any_standard_stream_emulated_pty, is_emulated_pty,
    Capability, CapabilityError, Probe, PtyKind,
};
pub use report::{AnsiStatus, ColorMode, Report};
pub use sys::{Backend, Fd, FileKind, NativeBackend, OutputMode};
