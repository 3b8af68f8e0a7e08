//! Console output channels
//!
//! Four channels: log and debug go to standard output, warn and error go to
//! standard error. Text is written exactly as given (no newline appended)
//! and flushed right away so interleaving with other writers stays ordered.

use std::io::{self, Stderr, Stdout, Write};
use std::sync::Mutex;

/// Output channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Log,
    Debug,
    Warn,
    Error,
}

impl Channel {
    /// Whether this channel writes to the error stream
    pub fn is_error_stream(&self) -> bool {
        matches!(self, Channel::Warn | Channel::Error)
    }
}

/// Text sink for the console layer
pub trait Console {
    fn write(&self, channel: Channel, msg: &str);

    fn log(&self, msg: &str) {
        self.write(Channel::Log, msg);
    }

    fn debug(&self, msg: &str) {
        self.write(Channel::Debug, msg);
    }

    fn warn(&self, msg: &str) {
        self.write(Channel::Warn, msg);
    }

    fn error(&self, msg: &str) {
        self.write(Channel::Error, msg);
    }
}

/// Console over a pair of writers
pub struct StreamConsole<O, E> {
    out: Mutex<O>,
    err: Mutex<E>,
}

impl StreamConsole<Stdout, Stderr> {
    /// Console bound to the process's standard output and error
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> StreamConsole<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self {
            out: Mutex::new(out),
            err: Mutex::new(err),
        }
    }

    /// Take the writers back
    pub fn into_inner(self) -> (O, E) {
        let out = self.out.into_inner().unwrap_or_else(|e| e.into_inner());
        let err = self.err.into_inner().unwrap_or_else(|e| e.into_inner());
        (out, err)
    }
}

fn emit<W: Write>(sink: &Mutex<W>, msg: &str) {
    // A writer that panicked mid-write is still usable for plain text
    let mut sink = sink.lock().unwrap_or_else(|e| e.into_inner());
    let _ = sink.write_all(msg.as_bytes());
    let _ = sink.flush();
}

impl<O: Write, E: Write> Console for StreamConsole<O, E> {
    fn write(&self, channel: Channel, msg: &str) {
        if channel.is_error_stream() {
            emit(&self.err, msg);
        } else {
            emit(&self.out, msg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels_route_to_streams() {
        let console = StreamConsole::new(Vec::new(), Vec::new());
        console.log("a");
        console.warn("b");
        console.debug("c");
        console.error("d\n");

        let (out, err) = console.into_inner();
        assert_eq!(out, b"ac");
        assert_eq!(err, b"bd\n");
    }

    #[test]
    fn test_text_is_verbatim() {
        let console = StreamConsole::new(Vec::new(), Vec::new());
        console.log("\x1b[31mred\x1b[0m");
        let (out, _) = console.into_inner();
        assert_eq!(out, b"\x1b[31mred\x1b[0m");
    }

    #[test]
    fn test_error_stream_flag() {
        assert!(!Channel::Log.is_error_stream());
        assert!(!Channel::Debug.is_error_stream());
        assert!(Channel::Warn.is_error_stream());
        assert!(Channel::Error.is_error_stream());
    }
}
