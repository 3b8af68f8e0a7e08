//! Cygwin/MSYS pty pipe-name grammar
//!
//! Both runtimes emulate a pty with a pair of named pipes:
//!
//! ```text
//! \cygwin-0123456789abcdef-pty3-from-master
//! \msys-0123456789abcdef-pty0-to-master
//! ^^^^^^^ ^^^^^^^^^^^^^^^^ ^^^^ ^^^^^^^^^^^^
//! vendor  session id (hex) index direction
//! ```
//!
//! Each stage is matched in order with no backtracking. Anything after the
//! direction is ignored, since newer runtimes append qualifiers such as
//! `-nat` to the same pipes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of hex digits in the session id
const SESSION_ID_LEN: usize = 16;

const CYGWIN_PREFIX: &str = "\\cygwin-";
const MSYS_PREFIX: &str = "\\msys-";
const PTY_MARKER: &str = "-pty";
const FROM_MASTER: &str = "-from-master";
const TO_MASTER: &str = "-to-master";

/// POSIX layer that owns an emulated pty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PtyKind {
    Cygwin,
    /// MSYS and MSYS2
    Msys,
}

impl PtyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PtyKind::Cygwin => "cygwin",
            PtyKind::Msys => "msys",
        }
    }
}

impl fmt::Display for PtyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which end of the pty a pipe carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    FromMaster,
    ToMaster,
}

/// A pipe name split into its grammar parts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipeNameToken<'a> {
    pub kind: PtyKind,
    pub session_id: &'a str,
    pub pty_index: &'a str,
    pub direction: Direction,
}

/// Parse a pipe name, returning `None` at the first stage that does not match
pub fn parse(name: &str) -> Option<PipeNameToken<'_>> {
    let (kind, rest) = if let Some(rest) = name.strip_prefix(CYGWIN_PREFIX) {
        (PtyKind::Cygwin, rest)
    } else if let Some(rest) = name.strip_prefix(MSYS_PREFIX) {
        (PtyKind::Msys, rest)
    } else {
        return None;
    };

    let (session_id, rest) = split_while(rest, |b| b.is_ascii_hexdigit());
    if session_id.len() != SESSION_ID_LEN {
        return None;
    }

    let rest = rest.strip_prefix(PTY_MARKER)?;

    let (pty_index, rest) = split_while(rest, |b| b.is_ascii_digit());
    if pty_index.is_empty() {
        return None;
    }

    let direction = if rest.starts_with(FROM_MASTER) {
        Direction::FromMaster
    } else if rest.starts_with(TO_MASTER) {
        Direction::ToMaster
    } else {
        return None;
    };

    Some(PipeNameToken {
        kind,
        session_id,
        pty_index,
        direction,
    })
}

/// Split off the longest prefix of ASCII bytes matching `pred`
fn split_while(s: &str, pred: impl Fn(u8) -> bool) -> (&str, &str) {
    // Every byte before `end` is ASCII, so `end` is a char boundary
    let end = s.bytes().position(|b| !pred(b)).unwrap_or(s.len());
    s.split_at(end)
}
