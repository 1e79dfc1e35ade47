//! Invocation configuration for termctl.
//!
//! Everything is supplied on the command line; there is no config file. The
//! two knobs are the server socket path and the socket timeout, both
//! validated here before any connection is attempted.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

/// Where the Terminale server listens by default.
pub const DEFAULT_SOCKET_PATH: &str = "/etc/terminale/.server.skt";

/// Default send/receive timeout in milliseconds, as typed on the CLI.
pub const DEFAULT_TIMEOUT_MS: &str = "100";

/// `sockaddr_un.sun_path` capacity, including the NUL terminator.
pub const UNIX_PATH_MAX: usize = 108;

/// Errors produced while validating command-line values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("socket path '{path}' too long (max length {})", UNIX_PATH_MAX - 1)]
    PathTooLong { path: String },
    #[error("invalid timeout '{raw}' (must be positive decimal integer)")]
    InvalidTimeout { raw: String },
}

/// A socket path known to fit in a `sockaddr_un`.
///
/// Stored verbatim; the length check happens once, at parse time, so the
/// exchange engine never has to re-validate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketPath(String);

impl SocketPath {
    /// Validate `raw` against the `sockaddr_un` path limit.
    ///
    /// Used as a clap value parser, so overlong paths are rejected before
    /// option parsing finishes.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        if raw.len() >= UNIX_PATH_MAX {
            return Err(ParseError::PathTooLong {
                path: raw.to_string(),
            });
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl fmt::Display for SocketPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<Path> for SocketPath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

/// Parse a timeout given in milliseconds.
///
/// Accepts positive base-10 integers only; zero, empty input, signs, and
/// trailing garbage are all rejected.
pub fn parse_timeout(raw: &str) -> Result<Duration, ParseError> {
    let invalid = || ParseError::InvalidTimeout {
        raw: raw.to_string(),
    };
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let ms: u64 = raw.parse().map_err(|_| invalid())?;
    if ms == 0 {
        return Err(invalid());
    }
    Ok(Duration::from_millis(ms))
}

/// Validated configuration for one invocation.
///
/// Built by the option parser and immutable afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the server socket.
    pub socket_path: SocketPath,
    /// Timeout applied to both the send and receive directions.
    pub timeout: Duration,
}
