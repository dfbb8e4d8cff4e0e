//! Unified infrastructure error type.

use std::fmt;

/// The error type returned by plinth's fallible infrastructure operations:
/// binding to a port or accepting a connection.
///
/// Application-level problems never take this shape. A handler that wants to
/// answer with 404 or 422 returns a [`Response`](crate::Response); a handler
/// that fails returns a [`Failure`](crate::Failure), which the dispatcher
/// translates into a 500 response at its boundary.
#[derive(Debug)]
pub struct Error(std::io::Error);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "io: {}", self.0)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self(e)
    }
}
