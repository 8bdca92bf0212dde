//! Unified error type.

use std::fmt;
use std::io;

/// The error type returned by siteserve's fallible operations.
///
/// Client-facing failures (bad payloads, missing files) are expressed as
/// HTTP [`Response`](crate::Response) values, not as `Error`s. This type
/// surfaces infrastructure failures and names the operation that failed,
/// since "address in use" alone tells a developer nothing at 9pm.
#[derive(Debug)]
pub struct Error {
    what: &'static str,
    source: io::Error,
}

impl Error {
    pub(crate) fn bind(source: io::Error) -> Self {
        Self { what: "bind the listener", source }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to {}: {}", self.what, self.source)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
