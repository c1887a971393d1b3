//! Error taxonomy shared by the parsing, matching, and patching stages.

use std::fmt;
use std::io;

/// Errors produced while reading, matching, or patching binaries.
#[derive(Debug)]
pub enum Error {
    /// Malformed or truncated binary structure: bad magic, a table or
    /// section claiming bytes past the end of the buffer, a missing
    /// required table.
    Format(String),
    /// A required named section was not found in an otherwise valid image.
    Lookup(String),
    /// Underlying file I/O failure.
    Io(io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn format(msg: impl Into<String>) -> Error {
        Error::Format(msg.into())
    }

    pub fn lookup(msg: impl Into<String>) -> Error {
        Error::Lookup(msg.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Format(msg) => write!(f, "{}", msg),
            Error::Lookup(msg) => write!(f, "{}", msg),
            Error::Io(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}
