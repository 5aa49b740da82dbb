//! Error types.

use std::fmt;

/// The error type returned by sprig's fallible server operations.
///
/// Application-level failures (404, 500, etc.) are expressed as HTTP
/// responses written through the [`Context`](crate::Context), not as
/// `Error`s. This type surfaces infrastructure failures: binding to a port
/// or accepting a connection.
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

/// A route pattern rejected at registration time.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RouteError {
    /// Patterns must start with `/`.
    MissingLeadingSlash,
    /// A `:` or `*` segment without a name.
    UnnamedParam,
    /// A `*name` segment followed by more segments.
    CatchAllNotLast,
    /// A wildcard whose name differs from the one already registered at the
    /// same position, e.g. `/users/:id` followed by `/users/:name/posts`.
    ParamConflict {
        existing: String,
        new: String,
    },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingLeadingSlash => write!(f, "pattern must begin with `/`"),
            Self::UnnamedParam => write!(f, "wildcard segments must be named"),
            Self::CatchAllNotLast => {
                write!(f, "catch-all segments are only allowed at the end of a pattern")
            }
            Self::ParamConflict { existing, new } => write!(
                f,
                "wildcard `{new}` conflicts with `{existing}` registered at the same position"
            ),
        }
    }
}

impl std::error::Error for RouteError {}
