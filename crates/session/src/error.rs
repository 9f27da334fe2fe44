use std::fmt;

/// Errors surfaced by the session engine, distinct from [`codec::Error`] (wire-level decode
/// failures) since these are about the session's own lifecycle and delivery guarantees.
#[derive(Debug)]
pub enum Error {
    Codec(codec::Error),
    Io(std::io::Error),
    /// `send`/`waitAck` exceeded its timeout waiting for an acknowledgement.
    AckTimeout,
    /// `send` was called while the session has no known repeater address.
    SendWhileDisconnected,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Codec(err) => write!(f, "codec error: {err}"),
            Error::Io(err) => write!(f, "io error: {err}"),
            Error::AckTimeout => write!(f, "timed out waiting for acknowledgement"),
            Error::SendWhileDisconnected => write!(f, "cannot send: no repeater connected"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Codec(err) => Some(err),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<codec::Error> for Error {
    fn from(err: codec::Error) -> Self {
        Error::Codec(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
