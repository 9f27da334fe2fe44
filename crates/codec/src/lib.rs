//! Packet codecs for Hytera's ADK protocol family: the HYT/HSTRP outer framing, the TxCtrl
//! sub-protocols carried inside it (RCP, RRS, TMP, ...), and the RTP codec used for voice.

use std::fmt;

pub mod enums;
pub mod hyt;
pub mod repeater_header;
pub mod rtp;
pub mod txctrl;
pub mod util;

pub mod ports;

pub use enums::*;

/// Crate-wide error type. No dependency on an error-handling crate here, matching the teacher
/// codec crate's hand-written `Error` with `std::error::Error` + `Display` impls.
#[derive(Debug)]
pub enum Error {
    /// The HYT signature bytes did not match `32 42 00`.
    BadSignature,
    /// The outer HYT type, or the `(MessageHeader, opcode)` pair, is not a type this decoder
    /// knows how to interpret.
    UnhandledType,
    /// The TxCtrl frame was too short, had the wrong trailer byte, or failed its checksum.
    PacketDataError(&'static str),
    /// Attempted to construct a decode-only message type.
    NotConstructible,
    /// Attempted to encode a decode-only message type.
    NotSerializable,
    /// Underlying I/O failure.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BadSignature => write!(f, "bad HYT signature"),
            Error::UnhandledType => write!(f, "unhandled packet type"),
            Error::PacketDataError(reason) => write!(f, "malformed packet data: {reason}"),
            Error::NotConstructible => write!(f, "message type is decode-only"),
            Error::NotSerializable => write!(f, "message type cannot be encoded"),
            Error::Io(err) => write!(f, "io error: {err}"),
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

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

/// Behavior selector for unrecognized outer HYT types or TxCtrl `(header, opcode)` pairs.
///
/// Collapses the source's process-global `CFG_RETURN_NONE_ON_UNKNOWN_*` flags into a single
/// value threaded through decoder construction, per the redesign note in SPEC_FULL.md §9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnUnknown {
    /// Fail decode with [`Error::UnhandledType`]. The default, matching the distilled spec's
    /// "fail and log" default.
    #[default]
    Fail,
    /// Return a generic, tag-only carrier instead of failing.
    Sentinel,
}

/// Decoder-construction-time configuration, shared by the HYT and TxCtrl decoders.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodecConfig {
    pub on_unknown: OnUnknown,
}

pub type Result<T> = std::result::Result<T, Error>;
