//! Outer HYT/HSTRP framing: signature, type byte, sequence ID, and payload.
//!
//! Grounded on `original_source/HyteraADK/packet.py`'s `HYTPacket` base class and its
//! subclasses. The source dispatches on type via `__subclasses__()` enumeration at decode time;
//! here that becomes a static match over a closed, tagged enum (per the redesign note in
//! SPEC_FULL.md §9) so decode-only variants (`Syn`, `FromRadio`, `Unknown`) simply have no public
//! constructor, and only the shared `encode` entry point needs a runtime `NotSerializable` guard.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{repeater_header::RepeaterHeader, txctrl::TxCtrlFrame, Error, OnUnknown, Result};

pub const SIGNATURE: [u8; 3] = [0x32, 0x42, 0x00];

/// A decoded (or about-to-be-encoded) HYT packet.
///
/// `Syn` and `FromRadio` are reachable only through [`HytMessage::decode`]: there is no public
/// constructor for them, and [`HytMessage::encode`] rejects them with
/// [`Error::NotSerializable`] as the single defensive fallback the type system can't express.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HytMessage {
    /// Host -> repeater command carrying a TxCtrl payload.
    ToRadio { seq_id: u16, txctrl: TxCtrlFrame },
    /// Either direction, empty payload.
    Ack { seq_id: u16 },
    /// Either direction, empty payload.
    Heartbeat { seq_id: u16 },
    /// Host -> repeater, empty payload, answers a `Syn`.
    SynAck { seq_id: u16 },
    /// Repeater -> host: a TLV header followed by a TxCtrl payload. Decode-only.
    FromRadio {
        seq_id: u16,
        header: RepeaterHeader,
        txctrl: TxCtrlFrame,
    },
    /// Repeater -> host: only a TLV header. Decode-only.
    Syn { seq_id: u16, header: RepeaterHeader },
    /// An unrecognised type byte, carried through rather than rejected. Only ever produced when
    /// [`crate::CodecConfig::on_unknown`] is [`OnUnknown::Sentinel`]; decode-only.
    Unknown {
        type_byte: u8,
        seq_id: u16,
        payload: Bytes,
    },
}

impl HytMessage {
    /// Returns `self` with its outer `seqId` replaced, used by the session engine to assign a
    /// freshly allocated sequence number immediately before enqueueing a message for send.
    pub fn with_seq_id(self, new_seq_id: u16) -> Self {
        match self {
            HytMessage::ToRadio { txctrl, .. } => HytMessage::ToRadio {
                seq_id: new_seq_id,
                txctrl,
            },
            HytMessage::Ack { .. } => HytMessage::Ack { seq_id: new_seq_id },
            HytMessage::Heartbeat { .. } => HytMessage::Heartbeat { seq_id: new_seq_id },
            HytMessage::SynAck { .. } => HytMessage::SynAck { seq_id: new_seq_id },
            HytMessage::FromRadio { header, txctrl, .. } => HytMessage::FromRadio {
                seq_id: new_seq_id,
                header,
                txctrl,
            },
            HytMessage::Syn { header, .. } => HytMessage::Syn {
                seq_id: new_seq_id,
                header,
            },
            HytMessage::Unknown {
                type_byte, payload, ..
            } => HytMessage::Unknown {
                type_byte,
                seq_id: new_seq_id,
                payload,
            },
        }
    }

    /// True for the only HYT type the host sends that expects an `Ack` back.
    pub fn expects_ack(&self) -> bool {
        matches!(self, HytMessage::ToRadio { .. })
    }

    pub fn seq_id(&self) -> u16 {
        match self {
            HytMessage::ToRadio { seq_id, .. }
            | HytMessage::Ack { seq_id }
            | HytMessage::Heartbeat { seq_id }
            | HytMessage::SynAck { seq_id }
            | HytMessage::FromRadio { seq_id, .. }
            | HytMessage::Syn { seq_id, .. }
            | HytMessage::Unknown { seq_id, .. } => *seq_id,
        }
    }

    /// Decodes a HYT frame. The outer `seqId` field is read big-endian, matching the wire's
    /// canonical order and the order [`HytMessage::encode`] always emits. Raw bytes alone can't
    /// distinguish a big-endian `seqId` from a little-endian one sent by a nonconforming repeater
    /// -- every 2-byte pair already decodes to some valid `u16` either way, so there is nothing
    /// here to reject or retry. The "accept both" tolerance SPEC_FULL.md §9 documents is realized
    /// one layer up, in the session's ack matching, which also tries `seq_id.swap_bytes()` before
    /// giving up on a lookup -- see `DESIGN.md`'s `PortSession` entry.
    pub fn decode(buf: &[u8], config: &crate::CodecConfig) -> Result<Self> {
        if buf.len() < 6 || buf[0..3] != SIGNATURE {
            return Err(Error::BadSignature);
        }

        let type_byte = buf[3];
        let seq_id = u16::from_be_bytes([buf[4], buf[5]]);
        let rest = &buf[6..];

        match type_byte {
            0x01 => Ok(HytMessage::Ack { seq_id }),
            0x02 => Ok(HytMessage::Heartbeat { seq_id }),
            0x05 => Ok(HytMessage::SynAck { seq_id }),
            0x00 => {
                let txctrl = TxCtrlFrame::decode(rest)?;
                Ok(HytMessage::ToRadio { seq_id, txctrl })
            }
            0x20 => {
                let (header, consumed) = RepeaterHeader::decode(rest)?;
                let txctrl = TxCtrlFrame::decode(&rest[consumed..])?;
                Ok(HytMessage::FromRadio {
                    seq_id,
                    header,
                    txctrl,
                })
            }
            0x24 => {
                let (header, _consumed) = RepeaterHeader::decode(rest)?;
                Ok(HytMessage::Syn { seq_id, header })
            }
            _ => match config.on_unknown {
                OnUnknown::Fail => Err(Error::UnhandledType),
                OnUnknown::Sentinel => Ok(HytMessage::Unknown {
                    type_byte,
                    seq_id,
                    payload: Bytes::copy_from_slice(rest),
                }),
            },
        }
    }

    /// Serializes the frame. Fails with [`Error::NotSerializable`] for `Syn`/`FromRadio`, which
    /// the host never constructs but which remain reachable here as enum variants shared with
    /// the encodable ones.
    pub fn encode(&self) -> Result<BytesMut> {
        let (type_byte, payload): (u8, Option<BytesMut>) = match self {
            HytMessage::ToRadio { txctrl, .. } => (0x00, Some(txctrl.encode())),
            HytMessage::Ack { .. } => (0x01, None),
            HytMessage::Heartbeat { .. } => (0x02, None),
            HytMessage::SynAck { .. } => (0x05, None),
            HytMessage::FromRadio { .. } | HytMessage::Syn { .. } | HytMessage::Unknown { .. } => {
                return Err(Error::NotSerializable)
            }
        };

        let mut buf = BytesMut::with_capacity(6 + payload.as_ref().map_or(0, |p| p.len()));
        buf.put_slice(&SIGNATURE);
        buf.put_u8(type_byte);
        buf.put_u16(self.seq_id());
        if let Some(payload) = payload {
            buf.put_slice(&payload);
        }
        Ok(buf)
    }
}
