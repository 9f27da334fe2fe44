//! TxCtrl sub-protocol framing: the payload carried inside a HYT `ToRadio`/`FromRadio` packet.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{enums::MessageHeader, Error, Result};

pub mod messages;

/// Computes the TxCtrl checksum: `(~sum(opcode ++ length ++ payload) + 0x33) & 0xFF`, all
/// arithmetic mod 256. Ported directly from `original_source/HyteraADK/packet.py`'s
/// `TxCtrlBase` checksum computation.
pub fn checksum(opcode_bytes: [u8; 2], length_bytes: [u8; 2], payload: &[u8]) -> u8 {
    let mut sum: u8 = 0;
    for b in opcode_bytes
        .iter()
        .chain(length_bytes.iter())
        .chain(payload.iter())
    {
        sum = sum.wrapping_add(*b);
    }
    (!sum).wrapping_add(0x33)
}

/// A decoded (or about-to-be-encoded) TxCtrl frame, prior to per-opcode interpretation of its
/// payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxCtrlFrame {
    pub header: MessageHeader,
    pub reliable: bool,
    pub opcode: u16,
    pub payload: Bytes,
}

impl TxCtrlFrame {
    /// Decodes a frame, validating minimum length, trailer byte, and checksum.
    ///
    /// # Test
    ///
    /// ```
    /// use hytera_adk_codec::txctrl::TxCtrlFrame;
    /// use hytera_adk_codec::enums::MessageHeader;
    ///
    /// let buf = [0x82u8, 0x41, 0x08, 0x05, 0x00, 0x00, 0xD2, 0x04, 0x00, 0x00, 0x0E, 0x03];
    /// let frame = TxCtrlFrame::decode(&buf).unwrap();
    /// assert_eq!(frame.header, MessageHeader::Rcp);
    /// assert!(frame.reliable);
    /// assert_eq!(frame.opcode, 0x0841);
    /// assert_eq!(&frame.payload[..], &[0x00, 0xD2, 0x04, 0x00, 0x00]);
    /// ```
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < 7 {
            return Err(Error::PacketDataError("frame shorter than minimum length"));
        }

        let header_byte = buf[0];
        let reliable = header_byte & 0x80 != 0;
        let header = MessageHeader::try_from(header_byte & 0x7F).map_err(|_| Error::UnhandledType)?;
        let little_endian = header.is_little_endian();

        let opcode_bytes = [buf[1], buf[2]];
        let length_bytes = [buf[3], buf[4]];
        let opcode = if little_endian {
            u16::from_le_bytes(opcode_bytes)
        } else {
            u16::from_be_bytes(opcode_bytes)
        };
        let length = if little_endian {
            u16::from_le_bytes(length_bytes)
        } else {
            u16::from_be_bytes(length_bytes)
        } as usize;

        let total = 7 + length;
        let frame_bytes = buf
            .get(..total)
            .ok_or(Error::PacketDataError("frame shorter than declared length"))?;

        let payload = &frame_bytes[5..5 + length];
        let trailer = frame_bytes[6 + length];
        if trailer != 0x03 {
            return Err(Error::PacketDataError("bad trailer byte"));
        }

        let expected = checksum(opcode_bytes, length_bytes, payload);
        let actual = frame_bytes[5 + length];
        if actual != expected {
            return Err(Error::PacketDataError("checksum mismatch"));
        }

        Ok(Self {
            header,
            reliable,
            opcode,
            payload: Bytes::copy_from_slice(payload),
        })
    }

    /// Serializes the frame, computing opcode/length endianness and the checksum.
    pub fn encode(&self) -> BytesMut {
        let little_endian = self.header.is_little_endian();
        let length = self.payload.len() as u16;

        let opcode_bytes = if little_endian {
            self.opcode.to_le_bytes()
        } else {
            self.opcode.to_be_bytes()
        };
        let length_bytes = if little_endian {
            length.to_le_bytes()
        } else {
            length.to_be_bytes()
        };

        let mut buf = BytesMut::with_capacity(7 + self.payload.len());
        let header_byte = u8::from(self.header) | if self.reliable { 0x80 } else { 0 };
        buf.put_u8(header_byte);
        buf.put_slice(&opcode_bytes);
        buf.put_slice(&length_bytes);
        buf.put_slice(&self.payload);
        buf.put_u8(checksum(opcode_bytes, length_bytes, &self.payload));
        buf.put_u8(0x03);
        buf
    }
}
