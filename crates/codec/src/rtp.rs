//! RFC-3550-style RTP codec, used for the voice stream a repeater multiplexes alongside its
//! control ports.
//!
//! Field layout cross-checked against `examples/mycrl-turn-rs/lib/rtp/src/header.rs` (used only
//! for the RFC-3550 bit layout, not for its `bitreader`/`anyhow` style — this module keeps the
//! `bytes`/`Result<_, Error>` idiom used throughout the rest of this codec).

use bytes::{BufMut, Bytes, BytesMut};

use crate::{Error, Result};

const FIXED_HEADER_LEN: usize = 12;

/// The Hytera-mandated extension profile for outbound audio: profile `0x15`, three zero words.
/// Without it, repeaters observed in practice will not relay the audio.
pub const AUDIO_EXTENSION_PROFILE: u16 = 0x15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpExtension {
    pub profile: u16,
    pub data: Vec<u32>,
}

impl RtpExtension {
    /// The extension Hytera repeaters require to relay an outbound audio packet.
    pub fn audio() -> Self {
        Self {
            profile: AUDIO_EXTENSION_PROFILE,
            data: vec![0, 0, 0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpPacket {
    pub version: u8,
    pub padding: bool,
    pub marker: bool,
    pub payload_type: u8,
    pub sequence: u16,
    pub timestamp: u32,
    pub ssrc: u32,
    pub csrc: Vec<u32>,
    pub extension: Option<RtpExtension>,
    pub payload: Bytes,
}

impl RtpPacket {
    /// Decodes a fixed RTP header, optional CSRC list, optional extension, and payload.
    /// Lenient about unrecognized payload types — only the wire shape is validated.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < FIXED_HEADER_LEN {
            return Err(Error::PacketDataError("rtp packet shorter than fixed header"));
        }

        let b0 = buf[0];
        let version = b0 >> 6;
        let padding = b0 & 0x20 != 0;
        let has_extension = b0 & 0x10 != 0;
        let csrc_count = (b0 & 0x0F) as usize;

        let b1 = buf[1];
        let marker = b1 & 0x80 != 0;
        let payload_type = b1 & 0x7F;

        let sequence = u16::from_be_bytes([buf[2], buf[3]]);
        let timestamp = u32::from_be_bytes(buf[4..8].try_into().unwrap());
        let ssrc = u32::from_be_bytes(buf[8..12].try_into().unwrap());

        let mut offset = FIXED_HEADER_LEN;
        let mut csrc = Vec::with_capacity(csrc_count);
        for _ in 0..csrc_count {
            let word = buf
                .get(offset..offset + 4)
                .ok_or(Error::PacketDataError("truncated csrc list"))?;
            csrc.push(u32::from_be_bytes(word.try_into().unwrap()));
            offset += 4;
        }

        let extension = if has_extension {
            let header = buf
                .get(offset..offset + 4)
                .ok_or(Error::PacketDataError("truncated extension header"))?;
            let profile = u16::from_be_bytes([header[0], header[1]]);
            let word_count = u16::from_be_bytes([header[2], header[3]]) as usize;
            offset += 4;
            let mut data = Vec::with_capacity(word_count);
            for _ in 0..word_count {
                let word = buf
                    .get(offset..offset + 4)
                    .ok_or(Error::PacketDataError("truncated extension data"))?;
                data.push(u32::from_be_bytes(word.try_into().unwrap()));
                offset += 4;
            }
            Some(RtpExtension { profile, data })
        } else {
            None
        };

        let mut payload_end = buf.len();
        if padding {
            let pad_len = *buf
                .last()
                .ok_or(Error::PacketDataError("padding bit set on empty packet"))?
                as usize;
            payload_end = payload_end
                .checked_sub(pad_len)
                .ok_or(Error::PacketDataError("padding length exceeds packet"))?;
        }
        if offset > payload_end {
            return Err(Error::PacketDataError("header overruns payload"));
        }

        Ok(Self {
            version,
            padding,
            marker,
            payload_type,
            sequence,
            timestamp,
            ssrc,
            csrc,
            extension,
            payload: Bytes::copy_from_slice(&buf[offset..payload_end]),
        })
    }

    /// Serializes the packet. Never emits padding. Rejects fields that cannot be represented in
    /// the fixed-width header.
    pub fn encode(&self) -> Result<BytesMut> {
        if self.version > 0b11 {
            return Err(Error::PacketDataError("rtp version does not fit in 2 bits"));
        }
        if self.payload_type > 0x7F {
            return Err(Error::PacketDataError("rtp payload type does not fit in 7 bits"));
        }
        if self.csrc.len() > 0x0F {
            return Err(Error::PacketDataError("too many csrc entries"));
        }

        let mut buf = BytesMut::with_capacity(
            FIXED_HEADER_LEN + self.csrc.len() * 4 + self.payload.len() + 16,
        );

        let b0 = (self.version << 6)
            | (if self.padding { 0x20 } else { 0 })
            | (if self.extension.is_some() { 0x10 } else { 0 })
            | (self.csrc.len() as u8);
        buf.put_u8(b0);

        let b1 = (if self.marker { 0x80 } else { 0 }) | self.payload_type;
        buf.put_u8(b1);

        buf.put_u16(self.sequence);
        buf.put_u32(self.timestamp);
        buf.put_u32(self.ssrc);

        for word in &self.csrc {
            buf.put_u32(*word);
        }

        if let Some(ext) = &self.extension {
            buf.put_u16(ext.profile);
            buf.put_u16(ext.data.len() as u16);
            for word in &ext.data {
                buf.put_u32(*word);
            }
        }

        buf.put_slice(&self.payload);
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_plain_pcmu_packet() {
        let packet = RtpPacket {
            version: 2,
            padding: false,
            marker: false,
            payload_type: 0,
            sequence: 1,
            timestamp: 160,
            ssrc: 0xDEAD_BEEF,
            csrc: vec![],
            extension: None,
            payload: Bytes::from_static(&[0xFFu8; 160]),
        };
        let encoded = packet.encode().unwrap();
        assert_eq!(RtpPacket::decode(&encoded).unwrap(), packet);
    }

    /// spec.md §8 scenario S6. The scenario's literal header byte (`0x80`) omits the extension
    /// bit despite describing an extension; this implementation sets the bit correctly (`0x90`)
    /// per RFC 3550 so `decode(encode(p)) == p` holds — see DESIGN.md.
    #[test]
    fn silent_frame_with_audio_extension() {
        let packet = RtpPacket {
            version: 2,
            padding: false,
            marker: false,
            payload_type: 0,
            sequence: 1000,
            timestamp: 160_000,
            ssrc: 0,
            csrc: vec![],
            extension: Some(RtpExtension::audio()),
            payload: Bytes::from(vec![0xFFu8; 160]),
        };
        let encoded = packet.encode().unwrap();
        assert_eq!(encoded[0], 0x90);
        assert_eq!(&encoded[2..4], &[0x03, 0xE8]);
        assert_eq!(
            &encoded[12..28],
            &[0x00, 0x15, 0x00, 0x03, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(&encoded[28..], &[0xFFu8; 160][..]);
        assert_eq!(RtpPacket::decode(&encoded).unwrap(), packet);
    }

    #[test]
    fn rejects_oversized_payload_type_on_encode() {
        let packet = RtpPacket {
            version: 2,
            padding: false,
            marker: false,
            payload_type: 0x80,
            sequence: 0,
            timestamp: 0,
            ssrc: 0,
            csrc: vec![],
            extension: None,
            payload: Bytes::new(),
        };
        assert!(packet.encode().is_err());
    }
}
