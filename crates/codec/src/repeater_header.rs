//! TLV header carried at the front of `Syn` and `FromRadio` HYT payloads.

use crate::{Error, Result};

/// Decoded fields of a repeater TLV header. Unknown tags are tolerated and skipped; only the
/// tags the core protocol cares about are surfaced as fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepeaterHeader {
    /// Tag 1 (zero-length): the repeater advertises an RTP-capable companion service.
    pub rtp_capable: bool,
    /// Tag 3 (4 bytes, big-endian): the repeater's radio ID.
    pub radio_id: Option<u32>,
    /// Tag 4 (1 byte): the DMR timeslot this header describes.
    pub timeslot: Option<u8>,
}

impl RepeaterHeader {
    /// Decodes a sequence of `(tag, length, value)` TLV entries. The high bit of each tag byte
    /// signals that another entry follows; a clear high bit marks the final entry.
    ///
    /// Returns the decoded header and the number of bytes consumed, so callers can locate the
    /// payload that follows the header.
    ///
    /// # Test
    ///
    /// ```
    /// use hytera_adk_codec::repeater_header::RepeaterHeader;
    ///
    /// let buf = [0x83u8, 0x04, 0x00, 0x01, 0x86, 0x9F, 0x04, 0x01, 0x01];
    /// let (header, consumed) = RepeaterHeader::decode(&buf).unwrap();
    /// assert_eq!(consumed, 9);
    /// assert_eq!(header.radio_id, Some(99999));
    /// assert_eq!(header.timeslot, Some(1));
    /// ```
    pub fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        let mut header = RepeaterHeader::default();
        let mut offset = 0;

        loop {
            let tag_byte = *buf
                .get(offset)
                .ok_or(Error::PacketDataError("truncated repeater header tag"))?;
            let more = tag_byte & 0x80 != 0;
            let tag = tag_byte & 0x7F;
            offset += 1;

            let len = *buf
                .get(offset)
                .ok_or(Error::PacketDataError("truncated repeater header length"))?
                as usize;
            offset += 1;

            let value = buf
                .get(offset..offset + len)
                .ok_or(Error::PacketDataError("truncated repeater header value"))?;

            match tag {
                1 => header.rtp_capable = true,
                3 if len >= 4 => {
                    header.radio_id = Some(u32::from_be_bytes(value[..4].try_into().unwrap()))
                }
                4 if len >= 1 => header.timeslot = Some(value[0]),
                _ => {}
            }

            offset += len;
            if !more {
                break;
            }
        }

        Ok((header, offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerates_unknown_tags() {
        // tag 5 (unknown, more-follows), len 2, value ignored, then tag 4 (timeslot) final.
        let buf = [0x85u8, 0x02, 0xAA, 0xBB, 0x04, 0x01, 0x02];
        let (header, consumed) = RepeaterHeader::decode(&buf).unwrap();
        assert_eq!(consumed, buf.len());
        assert_eq!(header.timeslot, Some(2));
        assert_eq!(header.radio_id, None);
    }

    #[test]
    fn single_entry_rtp_capable() {
        let buf = [0x01u8, 0x00];
        let (header, consumed) = RepeaterHeader::decode(&buf).unwrap();
        assert_eq!(consumed, 2);
        assert!(header.rtp_capable);
    }

    #[test]
    fn truncated_header_errors() {
        let buf = [0x83u8, 0x04, 0x00];
        assert!(RepeaterHeader::decode(&buf).is_err());
    }
}
