//! Typed sub-messages carried inside [`super::TxCtrlFrame`] payloads, keyed by
//! `(MessageHeader, opcode)`.
//!
//! Direction is expressed at the type level rather than with a runtime-checked tag: types the
//! host can send implement [`Encode`], types the host only ever receives implement [`Decode`].
//! `TxCtrlCallRequest` in `original_source/HyteraADK/packet.py` is the template this whole module
//! generalizes from.

use bytes::{BufMut, BytesMut};

use super::TxCtrlFrame;
use crate::enums::{
    ButtonOperation, ButtonTarget, CallType, MessageHeader, ProcessType, ResultCode,
    StatusParameter, StatusValueChannelMode,
};
use crate::{Error, Result};

/// Maps an out-of-range wire byte to the same "bad payload" error every other decode failure in
/// this module uses, instead of a bare `TryFromPrimitiveError`.
fn require_enum<T, E>(result: std::result::Result<T, E>, what: &'static str) -> Result<T> {
    result.map_err(|_| Error::PacketDataError(what))
}

/// A sub-message the host can serialize into a [`TxCtrlFrame`] payload.
pub trait Encode {
    const HEADER: MessageHeader;
    const OPCODE: u16;
    const RELIABLE: bool;

    fn encode_payload(&self, buf: &mut BytesMut);

    fn to_frame(&self) -> TxCtrlFrame {
        let mut payload = BytesMut::new();
        self.encode_payload(&mut payload);
        TxCtrlFrame {
            header: Self::HEADER,
            reliable: Self::RELIABLE,
            opcode: Self::OPCODE,
            payload: payload.freeze(),
        }
    }
}

/// A sub-message the host only ever receives from the repeater.
pub trait Decode: Sized {
    const HEADER: MessageHeader;
    const OPCODE: u16;

    fn decode_payload(payload: &[u8]) -> Result<Self>;

    fn from_frame(frame: &TxCtrlFrame) -> Result<Self> {
        if frame.header != Self::HEADER || frame.opcode != Self::OPCODE {
            return Err(Error::UnhandledType);
        }
        Self::decode_payload(&frame.payload)
    }
}

fn require_len(payload: &[u8], len: usize) -> Result<()> {
    if payload.len() < len {
        Err(Error::PacketDataError("sub-message payload too short"))
    } else {
        Ok(())
    }
}

/// RCP 0x0041 -- button request. Host -> repeater.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonRequest {
    pub target: ButtonTarget,
    pub operation: ButtonOperation,
}

impl Encode for ButtonRequest {
    const HEADER: MessageHeader = MessageHeader::Rcp;
    const OPCODE: u16 = 0x0041;
    const RELIABLE: bool = true;

    fn encode_payload(&self, buf: &mut BytesMut) {
        buf.put_u8(self.target.into());
        buf.put_u8(self.operation.into());
    }
}

/// RCP 0x8041 -- button response. Repeater -> host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonResponse {
    pub result: ResultCode,
}

impl Decode for ButtonResponse {
    const HEADER: MessageHeader = MessageHeader::Rcp;
    const OPCODE: u16 = 0x8041;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        require_len(payload, 1)?;
        Ok(Self {
            result: require_enum(ResultCode::try_from(payload[0]), "unrecognised result code")?,
        })
    }
}

/// RCP 0x00E7 -- channel status query. Host -> repeater. `target` is the repeater's channel
/// index, not a [`crate::enums::ButtonTarget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelStatusQuery {
    pub target: u8,
    pub value_type: StatusParameter,
}

impl Encode for ChannelStatusQuery {
    const HEADER: MessageHeader = MessageHeader::Rcp;
    const OPCODE: u16 = 0x00E7;
    const RELIABLE: bool = true;

    fn encode_payload(&self, buf: &mut BytesMut) {
        buf.put_u8(self.target);
        buf.put_u8(self.value_type.into());
    }
}

/// One `(target, value)` entry in a [`ChannelStatusResponse`]. `value`'s interpretation depends
/// on the `valueType` of the query it answers, so it's carried raw; [`Self::channel_mode`]
/// decodes it for the [`StatusParameter::ChannelMode`] case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelStatusEntry {
    pub target: u8,
    pub value: i32,
}

impl ChannelStatusEntry {
    pub fn channel_mode(&self) -> Result<StatusValueChannelMode> {
        require_enum(
            StatusValueChannelMode::try_from(self.value),
            "unrecognised channel mode",
        )
    }
}

/// RCP 0x80E7 -- channel status response. Repeater -> host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelStatusResponse {
    pub result: ResultCode,
    pub entries: Vec<ChannelStatusEntry>,
}

impl Decode for ChannelStatusResponse {
    const HEADER: MessageHeader = MessageHeader::Rcp;
    const OPCODE: u16 = 0x80E7;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        require_len(payload, 2)?;
        let result = require_enum(ResultCode::try_from(payload[0]), "unrecognised result code")?;
        let count = payload[1] as usize;
        let mut entries = Vec::with_capacity(count);
        let mut offset = 2;
        for _ in 0..count {
            require_len(payload, offset + 5)?;
            let target = payload[offset];
            let value = i32::from_le_bytes(payload[offset + 1..offset + 5].try_into().unwrap());
            entries.push(ChannelStatusEntry { target, value });
            offset += 5;
        }
        Ok(Self { result, entries })
    }
}

/// RCP 0x0841 -- call request. Host -> repeater.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallRequest {
    pub call_type: CallType,
    pub dest_id: u32,
}

impl Encode for CallRequest {
    const HEADER: MessageHeader = MessageHeader::Rcp;
    const OPCODE: u16 = 0x0841;
    const RELIABLE: bool = true;

    fn encode_payload(&self, buf: &mut BytesMut) {
        buf.put_u8(self.call_type.into());
        buf.put_u32_le(self.dest_id);
    }
}

/// RCP 0x8841 -- call response. Repeater -> host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallResponse {
    pub result: ResultCode,
}

impl Decode for CallResponse {
    const HEADER: MessageHeader = MessageHeader::Rcp;
    const OPCODE: u16 = 0x8841;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        require_len(payload, 1)?;
        Ok(Self {
            result: require_enum(ResultCode::try_from(payload[0]), "unrecognised result code")?,
        })
    }
}

/// RCP 0xB843 -- broadcast transmit status. Repeater -> host. `process` and `call_type` are wire
/// widths wider than their enum's discriminant range; [`Self::process_type`]/[`Self::call_type`]
/// decode the low byte, which is where the source's 0-10/0-7 values live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastTxStatus {
    pub process: u16,
    pub source: u16,
    pub call_type: u16,
    pub target_id: u32,
}

impl BroadcastTxStatus {
    pub fn process_type(&self) -> Result<ProcessType> {
        require_enum(ProcessType::try_from(self.process as u8), "unrecognised process type")
    }

    pub fn call_type(&self) -> Result<CallType> {
        require_enum(CallType::try_from(self.call_type as u8), "unrecognised call type")
    }
}

impl Decode for BroadcastTxStatus {
    const HEADER: MessageHeader = MessageHeader::Rcp;
    const OPCODE: u16 = 0xB843;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        require_len(payload, 10)?;
        Ok(Self {
            process: u16::from_le_bytes(payload[0..2].try_into().unwrap()),
            source: u16::from_le_bytes(payload[2..4].try_into().unwrap()),
            call_type: u16::from_le_bytes(payload[4..6].try_into().unwrap()),
            target_id: u32::from_le_bytes(payload[6..10].try_into().unwrap()),
        })
    }
}

/// RCP 0xB845 -- repeater broadcast transmit status. Repeater -> host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeaterBroadcastTxStatus {
    pub mode: u16,
    pub status: u16,
    pub service_type: u16,
    pub call_type: u16,
    pub target_id: u32,
    pub sender_id: u32,
}

impl Decode for RepeaterBroadcastTxStatus {
    const HEADER: MessageHeader = MessageHeader::Rcp;
    const OPCODE: u16 = 0xB845;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        require_len(payload, 16)?;
        Ok(Self {
            mode: u16::from_le_bytes(payload[0..2].try_into().unwrap()),
            status: u16::from_le_bytes(payload[2..4].try_into().unwrap()),
            service_type: u16::from_le_bytes(payload[4..6].try_into().unwrap()),
            call_type: u16::from_le_bytes(payload[6..8].try_into().unwrap()),
            target_id: u32::from_le_bytes(payload[8..12].try_into().unwrap()),
            sender_id: u32::from_le_bytes(payload[12..16].try_into().unwrap()),
        })
    }
}

/// RRS 0x0001 -- offline notice. Repeater -> host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RrsOffline {
    pub radio_ip: u32,
}

impl Decode for RrsOffline {
    const HEADER: MessageHeader = MessageHeader::Rrs;
    const OPCODE: u16 = 0x0001;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        require_len(payload, 4)?;
        Ok(Self {
            radio_ip: u32::from_be_bytes(payload[0..4].try_into().unwrap()),
        })
    }
}

/// RRS 0x0003 -- registration. Repeater -> host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RrsRegistration {
    pub radio_ip: u32,
}

impl Decode for RrsRegistration {
    const HEADER: MessageHeader = MessageHeader::Rrs;
    const OPCODE: u16 = 0x0003;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        require_len(payload, 4)?;
        Ok(Self {
            radio_ip: u32::from_be_bytes(payload[0..4].try_into().unwrap()),
        })
    }
}

fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Shared fields of the four TMP text-message variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmpTextMessage {
    pub seq: u32,
    pub dest_ip: u32,
    pub src_ip: u32,
    pub text: String,
}

fn decode_tmp_text(payload: &[u8]) -> Result<TmpTextMessage> {
    require_len(payload, 12)?;
    Ok(TmpTextMessage {
        seq: u32::from_be_bytes(payload[0..4].try_into().unwrap()),
        dest_ip: u32::from_be_bytes(payload[4..8].try_into().unwrap()),
        src_ip: u32::from_be_bytes(payload[8..12].try_into().unwrap()),
        text: decode_utf16le(&payload[12..]),
    })
}

/// Shared fields of the TMP message-answer variants (no text body).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TmpAnswer {
    pub seq: u32,
    pub dest_ip: u32,
    pub src_ip: u32,
}

fn decode_tmp_answer(payload: &[u8]) -> Result<TmpAnswer> {
    require_len(payload, 12)?;
    Ok(TmpAnswer {
        seq: u32::from_be_bytes(payload[0..4].try_into().unwrap()),
        dest_ip: u32::from_be_bytes(payload[4..8].try_into().unwrap()),
        src_ip: u32::from_be_bytes(payload[8..12].try_into().unwrap()),
    })
}

/// TMP 0x00A1 -- private message requiring acknowledgement. Repeater -> host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmpPrivateMsg(pub TmpTextMessage);

impl Decode for TmpPrivateMsg {
    const HEADER: MessageHeader = MessageHeader::Tmp;
    const OPCODE: u16 = 0x00A1;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        decode_tmp_text(payload).map(Self)
    }
}

/// TMP 0x00A2 -- private message answer. Repeater -> host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TmpPrivateMsgAnswer(pub TmpAnswer);

impl Decode for TmpPrivateMsgAnswer {
    const HEADER: MessageHeader = MessageHeader::Tmp;
    const OPCODE: u16 = 0x00A2;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        decode_tmp_answer(payload).map(Self)
    }
}

/// TMP 0x00B1 -- group message. Repeater -> host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmpGroupMsg(pub TmpTextMessage);

impl Decode for TmpGroupMsg {
    const HEADER: MessageHeader = MessageHeader::Tmp;
    const OPCODE: u16 = 0x00B1;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        decode_tmp_text(payload).map(Self)
    }
}

/// TMP 0x00B2 -- group message answer. Repeater -> host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TmpGroupMsgAnswer(pub TmpAnswer);

impl Decode for TmpGroupMsgAnswer {
    const HEADER: MessageHeader = MessageHeader::Tmp;
    const OPCODE: u16 = 0x00B2;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        decode_tmp_answer(payload).map(Self)
    }
}

/// TMP 0x80A1 -- private message, no acknowledgement requested. Repeater -> host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmpPrivateMsgNoAck(pub TmpTextMessage);

impl Decode for TmpPrivateMsgNoAck {
    const HEADER: MessageHeader = MessageHeader::Tmp;
    const OPCODE: u16 = 0x80A1;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        decode_tmp_text(payload).map(Self)
    }
}

/// The result of dispatching a decoded [`TxCtrlFrame`] to its typed sub-decoder by `(header,
/// opcode)`. `Unknown` carries the frame through unexamined rather than losing it, mirroring
/// [`crate::hyt::HytMessage::Unknown`]'s role for the outer HYT type byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedTxCtrl {
    ButtonResponse(ButtonResponse),
    ChannelStatusResponse(ChannelStatusResponse),
    CallResponse(CallResponse),
    BroadcastTxStatus(BroadcastTxStatus),
    RepeaterBroadcastTxStatus(RepeaterBroadcastTxStatus),
    RrsOffline(RrsOffline),
    RrsRegistration(RrsRegistration),
    TmpPrivateMsg(TmpPrivateMsg),
    TmpPrivateMsgAnswer(TmpPrivateMsgAnswer),
    TmpGroupMsg(TmpGroupMsg),
    TmpGroupMsgAnswer(TmpGroupMsgAnswer),
    TmpPrivateMsgNoAck(TmpPrivateMsgNoAck),
    Unknown(TxCtrlFrame),
}

/// Dispatches `frame` on `(header, opcode)` to whichever sub-decoder matches, per
/// `original_source/HyteraADK/packet.py`'s `__subclasses__()` lookup at decode time.
pub fn decode_dispatch(frame: &TxCtrlFrame) -> Result<DecodedTxCtrl> {
    macro_rules! try_decode {
        ($variant:ident, $ty:ty) => {
            if frame.header == <$ty>::HEADER && frame.opcode == <$ty>::OPCODE {
                return Ok(DecodedTxCtrl::$variant(<$ty>::from_frame(frame)?));
            }
        };
    }

    try_decode!(ButtonResponse, ButtonResponse);
    try_decode!(ChannelStatusResponse, ChannelStatusResponse);
    try_decode!(CallResponse, CallResponse);
    try_decode!(BroadcastTxStatus, BroadcastTxStatus);
    try_decode!(RepeaterBroadcastTxStatus, RepeaterBroadcastTxStatus);
    try_decode!(RrsOffline, RrsOffline);
    try_decode!(RrsRegistration, RrsRegistration);
    try_decode!(TmpPrivateMsg, TmpPrivateMsg);
    try_decode!(TmpPrivateMsgAnswer, TmpPrivateMsgAnswer);
    try_decode!(TmpGroupMsg, TmpGroupMsg);
    try_decode!(TmpGroupMsgAnswer, TmpGroupMsgAnswer);
    try_decode!(TmpPrivateMsgNoAck, TmpPrivateMsgNoAck);

    Ok(DecodedTxCtrl::Unknown(frame.clone()))
}
