use num_enum::{IntoPrimitive, TryFromPrimitive};

/// TxCtrl header's protocol class, packed into the low 7 bits of the frame's first byte.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum MessageHeader {
    Rcp = 0x02,
    Lp = 0x08,
    Tmp = 0x09,
    Rrs = 0x11,
    Tp = 0x12,
    Dtp = 0x13,
    Dds = 0x14,
}

impl MessageHeader {
    /// Opcode/length fields are little-endian only for RCP; every other class is big-endian.
    pub fn is_little_endian(self) -> bool {
        matches!(self, MessageHeader::Rcp)
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
pub enum CallType {
    Private = 0x00,
    Group = 0x01,
    AllCall = 0x02,
    EmergencyGroup = 0x03,
    RemoteMonitor = 0x04,
    PriorityPrivate = 0x05,
    PriorityGroup = 0x06,
    PriorityAll = 0x07,
}

/// The repeater's current activity on a call, reported in `RCP` status traffic.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
pub enum ProcessType {
    Unavailable = 0x00,
    VoiceTxOrRx = 0x01,
    HangTime = 0x02,
    CallEnd = 0x03,
    CallFail = 0x04,
    Tot = 0x05,
    TotPreAlert = 0x06,
    EmergencyAlarmTx = 0x07,
    EmergencyStay = 0x08,
    EmergencyCallTx = 0x09,
    EmergencyEnd = 0x0A,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
pub enum ButtonTarget {
    FrontPtt = 0x03,
    BackPtt = 0x1E,
    ChannelUp = 0x22,
    ChannelDown = 0x23,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
pub enum ButtonOperation {
    Release = 0x00,
    Press = 0x01,
    ShortPush = 0x02,
    LongPush = 0x03,
}

/// Which status parameter a `StatusQuery`/`StatusResponse` pair is about; the interpretation of
/// the accompanying value is parameter-specific (see `StatusValueChannelMode` for `ChannelMode`).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
pub enum StatusParameter {
    StatusOfAllChannels = 0x00,
    SquelchLevel = 0x01,
    CtcssCdcssMatchStatus = 0x02,
    PowerLevel = 0x03,
    TxFrequency = 0x04,
    RxFrequency = 0x05,
    TxAllow = 0x06,
    ChannelMode = 0x07,
    TalkaroundStatus = 0x08,
    Rssi = 0x09,
    CarrierStatus = 0x0A,
}

/// Valid values of a status entry's `value` field when its `parameter` is
/// [`StatusParameter::ChannelMode`]. A 4-byte signed field on the wire; `Invalid` is the source's
/// `0xFFFFFFFF` sentinel, stored as `-1` so the bit pattern matches.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
pub enum StatusValueChannelMode {
    ConventionalDigital = 0,
    ConventionalAnalog = 1,
    RepeaterDigital = 2,
    RepeaterAnalog = 3,
    TrunkingDigital = 4,
    TrunkingAnalog = 5,
    RepeaterMix = 6,
    Invalid = -1,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
pub enum ResultCode {
    Ok = 0x00,
    ChannelBusy = 0x01,
    RxOnly = 0x02,
    LowBattery = 0x03,
    PllUnlock = 0x04,
    PrivateCallNoAck = 0x05,
    RepeaterWakeupFail = 0x06,
    NoContact = 0x07,
    IgnitionPttDisable = 0x08,
    TotRekey = 0x09,
    TxDeny = 0x0A,
    TxInterrupted = 0x0B,
    InvalidParameter = 0x0C,
}

/// RTP payload type (the subset Hytera repeaters accept for voice).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
pub enum PayloadType {
    Pcmu = 0,
    Pcma = 8,
}
