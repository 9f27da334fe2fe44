/// Default UDP ports for each logical service/timeslot pairing.
///
/// Supplemented from `original_source/HyteraADK/ports.py`'s fuller `ADKDefaultPorts` table with
/// the timeslot-2 counterparts (`Rrs2`, `Lp2`, `Tp2`, `Tmp2`, `Sdm2`) that spec.md's distilled
/// example list dropped.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultPort {
    Rrs1 = 30001,
    Rrs2 = 30002,
    Lp1 = 30003,
    Lp2 = 30004,
    Tp1 = 30005,
    Tp2 = 30006,
    Tmp1 = 30007,
    Tmp2 = 30008,
    Rcp1 = 30009,
    Rcp2 = 30010,
    Rtp1 = 30012,
    Rtp2 = 30014,
    RcpAnalog = 30015,
    RtpAnalog = 30016,
    E2E1 = 30017,
    E2E2 = 30018,
    Sdm1 = 3017,
    Sdm2 = 3018,
}

impl DefaultPort {
    pub fn port(self) -> u16 {
        self as u16
    }
}
