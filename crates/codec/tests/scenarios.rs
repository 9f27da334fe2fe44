//! Black-box, public-API replays of the worked scenarios, exercising the HYT, TxCtrl, and RTP
//! codecs the way a session engine actually would: decode/encode through the crate root, not
//! through any module-private helper.

use bytes::Bytes;
use hytera_adk_codec::enums::{ButtonOperation, ButtonTarget, CallType, MessageHeader};
use hytera_adk_codec::hyt::HytMessage;
use hytera_adk_codec::rtp::{RtpExtension, RtpPacket};
use hytera_adk_codec::txctrl::messages::{decode_dispatch, ButtonRequest, CallRequest, DecodedTxCtrl, Encode};
use hytera_adk_codec::txctrl::TxCtrlFrame;
use hytera_adk_codec::CodecConfig;

#[test]
fn s1_syn_decode() {
    let buf = [
        0x32, 0x42, 0x00, 0x24, 0x00, 0x00, 0x83, 0x04, 0x00, 0x01, 0x86, 0x9F, 0x04, 0x01, 0x01,
        0x00, 0x00, 0x00,
    ];
    let msg = HytMessage::decode(&buf, &CodecConfig::default()).unwrap();
    let HytMessage::Syn { seq_id, header } = msg else {
        panic!("expected Syn");
    };
    assert_eq!(seq_id, 0);
    assert_eq!(header.radio_id, Some(99999));
    assert_eq!(header.timeslot, Some(1));
}

#[test]
fn s2_synack_encode() {
    let encoded = HytMessage::SynAck { seq_id: 1 }.encode().unwrap();
    assert_eq!(&encoded[..], &[0x32, 0x42, 0x00, 0x05, 0x00, 0x01]);
}

#[test]
fn s3_call_request_encode_through_hyt_layer() {
    let request = CallRequest {
        call_type: CallType::Private,
        dest_id: 1234,
    };
    let msg = HytMessage::ToRadio {
        seq_id: 9,
        txctrl: request.to_frame(),
    };
    let encoded = msg.encode().unwrap();
    assert_eq!(
        &encoded[6..],
        &[0x82, 0x41, 0x08, 0x05, 0x00, 0x00, 0xD2, 0x04, 0x00, 0x00, 0x0E, 0x03]
    );
}

#[test]
fn s4_button_press_then_release() {
    let press = ButtonRequest {
        target: ButtonTarget::FrontPtt,
        operation: ButtonOperation::Press,
    }
    .to_frame()
    .encode();
    let release = ButtonRequest {
        target: ButtonTarget::FrontPtt,
        operation: ButtonOperation::Release,
    }
    .to_frame()
    .encode();
    assert_eq!(press[6], 0x01);
    assert_eq!(release[6], 0x00);
    assert_ne!(press, release);
}

#[test]
fn s5_rrs_registration_via_from_radio_and_dispatch() {
    let mut buf = vec![0x32, 0x42, 0x00, 0x20, 0x00, 0x02, 0x04, 0x01, 0x01];
    let txctrl = TxCtrlFrame {
        header: MessageHeader::Rrs,
        reliable: false,
        opcode: 0x0003,
        payload: Bytes::from_static(&[0x0A, 0x00, 0x04, 0xD2]),
    };
    buf.extend_from_slice(&txctrl.encode());

    let msg = HytMessage::decode(&buf, &CodecConfig::default()).unwrap();
    let HytMessage::FromRadio { txctrl, .. } = &msg else {
        panic!("expected FromRadio");
    };

    match decode_dispatch(txctrl).unwrap() {
        DecodedTxCtrl::RrsRegistration(reg) => assert_eq!(reg.radio_ip, 0x0A00_04D2),
        other => panic!("expected RrsRegistration, got {other:?}"),
    }
}

#[test]
fn s6_rtp_silent_frame_round_trips() {
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
    let decoded = RtpPacket::decode(&encoded).unwrap();
    assert_eq!(decoded, packet);
}
