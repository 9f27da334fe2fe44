//! Loopback UDP tests for the port session engine's SYN handshake, sequence generator, watchdog,
//! heartbeat pacing, ack echo, and shutdown behavior (spec.md §8 properties 7-12).

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use codec::enums::MessageHeader;
use codec::hyt::HytMessage;
use codec::txctrl::TxCtrlFrame;
use hytera_adk_session::{PortSession, SessionConfig};
use tokio::net::UdpSocket;
use tokio::time::timeout;

fn build_syn(seq_id: u16, radio_id: u32, timeslot: u8) -> Vec<u8> {
    let mut buf = vec![0x32, 0x42, 0x00, 0x24];
    buf.extend_from_slice(&seq_id.to_be_bytes());
    buf.push(0x83);
    buf.push(4);
    buf.extend_from_slice(&radio_id.to_be_bytes());
    buf.push(0x04);
    buf.push(1);
    buf.push(timeslot);
    buf
}

fn build_from_radio(seq_id: u16) -> Vec<u8> {
    let mut buf = vec![0x32, 0x42, 0x00, 0x20];
    buf.extend_from_slice(&seq_id.to_be_bytes());
    buf.push(0x04); // last TLV entry, tag 4 (timeslot)
    buf.push(1);
    buf.push(1);
    let txctrl = TxCtrlFrame {
        header: MessageHeader::Rrs,
        reliable: false,
        opcode: 0x0003,
        payload: Bytes::from_static(&[0x0A, 0x00, 0x04, 0xD2]),
    };
    buf.extend_from_slice(&txctrl.encode());
    buf
}

async fn new_repeater() -> UdpSocket {
    UdpSocket::bind("127.0.0.1:0").await.unwrap()
}

#[tokio::test]
async fn syn_handshake_connects_and_resets_sequence() {
    let repeater = new_repeater().await;
    let session = PortSession::open("127.0.0.1:0".parse().unwrap(), SessionConfig::default())
        .await
        .unwrap();

    assert!(!session.is_connected());

    let syn = build_syn(7, 99999, 1);
    repeater.send_to(&syn, session.local_addr()).await.unwrap();

    // Wait for the SynAck the session emits in response.
    let mut buf = [0u8; 64];
    let (n, _) = timeout(Duration::from_secs(1), repeater.recv_from(&mut buf))
        .await
        .unwrap()
        .unwrap();
    let reply = HytMessage::decode(&buf[..n], &Default::default()).unwrap();
    assert!(matches!(reply, HytMessage::SynAck { .. }));

    assert!(session.is_connected());

    session.stop().await;
}

#[tokio::test]
async fn sequence_allocation_resumes_from_syn_seq_id() {
    let repeater = new_repeater().await;
    let session = PortSession::open("127.0.0.1:0".parse().unwrap(), SessionConfig::default())
        .await
        .unwrap();

    let syn = build_syn(5, 1, 1);
    repeater.send_to(&syn, session.local_addr()).await.unwrap();

    let mut buf = [0u8; 64];
    let (n, addr) = timeout(Duration::from_secs(1), repeater.recv_from(&mut buf))
        .await
        .unwrap()
        .unwrap();
    let synack = HytMessage::decode(&buf[..n], &Default::default()).unwrap();
    assert_eq!(synack.seq_id(), 5);

    // Next allocation after the SynAck (seq 5) must be 6. `send` blocks awaiting an ack, so the
    // fake repeater's ack reply must be driven concurrently with it.
    let request = HytMessage::ToRadio {
        seq_id: 0,
        txctrl: TxCtrlFrame {
            header: MessageHeader::Rcp,
            reliable: true,
            opcode: 0x0041,
            payload: Bytes::from_static(&[0x03, 0x01]),
        },
    };

    let send_fut = session.send(request);
    let ack_fut = async {
        let mut ack_buf = [0u8; 64];
        let (n, _) = timeout(Duration::from_secs(1), repeater.recv_from(&mut ack_buf))
            .await
            .unwrap()
            .unwrap();
        let sent = HytMessage::decode(&ack_buf[..n], &Default::default()).unwrap();
        let ack = HytMessage::Ack {
            seq_id: sent.seq_id(),
        }
        .encode()
        .unwrap();
        repeater.send_to(&ack, addr).await.unwrap();
        sent.seq_id()
    };

    let (seq_id, sent_seq) = tokio::join!(send_fut, ack_fut);
    assert_eq!(seq_id.unwrap(), Some(6));
    assert_eq!(sent_seq, 6);

    session.stop().await;
}

#[tokio::test]
async fn from_radio_is_acked_and_forwarded_to_callback() {
    let repeater = new_repeater().await;
    let session = PortSession::open("127.0.0.1:0".parse().unwrap(), SessionConfig::default())
        .await
        .unwrap();

    let syn = build_syn(0, 1, 1);
    repeater.send_to(&syn, session.local_addr()).await.unwrap();
    let mut buf = [0u8; 64];
    timeout(Duration::from_secs(1), repeater.recv_from(&mut buf))
        .await
        .unwrap()
        .unwrap();

    let received = Arc::new(AtomicUsize::new(0));
    let received_clone = received.clone();
    session.set_message_callback(move |_msg| {
        received_clone.fetch_add(1, Ordering::SeqCst);
    });

    let from_radio = build_from_radio(11);
    repeater
        .send_to(&from_radio, session.local_addr())
        .await
        .unwrap();

    let (n, _) = timeout(Duration::from_secs(1), repeater.recv_from(&mut buf))
        .await
        .unwrap()
        .unwrap();
    let ack = HytMessage::decode(&buf[..n], &Default::default()).unwrap();
    assert!(matches!(ack, HytMessage::Ack { seq_id: 11 }));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(received.load(Ordering::SeqCst), 1);

    session.stop().await;
}

#[tokio::test]
async fn heartbeat_emitted_while_connected_idle() {
    let repeater = new_repeater().await;
    let config = SessionConfig {
        heartbeat_interval: Duration::from_millis(50),
        ..SessionConfig::default()
    };
    let session = PortSession::open("127.0.0.1:0".parse().unwrap(), config)
        .await
        .unwrap();

    let syn = build_syn(0, 1, 1);
    repeater.send_to(&syn, session.local_addr()).await.unwrap();
    let mut buf = [0u8; 64];
    timeout(Duration::from_secs(1), repeater.recv_from(&mut buf))
        .await
        .unwrap()
        .unwrap(); // SynAck

    let (n, _) = timeout(Duration::from_millis(500), repeater.recv_from(&mut buf))
        .await
        .unwrap()
        .unwrap();
    let heartbeat = HytMessage::decode(&buf[..n], &Default::default()).unwrap();
    assert!(matches!(heartbeat, HytMessage::Heartbeat { seq_id: 0 }));

    session.stop().await;
}

#[tokio::test]
async fn no_heartbeat_while_disconnected() {
    let repeater = new_repeater().await;
    let config = SessionConfig {
        heartbeat_interval: Duration::from_millis(30),
        ..SessionConfig::default()
    };
    let session = PortSession::open("127.0.0.1:0".parse().unwrap(), config)
        .await
        .unwrap();

    let mut buf = [0u8; 64];
    let result = timeout(Duration::from_millis(150), repeater.recv_from(&mut buf)).await;
    assert!(result.is_err(), "no datagrams should arrive while disconnected");

    session.stop().await;
}

#[tokio::test]
async fn watchdog_disconnects_after_timeout() {
    let repeater = new_repeater().await;
    let config = SessionConfig {
        heartbeat_timeout: Duration::from_millis(80),
        heartbeat_interval: Duration::from_secs(30),
        ..SessionConfig::default()
    };
    let session = PortSession::open("127.0.0.1:0".parse().unwrap(), config)
        .await
        .unwrap();

    let syn = build_syn(0, 1, 1);
    repeater.send_to(&syn, session.local_addr()).await.unwrap();
    let mut buf = [0u8; 64];
    timeout(Duration::from_secs(1), repeater.recv_from(&mut buf))
        .await
        .unwrap()
        .unwrap();
    assert!(session.is_connected());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!session.is_connected());

    session.stop().await;
}

#[tokio::test]
async fn ack_callback_matches_byte_swapped_seq_id() {
    let repeater = new_repeater().await;
    let session = PortSession::open("127.0.0.1:0".parse().unwrap(), SessionConfig::default())
        .await
        .unwrap();

    let syn = build_syn(0, 1, 1);
    repeater.send_to(&syn, session.local_addr()).await.unwrap();
    let mut buf = [0u8; 64];
    let (_, addr) = timeout(Duration::from_secs(1), repeater.recv_from(&mut buf))
        .await
        .unwrap()
        .unwrap(); // SynAck

    let request = HytMessage::ToRadio {
        seq_id: 0,
        txctrl: TxCtrlFrame {
            header: MessageHeader::Rcp,
            reliable: true,
            opcode: 0x0041,
            payload: Bytes::from_static(&[0x03, 0x01]),
        },
    };
    let matched = Arc::new(AtomicUsize::new(0));
    let matched_clone = matched.clone();
    let sent_seq_id = session
        .send_with_callback(
            request,
            Box::new(move |seq_id| {
                matched_clone.store(seq_id as usize, Ordering::SeqCst);
            }),
        )
        .unwrap()
        .unwrap();

    let (n, _) = timeout(Duration::from_secs(1), repeater.recv_from(&mut buf))
        .await
        .unwrap()
        .unwrap();
    let sent = HytMessage::decode(&buf[..n], &Default::default()).unwrap();
    assert_eq!(sent.seq_id(), sent_seq_id);

    // A nonconforming repeater echoes the seqId little-endian instead of big-endian.
    let swapped_ack = HytMessage::Ack {
        seq_id: sent_seq_id.swap_bytes(),
    }
    .encode()
    .unwrap();
    repeater.send_to(&swapped_ack, addr).await.unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(matched.load(Ordering::SeqCst), sent_seq_id as usize);

    session.stop().await;
}

#[tokio::test]
async fn stop_halts_sends() {
    let session = PortSession::open("127.0.0.1:0".parse().unwrap(), SessionConfig::default())
        .await
        .unwrap();
    session.stop().await;

    let request = HytMessage::Heartbeat { seq_id: 0 };
    // The session was never connected, so this is rejected either way; the meaningful
    // assertion is that `stop()` returned promptly with both workers joined.
    assert!(session.send(request).await.is_err());
}

// silence unused-import warning on platforms where SocketAddr is only used in type position
#[allow(dead_code)]
fn _assert_socket_addr_type(_: SocketAddr) {}
