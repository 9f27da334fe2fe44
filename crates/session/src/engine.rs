//! The per-port UDP session: SYN/SYN-ACK handshake, heartbeat watchdog, sequence generation, and
//! ack matching, driving two Tokio tasks plus a watchdog task.
//!
//! Grounded primarily on `original_source/hylink/socket.py` (the newer, more complete variant —
//! proactive heartbeat synthesis on tx-queue idle, `FromRadio` ack-echo-then-callback, catch-all
//! exception logging), with the `Watchdog` shape and concurrency-primitive choices
//! (`parking_lot`, `ahash`, atomics) grounded on
//! `examples/mycrl-turn-rs/crates/service/src/session/mod.rs`'s `SessionManager`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ahash::HashMap;
use codec::hyt::HytMessage;
use codec::rtp::RtpPacket;
use parking_lot::Mutex;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, Mutex as AsyncMutex, Notify};
use tokio::task::JoinHandle;

use crate::config::SessionConfig;
use crate::error::{Error, Result};

/// One-shot callback invoked exactly once when the matching `Ack` arrives. Never reaped if the
/// ack never arrives — see `DESIGN.md`'s "no callback-ack reaping" open-question decision.
pub type AckCallback = Box<dyn FnOnce(u16) + Send>;
type MessageCallback = Arc<dyn Fn(HytMessage) + Send + Sync>;
type RtpCallback = Arc<dyn Fn(RtpPacket) + Send + Sync>;

enum Outbound {
    Hyt(HytMessage),
    Rtp(RtpPacket),
}

struct Shared {
    repeater_addr: Mutex<Option<SocketAddr>>,
    seq: AtomicU32,
    running: AtomicBool,
    ack_callbacks: Mutex<HashMap<u16, AckCallback>>,
    ack_tx: mpsc::UnboundedSender<u16>,
    message_callback: Mutex<Option<MessageCallback>>,
    rtp_callback: Mutex<Option<RtpCallback>>,
    config: SessionConfig,
}

impl Shared {
    /// Returns the current sequence value then increments it modulo 2^16, mirroring
    /// `ADKSocket._getSeq`.
    fn next_seq(&self) -> u16 {
        let prev = self.seq.fetch_add(1, Ordering::Relaxed);
        (prev & 0xFFFF) as u16
    }

    fn reset_seq(&self, value: u16) {
        self.seq.store(value as u32, Ordering::Relaxed);
    }

    fn is_connected(&self) -> bool {
        self.repeater_addr.lock().is_some()
    }
}

struct Workers {
    rx: JoinHandle<()>,
    tx: JoinHandle<()>,
    watchdog: JoinHandle<()>,
}

/// A live UDP endpoint bound to one repeater port. One `PortSession` corresponds to one `(host
/// port, repeater)` pairing per SPEC_FULL.md §4.5/§4.4.
pub struct PortSession {
    shared: Arc<Shared>,
    local_addr: SocketAddr,
    tx_tx: mpsc::UnboundedSender<Outbound>,
    ack_rx: AsyncMutex<mpsc::UnboundedReceiver<u16>>,
    shutdown: Arc<Notify>,
    workers: AsyncMutex<Option<Workers>>,
}

impl PortSession {
    /// Binds a UDP socket at `bind_addr` and starts the rx/tx/watchdog tasks.
    pub async fn open(bind_addr: SocketAddr, config: SessionConfig) -> Result<Self> {
        let socket = Arc::new(UdpSocket::bind(bind_addr).await?);
        let local_addr = socket.local_addr()?;

        let (tx_tx, tx_rx) = mpsc::unbounded_channel();
        let (ack_tx, ack_rx) = mpsc::unbounded_channel();
        let (pet_tx, pet_rx) = mpsc::unbounded_channel();
        let shutdown = Arc::new(Notify::new());

        let shared = Arc::new(Shared {
            repeater_addr: Mutex::new(None),
            seq: AtomicU32::new(0),
            running: AtomicBool::new(true),
            ack_callbacks: Mutex::new(HashMap::default()),
            ack_tx,
            message_callback: Mutex::new(None),
            rtp_callback: Mutex::new(None),
            config,
        });

        let rx = tokio::spawn(rx_loop(
            socket.clone(),
            shared.clone(),
            tx_tx.clone(),
            pet_tx,
            shutdown.clone(),
        ));
        let tx = tokio::spawn(tx_loop(socket, shared.clone(), tx_rx, shutdown.clone()));
        let watchdog = tokio::spawn(watchdog_loop(shared.clone(), pet_rx, shutdown.clone()));

        Ok(Self {
            shared,
            local_addr,
            tx_tx,
            ack_rx: AsyncMutex::new(ack_rx),
            shutdown,
            workers: AsyncMutex::new(Some(Workers { rx, tx, watchdog })),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_connected(&self) -> bool {
        self.shared.is_connected()
    }

    /// Sends a HYT message with no ack callback. If the message is a `ToRadio`, this blocks
    /// until an ack arrives or `ack_timeout` elapses, matching `ADKSocket.send`'s blocking path
    /// verbatim, including its documented imprecision: the returned ack is not verified to carry
    /// the same seqId as the send (see `DESIGN.md`).
    pub async fn send(&self, message: HytMessage) -> Result<Option<u16>> {
        self.send_inner(message, None).await
    }

    /// Sends a HYT message, invoking `callback` exactly once when its ack arrives (if the
    /// message is a `ToRadio`). Never blocks.
    pub fn send_with_callback(&self, message: HytMessage, callback: AckCallback) -> Result<Option<u16>> {
        self.send_immediate(message, Some(callback))
    }

    async fn send_inner(&self, message: HytMessage, callback: Option<AckCallback>) -> Result<Option<u16>> {
        let blocking = message.expects_ack() && callback.is_none();
        let seq_id = self.send_immediate(message, callback)?;
        if blocking && let Some(seq_id) = seq_id {
            let ack = self.wait_ack(Some(self.shared.config.ack_timeout)).await?;
            log::debug!("blocking send acknowledged: sent seq={seq_id}, ack={ack}");
        }
        Ok(seq_id)
    }

    fn send_immediate(&self, message: HytMessage, callback: Option<AckCallback>) -> Result<Option<u16>> {
        if !self.shared.is_connected() {
            log::warn!("can't send -- not connected to repeater. message={message:?}");
            return Err(Error::SendWhileDisconnected);
        }

        let seq_id = self.shared.next_seq();
        let message = message.with_seq_id(seq_id);
        if message.expects_ack() && let Some(cb) = callback {
            self.shared.ack_callbacks.lock().insert(seq_id, cb);
        }

        self.tx_tx
            .send(Outbound::Hyt(message))
            .map_err(|_| Error::Io(broken_pipe()))?;

        Ok(Some(seq_id))
    }

    /// Enqueues an RTP packet for immediate send. No sequence number, no ack tracking — matches
    /// `ADKSocket.send`'s RTP fast path.
    pub fn send_rtp(&self, packet: RtpPacket) -> Result<()> {
        self.tx_tx
            .send(Outbound::Rtp(packet))
            .map_err(|_| Error::Io(broken_pipe()))
    }

    /// Waits for the next acknowledgement in the FIFO. `None` blocks forever, `Some(ZERO)` is
    /// non-blocking, `Some(d)` blocks with a deadline. The FIFO is not keyed by seqId — see the
    /// "blocking send ack matching" open issue in `DESIGN.md`.
    pub async fn wait_ack(&self, timeout: Option<Duration>) -> Result<u16> {
        let mut rx = self.ack_rx.lock().await;
        match timeout {
            None => rx.recv().await.ok_or(Error::AckTimeout),
            Some(d) if d.is_zero() => rx.try_recv().map_err(|_| Error::AckTimeout),
            Some(d) => tokio::time::timeout(d, rx.recv())
                .await
                .map_err(|_| Error::AckTimeout)?
                .ok_or(Error::AckTimeout),
        }
    }

    pub fn set_message_callback<F>(&self, f: F)
    where
        F: Fn(HytMessage) + Send + Sync + 'static,
    {
        *self.shared.message_callback.lock() = Some(Arc::new(f));
    }

    pub fn set_rtp_callback<F>(&self, f: F)
    where
        F: Fn(RtpPacket) + Send + Sync + 'static,
    {
        *self.shared.rtp_callback.lock() = Some(Arc::new(f));
    }

    /// Signals shutdown to all three tasks and waits for them to exit.
    pub async fn stop(&self) {
        self.shared.running.store(false, Ordering::Relaxed);
        self.shutdown.notify_waiters();

        if let Some(workers) = self.workers.lock().await.take() {
            let _ = tokio::join!(workers.rx, workers.tx, workers.watchdog);
        }
    }
}

fn broken_pipe() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::BrokenPipe, "session worker has stopped")
}

async fn rx_loop(
    socket: Arc<UdpSocket>,
    shared: Arc<Shared>,
    tx_tx: mpsc::UnboundedSender<Outbound>,
    pet_tx: mpsc::UnboundedSender<()>,
    shutdown: Arc<Notify>,
) {
    log::debug!("rx worker running");
    let mut buf = [0u8; 2048];

    while shared.running.load(Ordering::Relaxed) {
        tokio::select! {
            _ = shutdown.notified() => break,
            result = socket.recv_from(&mut buf) => {
                match result {
                    Ok((0, _)) => continue,
                    Ok((n, addr)) => handle_inbound(&buf[..n], addr, &shared, &tx_tx, &pet_tx),
                    Err(err) => log::error!("rx socket error: {err}"),
                }
            }
        }
    }

    log::info!("rx worker shutting down");
}

/// Looks up and removes a pending ack callback for `seq_id`, falling back to its byte-swapped
/// form. Some repeaters echo the outer `seqId` little-endian instead of the canonical big-endian
/// this crate always sends (spec.md's "first-HYT-byte for Ack/Heartbeat" open question); a raw
/// `u16` can't be decoded as wrong, so the tolerance lives here, at the point where a mismatch
/// would actually be observable, rather than in `HytMessage::decode`. Returns the key the
/// callback was actually registered under, which is what callers should treat as the real seq_id.
fn take_ack_callback(shared: &Shared, seq_id: u16) -> Option<(u16, AckCallback)> {
    let mut callbacks = shared.ack_callbacks.lock();
    if let Some(callback) = callbacks.remove(&seq_id) {
        return Some((seq_id, callback));
    }
    let swapped = seq_id.swap_bytes();
    callbacks.remove(&swapped).map(|callback| (swapped, callback))
}

fn handle_inbound(
    data: &[u8],
    addr: SocketAddr,
    shared: &Shared,
    tx_tx: &mpsc::UnboundedSender<Outbound>,
    pet_tx: &mpsc::UnboundedSender<()>,
) {
    match HytMessage::decode(data, &shared.config.codec) {
        Ok(msg) => {
            log::debug!("packet received, addr={addr}, msg={msg:?}");

            match &msg {
                HytMessage::Syn { seq_id, header } => {
                    log::debug!("SYN... repeater id {:?}, addr={addr}", header.radio_id);
                    *shared.repeater_addr.lock() = Some(addr);
                    shared.reset_seq(*seq_id);
                    let synack_seq = shared.next_seq();
                    let _ = tx_tx.send(Outbound::Hyt(HytMessage::SynAck { seq_id: synack_seq }));
                }
                HytMessage::Heartbeat { .. } => {
                    // Keepalive only; the tx worker synthesizes heartbeats on idle, it does not
                    // echo on receipt (see original_source/hylink/socket.py).
                }
                HytMessage::Ack { seq_id } => {
                    let seq_id = *seq_id;
                    match take_ack_callback(shared, seq_id) {
                        Some((matched_seq_id, callback)) => {
                            if matched_seq_id != seq_id {
                                log::debug!(
                                    "ack seq={seq_id} matched callback registered under \
                                     byte-swapped seq={matched_seq_id}"
                                );
                            }
                            callback(matched_seq_id);
                        }
                        None => {
                            let _ = shared.ack_tx.send(seq_id);
                        }
                    }
                }
                HytMessage::FromRadio { seq_id, txctrl, .. } => {
                    let seq_id = *seq_id;
                    if shared.is_connected() {
                        let _ = tx_tx.send(Outbound::Hyt(HytMessage::Ack { seq_id }));
                        match codec::txctrl::messages::decode_dispatch(txctrl) {
                            Ok(decoded) => log::debug!("FromRadio seq={seq_id} dispatched: {decoded:?}"),
                            Err(err) => log::warn!("FromRadio seq={seq_id} sub-message decode error: {err}"),
                        }
                        if let Some(callback) = shared.message_callback.lock().clone() {
                            callback(msg.clone());
                        }
                    } else {
                        log::warn!("discarding FromRadio while disconnected: seq={seq_id}");
                    }
                }
                other => log::warn!("rx packet, unrecognised: {other:?}"),
            }

            let _ = pet_tx.send(());
        }
        Err(codec::Error::BadSignature) => match RtpPacket::decode(data) {
            Ok(packet) => {
                if let Some(callback) = shared.rtp_callback.lock().clone() {
                    callback(packet);
                }
                let _ = pet_tx.send(());
            }
            Err(err) => log::warn!("failed to decode as HYT or RTP: {err}"),
        },
        Err(err) => log::warn!("packet decode error: {err}"),
    }
}

async fn tx_loop(
    socket: Arc<UdpSocket>,
    shared: Arc<Shared>,
    mut tx_rx: mpsc::UnboundedReceiver<Outbound>,
    shutdown: Arc<Notify>,
) {
    log::debug!("tx worker running");
    let mut interval = tokio::time::interval(shared.config.heartbeat_interval);
    interval.tick().await; // the first tick fires immediately; consume it

    while shared.running.load(Ordering::Relaxed) {
        tokio::select! {
            _ = shutdown.notified() => break,
            item = tx_rx.recv() => {
                match item {
                    Some(item) => send_item(&socket, &shared, item).await,
                    None => break,
                }
            }
            _ = interval.tick() => {
                if shared.is_connected() {
                    send_item(&socket, &shared, Outbound::Hyt(HytMessage::Heartbeat { seq_id: 0 })).await;
                }
            }
        }
    }

    log::info!("tx worker shutting down");
}

async fn send_item(socket: &UdpSocket, shared: &Shared, item: Outbound) {
    let addr = match *shared.repeater_addr.lock() {
        Some(addr) => addr,
        None => {
            log::warn!("can't send -- not connected to repeater");
            return;
        }
    };

    let bytes = match item {
        Outbound::Hyt(msg) => match msg.encode() {
            Ok(bytes) => bytes,
            Err(err) => {
                log::error!("failed to encode outbound message: {err}");
                return;
            }
        },
        Outbound::Rtp(packet) => match packet.encode() {
            Ok(bytes) => bytes,
            Err(err) => {
                log::error!("failed to encode outbound rtp packet: {err}");
                return;
            }
        },
    };

    if let Err(err) = socket.send_to(&bytes, addr).await {
        log::error!("send failed: {err}");
    }
}

async fn watchdog_loop(shared: Arc<Shared>, mut pet_rx: mpsc::UnboundedReceiver<()>, shutdown: Arc<Notify>) {
    log::debug!("watchdog running");
    let timeout = shared.config.heartbeat_timeout;

    while shared.running.load(Ordering::Relaxed) {
        tokio::select! {
            _ = shutdown.notified() => break,
            result = tokio::time::timeout(timeout, pet_rx.recv()) => {
                match result {
                    Ok(Some(())) => continue,
                    Ok(None) => break,
                    Err(_elapsed) => {
                        log::error!(
                            "watchdog: no packets in {} seconds -- disconnecting",
                            timeout.as_secs()
                        );
                        *shared.repeater_addr.lock() = None;
                    }
                }
            }
        }
    }

    log::debug!("watchdog shutting down");
}
