use std::time::Duration;

use codec::CodecConfig;

/// Tunables for a [`crate::PortSession`]. Collapses the source's module-level constants
/// (`HEARTBEAT_TIMEOUT`, `HEARTBEAT_INTERVAL`, the default ack timeout) into a record passed at
/// construction, per SPEC_FULL.md §9's "no process-global state" redesign note.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// How long a blocking `send`/`waitAck` waits for an acknowledgement. Source default: 2s.
    pub ack_timeout: Duration,
    /// Cadence at which idle-while-connected sessions synthesize a heartbeat. Source: 2s.
    pub heartbeat_interval: Duration,
    /// How long without any inbound packet before the session considers itself disconnected.
    /// Source: 30s.
    pub heartbeat_timeout: Duration,
    pub codec: CodecConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ack_timeout: Duration::from_secs(2),
            heartbeat_interval: Duration::from_secs(2),
            heartbeat_timeout: Duration::from_secs(30),
            codec: CodecConfig::default(),
        }
    }
}
