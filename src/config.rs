//! Process configuration: which ports to bind, session tunables, and logging.
//!
//! Shape grounded on `examples/mycrl-turn-rs/src/config.rs` (kebab-case serde, `LogLevel` with a
//! hand-written `FromStr`, a `Cli` built with `clap::Parser`). That file parses its config as
//! TOML; this one uses `serde_json5`, matching the dependency the root `Cargo.toml` actually
//! carries (see `DESIGN.md`).

use std::fs::read_to_string;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use codec::{CodecConfig, OnUnknown};
use serde::Deserialize;
use session::SessionConfig;

#[derive(Parser, Debug)]
#[command(version, about = "Host-side Hytera ADK repeater endpoint")]
struct Cli {
    /// Path to a JSON5 config file.
    #[arg(long, short)]
    config: String,
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OnUnknownConfig {
    #[default]
    Fail,
    Sentinel,
}

impl From<OnUnknownConfig> for OnUnknown {
    fn from(value: OnUnknownConfig) -> Self {
        match value {
            OnUnknownConfig::Fail => OnUnknown::Fail,
            OnUnknownConfig::Sentinel => OnUnknown::Sentinel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value.to_ascii_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "info" => Self::Info,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            other => anyhow::bail!("unknown log level: {other}"),
        })
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        LogLevel::from_str(&raw).map_err(serde::de::Error::custom)
    }
}

impl LogLevel {
    pub fn as_level(&self) -> log::Level {
        match self {
            Self::Error => log::Level::Error,
            Self::Warn => log::Level::Warn,
            Self::Info => log::Level::Info,
            Self::Debug => log::Level::Debug,
            Self::Trace => log::Level::Trace,
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Log {
    #[serde(default)]
    pub level: LogLevel,
}

/// One repeater-facing UDP endpoint to bind on startup. `name` is only used in log lines; the
/// default port table in `codec::ports` is the reference for which value to put in `bind`.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct PortConfig {
    pub name: String,
    pub bind: SocketAddr,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Session {
    #[serde(default = "Session::default_ack_timeout_secs")]
    pub ack_timeout_secs: u64,
    #[serde(default = "Session::default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,
    #[serde(default = "Session::default_heartbeat_timeout_secs")]
    pub heartbeat_timeout_secs: u64,
    #[serde(default)]
    pub on_unknown: OnUnknownConfig,
}

impl Session {
    fn default_ack_timeout_secs() -> u64 {
        2
    }

    fn default_heartbeat_interval_secs() -> u64 {
        2
    }

    fn default_heartbeat_timeout_secs() -> u64 {
        30
    }
}

impl Default for Session {
    fn default() -> Self {
        Self {
            ack_timeout_secs: Self::default_ack_timeout_secs(),
            heartbeat_interval_secs: Self::default_heartbeat_interval_secs(),
            heartbeat_timeout_secs: Self::default_heartbeat_timeout_secs(),
            on_unknown: OnUnknownConfig::default(),
        }
    }
}

impl Session {
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig {
            ack_timeout: Duration::from_secs(self.ack_timeout_secs),
            heartbeat_interval: Duration::from_secs(self.heartbeat_interval_secs),
            heartbeat_timeout: Duration::from_secs(self.heartbeat_timeout_secs),
            codec: CodecConfig {
                on_unknown: self.on_unknown.into(),
            },
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub ports: Vec<PortConfig>,
    #[serde(default)]
    pub session: Session,
    #[serde(default)]
    pub log: Log,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let cli = Cli::parse();
        Ok(serde_json5::from_str::<Self>(&read_to_string(&cli.config)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let raw = r#"{
            ports: [
                { name: "rrs1", bind: "0.0.0.0:30001" },
            ],
        }"#;
        let config: Config = serde_json5::from_str(raw).unwrap();
        assert_eq!(config.ports.len(), 1);
        assert_eq!(config.ports[0].name, "rrs1");
        assert_eq!(config.session.ack_timeout_secs, 2);
        assert_eq!(config.log.level, LogLevel::Info);
        assert_eq!(config.session.on_unknown, OnUnknownConfig::Fail);
    }

    #[test]
    fn parses_overridden_session_tunables() {
        let raw = r#"{
            ports: [{ name: "rcp1", bind: "127.0.0.1:30009" }],
            session: { "ack-timeout-secs": 5, "on-unknown": "sentinel" },
            log: { level: "debug" },
        }"#;
        let config: Config = serde_json5::from_str(raw).unwrap();
        assert_eq!(config.session.ack_timeout_secs, 5);
        assert_eq!(config.session.on_unknown, OnUnknownConfig::Sentinel);
        assert_eq!(config.log.level, LogLevel::Debug);
    }
}
