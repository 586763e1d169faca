// Connection health domain model
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PushPhase {
    Disconnected,
    Connecting,
    Connected,
}

/// Pull channel phase. `Healthy` and `Degraded` persist between ticks;
/// `Idle` is only seen before the first poll completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PullPhase {
    Idle,
    Fetching,
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Push,
    Pull,
}

#[derive(Debug, Clone, Serialize)]
pub struct PushHealth {
    pub phase: PushPhase,
    pub connected: bool,
    pub last_error: Option<String>,
    pub last_update: Option<DateTime<Utc>>,
    pub connect_attempts: u64,
    pub frames_received: u64,
    pub dropped_frames: u64,
}

impl Default for PushHealth {
    fn default() -> Self {
        Self {
            phase: PushPhase::Disconnected,
            connected: false,
            last_error: None,
            last_update: None,
            connect_attempts: 0,
            frames_received: 0,
            dropped_frames: 0,
        }
    }
}

impl PushHealth {
    /// Every attempt counts, the first one included.
    pub fn begin_connect(&mut self, now: DateTime<Utc>) {
        self.phase = PushPhase::Connecting;
        self.connected = false;
        self.connect_attempts += 1;
        self.last_update = Some(now);
    }

    pub fn opened(&mut self, now: DateTime<Utc>) {
        self.phase = PushPhase::Connected;
        self.connected = true;
        self.last_error = None;
        self.last_update = Some(now);
    }

    pub fn closed(&mut self, now: DateTime<Utc>) {
        self.phase = PushPhase::Disconnected;
        self.connected = false;
        self.last_update = Some(now);
    }

    pub fn errored(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        self.phase = PushPhase::Disconnected;
        self.connected = false;
        self.last_error = Some(message.into());
        self.last_update = Some(now);
    }

    pub fn frame_accepted(&mut self, now: DateTime<Utc>) {
        self.frames_received += 1;
        self.last_update = Some(now);
    }

    /// A frame that failed to decode. Does not change the connection phase.
    pub fn frame_dropped(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        self.frames_received += 1;
        self.dropped_frames += 1;
        self.last_error = Some(message.into());
        self.last_update = Some(now);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PullHealth {
    pub phase: PullPhase,
    pub connected: bool,
    pub last_error: Option<String>,
    pub last_update: Option<DateTime<Utc>>,
    pub last_successful_fetch: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
}

impl Default for PullHealth {
    fn default() -> Self {
        Self {
            phase: PullPhase::Idle,
            connected: false,
            last_error: None,
            last_update: None,
            last_successful_fetch: None,
            consecutive_failures: 0,
        }
    }
}

impl PullHealth {
    pub fn begin_fetch(&mut self, now: DateTime<Utc>) {
        self.phase = PullPhase::Fetching;
        self.last_update = Some(now);
    }

    pub fn succeeded(&mut self, now: DateTime<Utc>) {
        self.phase = PullPhase::Healthy;
        self.connected = true;
        self.last_error = None;
        self.last_successful_fetch = Some(now);
        self.consecutive_failures = 0;
        self.last_update = Some(now);
    }

    pub fn failed(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        self.phase = PullPhase::Degraded;
        self.connected = false;
        self.last_error = Some(message.into());
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_update = Some(now);
    }
}

/// Flat protocol status reported by the backend, over either channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProtocolStatus {
    #[serde(default)]
    pub modbus: bool,
    #[serde(default)]
    pub mqtt: bool,
    #[serde(default)]
    pub opcua: bool,
    #[serde(default)]
    pub last_update: Option<String>,
}

impl ProtocolStatus {
    /// Text labels in the form `Modbus: Connected`.
    pub fn labels(&self) -> Vec<String> {
        [("Modbus", self.modbus), ("MQTT", self.mqtt), ("OPC UA", self.opcua)]
            .iter()
            .map(|(name, up)| {
                let status = if *up { "Connected" } else { "Disconnected" };
                format!("{}: {}", name, status)
            })
            .collect()
    }
}

/// User-visible error indicator. Last write wins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBanner {
    pub channel: ChannelKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_lifecycle() {
        let now = Utc::now();
        let mut health = PushHealth::default();
        assert_eq!(health.phase, PushPhase::Disconnected);
        assert!(!health.connected);

        health.begin_connect(now);
        assert_eq!(health.phase, PushPhase::Connecting);
        assert_eq!(health.connect_attempts, 1);

        health.opened(now);
        assert_eq!(health.phase, PushPhase::Connected);
        assert!(health.connected);

        health.errored("reset by peer", now);
        assert_eq!(health.phase, PushPhase::Disconnected);
        assert!(!health.connected);
        assert_eq!(health.last_error.as_deref(), Some("reset by peer"));
    }

    #[test]
    fn test_close_from_connecting() {
        let now = Utc::now();
        let mut health = PushHealth::default();
        health.begin_connect(now);
        health.closed(now);
        assert_eq!(health.phase, PushPhase::Disconnected);
    }

    #[test]
    fn test_dropped_frame_keeps_phase() {
        let now = Utc::now();
        let mut health = PushHealth::default();
        health.opened(now);
        health.frame_dropped("Parse error", now);
        assert_eq!(health.phase, PushPhase::Connected);
        assert_eq!(health.dropped_frames, 1);
    }

    #[test]
    fn test_pull_degraded_then_healthy() {
        let now = Utc::now();
        let mut health = PullHealth::default();
        assert_eq!(health.phase, PullPhase::Idle);

        health.begin_fetch(now);
        assert_eq!(health.phase, PullPhase::Fetching);
        health.failed("timeout", now);
        assert_eq!(health.phase, PullPhase::Degraded);
        assert_eq!(health.consecutive_failures, 1);
        assert!(health.last_successful_fetch.is_none());

        health.begin_fetch(now);
        health.succeeded(now);
        assert_eq!(health.phase, PullPhase::Healthy);
        assert_eq!(health.consecutive_failures, 0);
        assert_eq!(health.last_successful_fetch, Some(now));
        assert!(health.last_error.is_none());
    }

    #[test]
    fn test_protocol_status_defaults_missing_fields() {
        let status: ProtocolStatus = serde_json::from_str(r#"{"mqtt": true}"#).unwrap();
        assert!(status.mqtt);
        assert!(!status.modbus);
        assert!(status.last_update.is_none());
    }

    #[test]
    fn test_protocol_status_labels() {
        let status = ProtocolStatus {
            modbus: true,
            ..Default::default()
        };
        assert_eq!(
            status.labels(),
            vec!["Modbus: Connected", "MQTT: Disconnected", "OPC UA: Disconnected"]
        );
    }
}
