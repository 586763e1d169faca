// Dashboard state owned by the coordinator, and the read-only views over it
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::normalizer::PushPayload;
use crate::domain::event_log::{EventLog, LogCategory, LogEntry, LogLevel};
use crate::domain::health::{ChannelKind, ErrorBanner, ProtocolStatus, PullHealth, PushHealth};
use crate::domain::metrics::MetricsRecord;
use crate::domain::snapshot::{StateCounts, StateSnapshot};
use crate::domain::window::SlidingWindow;

#[derive(Debug)]
pub struct DashboardState {
    pub window: SlidingWindow,
    pub snapshot: StateSnapshot,
    pub push: PushHealth,
    pub pull: PullHealth,
    pub protocols: ProtocolStatus,
    pub banner: Option<ErrorBanner>,
    pub log: EventLog,
}

impl DashboardState {
    pub fn new(window_capacity: usize, log_capacity: usize) -> Self {
        Self {
            window: SlidingWindow::new(window_capacity),
            snapshot: StateSnapshot::default(),
            push: PushHealth::default(),
            pull: PullHealth::default(),
            protocols: ProtocolStatus::default(),
            banner: None,
            log: EventLog::new(log_capacity),
        }
    }

    /// Apply one decoded push payload in full.
    pub fn apply_push(&mut self, payload: PushPayload, now: DateTime<Utc>) {
        match payload {
            PushPayload::Telemetry { record, states } => {
                self.window.append(record);
                if let Some(states) = states {
                    self.snapshot.replace(states);
                }
            }
            PushPayload::Status(status) => {
                self.protocols = status;
            }
        }
        self.push.frame_accepted(now);
    }

    pub fn set_banner(&mut self, channel: ChannelKind, message: String, now: DateTime<Utc>) {
        self.banner = Some(ErrorBanner {
            channel,
            message,
            at: now,
        });
    }

    /// Clear the banner only if this channel raised it.
    pub fn clear_banner(&mut self, channel: ChannelKind) {
        if self.banner.as_ref().is_some_and(|b| b.channel == channel) {
            self.banner = None;
        }
    }

    pub fn log(
        &mut self,
        category: LogCategory,
        level: LogLevel,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        self.log.record(category, level, message, now);
    }

    pub fn view(&self) -> DashboardView {
        DashboardView {
            window: self.window.snapshot_sequence(),
            window_capacity: self.window.capacity(),
            states: self.snapshot.current().clone(),
            health: self.health_view(),
        }
    }

    pub fn health_view(&self) -> HealthView {
        HealthView {
            push: self.push.clone(),
            pull: self.pull.clone(),
            protocols: self.protocols.clone(),
            protocol_labels: self.protocols.labels(),
            banner: self.banner.clone(),
        }
    }

    pub fn logs(&self) -> Vec<LogEntry> {
        self.log.entries()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthView {
    pub push: PushHealth,
    pub pull: PullHealth,
    pub protocols: ProtocolStatus,
    pub protocol_labels: Vec<String>,
    pub banner: Option<ErrorBanner>,
}

/// Immutable copy of everything the presentation layer may read.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub window: Vec<MetricsRecord>,
    pub window_capacity: usize,
    pub states: StateCounts,
    pub health: HealthView,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_payload_leaves_window_alone() {
        let mut state = DashboardState::new(50, 10);
        let now = Utc::now();
        state.apply_push(
            PushPayload::Status(ProtocolStatus {
                mqtt: true,
                ..Default::default()
            }),
            now,
        );

        assert!(state.view().window.is_empty());
        assert_eq!(state.view().window_capacity, 50);
        assert!(state.protocols.mqtt);
        assert_eq!(state.push.frames_received, 1);
    }

    #[test]
    fn test_clear_banner_only_for_owner() {
        let mut state = DashboardState::new(50, 10);
        let now = Utc::now();
        state.set_banner(ChannelKind::Push, "closed".to_string(), now);
        state.clear_banner(ChannelKind::Pull);
        assert!(state.banner.is_some());

        state.clear_banner(ChannelKind::Push);
        assert!(state.banner.is_none());
    }
}
