// Dual-channel coordinator - owns the push subscription and the status poll loop
use crate::application::channels::{PushChannel, StatusSource};
use crate::application::error::ChannelError;
use crate::application::normalizer::{self, PushPayload};
use crate::application::state::{DashboardState, DashboardView, HealthView};
use crate::domain::event_log::{LogCategory, LogEntry, LogLevel};
use crate::domain::health::ChannelKind;
use crate::domain::metrics::MetricsRecord;
use crate::domain::snapshot::StateCounts;
use chrono::Utc;
use futures::StreamExt;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub reconnect_initial: Duration,
    pub reconnect_max: Duration,
    pub window_capacity: usize,
    pub log_capacity: usize,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            request_timeout: Duration::from_secs(3),
            connect_timeout: Duration::from_secs(10),
            reconnect_initial: Duration::from_secs(1),
            reconnect_max: Duration::from_secs(30),
            window_capacity: crate::domain::window::DEFAULT_WINDOW_CAPACITY,
            log_capacity: crate::domain::event_log::DEFAULT_LOG_CAPACITY,
        }
    }
}

#[derive(Clone)]
pub struct DashboardCoordinator {
    state: Arc<RwLock<DashboardState>>,
    push: Arc<dyn PushChannel>,
    status: Arc<dyn StatusSource>,
    settings: CoordinatorSettings,
}

impl DashboardCoordinator {
    pub fn new(
        push: Arc<dyn PushChannel>,
        status: Arc<dyn StatusSource>,
        settings: CoordinatorSettings,
    ) -> Self {
        let state = DashboardState::new(settings.window_capacity, settings.log_capacity);
        Self {
            state: Arc::new(RwLock::new(state)),
            push,
            status,
            settings,
        }
    }

    pub fn reader(&self) -> DashboardReader {
        DashboardReader {
            state: self.state.clone(),
        }
    }

    /// Spawn the push and pull loops. They run until the handle is shut down.
    pub fn start(self) -> CoordinatorHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let reader = self.reader();

        let push_task = tokio::spawn(self.clone().run_push(shutdown_rx.clone()));
        let pull_task = tokio::spawn(self.run_pull(shutdown_rx));

        CoordinatorHandle {
            shutdown: shutdown_tx,
            tasks: vec![push_task, pull_task],
            reader,
        }
    }

    /// Process one inbound push frame to completion.
    ///
    /// A frame that is not JSON is dropped and reported; nothing else changes.
    pub async fn handle_frame(&self, text: &str) {
        let now = Utc::now();
        match serde_json::from_str::<Value>(text) {
            Ok(raw) => {
                let payload = normalizer::classify(&raw, now);
                if let PushPayload::Telemetry { states, .. } = &payload {
                    debug!(has_states = states.is_some(), "Telemetry frame received");
                } else {
                    debug!("Status frame received");
                }
                self.state.write().await.apply_push(payload, now);
            }
            Err(e) => self.drop_frame(ChannelError::Decode(e.to_string())).await,
        }
    }

    async fn drop_frame(&self, e: ChannelError) {
        let message = e.to_string();
        warn!("Dropping push frame: {}", message);
        let now = Utc::now();
        let mut state = self.state.write().await;
        state.push.frame_dropped(message.clone(), now);
        state.log(LogCategory::Push, LogLevel::Warning, message, now);
    }

    /// Run one pull cycle: Fetching, then Healthy or Degraded.
    pub async fn poll_once(&self) {
        self.state.write().await.pull.begin_fetch(Utc::now());

        let fetch = timeout(self.settings.request_timeout, self.status.fetch_status());
        let result = match fetch.await {
            Ok(result) => result,
            Err(_) => Err(ChannelError::Timeout),
        };

        let now = Utc::now();
        let mut state = self.state.write().await;
        match result {
            Ok(status) => {
                let recovering = state.pull.consecutive_failures > 0;
                let first = state.pull.last_successful_fetch.is_none();
                state.protocols = status;
                state.pull.succeeded(now);
                state.clear_banner(ChannelKind::Pull);
                if recovering || first {
                    info!("Status poll healthy ({})", self.status.endpoint());
                    state.log(LogCategory::Pull, LogLevel::Info, "Status poll healthy", now);
                }
            }
            Err(e) => {
                warn!("Status poll to {} failed: {}", self.status.endpoint(), e);
                state.pull.failed(e.to_string(), now);
                state.set_banner(ChannelKind::Pull, format!("Status poll failed: {}", e), now);
                state.log(
                    LogCategory::Pull,
                    LogLevel::Error,
                    format!("Status poll failed: {}", e),
                    now,
                );
            }
        }
    }

    async fn run_push(self, mut shutdown: watch::Receiver<bool>) {
        let mut backoff = self.settings.reconnect_initial;

        loop {
            if *shutdown.borrow() {
                break;
            }

            self.on_push_connecting().await;
            let connected = tokio::select! {
                result = timeout(self.settings.connect_timeout, self.push.connect()) => {
                    result.unwrap_or(Err(ChannelError::Timeout))
                }
                _ = shutdown.changed() => break,
            };

            match connected {
                Ok(mut frames) => {
                    self.on_push_open().await;
                    backoff = self.settings.reconnect_initial;

                    loop {
                        tokio::select! {
                            frame = frames.next() => match frame {
                                Some(Ok(text)) => self.handle_frame(&text).await,
                                Some(Err(e @ ChannelError::Decode(_))) => self.drop_frame(e).await,
                                Some(Err(e)) => {
                                    self.on_push_error(e).await;
                                    break;
                                }
                                None => {
                                    self.on_push_closed().await;
                                    break;
                                }
                            },
                            _ = shutdown.changed() => {
                                self.on_push_closed().await;
                                return;
                            }
                        }
                    }
                }
                Err(e) => self.on_push_error(e).await,
            }

            if wait_or_shutdown(backoff, &mut shutdown).await {
                break;
            }
            backoff = (backoff * 2).min(self.settings.reconnect_max);
        }

        let mut state = self.state.write().await;
        state.push.closed(Utc::now());
    }

    async fn run_pull(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }
            tokio::select! {
                _ = self.poll_once() => {}
                _ = shutdown.changed() => break,
            }
        }
        debug!("Status poll loop stopped");
    }

    async fn on_push_connecting(&self) {
        info!("Connecting to {}", self.push.endpoint());
        let mut state = self.state.write().await;
        state.push.begin_connect(Utc::now());
    }

    async fn on_push_open(&self) {
        info!("Push channel connected to {}", self.push.endpoint());
        let now = Utc::now();
        let mut state = self.state.write().await;
        state.push.opened(now);
        state.clear_banner(ChannelKind::Push);
        state.log(LogCategory::Push, LogLevel::Info, "Connected", now);
    }

    async fn on_push_closed(&self) {
        info!("Push channel closed");
        let now = Utc::now();
        let mut state = self.state.write().await;
        state.push.closed(now);
        state.log(LogCategory::Push, LogLevel::Warning, "Disconnected", now);
    }

    async fn on_push_error(&self, e: ChannelError) {
        warn!("Push channel error: {}", e);
        let now = Utc::now();
        let mut state = self.state.write().await;
        state.push.errored(e.to_string(), now);
        state.set_banner(ChannelKind::Push, format!("Live feed disconnected: {}", e), now);
        state.log(LogCategory::Push, LogLevel::Error, e.to_string(), now);
    }
}

/// Returns true when shutdown was requested while waiting.
async fn wait_or_shutdown(delay: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => {
            let requested = *shutdown.borrow();
            requested
        }
        _ = shutdown.changed() => true,
    }
}

/// Read-only access to the coordinator state.
#[derive(Clone)]
pub struct DashboardReader {
    state: Arc<RwLock<DashboardState>>,
}

impl DashboardReader {
    pub async fn view(&self) -> DashboardView {
        self.state.read().await.view()
    }

    pub async fn snapshot_sequence(&self) -> Vec<MetricsRecord> {
        self.state.read().await.window.snapshot_sequence()
    }

    pub async fn current_states(&self) -> StateCounts {
        self.state.read().await.snapshot.current().clone()
    }

    pub async fn health(&self) -> HealthView {
        self.state.read().await.health_view()
    }

    pub async fn logs(&self) -> Vec<LogEntry> {
        self.state.read().await.logs()
    }
}

pub struct CoordinatorHandle {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
    reader: DashboardReader,
}

impl CoordinatorHandle {
    pub fn reader(&self) -> DashboardReader {
        self.reader.clone()
    }

    /// Stop the poll timer and close the push subscription, then wait for both.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                error!("Coordinator task failed: {}", e);
            }
        }
        let now = Utc::now();
        let mut state = self.reader.state.write().await;
        state.log(LogCategory::System, LogLevel::Info, "Coordinator stopped", now);
        info!("Coordinator stopped");
    }
}
