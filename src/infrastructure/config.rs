// Configuration loading
use crate::application::coordinator::CoordinatorSettings;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub push_url: String,
    pub status_url: String,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub window_capacity: usize,
    pub reconnect_initial_ms: u64,
    pub reconnect_max_ms: u64,
    pub log_capacity: usize,
    pub listen_addr: String,
}

impl DashboardConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.window_capacity == 0 {
            anyhow::bail!("window_capacity must be at least 1");
        }
        if self.log_capacity == 0 {
            anyhow::bail!("log_capacity must be at least 1");
        }
        if self.poll_interval_secs == 0 {
            anyhow::bail!("poll_interval_secs must be at least 1");
        }
        if self.connect_timeout_secs == 0 {
            anyhow::bail!("connect_timeout_secs must be at least 1");
        }
        if self.reconnect_initial_ms == 0 {
            anyhow::bail!("reconnect_initial_ms must be at least 1");
        }
        if self.reconnect_max_ms < self.reconnect_initial_ms {
            anyhow::bail!(
                "reconnect_max_ms ({}) is below reconnect_initial_ms ({})",
                self.reconnect_max_ms,
                self.reconnect_initial_ms
            );
        }
        Ok(())
    }

    pub fn coordinator_settings(&self) -> CoordinatorSettings {
        CoordinatorSettings {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            reconnect_initial: Duration::from_millis(self.reconnect_initial_ms),
            reconnect_max: Duration::from_millis(self.reconnect_max_ms),
            window_capacity: self.window_capacity,
            log_capacity: self.log_capacity,
        }
    }
}

fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    config::Config::builder()
        .set_default("push_url", "ws://localhost:8000/ws")?
        .set_default("status_url", "http://localhost:8000/status")?
        .set_default("poll_interval_secs", 5)?
        .set_default("request_timeout_secs", 3)?
        .set_default("connect_timeout_secs", 10)?
        .set_default("window_capacity", 50)?
        .set_default("reconnect_initial_ms", 1000)?
        .set_default("reconnect_max_ms", 30000)?
        .set_default("log_capacity", 1000)?
        .set_default("listen_addr", "0.0.0.0:8080")
}

/// Defaults, then `config/dashboard.*` if present, then `DASHBOARD__*` env vars.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = defaults()?
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: DashboardConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
