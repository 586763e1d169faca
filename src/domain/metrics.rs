// Metrics record domain model
use chrono::{DateTime, Utc};
use serde::Serialize;

/// The three processing stations on the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Station {
    Filling,
    Capping,
    Labeling,
}

impl Station {
    pub fn key(&self) -> &'static str {
        match self {
            Station::Filling => "filling",
            Station::Capping => "capping",
            Station::Labeling => "labeling",
        }
    }
}

/// One value per station, always fully populated.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PerStation<T> {
    pub filling: T,
    pub capping: T,
    pub labeling: T,
}

impl<T> PerStation<T> {
    pub fn from_fn(mut f: impl FnMut(Station) -> T) -> Self {
        Self {
            filling: f(Station::Filling),
            capping: f(Station::Capping),
            labeling: f(Station::Labeling),
        }
    }
}

/// One normalized observation. Every field is always present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRecord {
    /// Wall-clock time at receipt, not supplied by the sender.
    pub timestamp: DateTime<Utc>,
    pub station_busy: PerStation<u8>,
    pub throughput: f64,
    pub error_rate_percent: f64,
    pub bottles_in_progress: u64,
    pub fill_level: f64,
    pub capping_actuator_state: u8,
    pub labeling_speed: f64,
    pub conveyor_speed: f64,
    pub utilization: PerStation<f64>,
}

impl MetricsRecord {
    /// An all-default record, i.e. "no data this tick".
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            station_busy: PerStation::default(),
            throughput: 0.0,
            error_rate_percent: 0.0,
            bottles_in_progress: 0,
            fill_level: 0.0,
            capping_actuator_state: 0,
            labeling_speed: 0.0,
            conveyor_speed: 0.0,
            utilization: PerStation::default(),
        }
    }
}
