// Telemetry normalizer - raw push payload to a fully defaulted metrics record
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::health::ProtocolStatus;
use crate::domain::metrics::{MetricsRecord, PerStation, Station};
use crate::domain::snapshot::StateCounts;

const STATUS_KEYS: [&str; 4] = ["modbus", "mqtt", "opcua", "last_update"];

/// What a decoded push frame carries.
#[derive(Debug, Clone, PartialEq)]
pub enum PushPayload {
    Telemetry {
        record: MetricsRecord,
        /// `None` when the frame has no state mapping; the prior snapshot stays.
        states: Option<StateCounts>,
    },
    Status(ProtocolStatus),
}

/// Route a decoded frame to the status or the telemetry variant.
pub fn classify(raw: &Value, received_at: DateTime<Utc>) -> PushPayload {
    if is_status_frame(raw) {
        return PushPayload::Status(status_from_value(raw));
    }
    PushPayload::Telemetry {
        record: normalize(raw, received_at),
        states: extract_state_counts(raw),
    }
}

/// Total over every JSON value. Missing, null and mistyped fields become 0.
pub fn normalize(raw: &Value, received_at: DateTime<Utc>) -> MetricsRecord {
    let station_busy = PerStation::from_fn(|station| {
        flag(lookup(raw, &["process", "stations", station.key(), "busy"]))
    });
    let utilization = PerStation::from_fn(|station| {
        number(lookup(raw, &["stats", "station_utilization", station.key()]))
    });

    let bottles_in_progress = lookup(raw, &["process", "bottles_in_progress"])
        .and_then(Value::as_u64)
        .or_else(|| lookup(raw, &["process", "active_bottles"]).and_then(Value::as_u64))
        .unwrap_or(0);

    MetricsRecord {
        timestamp: received_at,
        station_busy,
        throughput: number(lookup(raw, &["stats", "throughput"])),
        error_rate_percent: finite(number(lookup(raw, &["stats", "error_rate"])) * 100.0),
        bottles_in_progress,
        fill_level: number(lookup(
            raw,
            &["process", "stations", Station::Filling.key(), "level"],
        )),
        capping_actuator_state: flag(lookup(
            raw,
            &["process", "stations", Station::Capping.key(), "actuator_state"],
        )),
        labeling_speed: number(lookup(
            raw,
            &["process", "stations", Station::Labeling.key(), "motor_speed"],
        )),
        conveyor_speed: number(lookup(raw, &["process", "conveyor_speed"])),
        utilization,
    }
}

/// The discrete-state mapping, if the frame carries one.
///
/// A present but empty object yields `Some(empty)`, which clears the snapshot.
/// Counts that are not non-negative integers are skipped.
pub fn extract_state_counts(raw: &Value) -> Option<StateCounts> {
    let map = ["bottles", "bottles_by_state"]
        .iter()
        .find_map(|key| lookup(raw, &["process", *key]).and_then(Value::as_object))?;

    Some(
        map.iter()
            .filter_map(|(label, count)| count.as_u64().map(|c| (label.clone(), c)))
            .collect(),
    )
}

fn is_status_frame(raw: &Value) -> bool {
    let Some(obj) = raw.as_object() else {
        return false;
    };
    if obj.contains_key("process") || obj.contains_key("stats") {
        return false;
    }
    STATUS_KEYS.iter().any(|key| obj.contains_key(*key))
}

fn status_from_value(raw: &Value) -> ProtocolStatus {
    let bool_at = |key: &str| raw.get(key).and_then(Value::as_bool).unwrap_or(false);
    ProtocolStatus {
        modbus: bool_at("modbus"),
        mqtt: bool_at("mqtt"),
        opcua: bool_at("opcua"),
        last_update: raw
            .get("last_update")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

fn lookup<'a>(raw: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(raw, |node, segment| node.get(*segment))
}

fn number(value: Option<&Value>) -> f64 {
    value.and_then(Value::as_f64).unwrap_or(0.0)
}

/// Non-finite values have no JSON representation and default like a mismatch.
fn finite(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn flag(value: Option<&Value>) -> u8 {
    match value.and_then(Value::as_bool) {
        Some(true) => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_partial_filling_station() {
        let raw = json!({"process": {"stations": {"filling": {"busy": true, "level": 42}}}});
        let record = normalize(&raw, at());

        assert_eq!(record.station_busy.filling, 1);
        assert_eq!(record.fill_level, 42.0);
        assert_eq!(record.station_busy.capping, 0);
        assert_eq!(record.throughput, 0.0);
    }

    #[test]
    fn test_non_object_payloads_default() {
        let now = at();
        let payloads = [
            json!({}),
            json!(null),
            json!([1, 2, 3]),
            json!("text"),
            json!(7),
            json!(true),
        ];
        for raw in payloads {
            assert_eq!(normalize(&raw, now), MetricsRecord::empty(now), "payload {}", raw);
        }
    }

    #[test]
    fn test_truncated_paths_default() {
        let now = at();
        let raw = json!({"process": {"stations": null}, "stats": []});
        assert_eq!(normalize(&raw, now), MetricsRecord::empty(now));

        let raw = json!({"process": {"stations": {"capping": "busy"}}});
        assert_eq!(normalize(&raw, now), MetricsRecord::empty(now));
    }

    #[test]
    fn test_type_mismatch_is_absent() {
        let raw = json!({
            "process": {
                "stations": {"filling": {"busy": 1, "level": "42"}},
                "conveyor_speed": null
            },
            "stats": {"throughput": "fast"}
        });
        let record = normalize(&raw, at());
        assert_eq!(record.station_busy.filling, 0);
        assert_eq!(record.fill_level, 0.0);
        assert_eq!(record.conveyor_speed, 0.0);
        assert_eq!(record.throughput, 0.0);
    }

    #[test]
    fn test_full_payload() {
        let raw = json!({
            "process": {
                "stations": {
                    "filling": {"busy": false, "level": 88.5},
                    "capping": {"busy": true, "actuator_state": true},
                    "labeling": {"busy": true, "motor_speed": 0.75}
                },
                "conveyor_speed": 1.2,
                "bottles_in_progress": 6
            },
            "stats": {
                "throughput": 12.5,
                "error_rate": 0.04,
                "station_utilization": {"filling": 0.5, "capping": 0.25}
            }
        });
        let record = normalize(&raw, at());

        assert_eq!(record.station_busy, PerStation { filling: 0, capping: 1, labeling: 1 });
        assert_eq!(record.fill_level, 88.5);
        assert_eq!(record.capping_actuator_state, 1);
        assert_eq!(record.labeling_speed, 0.75);
        assert_eq!(record.conveyor_speed, 1.2);
        assert_eq!(record.bottles_in_progress, 6);
        assert_eq!(record.throughput, 12.5);
        assert!((record.error_rate_percent - 4.0).abs() < 1e-9);
        assert_eq!(record.utilization.filling, 0.5);
        assert_eq!(record.utilization.capping, 0.25);
        assert_eq!(record.utilization.labeling, 0.0);
    }

    #[test]
    fn test_negative_values_pass_through() {
        let raw = json!({"stats": {"throughput": -3.0}});
        assert_eq!(normalize(&raw, at()).throughput, -3.0);
    }

    #[test]
    fn test_overflowing_error_rate_defaults() {
        let raw = json!({"stats": {"error_rate": 1.0e308}});
        let record = normalize(&raw, at());
        assert_eq!(record.error_rate_percent, 0.0);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["errorRatePercent"], 0.0);
    }

    #[test]
    fn test_bottles_in_progress_fallback() {
        let raw = json!({"process": {"active_bottles": 3}});
        assert_eq!(normalize(&raw, at()).bottles_in_progress, 3);

        let raw = json!({"process": {"bottles_in_progress": -1}});
        assert_eq!(normalize(&raw, at()).bottles_in_progress, 0);
    }

    #[test]
    fn test_state_counts_absent_vs_empty() {
        assert_eq!(extract_state_counts(&json!({"process": {}})), None);
        assert_eq!(extract_state_counts(&json!({"process": {"bottles": 5}})), None);
        assert_eq!(
            extract_state_counts(&json!({"process": {"bottles": {}}})),
            Some(StateCounts::new())
        );
    }

    #[test]
    fn test_state_counts_skip_bad_entries() {
        let raw = json!({"process": {"bottles_by_state": {"FILLING": 2, "ERROR": "x", "NEW": -1}}});
        let counts = extract_state_counts(&raw).unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get("FILLING"), Some(&2));
    }

    #[test]
    fn test_classify_status_frame() {
        let raw = json!({
            "modbus": true,
            "mqtt": false,
            "opcua": true,
            "last_update": "2024-05-01T10:00:00"
        });
        match classify(&raw, at()) {
            PushPayload::Status(status) => {
                assert!(status.modbus);
                assert!(!status.mqtt);
                assert!(status.opcua);
                assert_eq!(status.last_update.as_deref(), Some("2024-05-01T10:00:00"));
            }
            other => panic!("expected status, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_telemetry_frame() {
        let raw = json!({"process": {"bottles": {"NEW": 1}}, "modbus": true});
        match classify(&raw, at()) {
            PushPayload::Telemetry { states, .. } => {
                assert_eq!(states.and_then(|s| s.get("NEW").copied()), Some(1));
            }
            other => panic!("expected telemetry, got {:?}", other),
        }

        assert!(matches!(classify(&json!([]), at()), PushPayload::Telemetry { states: None, .. }));
    }
}
