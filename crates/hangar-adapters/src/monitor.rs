// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parsing of the provider monitor payload returned by `GetMonitor`.
//!
//! Providers report utilization as floats and network counters in a nested
//! document that is sometimes itself JSON-encoded as a string:
//!
//! ```json
//! {"CpuStats": 12.6, "MemoryStats": 40.2, "StorageStats": 71.5,
//!  "NetworkStats": "{\"BytesIn\": 1024, \"BytesOut\": 2048}"}
//! ```

use hangar_core::HangarError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Utilization of one instance, percentages rounded to the nearest integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Monitor {
    pub cpu_percent: i64,
    pub memory_percent: i64,
    pub storage_percent: i64,
    pub bytes_in: i64,
    pub bytes_out: i64,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawMonitor {
    #[serde(rename = "CpuStats")]
    cpu: f64,
    #[serde(rename = "MemoryStats")]
    memory: f64,
    #[serde(rename = "StorageStats")]
    storage: f64,
    #[serde(rename = "NetworkStats")]
    network: Value,
}

const BYTES_IN_KEYS: &[&str] = &["BytesIn", "bytes_in", "BytesReceived"];
const BYTES_OUT_KEYS: &[&str] = &["BytesOut", "bytes_out", "BytesSent"];

/// Parse a monitor payload. Blank input is a zero-valued [`Monitor`].
pub fn parse_monitor(raw: &str) -> Result<Monitor, HangarError> {
    if raw.trim().is_empty() {
        return Ok(Monitor::default());
    }
    let parsed: RawMonitor = serde_json::from_str(raw)
        .map_err(|e| HangarError::Internal(format!("decoding monitor payload: {e}")))?;
    let (bytes_in, bytes_out) = network_counters(&parsed.network);
    Ok(Monitor {
        cpu_percent: parsed.cpu.round() as i64,
        memory_percent: parsed.memory.round() as i64,
        storage_percent: parsed.storage.round() as i64,
        bytes_in,
        bytes_out,
    })
}

fn network_counters(network: &Value) -> (i64, i64) {
    let nested;
    let object = match network {
        Value::Object(map) => map,
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => {
                nested = map;
                &nested
            }
            _ => return (0, 0),
        },
        _ => return (0, 0),
    };
    let pick = |keys: &[&str]| {
        keys.iter()
            .find_map(|k| object.get(*k).and_then(as_number))
            .map(|n| n.round() as i64)
            .unwrap_or(0)
    };
    (pick(BYTES_IN_KEYS), pick(BYTES_OUT_KEYS))
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_payload_is_zero() {
        assert_eq!(parse_monitor("").unwrap(), Monitor::default());
        assert_eq!(parse_monitor("  \n").unwrap(), Monitor::default());
    }

    #[test]
    fn rounds_percentages() {
        let m = parse_monitor(r#"{"CpuStats":12.5,"MemoryStats":40.49,"StorageStats":99.51}"#).unwrap();
        assert_eq!(m.cpu_percent, 13);
        assert_eq!(m.memory_percent, 40);
        assert_eq!(m.storage_percent, 100);
        assert_eq!((m.bytes_in, m.bytes_out), (0, 0));
    }

    #[test]
    fn network_stats_as_object() {
        let m = parse_monitor(r#"{"NetworkStats":{"BytesIn":1024.4,"BytesOut":"2048"}}"#).unwrap();
        assert_eq!((m.bytes_in, m.bytes_out), (1024, 2048));
    }

    #[test]
    fn network_stats_as_encoded_string_with_aliases() {
        let m = parse_monitor(r#"{"NetworkStats":"{\"BytesReceived\":10,\"BytesSent\":20}"}"#).unwrap();
        assert_eq!((m.bytes_in, m.bytes_out), (10, 20));

        let m = parse_monitor(r#"{"NetworkStats":{"bytes_in":1,"bytes_out":2}}"#).unwrap();
        assert_eq!((m.bytes_in, m.bytes_out), (1, 2));
    }

    #[test]
    fn unparseable_network_stats_are_zero() {
        let m = parse_monitor(r#"{"CpuStats":1,"NetworkStats":"not json"}"#).unwrap();
        assert_eq!(m.cpu_percent, 1);
        assert_eq!((m.bytes_in, m.bytes_out), (0, 0));
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(matches!(parse_monitor("{broken"), Err(HangarError::Internal(_))));
    }
}
