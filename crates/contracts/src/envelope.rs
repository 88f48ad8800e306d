//! Envelope - wire format pushed to the remote endpoint
//!
//! ```json
//! { "sensorId": "...", "secFromStart": 1.2, "data": { "bpmChild": 140.0, "uterus": 15.0, "spasms": 20.0 } }
//! ```

use serde::{Deserialize, Serialize};

use crate::{SensorId, SensorSample};

/// Sensor id used when the configuration does not name one
pub const DEFAULT_SENSOR_ID: &str = "3f2b8c1e-9d47-4a6b-b0e5-7c1d2a9f4e68";

/// One streamed message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Session (sensor) identifier
    pub sensor_id: SensorId,

    /// Seconds since the streaming session started
    pub sec_from_start: f64,

    /// Channel readings
    pub data: EnvelopeData,
}

/// Channel readings as named on the wire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeData {
    pub bpm_child: f64,
    pub uterus: f64,
    pub spasms: f64,
}

impl Envelope {
    pub fn new(sensor_id: SensorId, sec_from_start: f64, sample: SensorSample) -> Self {
        Self {
            sensor_id,
            sec_from_start,
            data: sample.into(),
        }
    }
}

impl From<SensorSample> for EnvelopeData {
    fn from(sample: SensorSample) -> Self {
        Self {
            bpm_child: sample.heart_rate,
            uterus: sample.uterine_tone,
            spasms: sample.spasm_activity,
        }
    }
}

impl From<EnvelopeData> for SensorSample {
    fn from(data: EnvelopeData) -> Self {
        SensorSample::new(data.bpm_child, data.uterus, data.spasms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let envelope = Envelope::new(
            "sensor-1".into(),
            0.24,
            SensorSample::new(141.5, 15.0, 20.5),
        );
        let json: serde_json::Value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["sensorId"], "sensor-1");
        assert_eq!(json["secFromStart"], 0.24);
        assert_eq!(json["data"]["bpmChild"], 141.5);
        assert_eq!(json["data"]["uterus"], 15.0);
        assert_eq!(json["data"]["spasms"], 20.5);
        assert_eq!(json.as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_parse_incoming_message() {
        let raw = r#"{"sensorId":"abc","secFromStart":3.0,"data":{"bpmChild":120,"uterus":30,"spasms":55}}"#;
        let envelope: Envelope = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.sensor_id, "abc");
        let sample: SensorSample = envelope.data.into();
        assert_eq!(sample.heart_rate, 120.0);
    }
}
