//! Decoded telemetry messages
//!
//! Every message that reaches a parser has already been decoded into one of
//! the typed variants below. CAN message bodies carry their raw device
//! timestamp (`time`) in milliseconds; unwrapping it is the parser's job.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A decoded message as delivered by the transport layer
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Hierarchical `/`-delimited channel (e.g. "CAN/Parsley", "DAQ")
    pub channel: String,
    /// Host timestamp attached by the transport (seconds)
    pub timestamp: f64,
    /// Typed payload
    pub payload: Payload,
}

impl Message {
    pub fn new(channel: impl Into<String>, timestamp: f64, payload: Payload) -> Self {
        Self {
            channel: channel.into(),
            timestamp,
            payload,
        }
    }

    /// The CAN message carried by this message, if any
    pub fn as_can(&self) -> Option<&CanMessage> {
        match &self.payload {
            Payload::Can(can) => Some(can),
            Payload::Daq(_) => None,
        }
    }
}

/// Message payload variants
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A DAQ sensor sweep (raw analog samples per sensor)
    Daq(DaqSweep),
    /// A CAN-bus frame decoded by parsley
    Can(CanMessage),
}

/// One DAQ sweep: a short run of raw samples for every sensor
///
/// Sensors keep the order they had in the payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DaqSweep {
    pub sensors: IndexMap<String, Vec<f64>>,
}

/// A CAN message with its typed body
#[derive(Debug, Clone, PartialEq)]
pub struct CanMessage {
    /// Message type name as it appeared on the wire
    pub msg_type: String,
    /// Sending board, when the transport reported one
    pub board_id: Option<String>,
    pub body: CanBody,
}

impl CanMessage {
    pub fn new(msg_type: impl Into<String>, board_id: Option<String>, body: CanBody) -> Self {
        Self {
            msg_type: msg_type.into(),
            board_id,
            body,
        }
    }

    /// Build a message whose `msg_type` name is derived from the body
    pub fn from_body(board_id: Option<&str>, body: CanBody) -> Self {
        Self {
            msg_type: body.msg_type().as_str().to_string(),
            board_id: board_id.map(str::to_string),
            body,
        }
    }

    pub fn msg_type(&self) -> MsgType {
        self.body.msg_type()
    }
}

/// Known CAN message types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MsgType {
    FillLvl,
    SensorTemp,
    SensorAcc,
    SensorGyro,
    SensorMag,
    SensorAnalog,
    ActuatorStatus,
    GpsInfo,
    GpsAltitude,
    GpsLatitude,
    GpsLongitude,
    SensorAltitude,
    GeneralBoardStatus,
    /// Any message type without a typed body
    Unknown,
}

impl MsgType {
    /// All known types, in wire-name order of the parsley message table
    pub const KNOWN: [MsgType; 13] = [
        MsgType::FillLvl,
        MsgType::SensorTemp,
        MsgType::SensorAcc,
        MsgType::SensorGyro,
        MsgType::SensorMag,
        MsgType::SensorAnalog,
        MsgType::ActuatorStatus,
        MsgType::GpsInfo,
        MsgType::GpsAltitude,
        MsgType::GpsLatitude,
        MsgType::GpsLongitude,
        MsgType::SensorAltitude,
        MsgType::GeneralBoardStatus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MsgType::FillLvl => "FILL_LVL",
            MsgType::SensorTemp => "SENSOR_TEMP",
            MsgType::SensorAcc => "SENSOR_ACC",
            MsgType::SensorGyro => "SENSOR_GYRO",
            MsgType::SensorMag => "SENSOR_MAG",
            MsgType::SensorAnalog => "SENSOR_ANALOG",
            MsgType::ActuatorStatus => "ACTUATOR_STATUS",
            MsgType::GpsInfo => "GPS_INFO",
            MsgType::GpsAltitude => "GPS_ALTITUDE",
            MsgType::GpsLatitude => "GPS_LATITUDE",
            MsgType::GpsLongitude => "GPS_LONGITUDE",
            MsgType::SensorAltitude => "SENSOR_ALTITUDE",
            MsgType::GeneralBoardStatus => "GENERAL_BOARD_STATUS",
            MsgType::Unknown => "UNKNOWN",
        }
    }

    /// Look up a type by wire name; unrecognised names map to `Unknown`
    pub fn from_name(name: &str) -> Self {
        Self::KNOWN
            .iter()
            .copied()
            .find(|t| t.as_str() == name)
            .unwrap_or(MsgType::Unknown)
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed CAN message bodies
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CanBody {
    FillLevel(FillLevel),
    SensorTemp(TemperatureReading),
    SensorAcc(Axes),
    SensorGyro(Axes),
    SensorMag(Axes),
    SensorAnalog(SensorReading),
    ActuatorStatus(ActuatorStatus),
    GpsInfo(GpsInfo),
    GpsAltitude(GpsAltitude),
    GpsLatitude(GpsCoordinate),
    GpsLongitude(GpsCoordinate),
    SensorAltitude(AltitudeReading),
    GeneralBoardStatus(BoardStatusReport),
    Other(OtherBody),
}

impl CanBody {
    pub fn msg_type(&self) -> MsgType {
        match self {
            CanBody::FillLevel(_) => MsgType::FillLvl,
            CanBody::SensorTemp(_) => MsgType::SensorTemp,
            CanBody::SensorAcc(_) => MsgType::SensorAcc,
            CanBody::SensorGyro(_) => MsgType::SensorGyro,
            CanBody::SensorMag(_) => MsgType::SensorMag,
            CanBody::SensorAnalog(_) => MsgType::SensorAnalog,
            CanBody::ActuatorStatus(_) => MsgType::ActuatorStatus,
            CanBody::GpsInfo(_) => MsgType::GpsInfo,
            CanBody::GpsAltitude(_) => MsgType::GpsAltitude,
            CanBody::GpsLatitude(_) => MsgType::GpsLatitude,
            CanBody::GpsLongitude(_) => MsgType::GpsLongitude,
            CanBody::SensorAltitude(_) => MsgType::SensorAltitude,
            CanBody::GeneralBoardStatus(_) => MsgType::GeneralBoardStatus,
            CanBody::Other(_) => MsgType::Unknown,
        }
    }

    /// Raw device timestamp in milliseconds, if the body carries one
    pub fn raw_time(&self) -> Option<f64> {
        match self {
            CanBody::FillLevel(b) => Some(b.time),
            CanBody::SensorTemp(b) => Some(b.time),
            CanBody::SensorAcc(b) | CanBody::SensorGyro(b) | CanBody::SensorMag(b) => Some(b.time),
            CanBody::SensorAnalog(b) => Some(b.time),
            CanBody::ActuatorStatus(b) => Some(b.time),
            CanBody::GpsInfo(b) => Some(b.time),
            CanBody::GpsAltitude(b) => Some(b.time),
            CanBody::GpsLatitude(b) | CanBody::GpsLongitude(b) => Some(b.time),
            CanBody::SensorAltitude(b) => Some(b.time),
            CanBody::GeneralBoardStatus(b) => Some(b.time),
            CanBody::Other(b) => b.time,
        }
    }

    /// The body's fields as a JSON object (used for one-line formatting)
    pub fn fields(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillLevel {
    pub time: f64,
    pub level: f64,
}

/// Sensor identifier: boards send either a numeric index or an enum name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SensorId {
    Index(u64),
    Name(String),
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorId::Index(i) => write!(f, "{}", i),
            SensorId::Name(n) => f.write_str(n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading {
    pub time: f64,
    pub sensor_id: SensorId,
    pub temperature: f64,
}

/// Three-axis reading (accelerometer, gyroscope, magnetometer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axes {
    pub time: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Axes {
    /// Axis name and value pairs in x, y, z order
    pub fn components(&self) -> [(char, f64); 3] {
        [('x', self.x), ('y', self.y), ('z', self.z)]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub time: f64,
    pub sensor_id: SensorId,
    pub value: f64,
}

/// Actuator position as reported by a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActuatorState {
    #[serde(rename = "ACTUATOR_OPEN")]
    Open,
    #[serde(rename = "ACTUATOR_CLOSED")]
    Closed,
    #[serde(other)]
    Unknown,
}

impl ActuatorState {
    pub fn is_closed(self) -> bool {
        self == ActuatorState::Closed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActuatorStatus {
    pub time: f64,
    pub actuator: String,
    pub req_state: ActuatorState,
    pub cur_state: ActuatorState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsInfo {
    pub time: f64,
    pub num_sats: f64,
    pub quality: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsAltitude {
    pub time: f64,
    pub altitude: f64,
    /// Hundredths of the altitude unit
    pub daltitude: f64,
}

/// Latitude or longitude split into degrees, minutes and decimal minutes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsCoordinate {
    pub time: f64,
    pub degs: f64,
    pub mins: f64,
    /// Minutes fraction in units of 1/10000 minute
    pub dmins: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AltitudeReading {
    pub time: f64,
    pub altitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardStatusReport {
    pub time: f64,
    pub status: String,
}

/// Body of a message type without a typed representation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OtherBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msg_type_names_round_trip() {
        for msg_type in MsgType::KNOWN {
            assert_eq!(MsgType::from_name(msg_type.as_str()), msg_type);
        }
        assert_eq!(MsgType::from_name("LEDS_ON"), MsgType::Unknown);
    }

    #[test]
    fn test_body_msg_type_and_time() {
        let body = CanBody::SensorAcc(Axes {
            time: 1500.0,
            x: 1.0,
            y: 2.0,
            z: 3.0,
        });
        assert_eq!(body.msg_type(), MsgType::SensorAcc);
        assert_eq!(body.raw_time(), Some(1500.0));

        let other = CanBody::Other(OtherBody::default());
        assert_eq!(other.msg_type(), MsgType::Unknown);
        assert_eq!(other.raw_time(), None);
    }

    #[test]
    fn test_actuator_state_unknown_names() {
        let state: ActuatorState = serde_json::from_str("\"ACTUATOR_ILLEGAL\"").unwrap();
        assert_eq!(state, ActuatorState::Unknown);
        assert!(!state.is_closed());
        assert!(ActuatorState::Closed.is_closed());
    }

    #[test]
    fn test_body_fields_for_formatting() {
        let body = CanBody::GeneralBoardStatus(BoardStatusReport {
            time: 12.0,
            status: "E_NOMINAL".to_string(),
        });
        let fields = body.fields();
        assert_eq!(fields.get("status").and_then(|v| v.as_str()), Some("E_NOMINAL"));
        assert_eq!(fields.get("time").and_then(|v| v.as_f64()), Some(12.0));
    }
}
