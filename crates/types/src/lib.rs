//! omnidash-types: Shared data types for the omnidash telemetry dashboard.
//!
//! This crate contains the decoded message model (a tagged union keyed by
//! message type), the transport-boundary decoder, the avionics board table
//! and the board health mapping. It has no knowledge of series or parsers,
//! making it suitable as a foundation layer.

pub mod board;
pub mod decode;
pub mod message;
pub mod status;

// Re-export commonly used types at the crate root for convenience
pub use board::{board_by_id, board_by_name, board_index, BoardInfo, BOARDS};
pub use decode::{decode_json, decode_value, DecodeError};
pub use message::{
    ActuatorState, ActuatorStatus, AltitudeReading, Axes, BoardStatusReport, CanBody, CanMessage,
    DaqSweep, FillLevel, GpsAltitude, GpsCoordinate, GpsInfo, Message, MsgType, OtherBody,
    Payload, SensorId, SensorReading, TemperatureReading,
};
pub use status::{BoardHealth, StatusColor, DEAD_FROM_TIMEOUT_STATUS, DEAD_STATUS};
