//! Transport-boundary decoding
//!
//! Raw messages arrive as JSON objects shaped like
//! `{"channel": .., "msg_type": .., "board_id": .., "timestamp": .., "data": {..}}`.
//! They are decoded exactly once here; parsers only ever see typed payloads.
//! Messages with a `msg_type` are CAN frames, messages without one are DAQ sweeps.

use crate::message::{CanBody, CanMessage, DaqSweep, Message, MsgType, Payload};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Errors raised while decoding a raw message
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message on channel {channel} has a non-object data field")]
    DataNotObject { channel: String },

    #[error("DAQ message on channel {channel} has no timestamp")]
    MissingTimestamp { channel: String },

    #[error("invalid {msg_type} body on channel {channel}: {source}")]
    InvalidBody {
        channel: String,
        msg_type: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Wire shape of a message before typing
#[derive(Debug, Deserialize)]
struct RawMessage {
    channel: String,
    #[serde(default)]
    msg_type: Option<String>,
    #[serde(default)]
    board_id: Option<String>,
    #[serde(default)]
    timestamp: Option<f64>,
    data: Value,
}

/// Decode one JSON-encoded message
pub fn decode_json(text: &str) -> Result<Message, DecodeError> {
    let raw: RawMessage = serde_json::from_str(text)?;
    Message::try_from(raw)
}

/// Decode a message that has already been parsed into a JSON value
pub fn decode_value(value: Value) -> Result<Message, DecodeError> {
    let raw: RawMessage = serde_json::from_value(value)?;
    Message::try_from(raw)
}

impl TryFrom<RawMessage> for Message {
    type Error = DecodeError;

    fn try_from(raw: RawMessage) -> Result<Self, Self::Error> {
        if !raw.data.is_object() {
            return Err(DecodeError::DataNotObject {
                channel: raw.channel,
            });
        }

        match raw.msg_type {
            Some(msg_type) => {
                let body = decode_can_body(&raw.channel, &msg_type, raw.data)?;
                let can = CanMessage::new(msg_type, raw.board_id, body);
                Ok(Message::new(
                    raw.channel,
                    raw.timestamp.unwrap_or_default(),
                    Payload::Can(can),
                ))
            }
            None => {
                let timestamp = raw.timestamp.ok_or_else(|| DecodeError::MissingTimestamp {
                    channel: raw.channel.clone(),
                })?;
                let sweep: DaqSweep =
                    serde_json::from_value(raw.data).map_err(|source| DecodeError::InvalidBody {
                        channel: raw.channel.clone(),
                        msg_type: "DAQ".to_string(),
                        source,
                    })?;
                Ok(Message::new(raw.channel, timestamp, Payload::Daq(sweep)))
            }
        }
    }
}

fn decode_can_body(channel: &str, msg_type: &str, data: Value) -> Result<CanBody, DecodeError> {
    let body = match MsgType::from_name(msg_type) {
        MsgType::FillLvl => serde_json::from_value(data).map(CanBody::FillLevel),
        MsgType::SensorTemp => serde_json::from_value(data).map(CanBody::SensorTemp),
        MsgType::SensorAcc => serde_json::from_value(data).map(CanBody::SensorAcc),
        MsgType::SensorGyro => serde_json::from_value(data).map(CanBody::SensorGyro),
        MsgType::SensorMag => serde_json::from_value(data).map(CanBody::SensorMag),
        MsgType::SensorAnalog => serde_json::from_value(data).map(CanBody::SensorAnalog),
        MsgType::ActuatorStatus => serde_json::from_value(data).map(CanBody::ActuatorStatus),
        MsgType::GpsInfo => serde_json::from_value(data).map(CanBody::GpsInfo),
        MsgType::GpsAltitude => serde_json::from_value(data).map(CanBody::GpsAltitude),
        MsgType::GpsLatitude => serde_json::from_value(data).map(CanBody::GpsLatitude),
        MsgType::GpsLongitude => serde_json::from_value(data).map(CanBody::GpsLongitude),
        MsgType::SensorAltitude => serde_json::from_value(data).map(CanBody::SensorAltitude),
        MsgType::GeneralBoardStatus => {
            serde_json::from_value(data).map(CanBody::GeneralBoardStatus)
        }
        MsgType::Unknown => {
            log::trace!("No typed body for {} on {}", msg_type, channel);
            serde_json::from_value(data).map(CanBody::Other)
        }
    };

    body.map_err(|source| DecodeError::InvalidBody {
        channel: channel.to_string(),
        msg_type: msg_type.to_string(),
        source,
    })
}
