//! omnidash-parsers: Parser implementations for omnidash.

mod actuator;
mod daq;
mod gps;
mod parsley;
mod sensors;

pub use actuator::{actuator_code, ActuatorStateParser};
pub use daq::DaqParser;
pub use gps::{
    compose_coordinate, GpsAltitudeParser, GpsInfoParser, GpsLatitudeParser, GpsLongitudeParser,
};
pub use parsley::{CanParser, ParsleyParser};
pub use sensors::{
    AnalogSensorParser, AxesParser, FillSensingParser, SensorAltitudeParser, TemperatureParser,
};

use omnidash_core::ParserDispatcher;

/// Channel DAQ sweeps arrive on
pub const DAQ_CHANNEL: &str = "DAQ";

/// Umbrella channel for parsley-decoded CAN messages
pub const PARSLEY_CHANNEL: &str = "CAN/Parsley";

/// Register all built-in parsers with a dispatcher
pub fn register_all(dispatcher: &mut ParserDispatcher) {
    dispatcher.register(DAQ_CHANNEL, Box::new(DaqParser::new()));

    dispatcher.register(PARSLEY_CHANNEL, ParsleyParser::boxed(FillSensingParser));
    dispatcher.register(PARSLEY_CHANNEL, ParsleyParser::boxed(TemperatureParser));
    dispatcher.register(PARSLEY_CHANNEL, ParsleyParser::boxed(AxesParser::accelerometer()));
    dispatcher.register(PARSLEY_CHANNEL, ParsleyParser::boxed(AxesParser::gyroscope()));
    dispatcher.register(PARSLEY_CHANNEL, ParsleyParser::boxed(AxesParser::magnetometer()));
    dispatcher.register(PARSLEY_CHANNEL, ParsleyParser::boxed(AnalogSensorParser));
    dispatcher.register(PARSLEY_CHANNEL, ParsleyParser::boxed(ActuatorStateParser));
    dispatcher.register(PARSLEY_CHANNEL, ParsleyParser::boxed(GpsInfoParser));
    dispatcher.register(PARSLEY_CHANNEL, ParsleyParser::boxed(GpsAltitudeParser));
    dispatcher.register(PARSLEY_CHANNEL, ParsleyParser::boxed(GpsLatitudeParser));
    dispatcher.register(PARSLEY_CHANNEL, ParsleyParser::boxed(GpsLongitudeParser));
    dispatcher.register(PARSLEY_CHANNEL, ParsleyParser::boxed(SensorAltitudeParser));

    log::info!("Registered {} built-in parsers", dispatcher.parser_count());
}

#[cfg(test)]
pub(crate) mod test_util {
    use omnidash_core::{CanBody, CanMessage, Message, Payload};

    pub fn can_message(board: &str, body: CanBody) -> Message {
        Message::new(
            crate::PARSLEY_CHANNEL,
            0.0,
            Payload::Can(CanMessage::from_body(Some(board), body)),
        )
    }
}
