//! Parsers for sensor board messages

use crate::parsley::CanParser;
use omnidash_core::{CanBody, MsgType, ParseError, SeriesRegistry};

/// FILL_LVL -> "Fill Level"
pub struct FillSensingParser;

impl CanParser for FillSensingParser {
    fn msg_type(&self) -> MsgType {
        MsgType::FillLvl
    }

    fn name(&self) -> &str {
        "FillSensingParser"
    }

    fn parse_can(
        &mut self,
        time: f64,
        body: &CanBody,
        series: &SeriesRegistry,
    ) -> Result<(), ParseError> {
        let CanBody::FillLevel(fill) = body else {
            return Err(ParseError::UnexpectedBody { expected: self.msg_type() });
        };
        series.get_or_create("Fill Level").add(time, fill.level);
        Ok(())
    }
}

/// SENSOR_TEMP -> "Temperature <sensor_id>"
pub struct TemperatureParser;

impl CanParser for TemperatureParser {
    fn msg_type(&self) -> MsgType {
        MsgType::SensorTemp
    }

    fn name(&self) -> &str {
        "TemperatureParser"
    }

    fn parse_can(
        &mut self,
        time: f64,
        body: &CanBody,
        series: &SeriesRegistry,
    ) -> Result<(), ParseError> {
        let CanBody::SensorTemp(reading) = body else {
            return Err(ParseError::UnexpectedBody { expected: self.msg_type() });
        };
        series
            .get_or_create(&format!("Temperature {}", reading.sensor_id))
            .add(time, reading.temperature);
        Ok(())
    }
}

/// Three-axis sensors, one series per axis: "<label> (x)", "<label> (y)", "<label> (z)"
pub struct AxesParser {
    msg_type: MsgType,
    name: &'static str,
    label: &'static str,
}

impl AxesParser {
    pub fn accelerometer() -> Self {
        Self {
            msg_type: MsgType::SensorAcc,
            name: "AccelParser",
            label: "Acceleration",
        }
    }

    pub fn gyroscope() -> Self {
        Self {
            msg_type: MsgType::SensorGyro,
            name: "GyroParser",
            label: "Gyro",
        }
    }

    pub fn magnetometer() -> Self {
        Self {
            msg_type: MsgType::SensorMag,
            name: "MagParser",
            label: "Magnetometer",
        }
    }
}

impl CanParser for AxesParser {
    fn msg_type(&self) -> MsgType {
        self.msg_type
    }

    fn name(&self) -> &str {
        self.name
    }

    fn parse_can(
        &mut self,
        time: f64,
        body: &CanBody,
        series: &SeriesRegistry,
    ) -> Result<(), ParseError> {
        let axes = match body {
            CanBody::SensorAcc(axes) | CanBody::SensorGyro(axes) | CanBody::SensorMag(axes)
                if body.msg_type() == self.msg_type =>
            {
                axes
            }
            _ => return Err(ParseError::UnexpectedBody { expected: self.msg_type }),
        };

        for (axis, value) in axes.components() {
            series
                .get_or_create(&format!("{} ({})", self.label, axis))
                .add(time, value);
        }
        Ok(())
    }
}

/// SENSOR_ANALOG -> "CAN Sensor <sensor_id>"
pub struct AnalogSensorParser;

impl CanParser for AnalogSensorParser {
    fn msg_type(&self) -> MsgType {
        MsgType::SensorAnalog
    }

    fn name(&self) -> &str {
        "AnalogSensorParser"
    }

    fn parse_can(
        &mut self,
        time: f64,
        body: &CanBody,
        series: &SeriesRegistry,
    ) -> Result<(), ParseError> {
        let CanBody::SensorAnalog(reading) = body else {
            return Err(ParseError::UnexpectedBody { expected: self.msg_type() });
        };
        series
            .get_or_create(&format!("CAN Sensor {}", reading.sensor_id))
            .add(time, reading.value);
        Ok(())
    }
}

/// SENSOR_ALTITUDE -> "Sensor Altitude"
pub struct SensorAltitudeParser;

impl CanParser for SensorAltitudeParser {
    fn msg_type(&self) -> MsgType {
        MsgType::SensorAltitude
    }

    fn name(&self) -> &str {
        "SensorAltParser"
    }

    fn parse_can(
        &mut self,
        time: f64,
        body: &CanBody,
        series: &SeriesRegistry,
    ) -> Result<(), ParseError> {
        let CanBody::SensorAltitude(reading) = body else {
            return Err(ParseError::UnexpectedBody { expected: self.msg_type() });
        };
        series.get_or_create("Sensor Altitude").add(time, reading.altitude);
        Ok(())
    }
}
