//! GPS board parsers

use crate::parsley::CanParser;
use omnidash_core::{CanBody, MsgType, ParseError, SeriesRegistry};
use omnidash_types::GpsCoordinate;

const MINUTES_PER_DEGREE: f64 = 60.0;

/// `dmins` is in 1/10000 of a minute
const DMINUTES_PER_DEGREE: f64 = 600_000.0;

/// Degrees + minutes + decimal minutes as decimal degrees
///
/// The direction letter is display-only and never changes the sign.
pub fn compose_coordinate(coord: &GpsCoordinate) -> f64 {
    coord.degs + coord.mins / MINUTES_PER_DEGREE + coord.dmins / DMINUTES_PER_DEGREE
}

/// GPS_INFO -> "GPS Satellites", "GPS Quality"
pub struct GpsInfoParser;

impl CanParser for GpsInfoParser {
    fn msg_type(&self) -> MsgType {
        MsgType::GpsInfo
    }

    fn name(&self) -> &str {
        "GPSInfoParser"
    }

    fn parse_can(
        &mut self,
        time: f64,
        body: &CanBody,
        series: &SeriesRegistry,
    ) -> Result<(), ParseError> {
        let CanBody::GpsInfo(info) = body else {
            return Err(ParseError::UnexpectedBody { expected: self.msg_type() });
        };
        series.get_or_create("GPS Satellites").add(time, info.num_sats);
        series.get_or_create("GPS Quality").add(time, info.quality);
        Ok(())
    }
}

/// GPS_ALTITUDE -> "GPS Altitude"
pub struct GpsAltitudeParser;

impl CanParser for GpsAltitudeParser {
    fn msg_type(&self) -> MsgType {
        MsgType::GpsAltitude
    }

    fn name(&self) -> &str {
        "GPSAltParser"
    }

    fn parse_can(
        &mut self,
        time: f64,
        body: &CanBody,
        series: &SeriesRegistry,
    ) -> Result<(), ParseError> {
        let CanBody::GpsAltitude(alt) = body else {
            return Err(ParseError::UnexpectedBody { expected: self.msg_type() });
        };
        series
            .get_or_create("GPS Altitude")
            .add(time, alt.altitude + alt.daltitude / 100.0);
        Ok(())
    }
}

/// GPS_LATITUDE -> "GPS Latitude"
pub struct GpsLatitudeParser;

impl CanParser for GpsLatitudeParser {
    fn msg_type(&self) -> MsgType {
        MsgType::GpsLatitude
    }

    fn name(&self) -> &str {
        "GPSLatitudeParser"
    }

    fn parse_can(
        &mut self,
        time: f64,
        body: &CanBody,
        series: &SeriesRegistry,
    ) -> Result<(), ParseError> {
        let CanBody::GpsLatitude(coord) = body else {
            return Err(ParseError::UnexpectedBody { expected: self.msg_type() });
        };
        series
            .get_or_create("GPS Latitude")
            .add(time, compose_coordinate(coord));
        Ok(())
    }
}

/// GPS_LONGITUDE -> "GPS Longitude"
pub struct GpsLongitudeParser;

impl CanParser for GpsLongitudeParser {
    fn msg_type(&self) -> MsgType {
        MsgType::GpsLongitude
    }

    fn name(&self) -> &str {
        "GPSLongitudeParser"
    }

    fn parse_can(
        &mut self,
        time: f64,
        body: &CanBody,
        series: &SeriesRegistry,
    ) -> Result<(), ParseError> {
        let CanBody::GpsLongitude(coord) = body else {
            return Err(ParseError::UnexpectedBody { expected: self.msg_type() });
        };
        series
            .get_or_create("GPS Longitude")
            .add(time, compose_coordinate(coord));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omnidash_types::{GpsAltitude, GpsInfo};

    fn coord(degs: f64, mins: f64, dmins: f64, direction: Option<&str>) -> GpsCoordinate {
        GpsCoordinate {
            time: 0.0,
            degs,
            mins,
            dmins,
            direction: direction.map(str::to_string),
        }
    }

    #[test]
    fn test_compose_coordinate() {
        assert_eq!(compose_coordinate(&coord(40.0, 30.0, 300_000.0, None)), 41.0);
        assert_eq!(compose_coordinate(&coord(40.0, 30.0, 300_000.0, Some("N"))), 41.0);
        assert_eq!(compose_coordinate(&coord(123.0, 15.0, 0.0, Some("W"))), 123.25);
        assert_eq!(compose_coordinate(&coord(40.0, 30.0, 300_000.0, Some("S"))), 41.0);
    }

    #[test]
    fn test_latitude_and_longitude_series() {
        let registry = SeriesRegistry::new();
        GpsLatitudeParser
            .parse_can(
                3.0,
                &CanBody::GpsLatitude(coord(43.0, 28.0, 0.0, None)),
                &registry,
            )
            .unwrap();
        GpsLongitudeParser
            .parse_can(
                3.0,
                &CanBody::GpsLongitude(coord(80.0, 33.0, 0.0, None)),
                &registry,
            )
            .unwrap();

        let lat = registry.get("GPS Latitude").unwrap().last().unwrap();
        let lon = registry.get("GPS Longitude").unwrap().last().unwrap();
        assert!((lat.1 - (43.0 + 28.0 / 60.0)).abs() < 1e-12);
        assert!((lon.1 - 80.55).abs() < 1e-12);
    }

    #[test]
    fn test_info_and_altitude() {
        let registry = SeriesRegistry::new();
        GpsInfoParser
            .parse_can(
                1.0,
                &CanBody::GpsInfo(GpsInfo {
                    time: 0.0,
                    num_sats: 9.0,
                    quality: 2.0,
                }),
                &registry,
            )
            .unwrap();
        GpsAltitudeParser
            .parse_can(
                1.0,
                &CanBody::GpsAltitude(GpsAltitude {
                    time: 0.0,
                    altitude: 350.0,
                    daltitude: 25.0,
                }),
                &registry,
            )
            .unwrap();

        assert_eq!(registry.get("GPS Satellites").unwrap().values(), vec![(1.0, 9.0)]);
        assert_eq!(registry.get("GPS Quality").unwrap().values(), vec![(1.0, 2.0)]);
        assert_eq!(registry.get("GPS Altitude").unwrap().values(), vec![(1.0, 350.25)]);
    }

    #[test]
    fn test_western_longitude_keeps_sign() {
        use crate::parsley::ParsleyParser;
        use omnidash_core::Parser;

        let registry = SeriesRegistry::new();
        let mut parser = ParsleyParser::new(GpsLongitudeParser);
        let message = omnidash_types::decode_json(
            r#"{"channel": "CAN/Parsley/GPS", "msg_type": "GPS_LONGITUDE", "board_id": "GPS",
                "data": {"time": 1000, "degs": 40, "mins": 30, "dmins": 300000, "direction": "W"}}"#,
        )
        .unwrap();

        parser.parse(&message, &registry).unwrap();
        assert_eq!(registry.get("GPS Longitude").unwrap().values(), vec![(1.0, 41.0)]);
    }
}
