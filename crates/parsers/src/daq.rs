//! DAQ sweep averaging parser

use omnidash_core::{Message, ParseError, Parser, Payload, SeriesRegistry};

/// Averages each sensor's samples in a DAQ sweep into one point
///
/// Times are relative to the first sweep received, so the x axis starts at zero.
#[derive(Debug, Default)]
pub struct DaqParser {
    /// Timestamp of the first sweep
    start: Option<f64>,
}

impl DaqParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) -> Option<f64> {
        self.start
    }
}

impl Parser for DaqParser {
    fn name(&self) -> &str {
        "DaqParser"
    }

    fn parse(&mut self, message: &Message, series: &SeriesRegistry) -> Result<(), ParseError> {
        let Payload::Daq(sweep) = &message.payload else {
            return Ok(());
        };

        let start = *self.start.get_or_insert(message.timestamp);
        let time = message.timestamp - start;

        // Keep averaging the remaining sensors when one is empty; report the first
        let mut result = Ok(());
        for (sensor, samples) in &sweep.sensors {
            if samples.is_empty() {
                if result.is_ok() {
                    result = Err(ParseError::EmptySamples {
                        sensor: sensor.clone(),
                    });
                }
                continue;
            }
            let mean = samples.iter().sum::<f64>() / samples.len() as f64;
            series.get_or_create(sensor).add(time, mean);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omnidash_types::DaqSweep;

    fn sweep(timestamp: f64, sensors: &[(&str, Vec<f64>)]) -> Message {
        let sensors = sensors
            .iter()
            .map(|(name, samples)| (name.to_string(), samples.clone()))
            .collect();
        Message::new("DAQ", timestamp, Payload::Daq(DaqSweep { sensors }))
    }

    #[test]
    fn test_first_sweep_is_time_zero() {
        let registry = SeriesRegistry::new();
        let mut parser = DaqParser::new();

        parser
            .parse(&sweep(100.0, &[("s1", vec![10.0, 20.0, 30.0])]), &registry)
            .unwrap();

        assert_eq!(registry.get("s1").unwrap().values(), vec![(0.0, 20.0)]);
        assert_eq!(parser.start(), Some(100.0));
    }

    #[test]
    fn test_later_sweeps_are_relative() {
        let registry = SeriesRegistry::new();
        let mut parser = DaqParser::new();

        parser
            .parse(&sweep(100.0, &[("s1", vec![1.0]), ("s2", vec![2.0, 4.0])]), &registry)
            .unwrap();
        parser
            .parse(&sweep(102.5, &[("s1", vec![3.0, 5.0])]), &registry)
            .unwrap();

        assert_eq!(
            registry.get("s1").unwrap().values(),
            vec![(0.0, 1.0), (2.5, 4.0)]
        );
        assert_eq!(registry.get("s2").unwrap().values(), vec![(0.0, 3.0)]);
    }

    #[test]
    fn test_empty_samples_reported_but_others_kept() {
        let registry = SeriesRegistry::new();
        let mut parser = DaqParser::new();

        let err = parser
            .parse(&sweep(1.0, &[("a", vec![]), ("b", vec![6.0])]), &registry)
            .unwrap_err();

        assert_eq!(
            err,
            ParseError::EmptySamples {
                sensor: "a".to_string()
            }
        );
        assert!(registry.get("a").is_none());
        assert_eq!(registry.get("b").unwrap().values(), vec![(0.0, 6.0)]);
    }

    #[test]
    fn test_can_messages_ignored() {
        use omnidash_core::{CanBody, CanMessage};
        use omnidash_types::OtherBody;

        let registry = SeriesRegistry::new();
        let mut parser = DaqParser::new();
        let can = Message::new(
            "DAQ",
            5.0,
            Payload::Can(CanMessage::from_body(None, CanBody::Other(OtherBody::default()))),
        );

        parser.parse(&can, &registry).unwrap();
        assert!(registry.is_empty());
        assert_eq!(parser.start(), None);
    }
}
