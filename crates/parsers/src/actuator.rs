//! Actuator state parser

use crate::parsley::CanParser;
use omnidash_core::{CanBody, MsgType, ParseError, SeriesRegistry};
use omnidash_types::ActuatorState;

/// Pack requested and current actuator states into a 2-bit code
///
/// 0: request open, current open
/// 1: request open, current closed
/// 2: request closed, current open
/// 3: request closed, current closed
pub fn actuator_code(req: ActuatorState, cur: ActuatorState) -> u8 {
    let mut code = 0;
    if req.is_closed() {
        code |= 0b10;
    }
    if cur.is_closed() {
        code |= 0b01;
    }
    code
}

/// ACTUATOR_STATUS -> "Actuator State (<actuator>)"
pub struct ActuatorStateParser;

impl CanParser for ActuatorStateParser {
    fn msg_type(&self) -> MsgType {
        MsgType::ActuatorStatus
    }

    fn name(&self) -> &str {
        "ActuatorStateParser"
    }

    fn parse_can(
        &mut self,
        time: f64,
        body: &CanBody,
        series: &SeriesRegistry,
    ) -> Result<(), ParseError> {
        let CanBody::ActuatorStatus(status) = body else {
            return Err(ParseError::UnexpectedBody { expected: self.msg_type() });
        };
        let code = actuator_code(status.req_state, status.cur_state);
        series
            .get_or_create(&format!("Actuator State ({})", status.actuator))
            .add(time, f64::from(code));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omnidash_types::ActuatorState::{Closed, Open, Unknown};

    #[test]
    fn test_actuator_codes() {
        assert_eq!(actuator_code(Closed, Open), 2);
        assert_eq!(actuator_code(Open, Closed), 1);
        assert_eq!(actuator_code(Closed, Closed), 3);
        assert_eq!(actuator_code(Open, Open), 0);
    }

    #[test]
    fn test_unknown_state_counts_as_not_closed() {
        assert_eq!(actuator_code(Unknown, Closed), 1);
        assert_eq!(actuator_code(Closed, Unknown), 2);
    }

    #[test]
    fn test_series_per_actuator() {
        use omnidash_types::ActuatorStatus;

        let registry = SeriesRegistry::new();
        let mut parser = ActuatorStateParser;
        let status = |actuator: &str, req, cur| {
            CanBody::ActuatorStatus(ActuatorStatus {
                time: 0.0,
                actuator: actuator.to_string(),
                req_state: req,
                cur_state: cur,
            })
        };

        parser
            .parse_can(1.0, &status("ACTUATOR_VENT_VALVE", Closed, Closed), &registry)
            .unwrap();
        parser
            .parse_can(2.0, &status("ACTUATOR_INJECTOR_VALVE", Open, Closed), &registry)
            .unwrap();

        assert_eq!(
            registry.get("Actuator State (ACTUATOR_VENT_VALVE)").unwrap().values(),
            vec![(1.0, 3.0)]
        );
        assert_eq!(
            registry.get("Actuator State (ACTUATOR_INJECTOR_VALVE)").unwrap().values(),
            vec![(2.0, 1.0)]
        );
    }
}
