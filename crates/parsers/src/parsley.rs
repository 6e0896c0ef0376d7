//! Message-type filtered CAN parsers
//!
//! Every parsley parser sits on the shared "CAN/Parsley" channel, acts only on
//! one message type, and unwraps the device timestamp before decoding fields.

use omnidash_core::{
    BoxedParser, CanBody, Message, MsgType, ParseError, Parser, SeriesRegistry,
    TimestampUnwrapper,
};

/// Decoding of one CAN message type into series
pub trait CanParser: Send {
    /// The only message type this parser acts on
    fn msg_type(&self) -> MsgType;

    /// Human-readable name, used in logs
    fn name(&self) -> &str;

    /// Add points for one message; `time` is already unwrapped, in seconds
    fn parse_can(
        &mut self,
        time: f64,
        body: &CanBody,
        series: &SeriesRegistry,
    ) -> Result<(), ParseError>;
}

/// Adapts a [`CanParser`] to the dispatcher's [`Parser`] trait
///
/// Filters on message type and owns the timestamp unwrapper, so each message
/// type keeps its own wraparound state.
pub struct ParsleyParser<P> {
    msg_type: MsgType,
    unwrapper: TimestampUnwrapper,
    inner: P,
}

impl<P: CanParser> ParsleyParser<P> {
    pub fn new(inner: P) -> Self {
        Self {
            msg_type: inner.msg_type(),
            unwrapper: TimestampUnwrapper::new(),
            inner,
        }
    }

    pub fn msg_type(&self) -> MsgType {
        self.msg_type
    }
}

impl<P: CanParser + 'static> ParsleyParser<P> {
    pub fn boxed(inner: P) -> BoxedParser {
        Box::new(Self::new(inner))
    }
}

impl<P: CanParser> Parser for ParsleyParser<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn parse(&mut self, message: &Message, series: &SeriesRegistry) -> Result<(), ParseError> {
        let Some(can) = message.as_can() else {
            return Ok(());
        };
        if can.msg_type() != self.msg_type {
            return Ok(());
        }

        let raw_ms = can.body.raw_time().ok_or(ParseError::MissingTime {
            msg_type: self.msg_type,
        })?;
        let time = self.unwrapper.unwrap_ms(raw_ms);
        self.inner.parse_can(time, &can.body, series)
    }
}
