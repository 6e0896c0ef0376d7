//! Parser trait and related types

use super::registry::SeriesRegistry;
use omnidash_types::{Message, MsgType};
use thiserror::Error;

/// Errors a parser can report for a single message
///
/// These never abort a dispatch; the dispatcher logs them and moves on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("sensor '{sensor}' reported no samples")]
    EmptySamples { sensor: String },

    #[error("{msg_type} message has no device timestamp")]
    MissingTime { msg_type: MsgType },

    #[error("body does not match expected message type {expected}")]
    UnexpectedBody { expected: MsgType },
}

/// Trait for all parsers
///
/// A parser turns decoded messages into points on named series. Parsers are
/// registered with a [`ParserDispatcher`](crate::ParserDispatcher) under a
/// channel; every parser under the same channel writes into the same
/// [`SeriesRegistry`], which is handed to `parse` on each call.
pub trait Parser: Send {
    /// Human-readable name, used in logs
    fn name(&self) -> &str;

    /// Add all datapoints from `message` to the relevant series
    ///
    /// Messages of a type this parser does not handle must be ignored
    /// (return `Ok(())` without touching any series).
    fn parse(&mut self, message: &Message, series: &SeriesRegistry) -> Result<(), ParseError>;
}

/// Type-erased parser for dynamic dispatch
pub type BoxedParser = Box<dyn Parser>;
