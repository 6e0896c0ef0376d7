//! omnidash-core: Series registry and parser dispatch for omnidash.
//!
//! This crate contains the fundamental types every parser and consumer shares:
//! the append-only [`Series`], the per-channel [`SeriesRegistry`], the
//! [`Parser`] trait, the [`ParserDispatcher`] that routes messages by channel
//! prefix, and the [`TimestampUnwrapper`] used by CAN parsers.

pub mod constants;
mod dispatcher;
mod parser;
mod registry;
mod series;
mod unwrap;

pub use constants::{MAX_SUBSCRIBERS_WARN, MS_PER_SECOND};
pub use dispatcher::{DispatchReport, ParserDispatcher, SeriesCatalog};
pub use parser::{BoxedParser, ParseError, Parser};
pub use registry::SeriesRegistry;
pub use series::{Series, SeriesHandle, SeriesSnapshot, SeriesUpdate};
pub use unwrap::TimestampUnwrapper;

// Re-export the message model used in trait signatures for convenience
pub use omnidash_types::{CanBody, CanMessage, Message, MsgType, Payload};
