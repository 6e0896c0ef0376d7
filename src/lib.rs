//! omnidash: headless telemetry dashboard core
//!
//! This library wires the parser crates into a running dashboard:
//! - Configuration management
//! - Board health tracking fed by a CAN display parser
//! - Line-oriented message ingestion
//! - A periodic render loop producing summary frames

pub mod config;
pub mod health;
pub mod ingest;
pub mod render;

// Re-export commonly used types
pub use config::AppConfig;
pub use health::{BoardHealthTracker, CanDisplayParser, SharedHealthTracker};
pub use ingest::{IngestStats, Ingestor};
pub use render::{Frame, RenderLoop};

use omnidash_core::ParserDispatcher;

/// Build a dispatcher with every built-in parser plus the board health parser
pub fn build_dispatcher(tracker: &SharedHealthTracker) -> ParserDispatcher {
    let mut dispatcher = ParserDispatcher::new();
    omnidash_parsers::register_all(&mut dispatcher);
    dispatcher.register(
        omnidash_parsers::PARSLEY_CHANNEL,
        Box::new(CanDisplayParser::new(tracker.clone())),
    );
    dispatcher
}
