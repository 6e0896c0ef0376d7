//! Board health monitoring
//!
//! Every CAN message is routed through [`CanDisplayParser`], which keeps the
//! [`BoardHealthTracker`] current: last reported status, last message time,
//! and a short history of formatted messages per board. The render loop
//! expires boards that stopped talking.

mod display;
mod tracker;

pub use display::{health_series_name, CanDisplayParser};
pub use tracker::{
    format_message, BoardHealthTracker, BoardState, BoardSummary, SharedHealthTracker,
};
