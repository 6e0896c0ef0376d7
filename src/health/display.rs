//! Parser feeding every CAN message into the board health tracker

use super::tracker::SharedHealthTracker;
use omnidash_core::{Message, MsgType, ParseError, Parser, SeriesRegistry, TimestampUnwrapper};
use std::collections::HashMap;
use std::sync::PoisonError;
use std::time::Instant;

/// Name of the health series for a board
pub fn health_series_name(board: &str) -> String {
    format!("Board Health ({})", board)
}

/// Watches all CAN traffic to keep board status, liveness and history current
///
/// Unlike the per-type parsers this one sees every message type, so it keeps
/// one timestamp unwrapper per board instead of per message type.
pub struct CanDisplayParser {
    tracker: SharedHealthTracker,
    unwrappers: HashMap<String, TimestampUnwrapper>,
}

impl CanDisplayParser {
    pub fn new(tracker: SharedHealthTracker) -> Self {
        Self {
            tracker,
            unwrappers: HashMap::new(),
        }
    }

    pub fn tracker(&self) -> &SharedHealthTracker {
        &self.tracker
    }
}

/// Board a message came from: `board_id`, else the last channel segment
fn board_name(message: &Message, board_id: Option<&str>) -> Option<String> {
    if let Some(id) = board_id {
        return Some(id.to_string());
    }
    message
        .channel
        .rsplit('/')
        .next()
        .filter(|segment| omnidash_types::board_by_name(segment).is_some())
        .map(str::to_string)
}

impl Parser for CanDisplayParser {
    fn name(&self) -> &str {
        "CAN Display"
    }

    fn parse(&mut self, message: &Message, series: &SeriesRegistry) -> Result<(), ParseError> {
        let Some(can) = message.as_can() else {
            return Ok(());
        };
        let Some(board) = board_name(message, can.board_id.as_deref()) else {
            log::debug!("{} message without a board, skipping", can.msg_type);
            return Ok(());
        };
        if omnidash_types::board_by_name(&board).is_none() {
            log::debug!("Message from unknown board {}", board);
            return Ok(());
        }

        let unwrapper = self.unwrappers.entry(board.clone()).or_default();
        // Untimed messages still count for liveness, at the board's latest time
        let time = match can.body.raw_time() {
            Some(raw_ms) => unwrapper.unwrap_ms(raw_ms),
            None => unwrapper.current(),
        };

        let mut tracker = self.tracker.write().unwrap_or_else(PoisonError::into_inner);
        tracker.observe(&board, time, can, Instant::now());

        if can.msg_type() == MsgType::GeneralBoardStatus {
            if let Some(state) = tracker.board(&board) {
                series
                    .get_or_create(&health_series_name(&board))
                    .add(time, state.health.as_value());
            }
        }
        Ok(())
    }
}
