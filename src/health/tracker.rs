//! Per-board liveness and status tracking

use omnidash_types::{
    BoardHealth, BoardInfo, CanBody, CanMessage, StatusColor, BOARDS, DEAD_FROM_TIMEOUT_STATUS,
    DEAD_STATUS,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Live state of one board
#[derive(Debug, Clone)]
pub struct BoardState {
    pub board: &'static BoardInfo,
    /// Last reported status (starts as "DEAD")
    pub status: String,
    pub health: BoardHealth,
    /// Unwrapped device time of the last message (seconds)
    pub last_msg_time: Option<f64>,
    /// Host time the last message was observed
    pub last_seen: Option<Instant>,
    history: VecDeque<String>,
}

impl BoardState {
    fn new(board: &'static BoardInfo, history_len: usize) -> Self {
        Self {
            board,
            status: DEAD_STATUS.to_string(),
            health: BoardHealth::Unhealthy,
            last_msg_time: None,
            last_seen: None,
            history: VecDeque::with_capacity(history_len),
        }
    }

    /// Formatted recent messages, oldest first
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }
}

/// Serializable view of one board for status widgets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardSummary {
    pub name: &'static str,
    pub id: u8,
    pub status: String,
    pub health: BoardHealth,
    pub color: StatusColor,
    pub board_color: &'static str,
    pub last_msg_time: Option<f64>,
}

/// Tracks status and liveness of every known board
pub struct BoardHealthTracker {
    boards: Vec<BoardState>,
    history_len: usize,
    timeout: Duration,
}

/// Tracker shared between the ingestion thread and renderers
pub type SharedHealthTracker = Arc<RwLock<BoardHealthTracker>>;

impl BoardHealthTracker {
    pub fn new(history_len: usize, timeout: Duration) -> Self {
        Self {
            boards: BOARDS
                .iter()
                .map(|board| BoardState::new(board, history_len))
                .collect(),
            history_len,
            timeout,
        }
    }

    pub fn shared(history_len: usize, timeout: Duration) -> SharedHealthTracker {
        Arc::new(RwLock::new(Self::new(history_len, timeout)))
    }

    /// Record a message from `board_name` seen at host time `now`
    ///
    /// `time` is the message's unwrapped device time in seconds. Returns
    /// false (and records nothing) for boards not in the board table.
    pub fn observe(&mut self, board_name: &str, time: f64, msg: &CanMessage, now: Instant) -> bool {
        let history_len = self.history_len;
        let Some(state) = self.boards.iter_mut().find(|s| s.board.name == board_name) else {
            return false;
        };

        state.last_msg_time = Some(time);
        state.last_seen = Some(now);

        if history_len > 0 {
            if state.history.len() == history_len {
                state.history.pop_front();
            }
            state.history.push_back(format_message(time, board_name, msg));
        }

        if let CanBody::GeneralBoardStatus(report) = &msg.body {
            let health = BoardHealth::from_status(&report.status);
            if health != state.health {
                log::info!("Board {} is now {:?} ({})", board_name, health, report.status);
            }
            state.status = report.status.clone();
            state.health = health;
        }
        true
    }

    /// Mark boards silent for longer than the timeout as dead
    ///
    /// Boards that never reported stay "DEAD". Returns the newly expired boards.
    pub fn expire(&mut self, now: Instant) -> Vec<&'static str> {
        let mut expired = Vec::new();
        for state in &mut self.boards {
            let Some(last_seen) = state.last_seen else {
                continue;
            };
            if state.status == DEAD_FROM_TIMEOUT_STATUS {
                continue;
            }
            if now.saturating_duration_since(last_seen) > self.timeout {
                log::warn!(
                    "Board {} silent for more than {:?}",
                    state.board.name,
                    self.timeout
                );
                state.status = DEAD_FROM_TIMEOUT_STATUS.to_string();
                state.health = BoardHealth::Unhealthy;
                expired.push(state.board.name);
            }
        }
        expired
    }

    pub fn board(&self, name: &str) -> Option<&BoardState> {
        self.boards.iter().find(|s| s.board.name == name)
    }

    pub fn boards(&self) -> &[BoardState] {
        &self.boards
    }

    /// Copy of every board's state, in board table order
    pub fn snapshot(&self) -> Vec<BoardSummary> {
        self.boards
            .iter()
            .map(|s| BoardSummary {
                name: s.board.name,
                id: s.board.id,
                status: s.status.clone(),
                health: s.health,
                color: s.health.color(),
                board_color: s.board.color,
                last_msg_time: s.last_msg_time,
            })
            .collect()
    }

    pub fn healthy_count(&self) -> usize {
        self.boards.iter().filter(|s| s.health.is_healthy()).count()
    }
}

/// One-line rendering of a CAN message: `[time] BOARD MSG_TYPE key=value ...`
pub fn format_message(time: f64, board_name: &str, msg: &CanMessage) -> String {
    let mut line = format!("[{:.3}] {} {}", time, board_name, msg.msg_type);
    for (key, value) in msg.body.fields() {
        if key == "time" {
            continue;
        }
        match value {
            Value::String(s) => line.push_str(&format!(" {}={}", key, s)),
            other => line.push_str(&format!(" {}={}", key, other)),
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use omnidash_types::{BoardStatusReport, FillLevel};

    fn status(status: &str) -> CanMessage {
        CanMessage::from_body(
            Some("INJECTOR"),
            CanBody::GeneralBoardStatus(BoardStatusReport {
                time: 0.0,
                status: status.to_string(),
            }),
        )
    }

    fn fill(level: f64) -> CanMessage {
        CanMessage::from_body(Some("SENSOR"), CanBody::FillLevel(FillLevel { time: 0.0, level }))
    }

    #[test]
    fn test_boards_start_dead() {
        let tracker = BoardHealthTracker::new(50, Duration::from_secs(10));
        assert_eq!(tracker.boards().len(), BOARDS.len());
        for board in tracker.snapshot() {
            assert_eq!(board.status, DEAD_STATUS);
            assert_eq!(board.color, StatusColor::Red);
        }
        assert_eq!(tracker.healthy_count(), 0);
    }

    #[test]
    fn test_status_report_updates_health() {
        let mut tracker = BoardHealthTracker::new(50, Duration::from_secs(10));
        let now = Instant::now();

        assert!(tracker.observe("INJECTOR", 1.0, &status("E_NOMINAL"), now));
        let injector = tracker.board("INJECTOR").unwrap();
        assert_eq!(injector.status, "E_NOMINAL");
        assert_eq!(injector.health, BoardHealth::Healthy);

        tracker.observe("INJECTOR", 2.0, &status("E_BUS_UNDER_VOLTAGE"), now);
        let injector = tracker.board("INJECTOR").unwrap();
        assert_eq!(injector.health, BoardHealth::Unhealthy);
        assert_eq!(injector.last_msg_time, Some(2.0));
    }

    #[test]
    fn test_other_messages_keep_status() {
        let mut tracker = BoardHealthTracker::new(50, Duration::from_secs(10));
        tracker.observe("SENSOR", 4.0, &fill(0.5), Instant::now());

        let sensor = tracker.board("SENSOR").unwrap();
        assert_eq!(sensor.status, DEAD_STATUS);
        assert_eq!(sensor.last_msg_time, Some(4.0));
    }

    #[test]
    fn test_unknown_board_ignored() {
        let mut tracker = BoardHealthTracker::new(50, Duration::from_secs(10));
        assert!(!tracker.observe("MYSTERY", 1.0, &status("E_NOMINAL"), Instant::now()));
        assert_eq!(tracker.healthy_count(), 0);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut tracker = BoardHealthTracker::new(3, Duration::from_secs(10));
        let now = Instant::now();
        for i in 0..5 {
            tracker.observe("SENSOR", f64::from(i), &fill(f64::from(i)), now);
        }

        let history: Vec<&str> = tracker.board("SENSOR").unwrap().history().collect();
        assert_eq!(history.len(), 3);
        assert!(history[0].starts_with("[2.000] SENSOR FILL_LVL"));
        assert!(history[2].contains("level=4"));
    }

    #[test]
    fn test_silent_board_expires() {
        let mut tracker = BoardHealthTracker::new(50, Duration::from_secs(10));
        let start = Instant::now();
        tracker.observe("INJECTOR", 1.0, &status("E_NOMINAL"), start);

        assert!(tracker.expire(start + Duration::from_secs(5)).is_empty());
        assert_eq!(tracker.expire(start + Duration::from_secs(11)), vec!["INJECTOR"]);
        // Already expired boards are not reported again
        assert!(tracker.expire(start + Duration::from_secs(12)).is_empty());

        let injector = tracker.board("INJECTOR").unwrap();
        assert_eq!(injector.status, DEAD_FROM_TIMEOUT_STATUS);
        assert_eq!(injector.health, BoardHealth::Unhealthy);
        // Never-seen boards keep their initial status
        assert_eq!(tracker.board("GPS").unwrap().status, DEAD_STATUS);
    }

    #[test]
    fn test_format_message() {
        let line = format_message(12.5, "INJECTOR", &status("E_NOMINAL"));
        assert_eq!(line, "[12.500] INJECTOR GENERAL_BOARD_STATUS status=E_NOMINAL");
    }
}
