//! Periodic render loop
//!
//! Runs on the tokio runtime, independent of ingestion. Every tick it expires
//! silent boards; every `summary_every_ticks` ticks it takes a snapshot of all
//! series and board states and prints it as a frame.

use crate::config::RenderConfig;
use crate::health::{BoardSummary, SharedHealthTracker};
use chrono::Local;
use log::{debug, trace};
use omnidash_core::SeriesCatalog;
use serde::Serialize;
use std::fmt;
use std::sync::PoisonError;
use std::time::Instant;

/// Latest state of one series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub channel: String,
    pub name: String,
    pub points: usize,
    pub last: Option<(f64, f64)>,
}

/// Everything a dashboard needs to draw one refresh
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub tick: u64,
    /// Local wall-clock time of the snapshot (RFC 3339)
    pub rendered_at: String,
    pub series: Vec<SeriesSummary>,
    pub boards: Vec<BoardSummary>,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== frame {} at {} ===", self.tick, self.rendered_at)?;
        for s in &self.series {
            match s.last {
                Some((t, v)) => writeln!(
                    f,
                    "  {:<12} {:<40} {:>8} pts  last ({:.3}, {:.4})",
                    s.channel, s.name, s.points, t, v
                )?,
                None => writeln!(f, "  {:<12} {:<40} {:>8} pts", s.channel, s.name, s.points)?,
            }
        }
        let boards: Vec<String> = self
            .boards
            .iter()
            .map(|b| format!("{}={}({})", b.name, b.status, b.color))
            .collect();
        write!(f, "  boards: {}", boards.join(" "))
    }
}

/// Drives periodic board expiry and frame output
pub struct RenderLoop {
    catalog: SeriesCatalog,
    tracker: SharedHealthTracker,
    config: RenderConfig,
    ticks: u64,
}

impl RenderLoop {
    pub fn new(catalog: SeriesCatalog, tracker: SharedHealthTracker, config: RenderConfig) -> Self {
        Self {
            catalog,
            tracker,
            config,
            ticks: 0,
        }
    }

    /// Snapshot every series and board
    pub fn render_frame(&self) -> Frame {
        let mut series = Vec::new();
        for channel in self.catalog.channels() {
            let Some(registry) = self.catalog.registry(&channel) else {
                continue;
            };
            for handle in registry.all() {
                series.push(SeriesSummary {
                    channel: channel.clone(),
                    name: handle.name().to_string(),
                    points: handle.len(),
                    last: handle.last(),
                });
            }
        }

        let boards = self
            .tracker
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot();

        Frame {
            tick: self.ticks,
            rendered_at: Local::now().to_rfc3339(),
            series,
            boards,
        }
    }

    /// Advance one tick at host time `now`
    ///
    /// Returns a frame when one is due.
    pub fn tick(&mut self, now: Instant) -> Option<Frame> {
        self.ticks += 1;

        let expired = self
            .tracker
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .expire(now);
        if !expired.is_empty() {
            debug!("Expired boards: {}", expired.join(", "));
        }

        let every = u64::from(self.config.summary_every_ticks);
        if every == 0 || self.ticks % every != 0 {
            return None;
        }
        Some(self.render_frame())
    }

    /// Print a frame in the configured output format
    pub fn emit(&self, frame: &Frame) {
        if self.config.json {
            match serde_json::to_string(frame) {
                Ok(line) => println!("{}", line),
                Err(e) => log::error!("Failed to serialize frame: {}", e),
            }
        } else {
            println!("{}", frame);
        }
    }

    /// Run the loop
    ///
    /// This runs indefinitely; stop it by dropping the future.
    pub async fn run(&mut self) {
        let mut interval = tokio::time::interval(self.config.tick_interval());

        loop {
            interval.tick().await;

            let start = Instant::now();
            if let Some(frame) = self.tick(start) {
                self.emit(&frame);
            }
            trace!("Render tick took {:?}", start.elapsed());
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{BoardHealthTracker, CanDisplayParser};
    use omnidash_core::{CanBody, CanMessage, Message, ParserDispatcher, Payload};
    use omnidash_types::{BoardStatusReport, FillLevel};
    use std::time::Duration;

    fn setup(summary_every_ticks: u32) -> (ParserDispatcher, RenderLoop) {
        let tracker = BoardHealthTracker::shared(10, Duration::from_secs(10));
        let mut dispatcher = ParserDispatcher::new();
        omnidash_parsers::register_all(&mut dispatcher);
        dispatcher.register(
            omnidash_parsers::PARSLEY_CHANNEL,
            Box::new(CanDisplayParser::new(tracker.clone())),
        );
        let config = RenderConfig {
            summary_every_ticks,
            ..RenderConfig::default()
        };
        let render = RenderLoop::new(dispatcher.catalog(), tracker, config);
        (dispatcher, render)
    }

    fn can(board: &str, body: CanBody) -> Message {
        Message::new(
            "CAN/Parsley",
            0.0,
            Payload::Can(CanMessage::from_body(Some(board), body)),
        )
    }

    #[test]
    fn test_frame_includes_series_and_boards() {
        let (mut dispatcher, render) = setup(1);
        dispatcher.dispatch_message(&can(
            "SENSOR",
            CanBody::FillLevel(FillLevel { time: 500.0, level: 0.4 }),
        ));
        dispatcher.dispatch_message(&can(
            "SENSOR",
            CanBody::GeneralBoardStatus(BoardStatusReport {
                time: 600.0,
                status: "E_NOMINAL".to_string(),
            }),
        ));

        let frame = render.render_frame();
        let names: Vec<&str> = frame.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Fill Level", "Board Health (SENSOR)"]);
        assert_eq!(frame.series[0].last, Some((0.5, 0.4)));

        let sensor = frame.boards.iter().find(|b| b.name == "SENSOR").unwrap();
        assert_eq!(sensor.status, "E_NOMINAL");
        assert_eq!(frame.boards.len(), 13);

        let text = frame.to_string();
        assert!(text.contains("SENSOR=E_NOMINAL(green)"));
        assert!(text.contains("Fill Level"));

        let json: serde_json::Value = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["series"][0]["points"], 1);
        assert_eq!(json["boards"][4]["health"], "healthy");
    }

    #[test]
    fn test_frames_every_n_ticks() {
        let (_dispatcher, mut render) = setup(3);
        let now = Instant::now();

        let frames: Vec<bool> = (0..6).map(|_| render.tick(now).is_some()).collect();
        assert_eq!(frames, vec![false, false, true, false, false, true]);
        assert_eq!(render.ticks(), 6);
    }

    #[test]
    fn test_zero_disables_periodic_frames() {
        let (_dispatcher, mut render) = setup(0);
        assert!((0..5).all(|_| render.tick(Instant::now()).is_none()));
    }

    #[test]
    fn test_tick_expires_silent_boards() {
        let (mut dispatcher, mut render) = setup(1);
        dispatcher.dispatch_message(&can(
            "GPS",
            CanBody::GeneralBoardStatus(BoardStatusReport {
                time: 1.0,
                status: "E_NOMINAL".to_string(),
            }),
        ));

        let frame = render.tick(Instant::now() + Duration::from_secs(30)).unwrap();
        let gps = frame.boards.iter().find(|b| b.name == "GPS").unwrap();
        assert_eq!(gps.status, omnidash_types::DEAD_FROM_TIMEOUT_STATUS);
    }
}
