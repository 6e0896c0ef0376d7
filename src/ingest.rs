//! Line-oriented message ingestion
//!
//! The transport hands over one JSON message per line. Each line is decoded
//! into a typed [`Message`] once, here, and then dispatched.

use crate::config::IngestConfig;
use anyhow::{Context, Result};
use omnidash_core::{DispatchReport, Message, ParserDispatcher};
use serde::Serialize;
use std::io::BufRead;

/// Running counters for an ingestion session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// Non-empty lines read
    pub lines: u64,
    /// Lines decoded into messages
    pub decoded: u64,
    /// Lines that failed to decode
    pub malformed: u64,
    /// Messages dropped by the channel filter
    pub skipped_channel: u64,
    /// Messages handed to the dispatcher
    pub dispatched: u64,
    /// Parser errors across all dispatched messages
    pub parser_failures: u64,
}

/// Decodes transport lines and feeds them to a [`ParserDispatcher`]
pub struct Ingestor {
    dispatcher: ParserDispatcher,
    channel_filter: String,
    skip_malformed: bool,
    /// Physical input lines seen, blank ones included
    line_number: u64,
    stats: IngestStats,
}

impl Ingestor {
    pub fn new(dispatcher: ParserDispatcher, config: &IngestConfig) -> Self {
        Self {
            dispatcher,
            channel_filter: config.channel_filter.clone(),
            skip_malformed: config.skip_malformed,
            line_number: 0,
            stats: IngestStats::default(),
        }
    }

    /// Decode and dispatch the next input line
    ///
    /// Every call counts as one physical line for error reporting. Returns
    /// `Ok(None)` for blank lines, filtered channels and (when skipping is
    /// enabled) malformed messages.
    pub fn ingest_line(&mut self, line: &str) -> Result<Option<DispatchReport>> {
        self.line_number += 1;
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        self.stats.lines += 1;

        let message = match omnidash_types::decode_json(line) {
            Ok(message) => message,
            Err(e) => {
                self.stats.malformed += 1;
                if self.skip_malformed {
                    log::warn!(
                        "Skipping malformed message on line {}: {}",
                        self.line_number,
                        e
                    );
                    return Ok(None);
                }
                return Err(e).with_context(|| format!("line {}", self.line_number));
            }
        };
        self.stats.decoded += 1;

        Ok(self.ingest_message(&message))
    }

    /// Dispatch an already decoded message
    pub fn ingest_message(&mut self, message: &Message) -> Option<DispatchReport> {
        if !message.channel.starts_with(self.channel_filter.as_str()) {
            self.stats.skipped_channel += 1;
            return None;
        }

        let report = self.dispatcher.dispatch_message(message);
        self.stats.dispatched += 1;
        self.stats.parser_failures += report.failed as u64;
        Some(report)
    }

    /// Ingest every line of `reader` until end of input
    pub fn run<R: BufRead>(&mut self, reader: R) -> Result<IngestStats> {
        for line in reader.lines() {
            let line = line.context("Failed to read input")?;
            self.ingest_line(&line)?;
        }
        log::info!(
            "Ingestion finished: {} lines, {} dispatched, {} malformed",
            self.stats.lines,
            self.stats.dispatched,
            self.stats.malformed
        );
        Ok(self.stats)
    }

    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    pub fn dispatcher(&self) -> &ParserDispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut ParserDispatcher {
        &mut self.dispatcher
    }

    pub fn into_dispatcher(self) -> ParserDispatcher {
        self.dispatcher
    }
}
