//! Timestamp wraparound correction for CAN device clocks

use crate::constants::MS_PER_SECOND;

/// Turns a periodically overflowing device clock into monotonic time
///
/// Any raw time strictly below the previous one is taken as a wraparound:
/// the previous time is added to the running offset. Each parser owns its
/// own unwrapper and feeds it only the messages it handles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimestampUnwrapper {
    /// Last raw time seen (seconds, before the offset is applied)
    last_time: f64,
    /// Cumulative correction (seconds)
    time_offset: f64,
}

impl TimestampUnwrapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Correct a raw device time in milliseconds, returning seconds
    pub fn unwrap_ms(&mut self, raw_ms: f64) -> f64 {
        self.unwrap_secs(raw_ms / MS_PER_SECOND)
    }

    /// Correct a raw device time already in seconds
    pub fn unwrap_secs(&mut self, raw: f64) -> f64 {
        if raw < self.last_time {
            self.time_offset += self.last_time;
            log::debug!(
                "Timestamp wrapped ({:.3}s < {:.3}s), offset now {:.3}s",
                raw,
                self.last_time,
                self.time_offset
            );
        }
        self.last_time = raw;
        raw + self.time_offset
    }

    /// Corrected time of the last raw time seen (0 before any)
    pub fn current(&self) -> f64 {
        self.last_time + self.time_offset
    }

    pub fn last_time(&self) -> f64 {
        self.last_time
    }

    pub fn time_offset(&self) -> f64 {
        self.time_offset
    }
}
