//! Shared constants

/// Device timestamps are reported in milliseconds
pub const MS_PER_SECOND: f64 = 1000.0;

/// Subscriber count above which a series logs a warning (likely a leaked receiver)
pub const MAX_SUBSCRIBERS_WARN: usize = 64;
