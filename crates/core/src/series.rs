//! Append-only named time series

use crate::constants::MAX_SUBSCRIBERS_WARN;
use crossbeam::channel::{unbounded, Receiver, Sender};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Notification sent to subscribers for every appended point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesUpdate {
    pub series: String,
    pub time: f64,
    pub value: f64,
}

/// Copy of a series taken at one instant, for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSnapshot {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

/// A named, insertion-ordered sequence of `(time, value)` points
///
/// Ordering of times is not enforced; parsers are expected to append in
/// non-decreasing time order. Readers always receive copies, so a render
/// thread can read while the ingestion thread appends.
pub struct Series {
    name: String,
    points: RwLock<Vec<(f64, f64)>>,
    subscribers: Mutex<Vec<Sender<SeriesUpdate>>>,
}

/// Shared handle to a series; identity is the `Arc` allocation
pub type SeriesHandle = Arc<Series>;

impl Series {
    /// Create a new empty series
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: RwLock::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a point and notify subscribers
    pub fn add(&self, time: f64, value: f64) {
        self.points
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((time, value));
        self.notify(time, value);
    }

    /// All points in insertion order (copy-on-read)
    pub fn values(&self) -> Vec<(f64, f64)> {
        self.points
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Points split into parallel time and value columns
    pub fn columns(&self) -> (Vec<f64>, Vec<f64>) {
        self.points
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .unzip()
    }

    /// Most recent point
    pub fn last(&self) -> Option<(f64, f64)> {
        self.points
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .copied()
    }

    pub fn len(&self) -> usize {
        self.points.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> SeriesSnapshot {
        SeriesSnapshot {
            name: self.name.clone(),
            points: self.values(),
        }
    }

    /// Drop all points (used when a channel's registry is torn down)
    pub fn clear(&self) {
        self.points
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Receive a [`SeriesUpdate`] for every future `add`
    ///
    /// Dropping the receiver unsubscribes; the sender is pruned on the next append.
    pub fn subscribe(&self) -> Receiver<SeriesUpdate> {
        let (tx, rx) = unbounded();
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.push(tx);
        if subscribers.len() > MAX_SUBSCRIBERS_WARN {
            log::warn!(
                "Series '{}' has {} subscribers",
                self.name,
                subscribers.len()
            );
        }
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn notify(&self, time: f64, value: f64) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if subscribers.is_empty() {
            return;
        }

        let update = SeriesUpdate {
            series: self.name.clone(),
            time,
            value,
        };
        subscribers.retain(|tx| tx.send(update.clone()).is_ok());
    }
}

impl std::fmt::Debug for Series {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Series")
            .field("name", &self.name)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_in_call_order() {
        let series = Series::new("Fill Level");
        let points = [(0.0, 1.0), (2.0, -3.5), (1.0, 7.0), (1.0, 7.0)];
        for (t, v) in points {
            series.add(t, v);
        }

        // Out-of-order and duplicate times are kept as-is
        assert_eq!(series.values(), points.to_vec());
        assert_eq!(series.len(), 4);
        assert_eq!(series.last(), Some((1.0, 7.0)));
    }

    #[test]
    fn test_columns() {
        let series = Series::new("s");
        series.add(0.5, 10.0);
        series.add(1.5, 20.0);
        let (times, values) = series.columns();
        assert_eq!(times, vec![0.5, 1.5]);
        assert_eq!(values, vec![10.0, 20.0]);
    }

    #[test]
    fn test_empty_series() {
        let series = Series::new("empty");
        assert!(series.is_empty());
        assert_eq!(series.last(), None);
        assert!(series.values().is_empty());
    }

    #[test]
    fn test_subscribers_receive_updates() {
        let series = Series::new("GPS Altitude");
        let rx = series.subscribe();
        series.add(1.0, 100.25);

        let update = rx.try_recv().unwrap();
        assert_eq!(update.series, "GPS Altitude");
        assert_eq!(update.time, 1.0);
        assert_eq!(update.value, 100.25);
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let series = Series::new("s");
        let rx = series.subscribe();
        let _kept = series.subscribe();
        assert_eq!(series.subscriber_count(), 2);

        drop(rx);
        series.add(0.0, 0.0);
        assert_eq!(series.subscriber_count(), 1);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let series = Series::new("s");
        series.add(0.0, 1.0);
        let snapshot = series.snapshot();
        series.add(1.0, 2.0);

        assert_eq!(snapshot.points, vec![(0.0, 1.0)]);
        assert_eq!(series.len(), 2);
    }
}
