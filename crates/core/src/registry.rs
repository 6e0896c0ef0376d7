//! Per-channel registry of named series

use super::series::{Series, SeriesHandle};
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Default)]
struct RegistryInner {
    /// Series in creation order
    series: Vec<SeriesHandle>,
    /// Name to index into `series`
    by_name: HashMap<String, usize>,
}

/// Mapping from series name to [`Series`]
///
/// One registry is shared by every parser registered under the same exact
/// channel string, so those parsers share a single namespace of series names.
#[derive(Default)]
pub struct SeriesRegistry {
    inner: RwLock<RegistryInner>,
}

impl SeriesRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the series called `name`, creating an empty one if needed
    ///
    /// Repeated calls with the same name return the same instance.
    pub fn get_or_create(&self, name: &str) -> SeriesHandle {
        // Fast path: read lock only
        if let Some(series) = self.get(name) {
            return series;
        }

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        // Re-check after acquiring the write lock
        if let Some(&index) = inner.by_name.get(name) {
            return Arc::clone(&inner.series[index]);
        }

        debug!("Creating series '{}'", name);
        let series = Arc::new(Series::new(name));
        let index = inner.series.len();
        inner.series.push(Arc::clone(&series));
        inner.by_name.insert(name.to_string(), index);
        series
    }

    /// Look up a series without creating it
    pub fn get(&self, name: &str) -> Option<SeriesHandle> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .by_name
            .get(name)
            .map(|&index| Arc::clone(&inner.series[index]))
    }

    /// Snapshot of all series, in creation order
    pub fn all(&self) -> Vec<SeriesHandle> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .series
            .clone()
    }

    /// Names of all series, in creation order
    pub fn names(&self) -> Vec<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .series
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .series
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tear down every series held by this registry
    ///
    /// Outstanding handles stay valid but are emptied and detached.
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        for series in inner.series.drain(..) {
            series.clear();
        }
        inner.by_name.clear();
    }
}

impl std::fmt::Debug for SeriesRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeriesRegistry")
            .field("series", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_returns_same_instance() {
        let registry = SeriesRegistry::new();
        let a = registry.get_or_create("Temperature 1");
        let b = registry.get_or_create("Temperature 1");
        assert!(Arc::ptr_eq(&a, &b));

        a.add(1.0, 20.0);
        let c = registry.get_or_create("Temperature 1");
        assert!(Arc::ptr_eq(&a, &c));
        assert_eq!(c.values(), vec![(1.0, 20.0)]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_does_not_create() {
        let registry = SeriesRegistry::new();
        assert!(registry.get("missing").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_all_in_creation_order() {
        let registry = SeriesRegistry::new();
        for name in ["Gyro (x)", "Gyro (y)", "Gyro (z)"] {
            registry.get_or_create(name);
        }
        registry.get_or_create("Gyro (x)");

        assert_eq!(registry.names(), vec!["Gyro (x)", "Gyro (y)", "Gyro (z)"]);
        let all = registry.all();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].name(), "Gyro (z)");
    }

    #[test]
    fn test_clear_tears_down_series() {
        let registry = SeriesRegistry::new();
        let series = registry.get_or_create("s");
        series.add(0.0, 1.0);

        registry.clear();
        assert!(registry.is_empty());
        assert!(series.is_empty());

        let fresh = registry.get_or_create("s");
        assert!(!Arc::ptr_eq(&series, &fresh));
    }
}
