//! Channel-prefix dispatch of messages to parsers

use super::parser::BoxedParser;
use super::registry::SeriesRegistry;
use super::series::SeriesHandle;
use log::{debug, info, trace, warn};
use omnidash_types::Message;
use std::sync::{Arc, PoisonError, RwLock};

/// Parsers registered under one exact channel string, plus their shared registry
struct ParserGroup {
    channel: String,
    series: Arc<SeriesRegistry>,
    parsers: Vec<BoxedParser>,
}

/// Outcome of dispatching one message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Registered channels that prefix-matched the message channel
    pub matched_groups: usize,
    /// Parsers invoked
    pub invoked: usize,
    /// Parsers that returned an error (logged and skipped)
    pub failed: usize,
}

/// Read-only view of every channel's registry
///
/// Cheap to clone; hand one to a render thread so it can look series up
/// while the ingestion thread owns the dispatcher.
#[derive(Clone, Default)]
pub struct SeriesCatalog {
    channels: Arc<RwLock<Vec<(String, Arc<SeriesRegistry>)>>>,
}

impl SeriesCatalog {
    /// Look up a series by exact channel and name; never creates anything
    pub fn get_series(&self, channel: &str, name: &str) -> Option<SeriesHandle> {
        let channels = self.channels.read().unwrap_or_else(PoisonError::into_inner);
        channels
            .iter()
            .find(|(ch, _)| ch == channel)
            .and_then(|(_, registry)| registry.get(name))
    }

    /// All series of every channel starting with `channel_prefix`
    ///
    /// Ordered by channel registration, then series creation.
    pub fn all_series(&self, channel_prefix: &str) -> Vec<SeriesHandle> {
        let channels = self.channels.read().unwrap_or_else(PoisonError::into_inner);
        channels
            .iter()
            .filter(|(ch, _)| ch.starts_with(channel_prefix))
            .flat_map(|(_, registry)| registry.all())
            .collect()
    }

    /// The registry shared by parsers on exactly `channel`
    pub fn registry(&self, channel: &str) -> Option<Arc<SeriesRegistry>> {
        let channels = self.channels.read().unwrap_or_else(PoisonError::into_inner);
        channels
            .iter()
            .find(|(ch, _)| ch == channel)
            .map(|(_, registry)| Arc::clone(registry))
    }

    /// Registered channel strings, in registration order
    pub fn channels(&self) -> Vec<String> {
        self.channels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(ch, _)| ch.clone())
            .collect()
    }

    fn insert(&self, channel: &str, registry: Arc<SeriesRegistry>) {
        self.channels
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((channel.to_string(), registry));
    }

    fn remove(&self, channel: &str) {
        self.channels
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(ch, _)| ch != channel);
    }
}

/// Routes messages to every parser whose channel is a prefix of the message channel
///
/// Built explicitly at startup and populated with parser registrations; there
/// is no process-wide parser state.
#[derive(Default)]
pub struct ParserDispatcher {
    /// Groups in registration order, checked linearly
    groups: Vec<ParserGroup>,
    catalog: SeriesCatalog,
}

impl ParserDispatcher {
    /// Create a new empty dispatcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parser under an exact channel string
    ///
    /// The first parser on a channel creates that channel's registry; later
    /// parsers on the same channel share it. Returns the shared registry.
    pub fn register(&mut self, channel: &str, parser: BoxedParser) -> Arc<SeriesRegistry> {
        if let Some(group) = self.groups.iter_mut().find(|g| g.channel == channel) {
            debug!(
                "Registered parser {} on existing channel '{}' ({} parsers)",
                parser.name(),
                channel,
                group.parsers.len() + 1
            );
            group.parsers.push(parser);
            return Arc::clone(&group.series);
        }

        info!("Registered parser {} on new channel '{}'", parser.name(), channel);
        let series = Arc::new(SeriesRegistry::new());
        self.catalog.insert(channel, Arc::clone(&series));
        self.groups.push(ParserGroup {
            channel: channel.to_string(),
            series: Arc::clone(&series),
            parsers: vec![parser],
        });
        series
    }

    /// Remove every parser on `channel` and tear down its registry
    ///
    /// Returns false if nothing was registered under that channel.
    pub fn unregister(&mut self, channel: &str) -> bool {
        let Some(index) = self.groups.iter().position(|g| g.channel == channel) else {
            return false;
        };

        let group = self.groups.remove(index);
        self.catalog.remove(channel);
        group.series.clear();
        info!(
            "Unregistered channel '{}' ({} parsers)",
            channel,
            group.parsers.len()
        );
        true
    }

    /// Route `message` to all parsers whose channel prefixes `channel`
    ///
    /// Groups fire in registration order, parsers within a group in
    /// registration order. A failing parser is logged and skipped.
    pub fn dispatch(&mut self, channel: &str, message: &Message) -> DispatchReport {
        let mut report = DispatchReport::default();

        for group in self
            .groups
            .iter_mut()
            .filter(|g| channel.starts_with(g.channel.as_str()))
        {
            report.matched_groups += 1;
            for parser in group.parsers.iter_mut() {
                report.invoked += 1;
                if let Err(e) = parser.parse(message, &group.series) {
                    report.failed += 1;
                    warn!(
                        "Parser {} failed on channel '{}': {}",
                        parser.name(),
                        channel,
                        e
                    );
                }
            }
        }

        if report.matched_groups == 0 {
            trace!("No parsers registered for channel '{}'", channel);
        }
        report
    }

    /// Dispatch a message on its own channel
    pub fn dispatch_message(&mut self, message: &Message) -> DispatchReport {
        self.dispatch(&message.channel, message)
    }

    /// Look up a series by exact channel and name without creating it
    pub fn lookup(&self, channel: &str, name: &str) -> Option<SeriesHandle> {
        self.catalog.get_series(channel, name)
    }

    /// All series of every channel starting with `channel_prefix` ("" for all)
    pub fn all_series(&self, channel_prefix: &str) -> Vec<SeriesHandle> {
        self.catalog.all_series(channel_prefix)
    }

    /// The registry shared by parsers on exactly `channel`
    pub fn registry(&self, channel: &str) -> Option<Arc<SeriesRegistry>> {
        self.catalog.registry(channel)
    }

    /// A clonable read-only view for consumers on other threads
    pub fn catalog(&self) -> SeriesCatalog {
        self.catalog.clone()
    }

    /// Registered channel strings, in registration order
    pub fn channels(&self) -> Vec<String> {
        self.groups.iter().map(|g| g.channel.clone()).collect()
    }

    /// Total number of registered parsers
    pub fn parser_count(&self) -> usize {
        self.groups.iter().map(|g| g.parsers.len()).sum()
    }

    /// Names of the parsers on exactly `channel`, in registration order
    pub fn parser_names(&self, channel: &str) -> Vec<String> {
        self.groups
            .iter()
            .find(|g| g.channel == channel)
            .map(|g| g.parsers.iter().map(|p| p.name().to_string()).collect())
            .unwrap_or_default()
    }
}
