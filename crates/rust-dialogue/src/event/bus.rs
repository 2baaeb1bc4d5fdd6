//! In-process publish/subscribe for conversation events.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::sink::EventSink;
use super::{EventKind, FlowEvent};

/// Handler for conversation events.
pub type EventHandler = Arc<dyn Fn(&FlowEvent) + Send + Sync>;

/// Identifies a subscription so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// Handler registry keyed by event kind.
///
/// On every event the handlers of its kind run in subscription order, then
/// the catch-all handlers, then attached sinks.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    handlers: HashMap<EventKind, Vec<(SubscriptionId, EventHandler)>>,
    catch_all: Vec<(SubscriptionId, EventHandler)>,
    sinks: Vec<Box<dyn EventSink>>,
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    const fn allocate(&mut self) -> SubscriptionId {
        self.next_id += 1;
        SubscriptionId(self.next_id)
    }

    /// Subscribe to one kind of event.
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&FlowEvent) + Send + Sync + 'static,
    {
        let id = self.allocate();
        self.handlers
            .entry(kind)
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Subscribe to every event.
    pub fn subscribe_all<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: Fn(&FlowEvent) + Send + Sync + 'static,
    {
        let id = self.allocate();
        self.catch_all.push((id, Arc::new(handler)));
        id
    }

    /// Remove a subscription made with [`subscribe`](Self::subscribe).
    ///
    /// Returns false if `id` is not subscribed to `kind`.
    pub fn unsubscribe(&mut self, kind: EventKind, id: SubscriptionId) -> bool {
        let Some(handlers) = self.handlers.get_mut(&kind) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(sub, _)| *sub != id);
        handlers.len() != before
    }

    /// Remove a subscription of any kind, catch-all ones included.
    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriber_count();
        for handlers in self.handlers.values_mut() {
            handlers.retain(|(sub, _)| *sub != id);
        }
        self.catch_all.retain(|(sub, _)| *sub != id);
        self.subscriber_count() != before
    }

    /// Forward every event to `sink` as well.
    pub fn attach_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Number of handlers subscribed to `kind`, catch-all ones excluded.
    #[must_use]
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    /// Number of attached sinks.
    #[must_use]
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Total number of handlers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.handlers.values().map(Vec::len).sum::<usize>() + self.catch_all.len()
    }

    /// Drop every handler and sink.
    pub fn clear(&mut self) {
        self.handlers.clear();
        self.catch_all.clear();
        self.sinks.clear();
    }
}

impl EventSink for EventBus {
    fn emit(&mut self, event: &FlowEvent) {
        if let Some(handlers) = self.handlers.get(&event.kind()) {
            for (_, handler) in handlers {
                handler(event);
            }
        }
        for (_, handler) in &self.catch_all {
            handler(event);
        }
        let attached = self.sinks.len();
        self.sinks.retain(|sink| !sink.is_closed());
        if self.sinks.len() != attached {
            debug!(detached = attached - self.sinks.len(), "Detached closed event sinks");
        }
        for sink in &mut self.sinks {
            sink.emit(event);
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.subscriber_count())
            .field("sinks", &self.sinks.len())
            .finish()
    }
}
