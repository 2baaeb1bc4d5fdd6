//! Event recording.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::event::{EventKind, EventSink, FlowEvent};

/// An [`EventSink`] that keeps every event it receives.
///
/// Clones share the same log, so one clone can be attached to an engine
/// while the test inspects another.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<FlowEvent>>>,
}

impl RecordingSink {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<FlowEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of every recorded event.
    #[must_use]
    pub fn events(&self) -> Vec<FlowEvent> {
        self.lock().clone()
    }

    /// Kinds of the recorded events, in order.
    #[must_use]
    pub fn kinds(&self) -> Vec<EventKind> {
        self.lock().iter().map(FlowEvent::kind).collect()
    }

    /// Revealed message and question texts, in order.
    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|e| e.text().map(str::to_string))
            .collect()
    }

    /// Number of recorded events of `kind`.
    #[must_use]
    pub fn count(&self, kind: EventKind) -> usize {
        self.lock().iter().filter(|e| e.kind() == kind).count()
    }

    /// The most recent event.
    #[must_use]
    pub fn last(&self) -> Option<FlowEvent> {
        self.lock().last().cloned()
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &FlowEvent) {
        self.lock().push(event.clone());
    }
}
