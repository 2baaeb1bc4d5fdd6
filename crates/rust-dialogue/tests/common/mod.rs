//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rust_dialogue::{
    Clock, EventKind, FlowConfig, FlowEngine, FlowEvent, Node, NodeStore, VirtualClock,
};

/// An engine on virtual time, with every event stamped by the clock.
pub struct Run {
    pub engine: FlowEngine<VirtualClock>,
    pub clock: VirtualClock,
    log: Arc<Mutex<Vec<(Duration, FlowEvent)>>>,
}

impl Run {
    pub fn new(nodes: Vec<Node>, config: FlowConfig) -> Self {
        Self::with_store(NodeStore::new(nodes).unwrap(), config)
    }

    pub fn with_store(store: NodeStore, config: FlowConfig) -> Self {
        let clock = VirtualClock::new();
        let mut engine = FlowEngine::with_clock(store, config, clock.clone()).unwrap();
        let log: Arc<Mutex<Vec<(Duration, FlowEvent)>>> = Arc::default();

        let sink = Arc::clone(&log);
        let stamp = clock.clone();
        engine.subscribe_all(move |event| sink.lock().unwrap().push((stamp.now(), event.clone())));

        Self { engine, clock, log }
    }

    /// Fire timers until none is outstanding.
    pub fn settle(&mut self) {
        while let Some(wait) = self.engine.time_until_next() {
            self.clock.advance(wait);
            self.engine.tick().unwrap();
        }
    }

    pub fn start(&mut self) {
        self.engine.init(None).unwrap();
        self.settle();
    }

    pub fn reply(&mut self, text: &str) {
        self.engine.answer(text).unwrap();
        self.settle();
    }

    pub fn events(&self) -> Vec<FlowEvent> {
        self.log.lock().unwrap().iter().map(|(_, e)| e.clone()).collect()
    }

    pub fn stamped(&self) -> Vec<(Duration, FlowEvent)> {
        self.log.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events().iter().map(FlowEvent::kind).collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.events()
            .iter()
            .filter_map(|e| e.text().map(str::to_string))
            .collect()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.kinds().into_iter().filter(|k| *k == kind).count()
    }

    pub fn event_count(&self) -> usize {
        self.log.lock().unwrap().len()
    }
}
