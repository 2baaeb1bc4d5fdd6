//! Virtual-time engine harness.

use std::time::Duration;

use super::recording::RecordingSink;
use crate::config::FlowConfig;
use crate::engine::FlowEngine;
use crate::error::Result;
use crate::schedule::VirtualClock;
use crate::script::NodeStore;

/// Upper bound on timers fired by one [`EngineHarness::settle`] call.
const MAX_SETTLE_STEPS: usize = 10_000;

/// An engine on a [`VirtualClock`] with every event recorded.
#[derive(Debug)]
pub struct EngineHarness {
    /// The engine under test.
    pub engine: FlowEngine<VirtualClock>,
    /// The engine's clock.
    pub clock: VirtualClock,
    /// Every event the engine emitted.
    pub events: RecordingSink,
}

impl EngineHarness {
    /// Build a harness, failing on invalid configuration.
    pub fn try_new(store: NodeStore, config: FlowConfig) -> Result<Self> {
        let clock = VirtualClock::new();
        let events = RecordingSink::new();
        let mut engine = FlowEngine::with_clock(store, config, clock.clone())?;
        engine.attach_sink(Box::new(events.clone()));
        Ok(Self {
            engine,
            clock,
            events,
        })
    }

    /// Build a harness.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid.
    #[must_use]
    pub fn new(store: NodeStore, config: FlowConfig) -> Self {
        Self::try_new(store, config).expect("harness configuration is valid")
    }

    /// Advance the clock and fire whatever became due.
    ///
    /// # Panics
    ///
    /// Panics if a timer fails.
    pub fn advance(&mut self, by: Duration) -> usize {
        self.clock.advance(by);
        self.engine.tick().expect("timer fired")
    }

    /// Fire timers until none is outstanding, advancing the clock to each
    /// deadline. Returns the total virtual time that passed.
    ///
    /// # Panics
    ///
    /// Panics if a timer fails or timers keep being armed forever.
    pub fn settle(&mut self) -> Duration {
        let mut elapsed = Duration::ZERO;
        for _ in 0..MAX_SETTLE_STEPS {
            let Some(wait) = self.engine.time_until_next() else {
                return elapsed;
            };
            elapsed += wait;
            self.advance(wait);
        }
        panic!("engine did not settle after {MAX_SETTLE_STEPS} timers");
    }

    /// Start, then settle.
    ///
    /// # Panics
    ///
    /// Panics if the engine cannot start.
    pub fn start(&mut self) -> &mut Self {
        self.engine.init(None).expect("engine starts");
        self.settle();
        self
    }

    /// Answer, then settle.
    pub fn reply(&mut self, text: &str) -> Result<()> {
        self.engine.answer(text)?;
        self.settle();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use crate::test_utils::fixtures::{Fixtures, GREETING};

    #[test]
    fn settle_runs_to_the_question() {
        let mut harness = EngineHarness::new(Fixtures::scripts().store(GREETING), FlowConfig::default());
        harness.start();
        assert_eq!(harness.events.kinds(), vec![EventKind::Typing, EventKind::Question]);

        harness.reply("Ada").unwrap();
        assert!(harness.engine.is_finished());
        assert_eq!(harness.events.texts().last().map(String::as_str), Some("Nice to meet you, Ada!"));
    }
}
