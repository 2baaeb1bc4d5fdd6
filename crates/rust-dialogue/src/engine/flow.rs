//! The flow engine.

use std::fmt;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, trace, warn};

use super::state::{AnsweredEntry, EngineState, Phase};
use crate::config::FlowConfig;
use crate::error::{DialogueError, Result};
use crate::event::{EventBus, EventKind, EventSink, FlowEvent, SubscriptionId};
use crate::schedule::{Clock, Scheduler, SystemClock, TimerHandle};
use crate::script::{Callback, Node, NodeStore, QuestionKind, QuestionNode};
use crate::timing::{inter_turn_delay, typing_wait};
use crate::variables::VariableStore;

/// What happens when the outstanding timer fires.
#[derive(Debug)]
enum TimerAction {
    /// Reveal a node whose typing wait elapsed.
    Reveal(Node),
    /// Present the node with this id after the inter-turn delay.
    Advance(String),
}

#[derive(Debug)]
struct PendingTimer {
    handle: TimerHandle,
    action: TimerAction,
}

/// How an accepted answer continues the conversation.
struct Resolution {
    next: Option<String>,
    capture: Option<String>,
    callback: Option<Callback>,
}

/// Drives one conversation through a script.
///
/// The engine is sans-IO: it arms timers on a [`Scheduler`] instead of
/// sleeping, and fires them from [`tick`](Self::tick). Observable progress is
/// reported as [`FlowEvent`]s on the engine's [`EventBus`].
///
/// # Example
///
/// ```rust
/// use rust_dialogue::{FlowConfig, FlowEngine, Node, NodeStore, VirtualClock};
///
/// let store = NodeStore::new(vec![
///     Node::input("ask", "Your name?", "name").then("bye").into(),
///     Node::message("bye", "Bye ${name}").into(),
/// ])
/// .unwrap();
///
/// let clock = VirtualClock::new();
/// let mut engine = FlowEngine::with_clock(store, FlowConfig::default(), clock.clone()).unwrap();
///
/// engine.init(None).unwrap();
/// clock.advance(engine.time_until_next().unwrap());
/// engine.tick().unwrap();
///
/// engine.answer("Ada").unwrap();
/// while let Some(wait) = engine.time_until_next() {
///     clock.advance(wait);
///     engine.tick().unwrap();
/// }
///
/// assert!(engine.is_finished());
/// assert_eq!(engine.variables().get("name"), Some("Ada"));
/// ```
pub struct FlowEngine<C: Clock = SystemClock> {
    store: NodeStore,
    config: FlowConfig,
    state: EngineState,
    phase: Phase,
    scheduler: Scheduler<C>,
    timer: Option<PendingTimer>,
    rng: StdRng,
    events: EventBus,
}

impl FlowEngine<SystemClock> {
    /// Create an engine timed by the wall clock.
    pub fn new(store: NodeStore, config: FlowConfig) -> Result<Self> {
        Self::with_clock(store, config, SystemClock::new())
    }
}

impl<C: Clock> FlowEngine<C> {
    /// Create an engine timed by `clock`.
    ///
    /// Fails if the configuration is invalid.
    pub fn with_clock(store: NodeStore, config: FlowConfig, clock: C) -> Result<Self> {
        config.validate()?;
        let rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

        debug!(
            nodes = store.len(),
            speed = config.effective_speed(),
            auto_next = config.auto_next,
            "Created flow engine"
        );

        Ok(Self {
            store,
            config,
            state: EngineState::default(),
            phase: Phase::Idle,
            scheduler: Scheduler::new(clock),
            timer: None,
            rng,
            events: EventBus::new(),
        })
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Start the conversation.
    ///
    /// Starts at `start` if given, else at the configured first message,
    /// else at the first node of the script.
    pub fn init(&mut self, start: Option<&str>) -> Result<()> {
        self.ensure_not_finished("init")?;
        self.ensure_idle_timer("init")?;
        if self.phase != Phase::Idle {
            return Err(DialogueError::invalid_advance(
                "init",
                format!("conversation is already running ({})", self.phase),
            ));
        }
        if self.store.is_empty() {
            return Err(DialogueError::EmptyScript);
        }

        let node = match start.or(self.config.first_message.as_deref()) {
            Some(id) => self.store.find_by_id(id)?,
            None => self.store.first().ok_or(DialogueError::EmptyScript)?,
        }
        .clone();

        info!(node.id = %node.id(), "Conversation started");
        self.present(node);
        Ok(())
    }

    /// Answer the current question.
    ///
    /// For a choice question `text` must equal one of the answer texts; for
    /// an input question it is captured under the question's variable. The
    /// answer is validated before anything changes: a rejected answer leaves
    /// the state untouched and emits nothing.
    ///
    /// Effects run in this order: `answered`, `update`, the answer's
    /// callback, then the continuation. For a terminal answer the callback
    /// therefore runs before `finished` is emitted, so a callback always
    /// sees the conversation as still running.
    pub fn answer(&mut self, text: &str) -> Result<()> {
        self.ensure_not_finished("answer")?;
        self.ensure_idle_timer("answer")?;
        let question = match (&self.phase, &self.state.current_node) {
            (Phase::AwaitingAnswer, Some(question)) => question,
            _ => {
                return Err(DialogueError::invalid_advance(
                    "answer",
                    "no question is awaiting an answer",
                ));
            }
        };

        let resolution = Self::resolve(question, text)?;
        let entry = AnsweredEntry::new(self.state.variables.substitute(&question.question), text);
        debug!(
            node.id = %question.id,
            answer = %text,
            next = ?resolution.next,
            "Answer accepted"
        );

        if let Some(variable) = resolution.capture {
            self.state.variables.capture(variable, text);
        }
        self.state.current_node = None;
        self.state.transcript.push(entry.clone());
        self.emit(FlowEvent::Answered(entry));
        self.emit(FlowEvent::Update(self.state.transcript.clone()));

        if let Some(callback) = resolution.callback {
            callback();
        }

        match resolution.next {
            Some(next) => self.continue_with(next),
            None => self.finalize(),
        }
        Ok(())
    }

    /// Advance to the pending continuation in manual mode.
    ///
    /// With `id`, jumps to that node instead of the pending one. Without a
    /// pending continuation (including right after a previous `next`) this
    /// fails with `InvalidAdvance`, even while the next node is typing.
    pub fn next(&mut self, id: Option<&str>) -> Result<()> {
        self.ensure_not_finished("next")?;
        if self.config.auto_next {
            return Err(DialogueError::invalid_advance(
                "next",
                "automatic advancement is enabled",
            ));
        }
        let Some(pending) = self.state.pending_next_id.as_deref() else {
            return Err(DialogueError::invalid_advance(
                "next",
                "no continuation is pending",
            ));
        };
        self.ensure_idle_timer("next")?;

        let node = self.store.find_by_id(id.unwrap_or(pending))?.clone();
        self.state.pending_next_id = None;
        debug!(node.id = %node.id(), "Manual advance");
        self.present(node);
        Ok(())
    }

    /// Abandon the conversation in progress.
    ///
    /// Disarms the outstanding timer and forgets the current question and
    /// pending continuation. The transcript and variables are kept, and the
    /// engine may be started again. Does nothing once finished.
    pub fn cancel(&mut self) {
        if self.state.finished {
            return;
        }
        if let Some(timer) = self.timer.take() {
            trace!(handle = %timer.handle, "Timer disarmed");
        }
        self.scheduler.cancel_all();
        self.state.current_node = None;
        self.state.pending_next_id = None;
        self.phase = Phase::Idle;
        debug!("Conversation cancelled");
    }

    /// Fire every timer that is due.
    ///
    /// Timers armed while firing are left for the next call, even when they
    /// are already due. Returns the number of timers fired.
    pub fn tick(&mut self) -> Result<usize> {
        let mut due = Vec::new();
        while let Some(handle) = self.scheduler.pop_due() {
            due.push(handle);
        }

        let mut fired = 0;
        for handle in due {
            match self.timer.take() {
                Some(timer) if timer.handle == handle => {
                    trace!(%handle, "Timer fired");
                    self.fire(timer.action)?;
                    fired += 1;
                }
                other => {
                    self.timer = other;
                    warn!(%handle, "Ignoring stale timer");
                }
            }
        }
        Ok(fired)
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    fn present(&mut self, node: Node) {
        let shown = self.state.variables.substitute(node.template());
        let wait = typing_wait(&shown, &self.config);
        if let Node::Question(question) = &node {
            self.state.current_node = Some(question.clone());
        }

        debug!(node.id = %node.id(), wait_ms = wait.as_millis() as u64, "Typing");
        self.phase = Phase::Presenting;
        self.emit(FlowEvent::Typing { wait });
        self.arm(wait, TimerAction::Reveal(node));
    }

    fn fire(&mut self, action: TimerAction) -> Result<()> {
        match action {
            TimerAction::Reveal(Node::Message(message)) => {
                let shown = message.substituted(&self.state.variables);
                debug!(node.id = %message.id, "Revealing message");
                self.emit(FlowEvent::Message(shown));
                match message.next {
                    Some(next) => self.continue_with(next),
                    None => self.finalize(),
                }
            }
            TimerAction::Reveal(Node::Question(question)) => {
                let shown = question.substituted(&self.state.variables);
                debug!(node.id = %question.id, "Revealing question");
                self.phase = Phase::AwaitingAnswer;
                self.emit(FlowEvent::Question(shown));
            }
            TimerAction::Advance(id) => {
                let node = self.store.find_by_id(&id)?.clone();
                self.present(node);
            }
        }
        Ok(())
    }

    fn continue_with(&mut self, next: String) {
        if self.config.auto_next {
            let delay = inter_turn_delay(&self.config, &mut self.rng);
            debug!(next = %next, delay_ms = delay.as_millis() as u64, "Delaying");
            self.phase = Phase::Delaying;
            self.emit(FlowEvent::Delay { delay });
            self.arm(delay, TimerAction::Advance(next));
        } else {
            debug!(next = %next, "Waiting for next");
            self.phase = Phase::AdvancePending;
            self.state.pending_next_id = Some(next);
        }
    }

    fn finalize(&mut self) {
        if self.state.finished {
            return;
        }
        self.state.finished = true;
        self.state.current_node = None;
        self.state.pending_next_id = None;
        self.phase = Phase::Finished;

        info!(answers = self.state.transcript.len(), "Conversation finished");
        self.emit(FlowEvent::Finished {
            transcript: self.state.transcript.clone(),
            variables: self.state.variables.snapshot(),
        });
    }

    fn resolve(question: &QuestionNode, text: &str) -> Result<Resolution> {
        match &question.kind {
            QuestionKind::Input(input) => Ok(Resolution {
                next: input.next.clone(),
                capture: Some(input.variable.clone()),
                callback: None,
            }),
            QuestionKind::Choice(answers) => answers
                .iter()
                .find(|a| a.text == text)
                .map(|a| Resolution {
                    next: a.next.clone(),
                    capture: None,
                    callback: a.callback.clone(),
                })
                .ok_or_else(|| {
                    DialogueError::no_matching_answer(
                        question.id.clone(),
                        text,
                        answers.iter().map(|a| a.text.clone()).collect(),
                    )
                }),
        }
    }

    fn arm(&mut self, delay: Duration, action: TimerAction) {
        if let Some(previous) = self.timer.take() {
            self.scheduler.cancel(previous.handle);
        }
        let handle = self.scheduler.schedule(delay);
        trace!(%handle, delay_ms = delay.as_millis() as u64, "Timer armed");
        self.timer = Some(PendingTimer { handle, action });
    }

    fn emit(&mut self, event: FlowEvent) {
        trace!(kind = %event.kind(), "Emitting event");
        self.events.emit(&event);
    }

    fn ensure_not_finished(&self, operation: &'static str) -> Result<()> {
        if self.state.finished {
            return Err(DialogueError::invalid_advance(
                operation,
                "conversation is finished",
            ));
        }
        Ok(())
    }

    const fn ensure_idle_timer(&self, operation: &'static str) -> Result<()> {
        if self.timer.is_some() {
            return Err(DialogueError::busy(operation));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Subscribe to one kind of event.
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&FlowEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(kind, handler)
    }

    /// Subscribe to every event.
    pub fn subscribe_all<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: Fn(&FlowEvent) + Send + Sync + 'static,
    {
        self.events.subscribe_all(handler)
    }

    /// Remove a subscription.
    pub fn unsubscribe(&mut self, kind: EventKind, id: SubscriptionId) -> bool {
        self.events.unsubscribe(kind, id)
    }

    /// Forward every event to `sink`.
    pub fn attach_sink(&mut self, sink: Box<dyn EventSink>) {
        self.events.attach_sink(sink);
    }

    /// The engine's event bus.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// The engine's event bus, for bulk changes such as
    /// [`EventBus::clear`].
    pub const fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Conversation state.
    #[must_use]
    pub const fn state(&self) -> &EngineState {
        &self.state
    }

    /// Lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Check if the conversation has finished.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.state.finished
    }

    /// Check if a typing or delay timer is outstanding.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.timer.is_some()
    }

    /// Every answered question, in order.
    #[must_use]
    pub fn transcript(&self) -> &[AnsweredEntry] {
        &self.state.transcript
    }

    /// Captured variables.
    #[must_use]
    pub const fn variables(&self) -> &VariableStore {
        &self.state.variables
    }

    /// Seed a variable before it is captured, e.g. a user name known
    /// up front. Ignored once finished.
    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        if !self.state.finished {
            self.state.variables.capture(name, value);
        }
    }

    /// Engine configuration.
    #[must_use]
    pub const fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// The script.
    #[must_use]
    pub const fn store(&self) -> &NodeStore {
        &self.store
    }

    /// The clock timers are measured against.
    #[must_use]
    pub const fn clock(&self) -> &C {
        self.scheduler.clock()
    }

    /// Clock time at which the outstanding timer is due.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    /// Time until the outstanding timer is due (zero if overdue).
    #[must_use]
    pub fn time_until_next(&self) -> Option<Duration> {
        self.scheduler.time_until_next()
    }
}

impl<C: Clock> fmt::Debug for FlowEngine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowEngine")
            .field("nodes", &self.store.len())
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("state", &self.state)
            .field("timer", &self.timer)
            .field("events", &self.events)
            .finish()
    }
}
