//! Async driver running a conversation on tokio.
//!
//! [`FlowEngine`] never sleeps; [`Conversation`] owns one and a background
//! task that sleeps until the next timer is due and fires it. Calls made
//! through the conversation wake the task so newly armed timers are picked
//! up immediately.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, warn};

use crate::config::FlowConfig;
use crate::engine::{AnsweredEntry, FlowEngine, Phase};
use crate::error::{DialogueError, Result};
use crate::event::{EventKind, FlowEvent, SubscriptionId, event_stream};
use crate::schedule::Clock;
use crate::script::NodeStore;
use crate::variables::VariableStore;

/// Time on the tokio clock, so paused-time tests drive the engine too.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: tokio::time::Instant,
}

impl TokioClock {
    /// Create a clock whose origin is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

type SharedEngine = Arc<Mutex<FlowEngine<TokioClock>>>;

/// A conversation driven in the background.
///
/// Dropping the conversation stops the background task.
pub struct Conversation {
    engine: SharedEngine,
    wake: Arc<Notify>,
    task: JoinHandle<()>,
}

impl Conversation {
    /// Create a conversation over `store`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(store: NodeStore, config: FlowConfig) -> Result<Self> {
        let engine = FlowEngine::with_clock(store, config, TokioClock::new())?;
        Self::from_engine(engine)
    }

    /// Drive an existing engine.
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_engine(engine: FlowEngine<TokioClock>) -> Result<Self> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| DialogueError::config(format!("no tokio runtime: {e}")))?;

        let engine = Arc::new(Mutex::new(engine));
        let wake = Arc::new(Notify::new());
        let task = handle.spawn(run(Arc::clone(&engine), Arc::clone(&wake)));
        debug!("Conversation driver started");

        Ok(Self { engine, wake, task })
    }

    /// Start the conversation. See [`FlowEngine::init`].
    pub async fn init(&self, start: Option<&str>) -> Result<()> {
        self.call(|engine| engine.init(start)).await
    }

    /// Answer the current question. See [`FlowEngine::answer`].
    pub async fn answer(&self, text: &str) -> Result<()> {
        self.call(|engine| engine.answer(text)).await
    }

    /// Advance in manual mode. See [`FlowEngine::next`].
    pub async fn next(&self, id: Option<&str>) -> Result<()> {
        self.call(|engine| engine.next(id)).await
    }

    /// Abandon the conversation in progress. See [`FlowEngine::cancel`].
    pub async fn cancel(&self) {
        self.engine.lock().await.cancel();
        self.wake.notify_one();
    }

    /// Subscribe to one kind of event.
    pub async fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&FlowEvent) + Send + Sync + 'static,
    {
        self.engine.lock().await.subscribe(kind, handler)
    }

    /// Remove a subscription.
    pub async fn unsubscribe(&self, kind: EventKind, id: SubscriptionId) -> bool {
        self.engine.lock().await.unsubscribe(kind, id)
    }

    /// A stream of every event from now on.
    pub async fn events(&self) -> UnboundedReceiverStream<FlowEvent> {
        let (sink, stream) = event_stream();
        self.engine.lock().await.attach_sink(Box::new(sink));
        stream
    }

    /// Run `f` against the engine.
    pub async fn with_engine<R>(&self, f: impl FnOnce(&FlowEngine<TokioClock>) -> R) -> R {
        f(&*self.engine.lock().await)
    }

    /// Current phase.
    pub async fn phase(&self) -> Phase {
        self.engine.lock().await.phase()
    }

    /// Check if the conversation has finished.
    pub async fn is_finished(&self) -> bool {
        self.engine.lock().await.is_finished()
    }

    /// Copy of the transcript.
    pub async fn transcript(&self) -> Vec<AnsweredEntry> {
        self.engine.lock().await.transcript().to_vec()
    }

    /// Copy of the captured variables.
    pub async fn variables(&self) -> VariableStore {
        self.engine.lock().await.variables().clone()
    }

    /// Stop the background task. Pending timers never fire afterwards.
    pub fn shutdown(&self) {
        self.task.abort();
    }

    async fn call<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut FlowEngine<TokioClock>) -> Result<()>,
    {
        let result = f(&mut *self.engine.lock().await);
        self.wake.notify_one();
        result
    }
}

impl Drop for Conversation {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl std::fmt::Debug for Conversation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conversation")
            .field("running", &!self.task.is_finished())
            .finish_non_exhaustive()
    }
}

async fn run(engine: SharedEngine, wake: Arc<Notify>) {
    loop {
        let wait = engine.lock().await.time_until_next();
        match wait {
            Some(wait) => {
                tokio::select! {
                    () = tokio::time::sleep(wait) => {
                        let mut engine = engine.lock().await;
                        if let Err(e) = engine.tick() {
                            warn!(error = %e, "Timer failed");
                        }
                    }
                    () = wake.notified() => {}
                }
            }
            None => wake.notified().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio_stream::StreamExt;

    use super::*;
    use crate::script::{Answer, InputSpec, MessageNode, QuestionNode};

    fn store() -> NodeStore {
        NodeStore::new(vec![
            MessageNode::new("hi", "Hello!").then("ask").into(),
            QuestionNode::input("ask", "Your name?", InputSpec::new("name").then("go")).into(),
            QuestionNode::choice(
                "go",
                "Ready, ${name}?",
                [Answer::new("Yes").then("bye"), Answer::new("No")],
            )
            .into(),
            MessageNode::new("bye", "Bye ${name}").into(),
        ])
        .unwrap()
    }

    async fn wait_for(events: &mut UnboundedReceiverStream<FlowEvent>, kind: EventKind) -> FlowEvent {
        loop {
            let event = events.next().await.unwrap();
            if event.kind() == kind {
                return event;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn runs_to_completion() {
        let conversation = Conversation::new(store(), FlowConfig::default().delay_ms(500)).unwrap();
        let mut events = conversation.events().await;
        conversation.init(None).await.unwrap();

        let question = wait_for(&mut events, EventKind::Question).await;
        assert_eq!(question.text(), Some("Your name?"));
        conversation.answer("Ada").await.unwrap();

        let question = wait_for(&mut events, EventKind::Question).await;
        assert_eq!(question.text(), Some("Ready, Ada?"));
        conversation.answer("Yes").await.unwrap();

        let FlowEvent::Finished { transcript, variables } =
            wait_for(&mut events, EventKind::Finished).await
        else {
            unreachable!()
        };
        assert_eq!(transcript.len(), 2);
        assert_eq!(variables.get("name").map(String::as_str), Some("Ada"));
        assert!(conversation.is_finished().await);
    }

    #[tokio::test(start_paused = true)]
    async fn answer_while_typing_is_busy() {
        let conversation = Conversation::new(store(), FlowConfig::default()).unwrap();
        conversation.init(Some("ask")).await.unwrap();
        let err = conversation.answer("Ada").await.unwrap_err();
        assert!(err.is_busy());
        assert_eq!(conversation.phase().await, Phase::Presenting);
    }

    #[tokio::test(start_paused = true)]
    async fn reveal_waits_for_typing() {
        let conversation = Conversation::new(store(), FlowConfig::default()).unwrap();
        let mut events = conversation.events().await;
        let start = tokio::time::Instant::now();
        conversation.init(None).await.unwrap();

        let FlowEvent::Typing { wait } = events.next().await.unwrap() else {
            unreachable!()
        };
        wait_for(&mut events, EventKind::Message).await;
        assert!(start.elapsed() >= wait);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_timers() {
        let conversation = Conversation::new(store(), FlowConfig::default()).unwrap();
        conversation.init(None).await.unwrap();
        conversation.shutdown();

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(conversation.phase().await, Phase::Presenting);
    }

    #[test]
    fn requires_runtime() {
        assert!(Conversation::new(store(), FlowConfig::default()).is_err());
    }
}
