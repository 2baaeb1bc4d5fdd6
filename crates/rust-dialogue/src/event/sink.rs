//! Event sinks.

use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::trace;

use super::FlowEvent;

/// Receives the events of one conversation, in order.
///
/// Sinks run synchronously inside the engine call that produced the event,
/// so they must not block.
pub trait EventSink: Send {
    /// Handle one event.
    fn emit(&mut self, event: &FlowEvent);

    /// Check if the sink can no longer receive events.
    ///
    /// Closed sinks are detached by the [`EventBus`](super::EventBus).
    fn is_closed(&self) -> bool {
        false
    }
}

impl<F> EventSink for F
where
    F: FnMut(&FlowEvent) + Send,
{
    fn emit(&mut self, event: &FlowEvent) {
        self(event);
    }
}

/// Forwards events to an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<FlowEvent>,
}

impl ChannelSink {
    /// Wrap an existing sender.
    #[must_use]
    pub const fn new(tx: mpsc::UnboundedSender<FlowEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn emit(&mut self, event: &FlowEvent) {
        if self.tx.send(event.clone()).is_err() {
            trace!(kind = %event.kind(), "Event receiver dropped");
        }
    }

    /// The receiving side has been dropped.
    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Create a channel sink and its receiver.
#[must_use]
pub fn event_channel() -> (ChannelSink, mpsc::UnboundedReceiver<FlowEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelSink::new(tx), rx)
}

/// Create a channel sink and a [`Stream`](tokio_stream::Stream) of its events.
#[must_use]
pub fn event_stream() -> (ChannelSink, UnboundedReceiverStream<FlowEvent>) {
    let (sink, rx) = event_channel();
    (sink, UnboundedReceiverStream::new(rx))
}
