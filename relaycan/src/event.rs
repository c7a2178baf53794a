//! Node events and the per-node event queue.

use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

/// An event delivered to a node's reactor.
///
/// Events carry no payload: the state machine re-reads the relevant transport
/// or protocol state when it acts on one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The node's timer expired.
    TimerFired,
    /// A frame the node transmitted has left the bus.
    TransmitComplete,
    /// The node's receive FIFO holds a frame.
    ReceiveReady,
}

/// Producer half of a node's event queue.
///
/// Posting never blocks, so a sink is safe to use from interrupt and
/// timer-service context.
pub trait EventSink: Send {
    /// Post an event; returns `Err` when the queue is full.
    fn post(&self, event: Event) -> Result<(), QueueFull>;
}

/// Consumer half of a node's event queue.
pub trait EventSource {
    /// Fetch the next event in FIFO order, blocking on an empty queue.
    /// Returns `None` once every producer is gone.
    fn next(&self) -> Option<Event>;
}

/// The queue rejected an event because it was at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFull;

/// Producer handle for a node's event queue.
#[derive(Clone)]
pub struct EventSender(SyncSender<Event>);

/// Consumer handle for a node's event queue.
pub struct EventReceiver(Receiver<Event>);

/// Create a bounded FIFO event queue of the given depth.
pub fn event_queue(depth: usize) -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::sync_channel(depth);
    (EventSender(tx), EventReceiver(rx))
}

impl EventSink for EventSender {
    fn post(&self, event: Event) -> Result<(), QueueFull> {
        match self.0.try_send(event) {
            Ok(()) => Ok(()),
            // A consumer that went away behaves like a queue that can never
            // drain; either way the event is not deliverable.
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => Err(QueueFull),
        }
    }
}

impl EventSource for EventReceiver {
    fn next(&self) -> Option<Event> {
        self.0.recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_delivered_in_fifo_order() {
        let (tx, rx) = event_queue(4);
        tx.post(Event::TimerFired).unwrap();
        tx.post(Event::TransmitComplete).unwrap();
        tx.post(Event::ReceiveReady).unwrap();
        assert_eq!(rx.next(), Some(Event::TimerFired));
        assert_eq!(rx.next(), Some(Event::TransmitComplete));
        assert_eq!(rx.next(), Some(Event::ReceiveReady));
    }

    #[test]
    fn posting_to_a_full_queue_fails_without_blocking() {
        let (tx, _rx) = event_queue(1);
        tx.post(Event::TimerFired).unwrap();
        assert_eq!(tx.post(Event::TimerFired), Err(QueueFull));
    }

    #[test]
    fn next_reports_disconnection() {
        let (tx, rx) = event_queue(1);
        drop(tx);
        assert_eq!(rx.next(), None);
    }
}
