//! Event bridge: interrupt and timer triggers turned into queued events.
//!
//! Three producers feed a node's event queue, all through non-blocking posts:
//! the node's timer, the transmit-complete continuation registered with each
//! send, and the receive-FIFO pending hook. The receive hook additionally
//! suppresses further pending notifications for its FIFO until the node has
//! drained the current frame and re-armed: one receive event in flight at a
//! time, so a burst of frames cannot flood the queue.

use relaycan_transport::{CanController, CanCore, Continuation, RxFifo, RxPendingHook};

use crate::event::{Event, EventSender, EventSink};

/// Continuation posting [`Event::TransmitComplete`] to the sending node.
pub(crate) fn tx_continuation(sink: EventSender) -> Continuation {
    Box::new(move || {
        // Queue overflow drops the event; interrupt context has nowhere to
        // report it.
        let _ = sink.post(Event::TransmitComplete);
    })
}

/// Pending hook for a node's receive FIFO: suppress further notifications,
/// then post [`Event::ReceiveReady`].
pub(crate) fn rx_pending_hook<C: CanCore>(
    controller: CanController<C>,
    fifo: RxFifo,
    sink: EventSender,
) -> RxPendingHook {
    Box::new(move || {
        let _ = controller.disable_rx_notification(fifo);
        let _ = sink.post(Event::ReceiveReady);
    })
}
