//! The bus thread: transmission, filtering, delivery and interrupt dispatch.
//!
//! One thread drains loaded mailboxes in submission order. For each frame it
//! feeds the observation taps, routes the frame through the first matching
//! filter bank into that bank's FIFO, releases the mailbox, and then invokes
//! the bound interrupt entry points. Everything the entry points do happens
//! on this thread, making it the simulation's interrupt context.

use std::sync::mpsc::Receiver;
use std::sync::Arc;

use relaycan_transport::{BusFrame, Mailbox, RxFifo};

use crate::controller::{Shared, SimCan};

pub(crate) enum BusCommand {
    Transmit { mailbox: Mailbox, frame: BusFrame },
}

pub(crate) fn bus_loop(commands: Receiver<BusCommand>, shared: Arc<Shared>) {
    // Exits when every controller handle is gone.
    while let Ok(command) = commands.recv() {
        let BusCommand::Transmit { mailbox, frame } = command;
        transmit(&shared, mailbox, frame);
    }
}

fn transmit(shared: &Shared, mailbox: Mailbox, frame: BusFrame) {
    shared
        .taps
        .lock()
        .expect("taps poisoned")
        .retain(|tap| tap.send(frame).is_ok());

    let target = SimCan::route(shared, &frame);
    let raise = match target {
        Some(fifo) => deliver(shared, fifo, frame),
        None => false,
    };

    SimCan::release_mailbox(shared, mailbox);

    let events = shared.events.lock().expect("events poisoned").clone();
    if let Some(events) = events {
        events.tx_mailbox_complete(mailbox);
        if let (true, Some(fifo)) = (raise, target) {
            events.fifo_pending(fifo);
        }
    }
}

/// Queue the frame on `fifo`. Returns whether a pending notification must be
/// raised: only when notifications are enabled and none is outstanding, so a
/// suppressed FIFO stays silent until the consumer re-arms it.
fn deliver(shared: &Shared, fifo: RxFifo, frame: BusFrame) -> bool {
    let queue = &shared.fifos[fifo.index()];
    let mut state = queue.state.lock().expect("fifo poisoned");
    if state.frames.len() >= shared.config.fifo_depth {
        // Hardware overrun: the incoming frame is lost.
        return false;
    }
    state.frames.push_back(frame);
    queue.nonempty.notify_one();
    if state.enabled && !state.raised {
        state.raised = true;
        true
    } else {
        false
    }
}
