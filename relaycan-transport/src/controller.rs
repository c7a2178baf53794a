//! Controller facade and interrupt routing.

use std::sync::{Arc, Mutex};

use embedded_can::{Frame as _, StandardId};

use crate::error::TransportError;
use crate::filter::{FilterBank, FilterWord, RxFifo};
use crate::frame::BusFrame;
use crate::hw::{CanCore, CanEvents};
use crate::mailbox::{Continuation, Mailbox, MailboxPool};

/// Hook invoked from interrupt context when a receive FIFO turns pending.
pub type RxPendingHook = Box<dyn Fn() + Send>;

/// Task-side facade over a CAN controller backend.
///
/// One controller is shared by every node on it (the reference configuration
/// runs Master and Slave on a single loopback controller): the handle is
/// cheaply cloneable, and [`CanController::transmit`] arbitrates the transmit
/// mailboxes through the shared [`MailboxPool`].
pub struct CanController<C: CanCore> {
    core: C,
    pool: Arc<MailboxPool>,
}

impl<C: CanCore> Clone for CanController<C> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
            pool: Arc::clone(&self.pool),
        }
    }
}

impl<C: CanCore> CanController<C> {
    /// Wrap a backend, returning the controller handle together with the
    /// [`InterruptRouter`] the backend's interrupt dispatch must be bound to.
    pub fn new(core: C) -> (Self, Arc<InterruptRouter>) {
        let pool = Arc::new(MailboxPool::new());
        let router = Arc::new(InterruptRouter {
            pool: Arc::clone(&pool),
            rx_hooks: Mutex::new([None, None]),
        });
        (Self { core, pool }, router)
    }

    /// Start the controller. Safe to call from every node's initialization;
    /// the first call wins and the rest are no-ops.
    pub fn start(&self) -> Result<(), TransportError<C::Error>> {
        self.core.start()?;
        Ok(())
    }

    /// Program `bank` to deliver exactly the frames carrying `id` to `fifo`.
    ///
    /// Identifier+mask mode at 32-bit scale with an all-ones mask over the
    /// standard-identifier field: frames with any other standard identifier
    /// never reach the FIFO.
    pub fn set_exact_filter(
        &self,
        bank: FilterBank,
        fifo: RxFifo,
        id: StandardId,
    ) -> Result<(), TransportError<C::Error>> {
        self.core.program_filter(
            bank,
            fifo,
            FilterWord::standard(id),
            FilterWord::exact_standard_mask(),
        )?;
        Ok(())
    }

    /// Send one data frame, blocking the calling task until a transmit
    /// mailbox is free. `continuation` runs in interrupt context once the
    /// frame has left the bus.
    ///
    /// Hardware rejection of the submission is fatal; the claimed mailbox is
    /// not returned to the pool because the transport is no longer usable.
    pub fn transmit(
        &self,
        id: StandardId,
        data: &[u8],
        continuation: Continuation,
    ) -> Result<(), TransportError<C::Error>> {
        let frame =
            BusFrame::new(id, data).ok_or_else(|| TransportError::PayloadTooLong(data.len()))?;
        let mailbox = self.pool.acquire(continuation);
        self.core.load_mailbox(mailbox, &frame)?;
        Ok(())
    }

    /// Receive the oldest frame pending on `fifo`, blocking until one is
    /// available.
    pub fn receive(&self, fifo: RxFifo) -> Result<BusFrame, TransportError<C::Error>> {
        let frame = self.core.recv_fifo(fifo)?;
        Ok(frame)
    }

    /// Re-enable pending notifications for `fifo` after draining a frame.
    pub fn enable_rx_notification(&self, fifo: RxFifo) -> Result<(), TransportError<C::Error>> {
        self.core.set_fifo_notification(fifo, true)?;
        Ok(())
    }

    /// Suppress pending notifications for `fifo` until re-enabled.
    pub fn disable_rx_notification(&self, fifo: RxFifo) -> Result<(), TransportError<C::Error>> {
        self.core.set_fifo_notification(fifo, false)?;
        Ok(())
    }

    /// Number of currently free transmit mailboxes.
    pub fn free_mailboxes(&self) -> usize {
        self.pool.free_count()
    }
}

/// Routes backend interrupt events to their consumers: transmit completions
/// to the mailbox pool, FIFO-pending notifications to the hook each node
/// registers for its own FIFO.
pub struct InterruptRouter {
    pool: Arc<MailboxPool>,
    rx_hooks: Mutex<[Option<RxPendingHook>; RxFifo::COUNT]>,
}

impl InterruptRouter {
    /// Register the pending hook for `fifo`, replacing any previous one.
    /// Each node installs its hook once during initialization.
    pub fn set_rx_hook(&self, fifo: RxFifo, hook: RxPendingHook) {
        self.rx_hooks.lock().expect("rx hook table poisoned")[fifo.index()] = Some(hook);
    }
}

impl CanEvents for InterruptRouter {
    fn tx_mailbox_complete(&self, mailbox: Mailbox) {
        self.pool.complete(mailbox);
    }

    fn fifo_pending(&self, fifo: RxFifo) {
        let hooks = self.rx_hooks.lock().expect("rx hook table poisoned");
        if let Some(hook) = &hooks[fifo.index()] {
            hook();
        }
    }
}
