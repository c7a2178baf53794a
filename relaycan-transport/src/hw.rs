//! Hardware-facing contracts.
//!
//! [`CanCore`] is the register-level boundary of this crate: everything a
//! backend must expose for the mailbox pool, filter configurator and protocol
//! nodes to run on top of it. [`CanEvents`] is the opposite direction: the
//! entry points a backend's interrupt dispatch invokes when the hardware
//! signals completion or reception.

use crate::filter::{FilterBank, FilterWord, RxFifo};
use crate::frame::BusFrame;
use crate::mailbox::Mailbox;

/// Register-level CAN controller contract.
///
/// Implementations are peripheral handles: cheaply cloneable, internally
/// synchronized, shared between task threads and the interrupt context.
/// `relaycan-sim` provides the host-side implementation; a target build wraps
/// a bxCAN-style driver instead.
pub trait CanCore: Clone + Send + 'static {
    /// Backend-specific error type.
    type Error: core::fmt::Debug + Send + 'static;

    /// Start the controller. Called by every node during initialization;
    /// implementations must treat a second call as a no-op success.
    fn start(&self) -> Result<(), Self::Error>;

    /// Program one identifier+mask filter bank, routing matching frames to
    /// `fifo`. Errors if `bank` is beyond the hardware's bank count.
    fn program_filter(
        &self,
        bank: FilterBank,
        fifo: RxFifo,
        filter: FilterWord,
        mask: FilterWord,
    ) -> Result<(), Self::Error>;

    /// Load a frame into a specific transmit mailbox and request
    /// transmission. The caller guarantees the mailbox is free; backends may
    /// additionally detect a busy mailbox and reject the load.
    fn load_mailbox(&self, mailbox: Mailbox, frame: &BusFrame) -> Result<(), Self::Error>;

    /// Pop the oldest pending frame from `fifo`, blocking until one is
    /// available. No timeout exists; reception is driven by the bus.
    fn recv_fifo(&self, fifo: RxFifo) -> Result<BusFrame, Self::Error>;

    /// Enable or disable pending-frame notifications for `fifo`. While
    /// disabled, no [`CanEvents::fifo_pending`] calls are made for it;
    /// re-enabling with frames already queued raises the notification again.
    fn set_fifo_notification(&self, fifo: RxFifo, enabled: bool) -> Result<(), Self::Error>;
}

/// Interrupt entry points, invoked by the backend from its interrupt context.
///
/// Implementations must not block: the only permitted work is releasing a
/// mailbox, running its enqueue-only continuation, or posting an event.
pub trait CanEvents: Send + Sync {
    /// The frame in `mailbox` finished transmission on the bus.
    fn tx_mailbox_complete(&self, mailbox: Mailbox);

    /// `fifo` holds at least one frame and its notifications are enabled.
    fn fifo_pending(&self, fifo: RxFifo);
}
