#![warn(missing_docs)]

//! `relaycan-transport`: mailbox-pooled CAN transmission and filtered reception.
//!
//! This crate is the transport layer under the `relaycan` protocol nodes. It
//! arbitrates the controller's small pool of hardware transmit mailboxes among
//! concurrent senders, programs identifier+mask acceptance filters onto the
//! receive FIFOs, and routes interrupt-context completion/pending events to
//! the parties that care about them.
//!
//! The crate does not talk to hardware itself. It is written against the
//! [`CanCore`] trait, a register-level contract implemented by a concrete
//! backend: on a host, the `relaycan-sim` loopback controller; on a target,
//! a bxCAN-style driver shim. The backend (or its interrupt shim) reports
//! hardware events through [`CanEvents`].
//!
//! # Quick start
//! ```rust,ignore
//! use relaycan_transport::{CanController, FilterBank, RxFifo};
//! use embedded_can::StandardId;
//!
//! # fn example<C: relaycan_transport::CanCore>(core: C) -> Result<(), relaycan_transport::TransportError<C::Error>> {
//! let (ctrl, irq) = CanController::new(core);
//! // hand `irq` to the backend's interrupt dispatch, then:
//! ctrl.set_exact_filter(FilterBank::new(0), RxFifo::Fifo0, StandardId::new(0x301).unwrap())?;
//! ctrl.start()?;
//! ctrl.transmit(StandardId::new(0x300).unwrap(), &[0xAA], Box::new(|| {}))?;
//! # Ok(()) }
//! ```
//!
//! # Notes
//! - [`CanController::transmit`] blocks the calling task until a mailbox is
//!   free; it never blocks interrupt context.
//! - Completion continuations run in interrupt context and must only enqueue.
//! - Every hardware rejection is fatal; there is no retry class.

mod controller;
mod error;
mod filter;
mod frame;
mod hw;
mod mailbox;

pub use crate::controller::{CanController, InterruptRouter, RxPendingHook};
pub use crate::error::TransportError;
pub use crate::filter::{FilterBank, FilterWord, RxFifo};
pub use crate::frame::{BusFrame, MAX_FRAME_DATA};
pub use crate::hw::{CanCore, CanEvents};
pub use crate::mailbox::{Continuation, Mailbox, MailboxPool, MAILBOX_COUNT};
