//! `relaycan`: a two-node ON/OFF device-control protocol over CAN.
//!
//! A Master node periodically commands a device ON or OFF, alternating on
//! every cycle. The Slave node that owns the device answers each command with
//! a burst of status echoes at a higher, integer-multiple rate: with the
//! default 1 Hz command / 10 Hz status configuration, every command is
//! answered by exactly ten status frames before the Slave goes back to
//! listening.
//!
//! Each node is an event reactor: interrupt-side hooks and timers post
//! [`Event`]s into the node's bounded queue, and the node's task drains them
//! one at a time, driving a small state machine. The transport underneath is
//! `relaycan-transport`; any [`CanCore`](relaycan_transport::CanCore) backend
//! works, including the `relaycan-sim` loopback controller for host use.
//!
//! # Quick start
//! ```rust,ignore
//! use relaycan::{MasterNode, ProtocolConfig, SlaveNode};
//! use relaycan_transport::CanController;
//!
//! let (ctrl, irq) = CanController::new(core);
//! // bind `irq` to the backend's interrupt dispatch, then:
//! let cfg = ProtocolConfig::default();
//! let slave = SlaveNode::new(cfg.clone(), ctrl.clone(), &irq)?;
//! let master = MasterNode::new(cfg, ctrl, &irq)?;
//! let _slave = slave.spawn()?;
//! let _master = master.spawn()?;
//! ```
//!
//! # Wire format
//! Standard 11-bit identifiers, data frames only:
//!
//! | identifier | direction      | payload                                  |
//! |------------|----------------|------------------------------------------|
//! | `0x300`    | Master → Slave | 1 byte: command (`0xAA` ON / `0x55` OFF) |
//! | `0x301`    | Slave → Master | 2 bytes: status (0/1), value (wrapping)  |
//!
//! # Notes
//! - `status_hz` must be a nonzero integer multiple of `command_hz`;
//!   [`ProtocolConfig::validate`] rejects anything else.
//! - An event a state does not expect is dropped; there is no replay.
//! - Transport failures are fatal: a node's reactor returns the error and the
//!   node goes silent on the bus.

mod bridge;
mod config;
mod error;
mod event;
mod master;
mod slave;
mod timer;
pub mod wire;

pub use crate::config::ProtocolConfig;
pub use crate::error::{ConfigError, NodeError, WireError};
pub use crate::event::{
    event_queue, Event, EventReceiver, EventSender, EventSink, EventSource, QueueFull,
};
pub use crate::master::{MasterNode, MasterState};
pub use crate::slave::{SlaveNode, SlaveState};
pub use crate::timer::TickTimer;
pub use crate::wire::{OperationCommand, OperationStatus};
