#![warn(missing_docs)]

//! In-process loopback CAN controller for `relaycan`.
//!
//! This crate provides [`SimCan`], a simulated controller implementing the
//! `relaycan-transport` [`CanCore`](relaycan_transport::CanCore) contract on a
//! host: three transmit mailboxes, two receive FIFOs fed through
//! identifier+mask filter banks, notification gating, and a bus thread that
//! plays the interrupt context. The reference hardware configuration runs
//! both protocol nodes on one controller in loopback mode; `SimCan` models
//! exactly that topology.
//!
//! # Quick start
//! ```rust
//! use embedded_can::{Frame as _, StandardId};
//! use relaycan_sim::SimCan;
//! use relaycan_transport::{CanController, FilterBank, RxFifo};
//! use std::time::Duration;
//!
//! let can = SimCan::new();
//! let tap = can.tap();
//! let (ctrl, irq) = CanController::new(can.clone());
//! can.bind_interrupts(irq);
//!
//! ctrl.set_exact_filter(FilterBank::new(0), RxFifo::Fifo0, StandardId::new(0x301).unwrap()).unwrap();
//! ctrl.start().unwrap();
//! ctrl.transmit(StandardId::new(0x301).unwrap(), &[1, 2], Box::new(|| {})).unwrap();
//!
//! let seen = tap.recv_timeout(Duration::from_millis(100)).unwrap();
//! assert_eq!(seen.data(), &[1, 2]);
//! ```
//!
//! # Notes
//! - The bus thread transmits frames in submission order and delivers each
//!   through the first matching filter bank, as the hardware does.
//! - FIFO-pending dispatch is gated per FIFO: while notifications are
//!   disabled nothing is raised, and re-enabling with frames still queued
//!   raises the notification again.

mod bus;
mod controller;

pub use crate::controller::{SimCan, SimCanError, SimConfig};
