//! Slave node: command reception and the repeated status echo.

use std::io;
use std::thread::{self, JoinHandle};

use embedded_can::Frame as _;
use relaycan_transport::{CanController, CanCore, InterruptRouter};

use crate::bridge::{rx_pending_hook, tx_continuation};
use crate::config::ProtocolConfig;
use crate::error::NodeError;
use crate::event::{event_queue, Event, EventReceiver, EventSender, EventSource};
use crate::timer::TickTimer;
use crate::wire::{standard_id, OperationCommand, OperationStatus};

/// Slave reactor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaveState {
    /// Listening for the next operation command.
    Idle,
    /// Status submitted, waiting for its transmit completion.
    AwaitingTxComplete,
    /// More echoes due this cycle, waiting for the status timer.
    AwaitingNextTimerTick,
}

/// The Slave node.
///
/// Each received command triggers exactly `status_count_per_command` status
/// transmissions, spaced by the status timer, each re-applying the command to
/// the drifting device value. One instance exists for the lifetime of the
/// process; all of its state lives in this struct.
pub struct SlaveNode<C: CanCore> {
    config: ProtocolConfig,
    controller: CanController<C>,
    state: SlaveState,
    // Until the first command arrives the device reads OFF; the status timer
    // cannot fire before a command has been received.
    command: OperationCommand,
    status: OperationStatus,
    transmitted: u32,
    events: EventReceiver,
    sink: EventSender,
    status_timer: TickTimer,
}

impl<C: CanCore> SlaveNode<C> {
    /// Build the Slave: validates the configuration, programs the command
    /// filter onto the Slave's bank and FIFO, starts the controller (a no-op
    /// if the Master already did) and registers the receive hook.
    pub fn new(
        config: ProtocolConfig,
        controller: CanController<C>,
        router: &InterruptRouter,
    ) -> Result<Self, NodeError<C::Error>> {
        config.validate()?;
        controller.set_exact_filter(
            config.slave_bank,
            config.slave_fifo,
            standard_id(config.command_id),
        )?;
        controller.start()?;

        let (sink, events) = event_queue(config.event_queue_depth);
        router.set_rx_hook(
            config.slave_fifo,
            rx_pending_hook(controller.clone(), config.slave_fifo, sink.clone()),
        );
        let status_timer =
            TickTimer::one_shot(config.status_period(), sink.clone(), Event::TimerFired);

        Ok(Self {
            config,
            controller,
            state: SlaveState::Idle,
            command: OperationCommand::Off,
            status: OperationStatus::default(),
            transmitted: 0,
            events,
            sink,
            status_timer,
        })
    }

    /// The reactor state.
    pub fn state(&self) -> SlaveState {
        self.state
    }

    /// The current device status.
    pub fn device_status(&self) -> OperationStatus {
        self.status
    }

    /// Status frames transmitted in the current cycle.
    pub fn transmitted_this_cycle(&self) -> u32 {
        self.transmitted
    }

    /// Re-apply the last command to the status, transmit the result and arm
    /// the status timer for the next echo.
    fn update_and_transmit_status(&mut self) -> Result<(), NodeError<C::Error>> {
        self.status.apply(self.command);
        self.controller.transmit(
            standard_id(self.config.status_id),
            &self.status.encode(),
            tx_continuation(self.sink.clone()),
        )?;
        self.status_timer.start();
        Ok(())
    }

    /// Process one event against the current state. Events a state does not
    /// expect are dropped: state and counters stay untouched.
    pub fn handle_event(&mut self, event: Event) -> Result<(), NodeError<C::Error>> {
        match (self.state, event) {
            (SlaveState::Idle, Event::ReceiveReady) => {
                let frame = self.controller.receive(self.config.slave_fifo)?;
                self.controller.enable_rx_notification(self.config.slave_fifo)?;
                self.command = OperationCommand::decode(frame.data())?;
                self.update_and_transmit_status()?;
                self.state = SlaveState::AwaitingTxComplete;
            }
            (SlaveState::AwaitingTxComplete, Event::TransmitComplete) => {
                self.transmitted += 1;
                if self.transmitted == self.config.status_count_per_command() {
                    self.transmitted = 0;
                    self.state = SlaveState::Idle;
                } else {
                    self.status_timer.start();
                    self.state = SlaveState::AwaitingNextTimerTick;
                }
            }
            (SlaveState::AwaitingNextTimerTick, Event::TimerFired) => {
                self.update_and_transmit_status()?;
                self.state = SlaveState::AwaitingTxComplete;
            }
            _ => {}
        }
        Ok(())
    }

    /// Run the reactor: process events until a fatal error or until every
    /// event producer is gone. The status timer is armed on demand, so
    /// nothing is started up front.
    pub fn run(&mut self) -> Result<(), NodeError<C::Error>> {
        while let Some(event) = self.events.next() {
            self.handle_event(event)?;
        }
        Ok(())
    }

    /// Run the reactor on its own thread.
    pub fn spawn(mut self) -> io::Result<JoinHandle<Result<(), NodeError<C::Error>>>> {
        thread::Builder::new()
            .name("slave-node".into())
            .spawn(move || self.run())
    }
}
