//! Master node: periodic command transmission and status aggregation.

use std::io;
use std::thread::{self, JoinHandle};

use embedded_can::Frame as _;
use relaycan_transport::{CanController, CanCore, InterruptRouter};

use crate::bridge::{rx_pending_hook, tx_continuation};
use crate::config::ProtocolConfig;
use crate::error::NodeError;
use crate::event::{event_queue, Event, EventReceiver, EventSender, EventSource};
use crate::timer::TickTimer;
use crate::wire::{standard_id, OperationStatus};

/// Master reactor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterState {
    /// Waiting for the command timer to open the next cycle.
    Idle,
    /// Command submitted, waiting for its transmit completion.
    AwaitingTxComplete,
    /// Consuming the status burst for the current cycle.
    AwaitingStatus,
}

/// The Master node.
///
/// On every command-timer tick it sends the logical inverse of the last known
/// device status, then consumes exactly `status_count_per_command` status
/// frames before going idle again. One instance exists for the lifetime of
/// the process; all of its state lives in this struct.
pub struct MasterNode<C: CanCore> {
    config: ProtocolConfig,
    controller: CanController<C>,
    state: MasterState,
    status: OperationStatus,
    received: u32,
    events: EventReceiver,
    sink: EventSender,
    command_timer: TickTimer,
}

impl<C: CanCore> MasterNode<C> {
    /// Build the Master: validates the configuration, programs the status
    /// filter onto the Master's bank and FIFO, starts the controller (a
    /// no-op if the Slave already did) and registers the receive hook.
    pub fn new(
        config: ProtocolConfig,
        controller: CanController<C>,
        router: &InterruptRouter,
    ) -> Result<Self, NodeError<C::Error>> {
        config.validate()?;
        controller.set_exact_filter(
            config.master_bank,
            config.master_fifo,
            standard_id(config.status_id),
        )?;
        controller.start()?;

        let (sink, events) = event_queue(config.event_queue_depth);
        router.set_rx_hook(
            config.master_fifo,
            rx_pending_hook(controller.clone(), config.master_fifo, sink.clone()),
        );
        let command_timer =
            TickTimer::periodic(config.command_period(), sink.clone(), Event::TimerFired);

        Ok(Self {
            config,
            controller,
            state: MasterState::Idle,
            status: OperationStatus::default(),
            received: 0,
            events,
            sink,
            command_timer,
        })
    }

    /// The reactor state.
    pub fn state(&self) -> MasterState {
        self.state
    }

    /// The last device status decoded from the bus.
    pub fn device_status(&self) -> OperationStatus {
        self.status
    }

    /// Status frames consumed in the current cycle.
    pub fn received_this_cycle(&self) -> u32 {
        self.received
    }

    /// Process one event against the current state. Events a state does not
    /// expect are dropped: state and counters stay untouched.
    pub fn handle_event(&mut self, event: Event) -> Result<(), NodeError<C::Error>> {
        match (self.state, event) {
            (MasterState::Idle, Event::TimerFired) => {
                let command = self.status.inverse_command();
                self.controller.transmit(
                    standard_id(self.config.command_id),
                    &[command.encode()],
                    tx_continuation(self.sink.clone()),
                )?;
                self.state = MasterState::AwaitingTxComplete;
            }
            (MasterState::AwaitingTxComplete, Event::TransmitComplete) => {
                self.received = 0;
                self.state = MasterState::AwaitingStatus;
            }
            (MasterState::AwaitingStatus, Event::ReceiveReady) => {
                let frame = self.controller.receive(self.config.master_fifo)?;
                self.controller.enable_rx_notification(self.config.master_fifo)?;
                self.status = OperationStatus::decode(frame.data())?;
                self.received += 1;
                if self.received >= self.config.status_count_per_command() {
                    self.state = MasterState::Idle;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Run the reactor: arm the command timer once, then process events until
    /// a fatal error or until every event producer is gone.
    pub fn run(&mut self) -> Result<(), NodeError<C::Error>> {
        self.command_timer.start();
        while let Some(event) = self.events.next() {
            self.handle_event(event)?;
        }
        Ok(())
    }

    /// Run the reactor on its own thread.
    pub fn spawn(mut self) -> io::Result<JoinHandle<Result<(), NodeError<C::Error>>>> {
        thread::Builder::new()
            .name("master-node".into())
            .spawn(move || self.run())
    }
}
