use std::collections::VecDeque;
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

use relaycan_transport::{
    BusFrame, CanCore, CanEvents, FilterBank, FilterWord, Mailbox, RxFifo,
};

use crate::bus::{bus_loop, BusCommand};

/// Simulated-controller dimensions.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// Number of filter banks (the bxCAN family has 14 per controller).
    pub filter_banks: usize,
    /// Hardware receive-FIFO depth; frames arriving into a full FIFO are lost.
    pub fifo_depth: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            filter_banks: 14,
            fifo_depth: 3,
        }
    }
}

/// Errors produced by the simulated controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimCanError {
    /// Operation requires a started controller.
    NotStarted,
    /// Filter bank index beyond the configured bank count.
    BankOutOfRange {
        /// The rejected bank index.
        bank: usize,
        /// Number of banks the controller has.
        banks: usize,
    },
    /// A frame was loaded into a mailbox that still holds an in-flight frame.
    MailboxBusy(usize),
    /// The bus thread is gone.
    BusDown,
}

impl fmt::Display for SimCanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimCanError::NotStarted => write!(f, "controller not started"),
            SimCanError::BankOutOfRange { bank, banks } => {
                write!(f, "filter bank {bank} out of range ({banks} banks)")
            }
            SimCanError::MailboxBusy(index) => write!(f, "transmit mailbox {index} busy"),
            SimCanError::BusDown => write!(f, "bus thread terminated"),
        }
    }
}

impl std::error::Error for SimCanError {}

pub(crate) struct FilterSlot {
    pub(crate) fifo: RxFifo,
    pub(crate) filter: FilterWord,
    pub(crate) mask: FilterWord,
}

struct CtrlState {
    started: bool,
    banks: Vec<Option<FilterSlot>>,
    busy_mailboxes: u8,
}

pub(crate) struct FifoState {
    pub(crate) frames: VecDeque<BusFrame>,
    pub(crate) enabled: bool,
    pub(crate) raised: bool,
}

pub(crate) struct Fifo {
    pub(crate) state: Mutex<FifoState>,
    pub(crate) nonempty: Condvar,
}

impl Fifo {
    fn new() -> Self {
        Self {
            state: Mutex::new(FifoState {
                frames: VecDeque::new(),
                // Pending sources start enabled; consumers gate them per FIFO.
                enabled: true,
                raised: false,
            }),
            nonempty: Condvar::new(),
        }
    }
}

pub(crate) struct Shared {
    pub(crate) config: SimConfig,
    state: Mutex<CtrlState>,
    pub(crate) fifos: [Fifo; RxFifo::COUNT],
    pub(crate) events: Mutex<Option<Arc<dyn CanEvents>>>,
    pub(crate) taps: Mutex<Vec<Sender<BusFrame>>>,
}

/// A simulated loopback CAN controller.
///
/// Handle semantics: clones share the same controller, as clones of a
/// peripheral handle would. The bus thread lives as long as any handle does.
#[derive(Clone)]
pub struct SimCan {
    shared: Arc<Shared>,
    bus_tx: Sender<BusCommand>,
}

impl SimCan {
    /// A controller with the default dimensions.
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    /// A controller with explicit dimensions.
    pub fn with_config(config: SimConfig) -> Self {
        let banks = (0..config.filter_banks).map(|_| None).collect();
        let shared = Arc::new(Shared {
            config,
            state: Mutex::new(CtrlState {
                started: false,
                banks,
                busy_mailboxes: 0,
            }),
            fifos: [Fifo::new(), Fifo::new()],
            events: Mutex::new(None),
            taps: Mutex::new(Vec::new()),
        });

        let (bus_tx, bus_rx): (Sender<BusCommand>, Receiver<BusCommand>) = mpsc::channel();
        let bus_shared = Arc::clone(&shared);
        thread::Builder::new()
            .name("simcan-bus".into())
            .spawn(move || bus_loop(bus_rx, bus_shared))
            .expect("spawn bus thread");

        Self { shared, bus_tx }
    }

    /// Bind the interrupt entry points the bus thread dispatches into.
    pub fn bind_interrupts(&self, events: Arc<dyn CanEvents>) {
        *self.shared.events.lock().expect("events poisoned") = Some(events);
    }

    /// Observation channel receiving every transmitted frame in bus order.
    pub fn tap(&self) -> Receiver<BusFrame> {
        let (tx, rx) = mpsc::channel();
        self.shared.taps.lock().expect("taps poisoned").push(tx);
        rx
    }

    pub(crate) fn release_mailbox(shared: &Shared, mailbox: Mailbox) {
        let mut state = shared.state.lock().expect("controller state poisoned");
        state.busy_mailboxes &= !(1 << mailbox.index());
    }

    pub(crate) fn route(shared: &Shared, frame: &BusFrame) -> Option<RxFifo> {
        let state = shared.state.lock().expect("controller state poisoned");
        let word = FilterWord::from_frame(frame);
        state
            .banks
            .iter()
            .flatten()
            .find(|slot| slot.filter.accepts(slot.mask, word))
            .map(|slot| slot.fifo)
    }
}

impl Default for SimCan {
    fn default() -> Self {
        Self::new()
    }
}

impl CanCore for SimCan {
    type Error = SimCanError;

    fn start(&self) -> Result<(), Self::Error> {
        let mut state = self.shared.state.lock().expect("controller state poisoned");
        state.started = true;
        Ok(())
    }

    fn program_filter(
        &self,
        bank: FilterBank,
        fifo: RxFifo,
        filter: FilterWord,
        mask: FilterWord,
    ) -> Result<(), Self::Error> {
        let mut state = self.shared.state.lock().expect("controller state poisoned");
        let banks = state.banks.len();
        if bank.index() >= banks {
            return Err(SimCanError::BankOutOfRange {
                bank: bank.index(),
                banks,
            });
        }
        state.banks[bank.index()] = Some(FilterSlot { fifo, filter, mask });
        Ok(())
    }

    fn load_mailbox(&self, mailbox: Mailbox, frame: &BusFrame) -> Result<(), Self::Error> {
        {
            let mut state = self.shared.state.lock().expect("controller state poisoned");
            if !state.started {
                return Err(SimCanError::NotStarted);
            }
            let bit = 1u8 << mailbox.index();
            if state.busy_mailboxes & bit != 0 {
                return Err(SimCanError::MailboxBusy(mailbox.index()));
            }
            state.busy_mailboxes |= bit;
        }
        self.bus_tx
            .send(BusCommand::Transmit {
                mailbox,
                frame: *frame,
            })
            .map_err(|_| SimCanError::BusDown)
    }

    fn recv_fifo(&self, fifo: RxFifo) -> Result<BusFrame, Self::Error> {
        let queue = &self.shared.fifos[fifo.index()];
        let mut state = queue.state.lock().expect("fifo poisoned");
        while state.frames.is_empty() {
            state = queue.nonempty.wait(state).expect("fifo poisoned");
        }
        Ok(state.frames.pop_front().expect("nonempty checked"))
    }

    fn set_fifo_notification(&self, fifo: RxFifo, enabled: bool) -> Result<(), Self::Error> {
        let queue = &self.shared.fifos[fifo.index()];
        let raise = {
            let mut state = queue.state.lock().expect("fifo poisoned");
            if enabled {
                state.enabled = true;
                if !state.raised && !state.frames.is_empty() {
                    state.raised = true;
                    true
                } else {
                    false
                }
            } else {
                state.enabled = false;
                state.raised = false;
                false
            }
        };
        if raise {
            let events = self.shared.events.lock().expect("events poisoned").clone();
            if let Some(events) = events {
                events.fifo_pending(fifo);
            }
        }
        Ok(())
    }
}
