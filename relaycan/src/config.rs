//! Protocol configuration container.

use std::time::Duration;

use crate::error::ConfigError;
use crate::wire::{COMMAND_STD_ID, STATUS_STD_ID};
use relaycan_transport::{FilterBank, RxFifo};

/// Configuration shared by both protocol nodes.
///
/// The bank/FIFO partitioning is static: the Master listens for status frames
/// on its own bank and FIFO, the Slave for command frames on the other pair.
/// Nothing changes at runtime.
#[derive(Debug, Clone)]
pub struct ProtocolConfig {
    /// Command transmission rate in Hz.
    pub command_hz: u32,
    /// Status transmission rate in Hz; must be an integer multiple of
    /// `command_hz`.
    pub status_hz: u32,
    /// Standard identifier carrying commands.
    pub command_id: u16,
    /// Standard identifier carrying status.
    pub status_id: u16,
    /// Filter bank the Master's status filter is programmed into.
    pub master_bank: FilterBank,
    /// Receive FIFO delivering status frames to the Master.
    pub master_fifo: RxFifo,
    /// Filter bank the Slave's command filter is programmed into.
    pub slave_bank: FilterBank,
    /// Receive FIFO delivering command frames to the Slave.
    pub slave_fifo: RxFifo,
    /// Depth of each node's event queue.
    pub event_queue_depth: usize,
}

impl Default for ProtocolConfig {
    /// The reference configuration: 1 Hz commands, 10 Hz status,
    /// identifiers `0x300`/`0x301`, Master on bank 0 / FIFO 0 and Slave on
    /// bank 1 / FIFO 1, queue depth 10.
    fn default() -> Self {
        Self {
            command_hz: 1,
            status_hz: 10,
            command_id: COMMAND_STD_ID,
            status_id: STATUS_STD_ID,
            master_bank: FilterBank::new(0),
            master_fifo: RxFifo::Fifo0,
            slave_bank: FilterBank::new(1),
            slave_fifo: RxFifo::Fifo1,
            event_queue_depth: 10,
        }
    }
}

impl ProtocolConfig {
    /// Reject configurations the protocol cannot run on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command_hz == 0 || self.status_hz == 0 {
            return Err(ConfigError::ZeroFrequency);
        }
        if self.status_hz < self.command_hz || self.status_hz % self.command_hz != 0 {
            return Err(ConfigError::FrequencyRatio {
                command_hz: self.command_hz,
                status_hz: self.status_hz,
            });
        }
        if self.command_id > 0x7FF || self.status_id > 0x7FF {
            return Err(ConfigError::IdOutOfRange);
        }
        if self.command_id == self.status_id {
            return Err(ConfigError::MirroredIds);
        }
        if self.master_bank == self.slave_bank || self.master_fifo == self.slave_fifo {
            return Err(ConfigError::SharedReceivePath);
        }
        if self.event_queue_depth == 0 {
            return Err(ConfigError::ZeroQueueDepth);
        }
        Ok(())
    }

    /// Status transmissions expected per command cycle.
    pub fn status_count_per_command(&self) -> u32 {
        self.status_hz / self.command_hz
    }

    /// Period of the Master's command timer.
    pub fn command_period(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.command_hz))
    }

    /// Period of the Slave's status timer.
    pub fn status_period(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.status_hz))
    }
}
