//! Wire format: identifiers, sentinels and payload codecs.

use embedded_can::StandardId;

use crate::error::WireError;

/// Standard identifier carrying operation commands, Master → Slave.
pub const COMMAND_STD_ID: u16 = 0x300;
/// Standard identifier carrying operation status, Slave → Master.
pub const STATUS_STD_ID: u16 = 0x301;

/// Command payload length in bytes.
pub const COMMAND_MSG_SIZE: usize = 1;
/// Status payload length in bytes.
pub const STATUS_MSG_SIZE: usize = 2;

const COMMAND_ON: u8 = 0xAA;
const COMMAND_OFF: u8 = 0x55;

const STATUS_ON: u8 = 1;
const STATUS_OFF: u8 = 0;

/// Step applied to the status value on every command application.
pub const STATUS_VALUE_MODIFIER: u8 = 1;

/// Helper for the two well-known identifiers.
pub(crate) fn standard_id(raw: u16) -> StandardId {
    StandardId::new(raw).expect("identifier validated by ProtocolConfig")
}

/// An operation command, the single-byte payload on the command identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationCommand {
    /// Switch the device on (`0xAA` on the wire).
    On,
    /// Switch the device off (`0x55` on the wire).
    Off,
}

impl OperationCommand {
    /// The wire byte for this command.
    pub const fn encode(self) -> u8 {
        match self {
            OperationCommand::On => COMMAND_ON,
            OperationCommand::Off => COMMAND_OFF,
        }
    }

    /// Decode a command payload. Anything but a single sentinel byte is
    /// rejected.
    pub fn decode(payload: &[u8]) -> Result<Self, WireError> {
        if payload.len() != COMMAND_MSG_SIZE {
            return Err(WireError::BadLength {
                expected: COMMAND_MSG_SIZE,
                got: payload.len(),
            });
        }
        match payload[0] {
            COMMAND_ON => Ok(OperationCommand::On),
            COMMAND_OFF => Ok(OperationCommand::Off),
            other => Err(WireError::UnknownCommand(other)),
        }
    }
}

/// Device operation status, the two-byte payload on the status identifier.
///
/// `value` is a dummy device reading that drifts up while the device is ON
/// and down while it is OFF, one step per status transmission, wrapping per
/// unsigned-byte arithmetic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationStatus {
    /// Whether the device is ON.
    pub on: bool,
    /// Drifting device value.
    pub value: u8,
}

impl OperationStatus {
    /// Encode as the 2-byte status payload.
    pub fn encode(self) -> [u8; STATUS_MSG_SIZE] {
        let status = if self.on { STATUS_ON } else { STATUS_OFF };
        [status, self.value]
    }

    /// Decode a status payload, rejecting bad lengths and status bytes other
    /// than 0 or 1.
    pub fn decode(payload: &[u8]) -> Result<Self, WireError> {
        if payload.len() != STATUS_MSG_SIZE {
            return Err(WireError::BadLength {
                expected: STATUS_MSG_SIZE,
                got: payload.len(),
            });
        }
        let on = match payload[0] {
            STATUS_ON => true,
            STATUS_OFF => false,
            other => return Err(WireError::BadStatus(other)),
        };
        Ok(Self {
            on,
            value: payload[1],
        })
    }

    /// Apply a command: the status mirrors it and the value steps up (ON) or
    /// down (OFF). The Slave re-applies the last command before every status
    /// transmission, so the value drifts one step per echo.
    pub fn apply(&mut self, command: OperationCommand) {
        match command {
            OperationCommand::On => {
                self.on = true;
                self.value = self.value.wrapping_add(STATUS_VALUE_MODIFIER);
            }
            OperationCommand::Off => {
                self.on = false;
                self.value = self.value.wrapping_sub(STATUS_VALUE_MODIFIER);
            }
        }
    }

    /// The command a Master should issue next: the logical inverse of this
    /// status.
    pub fn inverse_command(self) -> OperationCommand {
        if self.on {
            OperationCommand::Off
        } else {
            OperationCommand::On
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_bytes_round_trip() {
        assert_eq!(OperationCommand::On.encode(), 0xAA);
        assert_eq!(OperationCommand::Off.encode(), 0x55);
        assert_eq!(OperationCommand::decode(&[0xAA]), Ok(OperationCommand::On));
        assert_eq!(OperationCommand::decode(&[0x55]), Ok(OperationCommand::Off));
    }

    #[test]
    fn command_decode_rejects_junk() {
        assert_eq!(
            OperationCommand::decode(&[0x00]),
            Err(WireError::UnknownCommand(0x00))
        );
        assert_eq!(
            OperationCommand::decode(&[]),
            Err(WireError::BadLength {
                expected: 1,
                got: 0
            })
        );
        assert_eq!(
            OperationCommand::decode(&[0xAA, 0xAA]),
            Err(WireError::BadLength {
                expected: 1,
                got: 2
            })
        );
    }

    #[test]
    fn status_payload_round_trips() {
        let status = OperationStatus { on: true, value: 7 };
        assert_eq!(status.encode(), [1, 7]);
        assert_eq!(OperationStatus::decode(&[1, 7]), Ok(status));
        assert_eq!(
            OperationStatus::decode(&[2, 7]),
            Err(WireError::BadStatus(2))
        );
        assert_eq!(
            OperationStatus::decode(&[1]),
            Err(WireError::BadLength {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn value_steps_up_while_on_and_back_down_while_off() {
        let mut status = OperationStatus::default();
        for expected in 1..=5u8 {
            status.apply(OperationCommand::On);
            assert_eq!(status, OperationStatus { on: true, value: expected });
        }
        for expected in (0..5u8).rev() {
            status.apply(OperationCommand::Off);
            assert_eq!(status, OperationStatus { on: false, value: expected });
        }
    }

    #[test]
    fn value_wraps_per_unsigned_byte_arithmetic() {
        let mut status = OperationStatus { on: false, value: 0 };
        status.apply(OperationCommand::Off);
        assert_eq!(status.value, 0xFF);
        let mut status = OperationStatus { on: true, value: 0xFF };
        status.apply(OperationCommand::On);
        assert_eq!(status.value, 0x00);
    }

    #[test]
    fn master_alternates_commands_from_the_last_status() {
        assert_eq!(
            OperationStatus { on: false, value: 0 }.inverse_command(),
            OperationCommand::On
        );
        assert_eq!(
            OperationStatus { on: true, value: 3 }.inverse_command(),
            OperationCommand::Off
        );
    }
}
