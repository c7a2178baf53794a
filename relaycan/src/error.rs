//! Protocol-layer error types.

use std::fmt;

use relaycan_transport::TransportError;

/// Configuration rejected by [`ProtocolConfig::validate`](crate::ProtocolConfig::validate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A frequency was zero.
    ZeroFrequency,
    /// `status_hz` is not an integer multiple of `command_hz`.
    FrequencyRatio {
        /// Configured command rate.
        command_hz: u32,
        /// Configured status rate.
        status_hz: u32,
    },
    /// An identifier does not fit in 11 bits.
    IdOutOfRange,
    /// Command and status identifiers are equal.
    MirroredIds,
    /// Master and Slave share a filter bank or receive FIFO.
    SharedReceivePath,
    /// Event queue depth was zero.
    ZeroQueueDepth,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroFrequency => write!(f, "frequencies must be nonzero"),
            ConfigError::FrequencyRatio {
                command_hz,
                status_hz,
            } => write!(
                f,
                "status rate {status_hz} Hz is not an integer multiple of command rate {command_hz} Hz"
            ),
            ConfigError::IdOutOfRange => write!(f, "identifier exceeds 11 bits"),
            ConfigError::MirroredIds => write!(f, "command and status identifiers are equal"),
            ConfigError::SharedReceivePath => {
                write!(f, "nodes must use distinct filter banks and receive FIFOs")
            }
            ConfigError::ZeroQueueDepth => write!(f, "event queue depth must be nonzero"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Malformed payload on a protocol identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireError {
    /// Payload length did not match the message.
    BadLength {
        /// Expected payload length.
        expected: usize,
        /// Received payload length.
        got: usize,
    },
    /// Command byte was neither the ON nor the OFF sentinel.
    UnknownCommand(u8),
    /// Status byte was neither 0 nor 1.
    BadStatus(u8),
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::BadLength { expected, got } => {
                write!(f, "expected {expected}-byte payload, got {got}")
            }
            WireError::UnknownCommand(byte) => write!(f, "unknown command byte {byte:#04x}"),
            WireError::BadStatus(byte) => write!(f, "invalid status byte {byte:#04x}"),
        }
    }
}

impl std::error::Error for WireError {}

/// Fatal errors a node reactor can stop on.
///
/// There is no degraded mode: a node returning one of these goes silent on
/// the bus.
#[derive(Debug)]
pub enum NodeError<E> {
    /// Configuration rejected at construction time.
    Config(ConfigError),
    /// The transport failed; per the error design this is unrecoverable.
    Transport(TransportError<E>),
    /// A frame on an exact-matched identifier carried a malformed payload.
    Wire(WireError),
}

impl<E> From<ConfigError> for NodeError<E> {
    fn from(err: ConfigError) -> Self {
        NodeError::Config(err)
    }
}

impl<E> From<TransportError<E>> for NodeError<E> {
    fn from(err: TransportError<E>) -> Self {
        NodeError::Transport(err)
    }
}

impl<E> From<WireError> for NodeError<E> {
    fn from(err: WireError) -> Self {
        NodeError::Wire(err)
    }
}

impl<E: fmt::Debug> fmt::Display for NodeError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeError::Config(err) => write!(f, "configuration error: {err}"),
            NodeError::Transport(err) => write!(f, "transport failure: {err}"),
            NodeError::Wire(err) => write!(f, "wire error: {err}"),
        }
    }
}

impl<E: fmt::Debug> std::error::Error for NodeError<E> {}
