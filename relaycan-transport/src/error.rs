//! Transport-layer error type.

use core::fmt;

/// Errors surfaced by the transport layer.
///
/// Per the system's error design these are all fatal: filter programming and
/// frame submission either succeed or leave the node with no usable transport.
/// There is no transient-retry class.
#[derive(Debug)]
pub enum TransportError<E> {
    /// Payload exceeds the classic-CAN frame limit.
    PayloadTooLong(usize),
    /// Wrapper around the backend-specific error.
    Hardware(E),
}

impl<E> From<E> for TransportError<E> {
    /// Convert a backend-specific error into [`TransportError::Hardware`].
    fn from(err: E) -> Self {
        TransportError::Hardware(err)
    }
}

impl<E: fmt::Debug> fmt::Display for TransportError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::PayloadTooLong(len) => {
                write!(f, "payload of {len} bytes exceeds the 8-byte frame limit")
            }
            TransportError::Hardware(err) => write!(f, "controller error: {err:?}"),
        }
    }
}

impl<E: fmt::Debug> std::error::Error for TransportError<E> {}
