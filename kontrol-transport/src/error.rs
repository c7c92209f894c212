//! Transport, protocol and device error types

use thiserror::Error;

use crate::control::ControlId;

/// Errors raised by a raw transport backend
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Device disconnected")]
    Disconnected,

    #[error("Short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    // HID-specific errors
    #[error("HID error: {0}")]
    HidError(String),

    #[error("HID permission denied: {0}")]
    HidPermissionDenied(String),
}

impl From<hidapi::HidError> for TransportError {
    fn from(e: hidapi::HidError) -> Self {
        let msg = e.to_string();
        if msg.contains("Permission denied") || msg.contains("EPERM") {
            TransportError::HidPermissionDenied(msg)
        } else {
            TransportError::HidError(msg)
        }
    }
}

/// Malformed input report
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Input report too short: expected {expected} bytes, got {actual}")]
    ShortReport { expected: usize, actual: usize },
}

/// Errors surfaced by [`crate::Device`] operations
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("HID access is not supported on {0}")]
    Unsupported(String),

    /// A transport operation failed; `op` names what was attempted
    #[error("Failed to {op}: {source}")]
    Transport {
        op: &'static str,
        #[source]
        source: TransportError,
    },

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("{operation} is not supported by {control} ({class})")]
    InvalidControl {
        control: ControlId,
        class: crate::control::ControlClass,
        operation: &'static str,
    },
}

impl DeviceError {
    pub(crate) fn transport(op: &'static str) -> impl FnOnce(TransportError) -> Self {
        move |source| DeviceError::Transport { op, source }
    }

    pub(crate) fn invalid(control: ControlId, operation: &'static str) -> Self {
        DeviceError::InvalidControl {
            control,
            class: control.class(),
            operation,
        }
    }
}
