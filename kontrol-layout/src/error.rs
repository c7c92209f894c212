//! Layout error types

use kontrol_transport::DeviceError;
use thiserror::Error;

/// Errors from layout operations
#[derive(Error, Debug)]
pub enum LayoutError {
    /// Device layer error
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    #[error("Layout {0} is already connected")]
    AlreadyConnected(String),

    #[error("Layout {0} is not connected")]
    NotConnected(String),

    /// connect() was called outside a Tokio runtime
    #[error("No Tokio runtime available to run layout {0}")]
    NoRuntime(String),
}
