//! Transport, protocol codec and device state for the Native Instruments
//! Traktor Kontrol F1
//!
//! - [`input::decode`] / [`output::encode`]: stateless report codec
//! - [`Device`]: owns the HID transport, diffs input reports into [`Event`]s
//!   and writes LED/display state through to the hardware
//! - [`EventBus`]: best-effort fan-out of events to subscriber queues

pub mod bus;
pub mod color;
pub mod config;
pub mod control;
pub mod diff;
pub mod error;
pub mod event;
pub mod input;
pub mod output;
pub mod protocol;
pub mod types;

mod device;
mod discovery;
mod hid;

pub use bus::{EventBus, DEFAULT_SUBSCRIBER_CAPACITY};
pub use color::{ColorMap, LedIntensity, Rgb};
pub use config::DeviceConfig;
pub use control::{ControlClass, ControlId};
pub use device::Device;
pub use discovery::{platform_supported, HidDiscovery};
pub use error::{DeviceError, ProtocolError, TransportError};
pub use event::{is_class, is_control, is_kind, Event, EventKind};
pub use hid::HidTransport;
pub use input::InputSnapshot;
pub use output::OutputState;
pub use types::{DiscoveredDevice, TransportDeviceInfo};

/// Raw report I/O with one device
///
/// Implementations are blocking; [`Device`] drives `read` from a dedicated
/// thread and calls `write` from whichever thread mutates the output state.
pub trait Transport: Send + Sync {
    /// Read one input report into `buf`
    ///
    /// Waits at most `timeout_ms` milliseconds (-1 blocks). Returns the number
    /// of bytes read, 0 on timeout.
    fn read(&self, buf: &mut [u8], timeout_ms: i32) -> Result<usize, TransportError>;

    /// Write one output report (including the report ID byte)
    fn write(&self, data: &[u8]) -> Result<usize, TransportError>;

    /// Get device information
    fn device_info(&self) -> &TransportDeviceInfo;

    /// Release the underlying handle; later reads and writes fail
    fn close(&self) -> Result<(), TransportError> {
        Ok(())
    }
}
