//! What a layout needs from a controller

use kontrol_transport::{ColorMap, Device, DeviceError, Event};
use tokio::sync::mpsc;

/// Event source and LED sink a layout attaches to
///
/// Implemented by [`Device`]; tests substitute an in-memory surface.
pub trait Surface: Send + Sync + 'static {
    /// New event queue of `capacity`
    fn subscribe(&self, capacity: usize) -> mpsc::Receiver<Event>;

    /// Write the given LED colors in one frame
    ///
    /// May block on device I/O; the refresh task calls it from Tokio's
    /// blocking pool.
    fn write_colors(&self, colors: &ColorMap) -> Result<(), DeviceError>;

    fn name(&self) -> String;
}

impl Surface for Device {
    fn subscribe(&self, capacity: usize) -> mpsc::Receiver<Event> {
        Device::subscribe(self, capacity)
    }

    fn write_colors(&self, colors: &ColorMap) -> Result<(), DeviceError> {
        self.set_colors(colors)
    }

    fn name(&self) -> String {
        Device::name(self)
    }
}
