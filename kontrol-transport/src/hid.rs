//! hidapi-backed transport

use hidapi::HidDevice;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::TransportError;
use crate::types::TransportDeviceInfo;
use crate::Transport;

/// Interrupt-endpoint transport for a USB HID device
pub struct HidTransport {
    /// `None` once closed
    device: Mutex<Option<HidDevice>>,
    info: TransportDeviceInfo,
}

impl HidTransport {
    pub fn new(device: HidDevice, info: TransportDeviceInfo) -> Self {
        Self {
            device: Mutex::new(Some(device)),
            info,
        }
    }
}

impl Transport for HidTransport {
    fn read(&self, buf: &mut [u8], timeout_ms: i32) -> Result<usize, TransportError> {
        let guard = self.device.lock();
        let device = guard.as_ref().ok_or(TransportError::Disconnected)?;
        let len = device.read_timeout(buf, timeout_ms)?;
        if len > 0 {
            debug!("HID read {} bytes: {:02X?}", len, &buf[..len.min(22)]);
        }
        Ok(len)
    }

    fn write(&self, data: &[u8]) -> Result<usize, TransportError> {
        let guard = self.device.lock();
        let device = guard.as_ref().ok_or(TransportError::Disconnected)?;
        let written = device.write(data)?;
        if written < data.len() {
            return Err(TransportError::ShortWrite {
                written,
                expected: data.len(),
            });
        }
        Ok(written)
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }

    fn close(&self) -> Result<(), TransportError> {
        if self.device.lock().take().is_some() {
            info!("Closed HID device {}", self.info.device_path);
        }
        Ok(())
    }
}
