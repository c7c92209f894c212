//! Device discovery for Kontrol F1 controllers

use std::sync::Arc;

use hidapi::HidApi;
use tracing::{debug, info, warn};

use crate::config::DeviceConfig;
use crate::error::{DeviceError, TransportError};
use crate::hid::HidTransport;
use crate::types::{DiscoveredDevice, TransportDeviceInfo};
use crate::Transport;

/// Whether this build target has a HID backend
pub const fn platform_supported() -> bool {
    cfg!(any(
        target_os = "linux",
        target_os = "macos",
        target_os = "windows",
        target_os = "freebsd"
    ))
}

/// HID device discovery
pub struct HidDiscovery {
    vendor_id: u16,
    product_id: u16,
    expected_name: String,
}

impl Default for HidDiscovery {
    fn default() -> Self {
        Self::new(&DeviceConfig::default())
    }
}

impl HidDiscovery {
    pub fn new(config: &DeviceConfig) -> Self {
        Self {
            vendor_id: config.vendor_id,
            product_id: config.product_id,
            expected_name: config.expected_product_name.clone(),
        }
    }

    fn api() -> Result<HidApi, DeviceError> {
        if !platform_supported() {
            return Err(DeviceError::Unsupported(std::env::consts::OS.to_string()));
        }
        HidApi::new().map_err(|e| DeviceError::transport("initialise HID")(e.into()))
    }

    /// List matching devices currently attached
    ///
    /// A product string other than the expected one is reported but not
    /// filtered out.
    pub fn list_devices(&self) -> Result<Vec<DiscoveredDevice>, DeviceError> {
        let api = Self::api()?;
        Ok(self.enumerate(&api))
    }

    fn enumerate(&self, api: &HidApi) -> Vec<DiscoveredDevice> {
        let mut devices = Vec::new();

        for device_info in api.device_list() {
            if device_info.vendor_id() != self.vendor_id
                || device_info.product_id() != self.product_id
            {
                continue;
            }

            let info = TransportDeviceInfo {
                vid: device_info.vendor_id(),
                pid: device_info.product_id(),
                device_path: device_info.path().to_string_lossy().to_string(),
                serial: device_info.serial_number().map(|s| s.to_string()),
                product_name: device_info.product_string().map(|s| s.to_string()),
            };
            let name_matches = info.product_name.as_deref() == Some(self.expected_name.as_str());
            if !name_matches {
                warn!(
                    "Device at {} reports product {:?}, expected {:?}",
                    info.device_path, info.product_name, self.expected_name
                );
            }

            debug!(
                "Found device: VID={:04X} PID={:04X} path={}",
                info.vid, info.pid, info.device_path
            );
            devices.push(DiscoveredDevice { info, name_matches });
        }

        devices
    }

    /// Open a specific device
    pub fn open_device(
        &self,
        device: &DiscoveredDevice,
    ) -> Result<Arc<dyn Transport>, DeviceError> {
        let api = Self::api()?;
        self.open_with_api(&api, device)
    }

    fn open_with_api(
        &self,
        api: &HidApi,
        device: &DiscoveredDevice,
    ) -> Result<Arc<dyn Transport>, DeviceError> {
        let path = std::ffi::CString::new(device.info.device_path.clone()).map_err(|_| {
            DeviceError::DeviceNotFound(format!("invalid device path {}", device.info.device_path))
        })?;
        let hid = api
            .open_path(&path)
            .map_err(|e| DeviceError::transport("open device")(TransportError::from(e)))?;

        info!(
            "Opened {} at {}",
            device.info.display_name(),
            device.info.device_path
        );
        Ok(Arc::new(HidTransport::new(hid, device.info.clone())))
    }

    /// Open the first matching device
    pub fn open_first(&self) -> Result<Arc<dyn Transport>, DeviceError> {
        let api = Self::api()?;
        let devices = self.enumerate(&api);
        let Some(first) = devices.first() else {
            return Err(DeviceError::DeviceNotFound(format!(
                "no {} ({:04x}:{:04x}) attached",
                self.expected_name, self.vendor_id, self.product_id
            )));
        };
        if devices.len() > 1 {
            info!("{} devices found, using {}", devices.len(), first.info.device_path);
        }
        self.open_with_api(&api, first)
    }
}
