//! Common types for the transport layer

use serde::Serialize;

/// Device identification information
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransportDeviceInfo {
    /// USB Vendor ID
    pub vid: u16,
    /// USB Product ID
    pub pid: u16,
    /// Device path or identifier (transport-specific)
    pub device_path: String,
    /// Serial number if available
    pub serial: Option<String>,
    /// Product name if available
    pub product_name: Option<String>,
}

impl TransportDeviceInfo {
    /// Product name, or a VID:PID fallback
    pub fn display_name(&self) -> String {
        match &self.product_name {
            Some(name) => name.clone(),
            None => format!("{:04x}:{:04x}", self.vid, self.pid),
        }
    }
}

/// Device found by enumeration, not yet opened
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredDevice {
    pub info: TransportDeviceInfo,
    /// Whether the product string matched the expected name
    pub name_matches: bool,
}
