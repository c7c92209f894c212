//! Device configuration

use crate::bus::DEFAULT_SUBSCRIBER_CAPACITY;
use crate::protocol::device;

/// Settings for opening and running a [`crate::Device`]
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Read timeout in milliseconds (bounds how long close() waits for the
    /// reader thread when the device is idle)
    pub read_timeout_ms: i32,
    /// Product string the device is expected to report
    pub expected_product_name: String,
    pub vendor_id: u16,
    pub product_id: u16,
    /// Queue capacity used by [`crate::Device::add_callback`] consumers
    pub subscriber_capacity: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: 10,
            expected_product_name: device::PRODUCT_NAME.to_string(),
            vendor_id: device::VENDOR_ID,
            product_id: device::PRODUCT_ID,
            subscriber_capacity: DEFAULT_SUBSCRIBER_CAPACITY,
        }
    }
}

impl DeviceConfig {
    pub fn with_read_timeout_ms(mut self, ms: i32) -> Self {
        self.read_timeout_ms = ms;
        self
    }

    pub fn with_subscriber_capacity(mut self, capacity: usize) -> Self {
        self.subscriber_capacity = capacity;
        self
    }

    /// Match a different VID/PID (e.g. a firmware variant)
    pub fn with_ids(mut self, vendor_id: u16, product_id: u16) -> Self {
        self.vendor_id = vendor_id;
        self.product_id = product_id;
        self
    }
}
