//! List attached controllers

use anyhow::Result;
use kontrol_transport::{protocol, HidDiscovery};

pub fn run() -> Result<()> {
    let devices = HidDiscovery::default().list_devices()?;

    if devices.is_empty() {
        println!(
            "No {} found (VID={:04X} PID={:04X})",
            protocol::device::PRODUCT_NAME,
            protocol::device::VENDOR_ID,
            protocol::device::PRODUCT_ID
        );
        return Ok(());
    }

    println!("Found {} device(s):", devices.len());
    for (idx, device) in devices.iter().enumerate() {
        let info = &device.info;
        println!(
            "  [{}] {} VID={:04X} PID={:04X} serial={} path={}{}",
            idx,
            info.display_name(),
            info.vid,
            info.pid,
            info.serial.as_deref().unwrap_or("-"),
            info.device_path,
            if device.name_matches {
                ""
            } else {
                " (unexpected product name)"
            }
        );
    }
    Ok(())
}
