//! Command handlers for the CLI application.
//!
//! - `list`: enumerate attached controllers
//! - `monitor`: print control events
//! - `demo`: interactive LED and display demo
//! - `layout`: mute-key layout driven by the layout engine

pub mod demo;
pub mod layout;
pub mod list;
pub mod monitor;

use anyhow::{Context, Result};
use kontrol_transport::Device;
use tracing::{info, warn};

/// Open the first attached controller
pub fn open_device() -> Result<Device> {
    let device = Device::open().context("failed to open Traktor Kontrol F1")?;
    info!("Opened {}", device.name());
    Ok(device)
}

/// Block until Ctrl-C
pub async fn wait_for_exit() -> Result<()> {
    println!("Ready. Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    println!();
    Ok(())
}

/// Turn the LEDs off and release the device
pub fn shutdown(device: &Device) -> Result<()> {
    if let Err(e) = device.blackout() {
        warn!("Failed to clear LEDs: {}", e);
    }
    device.close().context("failed to close device")?;
    Ok(())
}
