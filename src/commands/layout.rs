//! Mute-key layout
//!
//! A short press toggles a mute key between green and off. Holding a key
//! paints it red until it is released, which clears it.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use kontrol_layout::{HandlerSlot, Layout, LayoutConfig, MaskPreset};
use kontrol_transport::{ControlId, Rgb};
use parking_lot::Mutex;
use tracing::{debug, info};

use super::{open_device, shutdown, wait_for_exit};

const PRESSED: Rgb = Rgb::WHITE;
const ENGAGED: Rgb = Rgb::GREEN;
const HELD: Rgb = Rgb::RED;

pub async fn run(hold_ms: u64, refresh_hz: u32) -> Result<()> {
    let device = Arc::new(open_device()?);
    let hold = Duration::from_millis(hold_ms);

    let config = LayoutConfig::default()
        .with_name("mutes")
        .with_default_hold(hold)
        .with_refresh_rate_hz(refresh_hz);
    let layout = Layout::with_config(MaskPreset::Mutes, config);

    let engaged: Arc<Mutex<BTreeSet<ControlId>>> = Arc::default();

    layout.set_hold_handler(HandlerSlot::MutePressed, |layout, control, _| {
        layout.set_color(control, PRESSED);
    });

    layout.set_hold_handler(HandlerSlot::MuteHold, |layout, control, first| {
        if first {
            info!("{} held", control);
            layout.set_color(control, HELD);
        } else if let Some(time) = layout.hold_time(control) {
            debug!("{} still held ({} ms)", control, time.as_millis());
        }
    });

    let toggles = Arc::clone(&engaged);
    layout.set_hold_handler(HandlerSlot::MuteReleased, move |layout, control, _| {
        let mut engaged = toggles.lock();
        if layout.is_held(control, hold) {
            engaged.remove(&control);
            layout.set_color(control, Rgb::BLACK);
            return;
        }
        let color = if engaged.insert(control) {
            ENGAGED
        } else {
            engaged.remove(&control);
            Rgb::BLACK
        };
        info!("{} {}", control, if color == ENGAGED { "on" } else { "off" });
        layout.set_color(control, color);
    });

    layout
        .connect(Arc::clone(&device))
        .context("failed to attach layout")?;
    layout.activate();
    info!(
        "Layout '{}' active on {} controls",
        layout.name(),
        layout.mask().len()
    );

    wait_for_exit().await?;

    layout.deactivate();
    layout.disconnect()?;
    shutdown(&device)
}
