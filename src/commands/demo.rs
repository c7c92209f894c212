//! Interactive demo
//!
//! Pads step through a color wheel on every press, the dial counts on the
//! display (press it to reset) and mute/function LEDs light while held.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use kontrol_transport::{
    is_class, ControlClass, ControlId, Device, DeviceError, Event, EventKind, LedIntensity, Rgb,
};
use tracing::{info, warn};

use super::{open_device, shutdown, wait_for_exit};

/// Wheel distance between neighbouring pads and between presses
const WHEEL_STEP: u8 = 16;

/// LED level of an idle mute/function key
const IDLE_LEVEL: u8 = 8;

pub async fn run() -> Result<()> {
    let device = Arc::new(open_device()?);
    device.enable_debug_logger();

    let mut wheel: HashMap<ControlId, u8> = ControlId::PADS
        .iter()
        .enumerate()
        .map(|(idx, pad)| (*pad, idx as u8 * WHEEL_STEP))
        .collect();
    for (pad, pos) in &wheel {
        device.set_pad_color(*pad, Rgb::wheel(*pos))?;
    }
    for control in ControlId::MUTES.iter().chain(ControlId::FUNCTIONS.iter()) {
        device.set_brightness(*control, IDLE_LEVEL)?;
    }
    device.set_display(0)?;

    let weak = Arc::downgrade(&device);
    let pressed = is_class(ControlClass::Pad);
    device.add_callback(
        move |event| pressed(event) && event.kind == EventKind::Pressed,
        move |event| {
            let Some(device) = weak.upgrade() else {
                return;
            };
            let pos = wheel.entry(event.control).or_default();
            *pos = pos.wrapping_add(WHEEL_STEP);
            if let Err(e) = device.set_pad_color(event.control, Rgb::wheel(*pos)) {
                warn!("Failed to set {} color: {}", event.control, e);
            }
        },
    );

    let mut events = device.subscribe(100);
    let follower = {
        let device = Arc::clone(&device);
        tokio::spawn(async move {
            let mut dial: i32 = 0;
            while let Some(event) = events.recv().await {
                info!("{}", event);
                if let Err(e) = apply(&device, &event, &mut dial) {
                    warn!("Failed to update LEDs: {}", e);
                }
            }
        })
    };

    wait_for_exit().await?;
    follower.abort();
    shutdown(&device)
}

fn apply(device: &Device, event: &Event, dial: &mut i32) -> Result<(), DeviceError> {
    let control = event.control;
    match event.kind {
        EventKind::Pressed | EventKind::Released if control.is_mute() || control.is_function() => {
            let level = if event.kind == EventKind::Pressed {
                LedIntensity::FULL.value()
            } else {
                IDLE_LEVEL
            };
            device.set_brightness(control, level)
        }
        EventKind::Pressed if control == ControlId::Dial => {
            *dial = 0;
            device.set_display(*dial)
        }
        EventKind::Increment => {
            *dial = (*dial + 1).min(99);
            device.set_display(*dial)
        }
        EventKind::Decrement => {
            *dial = (*dial - 1).max(-99);
            device.set_display(*dial)
        }
        _ => Ok(()),
    }
}
