//! Input report decoding

use serde::Serialize;
use tracing::warn;

use crate::control::{ControlClass, ControlId};
use crate::error::ProtocolError;
use crate::protocol::{input, ANALOG_MASK, INPUT_REPORT_LEN, INPUT_VERSION};

/// Decoded state of every control at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct InputSnapshot {
    /// Protocol version byte
    pub version: u8,
    /// Pads, row-major (A1..A4, B1..B4, ...)
    pub pads: [bool; 16],
    pub mutes: [bool; 4],
    /// Function keys, indexed like [`ControlId::FUNCTIONS`]
    pub functions: [bool; 8],
    /// Dial push click
    pub dial_pressed: bool,
    /// Raw wrap-around dial counter
    pub dial: u8,
    /// Raw 12-bit filter knob readings
    pub knobs: [u16; 4],
    /// Raw 12-bit volume fader readings
    pub faders: [u16; 4],
}

#[inline]
fn bit(byte: u8, msb_index: u8) -> bool {
    byte & (0x80 >> msb_index) != 0
}

#[inline]
fn analog(buf: &[u8], slot: usize) -> u16 {
    let lo = buf[input::ANALOG + slot * 2] as u16;
    let hi = buf[input::ANALOG + slot * 2 + 1] as u16;
    (lo | (hi << 8)) & ANALOG_MASK
}

/// Decode an input report
///
/// Extra trailing bytes are ignored. A version byte other than
/// [`INPUT_VERSION`] is logged and parsing continues.
pub fn decode(buf: &[u8]) -> Result<InputSnapshot, ProtocolError> {
    if buf.len() < INPUT_REPORT_LEN {
        return Err(ProtocolError::ShortReport {
            expected: INPUT_REPORT_LEN,
            actual: buf.len(),
        });
    }

    let version = buf[input::VERSION];
    if version != INPUT_VERSION {
        warn!(
            "Unexpected input report version 0x{:02X} (expected 0x{:02X})",
            version, INPUT_VERSION
        );
    }

    let mut snapshot = InputSnapshot {
        version,
        dial: buf[input::DIAL],
        ..Default::default()
    };

    for i in 0..8u8 {
        snapshot.pads[i as usize] = bit(buf[input::PADS_AB], i);
        snapshot.pads[i as usize + 8] = bit(buf[input::PADS_CD], i);
    }

    // Byte 3: Shift, Reverse, Type, Size, Browse, dial click
    let buttons = buf[input::BUTTONS];
    for i in 0..5u8 {
        snapshot.functions[i as usize] = bit(buttons, i);
    }
    snapshot.dial_pressed = bit(buttons, 5);

    // Byte 4: Mute1..4, Sync, Quant, Capture
    let mutes = buf[input::MUTES];
    for i in 0..4u8 {
        snapshot.mutes[i as usize] = bit(mutes, i);
    }
    for i in 0..3u8 {
        snapshot.functions[5 + i as usize] = bit(mutes, 4 + i);
    }

    for i in 0..4 {
        snapshot.knobs[i] = analog(buf, i);
        snapshot.faders[i] = analog(buf, 4 + i);
    }

    Ok(snapshot)
}

impl InputSnapshot {
    /// Pressed state of a digital control; `None` for knobs and faders
    pub fn pressed(&self, control: ControlId) -> Option<bool> {
        let i = control.index();
        match control.class() {
            ControlClass::Pad => Some(self.pads[i]),
            ControlClass::Mute => Some(self.mutes[i]),
            ControlClass::Function => Some(self.functions[i]),
            ControlClass::Dial => Some(self.dial_pressed),
            ControlClass::Knob | ControlClass::Fader => None,
        }
    }

    /// Whether a digital control is down (analog controls are never pressed)
    pub fn is_pressed(&self, control: ControlId) -> bool {
        self.pressed(control).unwrap_or(false)
    }

    /// Raw 12-bit reading of a knob or fader
    pub fn analog(&self, control: ControlId) -> Option<u16> {
        match control.class() {
            ControlClass::Knob => Some(self.knobs[control.index()]),
            ControlClass::Fader => Some(self.faders[control.index()]),
            _ => None,
        }
    }

    /// Every digital control with its pressed state, in diff order
    pub fn digital(&self) -> impl Iterator<Item = (ControlId, bool)> + '_ {
        ControlId::all().filter_map(move |c| self.pressed(c).map(|p| (c, p)))
    }

    /// Controls currently held down
    pub fn pressed_controls(&self) -> Vec<ControlId> {
        self.digital()
            .filter_map(|(c, pressed)| pressed.then_some(c))
            .collect()
    }
}

/// Build a raw input report from a snapshot (test and replay helper)
pub fn encode_input(snapshot: &InputSnapshot) -> [u8; INPUT_REPORT_LEN] {
    let mut buf = [0u8; INPUT_REPORT_LEN];
    buf[input::VERSION] = snapshot.version;

    for i in 0..8u8 {
        if snapshot.pads[i as usize] {
            buf[input::PADS_AB] |= 0x80 >> i;
        }
        if snapshot.pads[i as usize + 8] {
            buf[input::PADS_CD] |= 0x80 >> i;
        }
    }
    for i in 0..5u8 {
        if snapshot.functions[i as usize] {
            buf[input::BUTTONS] |= 0x80 >> i;
        }
    }
    if snapshot.dial_pressed {
        buf[input::BUTTONS] |= 0x80 >> 5;
    }
    for i in 0..4u8 {
        if snapshot.mutes[i as usize] {
            buf[input::MUTES] |= 0x80 >> i;
        }
    }
    for i in 0..3u8 {
        if snapshot.functions[5 + i as usize] {
            buf[input::MUTES] |= 0x80 >> (4 + i);
        }
    }
    buf[input::DIAL] = snapshot.dial;

    let readings = snapshot.knobs.iter().chain(snapshot.faders.iter());
    for (slot, raw) in readings.enumerate() {
        let bytes = (raw & ANALOG_MASK).to_le_bytes();
        buf[input::ANALOG + slot * 2] = bytes[0];
        buf[input::ANALOG + slot * 2 + 1] = bytes[1];
    }
    buf
}
