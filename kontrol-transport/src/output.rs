//! Output state and output report encoding

use serde::Serialize;

use crate::color::{ColorMap, LedIntensity, Rgb};
use crate::control::{ControlClass, ControlId};
use crate::error::DeviceError;
use crate::protocol::{output, segment, OUTPUT_REPORT_ID, OUTPUT_REPORT_LEN};

/// Largest magnitude the two-digit display can show
pub const DISPLAY_MAX: i8 = 99;

/// Function LED wire order
const FUNCTION_LED_ORDER: [ControlId; 8] = [
    ControlId::Browse,
    ControlId::Size,
    ControlId::Type,
    ControlId::Reverse,
    ControlId::Shift,
    ControlId::Capture,
    ControlId::Quant,
    ControlId::Sync,
];

/// Everything the host can drive on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct OutputState {
    display: i8,
    pads: [Rgb; 16],
    functions: [LedIntensity; 8],
    mutes: [LedIntensity; 4],
}

impl OutputState {
    /// All LEDs dark, display showing 00
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display(&self) -> i8 {
        self.display
    }

    /// Set the display value, clamped to [-99, 99]; negative lights the decimal point
    pub fn set_display(&mut self, value: i32) {
        self.display = value.clamp(-(DISPLAY_MAX as i32), DISPLAY_MAX as i32) as i8;
    }

    pub fn pad(&self, control: ControlId) -> Option<Rgb> {
        control.is_pad().then(|| self.pads[control.index()])
    }

    /// LED intensity of a mute or function key
    pub fn intensity(&self, control: ControlId) -> Option<LedIntensity> {
        match control.class() {
            ControlClass::Mute => Some(self.mutes[control.index()]),
            ControlClass::Function => Some(self.functions[control.index()]),
            _ => None,
        }
    }

    pub fn set_pad_color(&mut self, control: ControlId, color: Rgb) -> Result<(), DeviceError> {
        if !control.is_pad() {
            return Err(DeviceError::invalid(control, "set pad color"));
        }
        self.pads[control.index()] = color;
        Ok(())
    }

    pub fn set_intensity(
        &mut self,
        control: ControlId,
        level: LedIntensity,
    ) -> Result<(), DeviceError> {
        match control.class() {
            ControlClass::Mute => self.mutes[control.index()] = level,
            ControlClass::Function => self.functions[control.index()] = level,
            _ => return Err(DeviceError::invalid(control, "set brightness")),
        }
        Ok(())
    }

    /// Apply one color to any LED control: pads take RGB, single-color keys
    /// take the brightest channel
    pub fn set_color(&mut self, control: ControlId, color: Rgb) -> Result<(), DeviceError> {
        match control.class() {
            ControlClass::Pad => self.set_pad_color(control, color),
            ControlClass::Mute | ControlClass::Function => {
                self.set_intensity(control, LedIntensity::from_rgb(color))
            }
            _ => Err(DeviceError::invalid(control, "set color")),
        }
    }

    /// Apply a whole color map; fails before mutating anything if any entry
    /// targets a control without a light
    pub fn apply_colors(&mut self, colors: &ColorMap) -> Result<(), DeviceError> {
        if let Some(bad) = colors.controls().find(|c| !c.class().has_led()) {
            return Err(DeviceError::invalid(bad, "set color"));
        }
        for (control, color) in colors.iter() {
            self.set_color(control, color)?;
        }
        Ok(())
    }
}

fn digit_segments(digit: u8) -> &'static [u8; segment::SEGMENTS] {
    match segment::DIGITS.get(digit as usize) {
        Some(segments) => segments,
        None => unreachable!("seven-segment digit out of range: {digit}"),
    }
}

fn write_digit(buf: &mut [u8], offset: usize, digit: u8, point: bool) {
    buf[offset] = if point { segment::ON } else { segment::OFF };
    buf[offset + 1..offset + 1 + segment::SEGMENTS].copy_from_slice(digit_segments(digit));
}

/// Serialize an output state into an output report
pub fn encode(state: &OutputState) -> [u8; OUTPUT_REPORT_LEN] {
    let mut buf = [0u8; OUTPUT_REPORT_LEN];
    buf[0] = OUTPUT_REPORT_ID;

    let magnitude = (state.display as i16).unsigned_abs().min(DISPLAY_MAX as u16) as u8;
    write_digit(&mut buf, output::ONES_DIGIT, magnitude % 10, state.display < 0);
    write_digit(&mut buf, output::TENS_DIGIT, magnitude / 10, false);

    for (slot, control) in FUNCTION_LED_ORDER.iter().enumerate() {
        buf[output::FUNCTIONS + slot] = state.functions[control.index()].value();
    }

    for (i, color) in state.pads.iter().enumerate() {
        let c = color.quantized();
        let base = output::PADS + i * 3;
        buf[base] = c.b;
        buf[base + 1] = c.r;
        buf[base + 2] = c.g;
    }

    for (slot, level) in state.mutes.iter().rev().enumerate() {
        let base = output::MUTES + slot * 2;
        buf[base] = level.value();
        buf[base + 1] = level.value();
    }

    buf
}
