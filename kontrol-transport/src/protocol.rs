//! Kontrol F1 HID protocol constants
//!
//! Report layout:
//! - Input (device -> host): 22 bytes, no report ID on the wire, byte 0 is the
//!   protocol version.
//! - Output (host -> device): 81 bytes, byte 0 is report ID 0x80.

/// Device identification
pub mod device {
    /// Native Instruments USB vendor ID
    pub const VENDOR_ID: u16 = 0x17CC;
    /// Traktor Kontrol F1 product ID
    pub const PRODUCT_ID: u16 = 0x1120;
    /// Product string reported by the device
    pub const PRODUCT_NAME: &str = "Traktor Kontrol F1";
}

/// Input report length in bytes
pub const INPUT_REPORT_LEN: usize = 22;

/// Output report length in bytes (including report ID)
pub const OUTPUT_REPORT_LEN: usize = 81;

/// Expected protocol version in byte 0 of every input report
pub const INPUT_VERSION: u8 = 0x01;

/// Report ID of the LED/display output report
pub const OUTPUT_REPORT_ID: u8 = 0x80;

/// Highest value a 7-bit LED channel can take
pub const LED_MAX: u8 = 0x7F;

/// Analog readings are 12-bit
pub const ANALOG_MASK: u16 = 0x0FFF;

/// Input report byte offsets
pub mod input {
    pub const VERSION: usize = 0;
    /// Pads A1..A4, B1..B4, MSB first
    pub const PADS_AB: usize = 1;
    /// Pads C1..C4, D1..D4, MSB first
    pub const PADS_CD: usize = 2;
    /// Shift, Reverse, Type, Size, Browse, dial click (MSB first)
    pub const BUTTONS: usize = 3;
    /// Mute 1..4, Sync, Quant, Capture (MSB first)
    pub const MUTES: usize = 4;
    pub const DIAL: usize = 5;
    /// Eight little-endian u16 readings: 4 filter knobs then 4 volume faders
    pub const ANALOG: usize = 6;
}

/// Output report byte offsets
pub mod output {
    /// Ones digit: decimal point byte followed by 7 segment bytes
    pub const ONES_DIGIT: usize = 1;
    /// Tens digit: decimal point byte followed by 7 segment bytes
    pub const TENS_DIGIT: usize = 9;
    /// 8 function LED intensities
    pub const FUNCTIONS: usize = 17;
    /// 16 pads x (blue, red, green)
    pub const PADS: usize = 25;
    /// 4 mute keys x 2 bytes, highest index first
    pub const MUTES: usize = 73;
}

/// Seven-segment display encoding
pub mod segment {
    /// Byte value of a lit segment (or decimal point)
    pub const ON: u8 = 64;
    pub const OFF: u8 = 0;

    /// Segments per digit, wire order G, C, B, A, F, E, D
    pub const SEGMENTS: usize = 7;

    const X: u8 = ON;
    const O: u8 = OFF;

    /// Digit -> segment bytes in wire order (G, C, B, A, F, E, D)
    pub const DIGITS: [[u8; SEGMENTS]; 10] = [
        [O, X, X, X, X, X, X], // 0
        [O, X, X, O, O, O, O], // 1
        [X, O, X, X, O, X, X], // 2
        [X, X, X, X, O, O, X], // 3
        [X, X, X, O, X, O, O], // 4
        [X, X, O, X, X, O, X], // 5
        [X, X, O, X, X, X, X], // 6
        [O, X, X, X, O, O, O], // 7
        [X, X, X, X, X, X, X], // 8
        [X, X, X, X, X, O, O], // 9
    ];
}
