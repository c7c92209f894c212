//! Control identities and their classification
//!
//! Every physical control on the F1 has exactly one [`ControlId`]. The class a
//! control belongs to is looked up through an explicit table ([`ControlId::class`])
//! rather than inferred from the variant order, so reordering the enum never
//! changes which controls are pads, mutes, etc.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Control class (what kind of physical element a control is)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ControlClass {
    /// RGB pad in the 4x4 grid
    Pad,
    /// Relative filter knob (reported as an absolute 12-bit reading)
    Knob,
    /// Absolute volume fader
    Fader,
    /// Mute ("stop") key below the faders
    Mute,
    /// Small function key with a single-color LED
    Function,
    /// Relative rotary encoder with push click
    Dial,
}

impl ControlClass {
    /// All classes
    pub const ALL: [ControlClass; 6] = [
        ControlClass::Pad,
        ControlClass::Knob,
        ControlClass::Fader,
        ControlClass::Mute,
        ControlClass::Function,
        ControlClass::Dial,
    ];

    /// Controls of this class, in wire order
    pub fn controls(self) -> &'static [ControlId] {
        match self {
            ControlClass::Pad => &ControlId::PADS,
            ControlClass::Knob => &ControlId::KNOBS,
            ControlClass::Fader => &ControlId::FADERS,
            ControlClass::Mute => &ControlId::MUTES,
            ControlClass::Function => &ControlId::FUNCTIONS,
            ControlClass::Dial => &[ControlId::Dial],
        }
    }

    /// Whether controls of this class report a pressed/released state
    pub fn is_digital(self) -> bool {
        matches!(
            self,
            ControlClass::Pad | ControlClass::Mute | ControlClass::Function | ControlClass::Dial
        )
    }

    /// Whether controls of this class report a 12-bit analog reading
    pub fn is_analog(self) -> bool {
        matches!(self, ControlClass::Knob | ControlClass::Fader)
    }

    /// Whether controls of this class have a light the host can drive
    pub fn has_led(self) -> bool {
        matches!(
            self,
            ControlClass::Pad | ControlClass::Mute | ControlClass::Function
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            ControlClass::Pad => "pad",
            ControlClass::Knob => "knob",
            ControlClass::Fader => "fader",
            ControlClass::Mute => "mute",
            ControlClass::Function => "function",
            ControlClass::Dial => "dial",
        }
    }
}

impl fmt::Display for ControlClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of one physical control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ControlId {
    // Filter knobs (top row)
    Filter1,
    Filter2,
    Filter3,
    Filter4,

    // Volume faders
    Volume1,
    Volume2,
    Volume3,
    Volume4,

    // Pads, row-major (A = top row)
    PadA1,
    PadA2,
    PadA3,
    PadA4,
    PadB1,
    PadB2,
    PadB3,
    PadB4,
    PadC1,
    PadC2,
    PadC3,
    PadC4,
    PadD1,
    PadD2,
    PadD3,
    PadD4,

    // Mute keys below the faders
    Mute1,
    Mute2,
    Mute3,
    Mute4,

    Dial,

    // Function keys
    Shift,
    Reverse,
    Type,
    Size,
    Browse,
    Sync,
    Quant,
    Capture,
}

impl ControlId {
    /// Total number of controls
    pub const COUNT: usize = 37;

    pub const PADS: [ControlId; 16] = [
        ControlId::PadA1,
        ControlId::PadA2,
        ControlId::PadA3,
        ControlId::PadA4,
        ControlId::PadB1,
        ControlId::PadB2,
        ControlId::PadB3,
        ControlId::PadB4,
        ControlId::PadC1,
        ControlId::PadC2,
        ControlId::PadC3,
        ControlId::PadC4,
        ControlId::PadD1,
        ControlId::PadD2,
        ControlId::PadD3,
        ControlId::PadD4,
    ];

    pub const KNOBS: [ControlId; 4] = [
        ControlId::Filter1,
        ControlId::Filter2,
        ControlId::Filter3,
        ControlId::Filter4,
    ];

    pub const FADERS: [ControlId; 4] = [
        ControlId::Volume1,
        ControlId::Volume2,
        ControlId::Volume3,
        ControlId::Volume4,
    ];

    pub const MUTES: [ControlId; 4] = [
        ControlId::Mute1,
        ControlId::Mute2,
        ControlId::Mute3,
        ControlId::Mute4,
    ];

    pub const FUNCTIONS: [ControlId; 8] = [
        ControlId::Shift,
        ControlId::Reverse,
        ControlId::Type,
        ControlId::Size,
        ControlId::Browse,
        ControlId::Sync,
        ControlId::Quant,
        ControlId::Capture,
    ];

    /// Every control, grouped by class
    pub fn all() -> impl Iterator<Item = ControlId> {
        ControlClass::ALL
            .into_iter()
            .flat_map(|class| class.controls().iter().copied())
    }

    /// Class lookup table
    pub fn class(self) -> ControlClass {
        use ControlId::*;
        match self {
            PadA1 | PadA2 | PadA3 | PadA4 | PadB1 | PadB2 | PadB3 | PadB4 | PadC1 | PadC2
            | PadC3 | PadC4 | PadD1 | PadD2 | PadD3 | PadD4 => ControlClass::Pad,
            Filter1 | Filter2 | Filter3 | Filter4 => ControlClass::Knob,
            Volume1 | Volume2 | Volume3 | Volume4 => ControlClass::Fader,
            Mute1 | Mute2 | Mute3 | Mute4 => ControlClass::Mute,
            Shift | Reverse | Type | Size | Browse | Sync | Quant | Capture => {
                ControlClass::Function
            }
            Dial => ControlClass::Dial,
        }
    }

    /// Position of this control within its class table
    pub fn index(self) -> usize {
        use ControlId::*;
        match self {
            PadA1 | Filter1 | Volume1 | Mute1 | Shift | Dial => 0,
            PadA2 | Filter2 | Volume2 | Mute2 | Reverse => 1,
            PadA3 | Filter3 | Volume3 | Mute3 | Type => 2,
            PadA4 | Filter4 | Volume4 | Mute4 | Size => 3,
            PadB1 | Browse => 4,
            PadB2 | Sync => 5,
            PadB3 | Quant => 6,
            PadB4 | Capture => 7,
            PadC1 => 8,
            PadC2 => 9,
            PadC3 => 10,
            PadC4 => 11,
            PadD1 => 12,
            PadD2 => 13,
            PadD3 => 14,
            PadD4 => 15,
        }
    }

    pub fn is_pad(self) -> bool {
        self.class() == ControlClass::Pad
    }

    pub fn is_knob(self) -> bool {
        self.class() == ControlClass::Knob
    }

    pub fn is_fader(self) -> bool {
        self.class() == ControlClass::Fader
    }

    pub fn is_mute(self) -> bool {
        self.class() == ControlClass::Mute
    }

    pub fn is_function(self) -> bool {
        self.class() == ControlClass::Function
    }

    /// Pad at `row`/`col` of the 4x4 grid (0-based, row 0 at the top)
    pub fn pad_at(row: usize, col: usize) -> Option<ControlId> {
        if row < 4 && col < 4 {
            Some(Self::PADS[row * 4 + col])
        } else {
            None
        }
    }

    /// Look up a control by its display name (case-insensitive)
    pub fn from_name(name: &str) -> Option<ControlId> {
        Self::all().find(|c| c.name().eq_ignore_ascii_case(name))
    }

    pub fn name(self) -> &'static str {
        use ControlId::*;
        match self {
            Filter1 => "Filter1",
            Filter2 => "Filter2",
            Filter3 => "Filter3",
            Filter4 => "Filter4",
            Volume1 => "Volume1",
            Volume2 => "Volume2",
            Volume3 => "Volume3",
            Volume4 => "Volume4",
            PadA1 => "PadA1",
            PadA2 => "PadA2",
            PadA3 => "PadA3",
            PadA4 => "PadA4",
            PadB1 => "PadB1",
            PadB2 => "PadB2",
            PadB3 => "PadB3",
            PadB4 => "PadB4",
            PadC1 => "PadC1",
            PadC2 => "PadC2",
            PadC3 => "PadC3",
            PadC4 => "PadC4",
            PadD1 => "PadD1",
            PadD2 => "PadD2",
            PadD3 => "PadD3",
            PadD4 => "PadD4",
            Mute1 => "Mute1",
            Mute2 => "Mute2",
            Mute3 => "Mute3",
            Mute4 => "Mute4",
            Dial => "Dial",
            Shift => "Shift",
            Reverse => "Reverse",
            Type => "Type",
            Size => "Size",
            Browse => "Browse",
            Sync => "Sync",
            Quant => "Quant",
            Capture => "Capture",
        }
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
