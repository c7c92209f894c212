//! Handler slots and callback types

use std::sync::Arc;

use kontrol_transport::{ControlClass, ControlId, Event};

use crate::layout::Layout;

/// Callback for Pressed / Hold / Released; `first` is false only on repeated
/// Hold calls during one press
pub type HoldHandler = Arc<dyn Fn(&Layout, ControlId, bool) + Send + Sync>;

/// Callback for Changed / Increment / Decrement events
pub type ValueHandler = Arc<dyn Fn(&Layout, Event) + Send + Sync>;

/// Button groups that have their own handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerClass {
    Functions,
    Pad,
    Mute,
    Dial,
}

impl HandlerClass {
    /// Handler group of a control; knobs and faders have none
    pub fn of(control: ControlId) -> Option<Self> {
        match control.class() {
            ControlClass::Function => Some(HandlerClass::Functions),
            ControlClass::Pad => Some(HandlerClass::Pad),
            ControlClass::Mute => Some(HandlerClass::Mute),
            ControlClass::Dial => Some(HandlerClass::Dial),
            ControlClass::Knob | ControlClass::Fader => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Pressed,
    Hold,
    Released,
}

/// One of the twelve handler slots (class x phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerSlot {
    FunctionsPressed,
    FunctionsHold,
    FunctionsReleased,
    PadPressed,
    PadHold,
    PadReleased,
    MutePressed,
    MuteHold,
    MuteReleased,
    DialPressed,
    DialHold,
    DialReleased,
}

impl HandlerSlot {
    pub const ALL: [HandlerSlot; 12] = [
        HandlerSlot::FunctionsPressed,
        HandlerSlot::FunctionsHold,
        HandlerSlot::FunctionsReleased,
        HandlerSlot::PadPressed,
        HandlerSlot::PadHold,
        HandlerSlot::PadReleased,
        HandlerSlot::MutePressed,
        HandlerSlot::MuteHold,
        HandlerSlot::MuteReleased,
        HandlerSlot::DialPressed,
        HandlerSlot::DialHold,
        HandlerSlot::DialReleased,
    ];

    pub fn new(class: HandlerClass, phase: Phase) -> Self {
        use HandlerClass as C;
        use HandlerSlot as S;
        match (class, phase) {
            (C::Functions, Phase::Pressed) => S::FunctionsPressed,
            (C::Functions, Phase::Hold) => S::FunctionsHold,
            (C::Functions, Phase::Released) => S::FunctionsReleased,
            (C::Pad, Phase::Pressed) => S::PadPressed,
            (C::Pad, Phase::Hold) => S::PadHold,
            (C::Pad, Phase::Released) => S::PadReleased,
            (C::Mute, Phase::Pressed) => S::MutePressed,
            (C::Mute, Phase::Hold) => S::MuteHold,
            (C::Mute, Phase::Released) => S::MuteReleased,
            (C::Dial, Phase::Pressed) => S::DialPressed,
            (C::Dial, Phase::Hold) => S::DialHold,
            (C::Dial, Phase::Released) => S::DialReleased,
        }
    }

    /// Slot for a control's press phase, if the control has handlers
    pub fn for_control(control: ControlId, phase: Phase) -> Option<Self> {
        HandlerClass::of(control).map(|class| Self::new(class, phase))
    }

    pub fn class(self) -> HandlerClass {
        use HandlerSlot::*;
        match self {
            FunctionsPressed | FunctionsHold | FunctionsReleased => HandlerClass::Functions,
            PadPressed | PadHold | PadReleased => HandlerClass::Pad,
            MutePressed | MuteHold | MuteReleased => HandlerClass::Mute,
            DialPressed | DialHold | DialReleased => HandlerClass::Dial,
        }
    }

    pub fn phase(self) -> Phase {
        use HandlerSlot::*;
        match self {
            FunctionsPressed | PadPressed | MutePressed | DialPressed => Phase::Pressed,
            FunctionsHold | PadHold | MuteHold | DialHold => Phase::Hold,
            FunctionsReleased | PadReleased | MuteReleased | DialReleased => Phase::Released,
        }
    }
}

/// Adapt a press-style callback so only the first call of a slot is forwarded
pub(crate) fn first_only<F>(handler: F) -> HoldHandler
where
    F: Fn(&Layout, ControlId) + Send + Sync + 'static,
{
    Arc::new(move |layout, control, first| {
        if first {
            handler(layout, control)
        }
    })
}
