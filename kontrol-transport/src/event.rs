//! Semantic control events

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::control::{ControlClass, ControlId};

/// What happened to a control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Pressed,
    Released,
    /// Knob or fader moved; value is the rescaled reading
    Changed,
    /// Dial turned clockwise; value is the raw counter
    Increment,
    /// Dial turned counter-clockwise; value is the raw counter
    Decrement,
}

impl EventKind {
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Pressed => "Pressed",
            EventKind::Released => "Released",
            EventKind::Changed => "Changed",
            EventKind::Increment => "Increment",
            EventKind::Decrement => "Decrement",
        }
    }

    /// Pressed or Released
    pub fn is_button(self) -> bool {
        matches!(self, EventKind::Pressed | EventKind::Released)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    pub control: ControlId,
    pub kind: EventKind,
    pub value: i16,
}

impl Event {
    pub fn new(control: ControlId, kind: EventKind, value: i16) -> Self {
        Self {
            control,
            kind,
            value,
        }
    }

    pub fn pressed(control: ControlId) -> Self {
        Self::new(control, EventKind::Pressed, 1)
    }

    pub fn released(control: ControlId) -> Self {
        Self::new(control, EventKind::Released, 0)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Event: {} - {}", self.control, self.kind)?;
        if !self.kind.is_button() {
            write!(f, " - {}", self.value)?;
        }
        Ok(())
    }
}

/// Match events of one kind
pub fn is_kind(kind: EventKind) -> impl Fn(&Event) -> bool + Send + Sync + Clone + 'static {
    move |e| e.kind == kind
}

/// Match events from one control
pub fn is_control(control: ControlId) -> impl Fn(&Event) -> bool + Send + Sync + Clone + 'static {
    move |e| e.control == control
}

/// Match events from any control of a class
pub fn is_class(class: ControlClass) -> impl Fn(&Event) -> bool + Send + Sync + Clone + 'static {
    move |e| e.control.class() == class
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            Event::pressed(ControlId::PadA1).to_string(),
            "Event: PadA1 - Pressed"
        );
        assert_eq!(
            Event::new(ControlId::Volume2, EventKind::Changed, 128).to_string(),
            "Event: Volume2 - Changed - 128"
        );
    }

    #[test]
    fn test_filters() {
        let e = Event::pressed(ControlId::Mute3);
        assert!(is_kind(EventKind::Pressed)(&e));
        assert!(!is_kind(EventKind::Released)(&e));
        assert!(is_control(ControlId::Mute3)(&e));
        assert!(is_class(ControlClass::Mute)(&e));
        assert!(!is_class(ControlClass::Pad)(&e));

        let both = {
            let k = is_kind(EventKind::Pressed);
            let c = is_class(ControlClass::Mute);
            move |e: &Event| k(e) && c(e)
        };
        assert!(both(&e));
        assert!(!both(&Event::released(ControlId::Mute3)));
    }

    #[test]
    fn test_serializes_as_json() {
        let json = serde_json::to_string(&Event::pressed(ControlId::Shift)).unwrap();
        assert_eq!(json, r#"{"control":"Shift","kind":"Pressed","value":1}"#);
    }
}
