//! Snapshot diffing: turns two consecutive input snapshots into events

use crate::control::ControlId;
use crate::event::{Event, EventKind};
use crate::input::InputSnapshot;

/// Full-scale divisor of the analog rescale
pub const ANALOG_DIVISOR: u32 = 4090;

/// Rescale a raw 12-bit reading to roughly 0..=256
pub fn rescale_analog(raw: u16) -> i16 {
    (raw as u32 * 256 / ANALOG_DIVISOR) as i16
}

/// Direction of a dial step from `prev` to `cur`
///
/// The counter wraps, so 255 -> 0 is a single clockwise step and 0 -> 255 a
/// single counter-clockwise one.
pub fn dial_direction(prev: u8, cur: u8) -> Option<EventKind> {
    let (prev, cur) = match (prev, cur) {
        (255, 0) => (0u8, 1u8),
        (0, 255) => (1, 0),
        pair => pair,
    };
    match cur.cmp(&prev) {
        std::cmp::Ordering::Greater => Some(EventKind::Increment),
        std::cmp::Ordering::Less => Some(EventKind::Decrement),
        std::cmp::Ordering::Equal => None,
    }
}

/// Events describing the transition `prev` -> `cur`
///
/// Order: dial rotation, digital controls (pads, mutes, function keys, dial
/// click), then knobs and faders.
pub fn diff(prev: &InputSnapshot, cur: &InputSnapshot) -> Vec<Event> {
    let mut events = Vec::new();

    if let Some(kind) = dial_direction(prev.dial, cur.dial) {
        events.push(Event::new(ControlId::Dial, kind, cur.dial as i16));
    }

    for ((control, was), (_, is)) in prev.digital().zip(cur.digital()) {
        match (was, is) {
            (false, true) => events.push(Event::pressed(control)),
            (true, false) => events.push(Event::released(control)),
            _ => {}
        }
    }

    for control in ControlId::FADERS.into_iter().chain(ControlId::KNOBS) {
        let (Some(was), Some(is)) = (prev.analog(control), cur.analog(control)) else {
            continue;
        };
        if was != is {
            events.push(Event::new(control, EventKind::Changed, rescale_analog(is)));
        }
    }

    events
}
