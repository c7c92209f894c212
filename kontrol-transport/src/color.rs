//! Colors, LED intensities and sparse color maps

use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::control::ControlId;
use crate::protocol::LED_MAX;

/// 8-bit RGB color
///
/// The device only resolves 7 bits per channel; [`Rgb::quantized`] performs
/// the reduction at encode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels reduced to the device's 7-bit range
    pub const fn quantized(self) -> Self {
        Self::new(self.r >> 1, self.g >> 1, self.b >> 1)
    }

    /// Brightest channel
    pub fn max_channel(self) -> u8 {
        self.r.max(self.g).max(self.b)
    }

    /// Color wheel position (0..=255) to a fully saturated color
    pub fn wheel(pos: u8) -> Self {
        let pos = 255 - pos;
        match pos {
            0..=84 => Self::new(255 - pos * 3, 0, pos * 3),
            85..=169 => {
                let p = pos - 85;
                Self::new(0, p * 3, 255 - p * 3)
            }
            _ => {
                let p = pos - 170;
                Self::new(p * 3, 255 - p * 3, 0)
            }
        }
    }
}

/// Single-channel LED intensity, clamped to 0..=127 on construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct LedIntensity(u8);

impl LedIntensity {
    pub const OFF: LedIntensity = LedIntensity(0);
    pub const FULL: LedIntensity = LedIntensity(LED_MAX);

    pub fn new(value: u8) -> Self {
        Self(value.min(LED_MAX))
    }

    /// Intensity of the brightest channel, reduced to 7 bits
    pub fn from_rgb(color: Rgb) -> Self {
        Self(color.max_channel() >> 1)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl From<u8> for LedIntensity {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

/// Sparse mapping of controls to colors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorMap {
    colors: BTreeMap<ControlId, Rgb>,
}

impl ColorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map every given control to the same color
    pub fn filled<I>(controls: I, color: Rgb) -> Self
    where
        I: IntoIterator<Item = ControlId>,
    {
        controls.into_iter().map(|c| (c, color)).collect()
    }

    pub fn set(&mut self, control: ControlId, color: Rgb) {
        self.colors.insert(control, color);
    }

    pub fn get(&self, control: ControlId) -> Option<Rgb> {
        self.colors.get(&control).copied()
    }

    pub fn remove(&mut self, control: ControlId) -> Option<Rgb> {
        self.colors.remove(&control)
    }

    pub fn contains(&self, control: ControlId) -> bool {
        self.colors.contains_key(&control)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn clear(&mut self) {
        self.colors.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (ControlId, Rgb)> + '_ {
        self.colors.iter().map(|(c, rgb)| (*c, *rgb))
    }

    pub fn controls(&self) -> impl Iterator<Item = ControlId> + '_ {
        self.colors.keys().copied()
    }

    /// Overwrite entries with those of `other`
    pub fn apply_from(&mut self, other: &ColorMap) {
        for (control, color) in other.iter() {
            self.colors.insert(control, color);
        }
    }

    /// Entries of `self` that are absent from or different in `previous`
    pub fn diff_from(&self, previous: &ColorMap) -> ColorMap {
        self.iter()
            .filter(|(control, color)| previous.get(*control) != Some(*color))
            .collect()
    }

    /// Entries whose control is in `allowed`
    pub fn restricted_to(&self, allowed: &BTreeSet<ControlId>) -> ColorMap {
        self.iter()
            .filter(|(control, _)| allowed.contains(control))
            .collect()
    }
}

impl FromIterator<(ControlId, Rgb)> for ColorMap {
    fn from_iter<T: IntoIterator<Item = (ControlId, Rgb)>>(iter: T) -> Self {
        Self {
            colors: iter.into_iter().collect(),
        }
    }
}

impl Extend<(ControlId, Rgb)> for ColorMap {
    fn extend<T: IntoIterator<Item = (ControlId, Rgb)>>(&mut self, iter: T) {
        self.colors.extend(iter);
    }
}

impl IntoIterator for ColorMap {
    type Item = (ControlId, Rgb);
    type IntoIter = btree_map::IntoIter<ControlId, Rgb>;

    fn into_iter(self) -> Self::IntoIter {
        self.colors.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_drops_low_bit() {
        assert_eq!(Rgb::new(255, 128, 1).quantized(), Rgb::new(127, 64, 0));
    }

    #[test]
    fn test_intensity_clamps() {
        assert_eq!(LedIntensity::new(200).value(), 127);
        assert_eq!(LedIntensity::new(42).value(), 42);
        assert_eq!(LedIntensity::from_rgb(Rgb::new(10, 255, 30)).value(), 127);
        assert_eq!(LedIntensity::from_rgb(Rgb::BLACK), LedIntensity::OFF);
    }

    #[test]
    fn test_diff_treats_missing_as_changed() {
        let mut prev = ColorMap::new();
        prev.set(ControlId::PadA1, Rgb::RED);
        prev.set(ControlId::PadA2, Rgb::GREEN);

        let mut next = prev.clone();
        next.set(ControlId::PadA2, Rgb::BLUE);
        next.set(ControlId::PadA3, Rgb::WHITE);

        let diff = next.diff_from(&prev);
        assert_eq!(diff.len(), 2);
        assert_eq!(diff.get(ControlId::PadA2), Some(Rgb::BLUE));
        assert_eq!(diff.get(ControlId::PadA3), Some(Rgb::WHITE));
        assert!(!diff.contains(ControlId::PadA1));

        assert!(prev.diff_from(&prev).is_empty());
    }

    #[test]
    fn test_apply_and_restrict() {
        let mut base = ColorMap::filled(ControlId::PADS, Rgb::BLACK);
        let mut overlay = ColorMap::new();
        overlay.set(ControlId::PadD4, Rgb::RED);
        overlay.set(ControlId::Mute1, Rgb::WHITE);
        base.apply_from(&overlay);

        assert_eq!(base.len(), 17);
        assert_eq!(base.get(ControlId::PadD4), Some(Rgb::RED));

        let allowed: BTreeSet<_> = ControlId::MUTES.into_iter().collect();
        let only_mutes = base.restricted_to(&allowed);
        assert_eq!(only_mutes.len(), 1);
        assert_eq!(only_mutes.get(ControlId::Mute1), Some(Rgb::WHITE));
    }

    #[test]
    fn test_wheel_endpoints_are_saturated() {
        for pos in [0u8, 64, 128, 200, 255] {
            assert!(Rgb::wheel(pos).max_channel() >= 128, "pos {pos}");
        }
    }
}
