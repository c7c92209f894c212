//! Control ownership masks

use std::collections::BTreeSet;

use kontrol_transport::{ControlClass, ControlId};

/// Predefined masks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaskPreset {
    Knobs,
    Pads,
    Functions,
    /// Volume faders
    Faders,
    Mutes,
    All,
}

impl MaskPreset {
    pub fn mask(self) -> Mask {
        match self {
            MaskPreset::Knobs => Mask::from_class(ControlClass::Knob),
            MaskPreset::Pads => Mask::from_class(ControlClass::Pad),
            MaskPreset::Functions => Mask::from_class(ControlClass::Function),
            MaskPreset::Faders => Mask::from_class(ControlClass::Fader),
            MaskPreset::Mutes => Mask::from_class(ControlClass::Mute),
            MaskPreset::All => ControlId::all().collect(),
        }
    }
}

/// Set of controls a layout owns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mask {
    controls: BTreeSet<ControlId>,
}

impl Mask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_class(class: ControlClass) -> Self {
        class.controls().iter().copied().collect()
    }

    pub fn contains(&self, control: ControlId) -> bool {
        self.controls.contains(&control)
    }

    pub fn insert(&mut self, control: ControlId) -> bool {
        self.controls.insert(control)
    }

    pub fn remove(&mut self, control: ControlId) -> bool {
        self.controls.remove(&control)
    }

    /// Union with other masks
    pub fn merge(mut self, other: &Mask) -> Self {
        self.controls.extend(other.controls.iter().copied());
        self
    }

    /// Union with preset masks
    pub fn merge_preset(self, presets: &[MaskPreset]) -> Self {
        presets.iter().fold(self, |m, p| m.merge(&p.mask()))
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ControlId> + '_ {
        self.controls.iter().copied()
    }

    pub fn as_set(&self) -> &BTreeSet<ControlId> {
        &self.controls
    }
}

impl From<MaskPreset> for Mask {
    fn from(preset: MaskPreset) -> Self {
        preset.mask()
    }
}

impl FromIterator<ControlId> for Mask {
    fn from_iter<T: IntoIterator<Item = ControlId>>(iter: T) -> Self {
        Self {
            controls: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(MaskPreset::Pads.mask().len(), 16);
        assert_eq!(MaskPreset::Functions.mask().len(), 8);
        assert_eq!(MaskPreset::Mutes.mask().len(), 4);
        assert_eq!(MaskPreset::All.mask().len(), ControlId::COUNT);
        assert!(MaskPreset::Faders.mask().contains(ControlId::Volume3));
        assert!(!MaskPreset::Knobs.mask().contains(ControlId::Volume3));
    }

    #[test]
    fn test_merge() {
        let m = Mask::from(MaskPreset::Mutes)
            .merge_preset(&[MaskPreset::Functions, MaskPreset::Mutes]);
        assert_eq!(m.len(), 12);
        assert!(m.contains(ControlId::Mute1));
        assert!(m.contains(ControlId::Capture));
        assert!(!m.contains(ControlId::PadA1));

        let single: Mask = [ControlId::Dial].into_iter().collect();
        assert_eq!(m.merge(&single).len(), 13);
    }
}
