//! Image placeholders expected by the report templates

use std::collections::BTreeMap;

use vlf_types::PhaseType;

/// Placeholder for the voltage table image
pub const REFERENCE_IMAGE_KEY: &str = "imgTablaTensionPrueba";
/// Placeholder for the site location map
pub const MAP_IMAGE_KEY: &str = "imgMapsProyecto";

pub const SEGMENT_IMAGE_WIDTH_CM: f64 = 14.0;
pub const REFERENCE_IMAGE_WIDTH_CM: f64 = 18.0;
pub const MAP_IMAGE_WIDTH_CM: f64 = 18.0;

/// Ordered phase labels for one segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseSet(&'static [&'static str]);

impl PhaseSet {
    pub fn from_phase_type(phase_type: &PhaseType) -> Self {
        Self(phase_type.phase_labels())
    }

    pub fn labels(&self) -> &'static [&'static str] {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every (segment, phase) key, segment-major
    pub fn slot_keys(&self, segment_count: u32) -> Vec<SlotKey> {
        (1..=segment_count)
            .flat_map(|segment| self.0.iter().map(move |phase| SlotKey::new(segment, phase)))
            .collect()
    }
}

const SLOT_KEY_PREFIX: &str = "imgPruebaTramoTrm";

/// `imgPruebaTramoTrm{segment}{phase}`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotKey(String);

impl SlotKey {
    pub fn new(segment: u32, phase: &str) -> Self {
        Self(format!("{}{}{}", SLOT_KEY_PREFIX, segment, phase))
    }

    /// Whether `name` has the shape of a segment photo key
    pub fn is_slot_name(name: &str) -> bool {
        let Some(rest) = name.strip_prefix(SLOT_KEY_PREFIX) else {
            return false;
        };
        let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
        let phase = &rest[digits..];
        digits > 0 && phase.len() <= 1 && phase.chars().all(|c| c.is_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SlotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Image bytes plus the width they take in the document
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub bytes: Vec<u8>,
    pub width_cm: f64,
}

impl InlineImage {
    pub fn new(bytes: Vec<u8>, width_cm: f64) -> Self {
        Self { bytes, width_cm }
    }
}

/// What a segment placeholder renders as
#[derive(Debug, Clone, PartialEq)]
pub enum SlotBinding {
    Image(InlineImage),
    /// Rendered as an empty string
    Empty,
}

impl SlotBinding {
    pub fn is_image(&self) -> bool {
        matches!(self, SlotBinding::Image(_))
    }
}

/// Output of the slot binder
#[derive(Debug, Clone, Default)]
pub struct SlotBindings {
    pub slots: BTreeMap<SlotKey, SlotBinding>,
    /// Voltage table image, absent for unknown categories or missing files
    pub reference: Option<InlineImage>,
}

impl SlotBindings {
    pub fn image_count(&self) -> usize {
        self.slots.values().filter(|b| b.is_image()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_key_format() {
        assert_eq!(SlotKey::new(1, "A").as_str(), "imgPruebaTramoTrm1A");
        assert_eq!(SlotKey::new(10, "").as_str(), "imgPruebaTramoTrm10");
    }

    #[test]
    fn test_is_slot_name() {
        assert!(SlotKey::is_slot_name("imgPruebaTramoTrm1"));
        assert!(SlotKey::is_slot_name("imgPruebaTramoTrm12B"));
        assert!(!SlotKey::is_slot_name("imgPruebaTramoTrm"));
        assert!(!SlotKey::is_slot_name("imgPruebaTramoTrmA"));
        assert!(!SlotKey::is_slot_name("imgPruebaTramoTrm1AB"));
        assert!(!SlotKey::is_slot_name("thumbs"));
    }

    #[test]
    fn test_three_phase_keys_are_segment_major() {
        let keys: Vec<String> = PhaseSet::from_phase_type(&PhaseType::ThreePhase)
            .slot_keys(2)
            .into_iter()
            .map(|k| k.to_string())
            .collect();
        assert_eq!(
            keys,
            vec![
                "imgPruebaTramoTrm1A",
                "imgPruebaTramoTrm1B",
                "imgPruebaTramoTrm1C",
                "imgPruebaTramoTrm2A",
                "imgPruebaTramoTrm2B",
                "imgPruebaTramoTrm2C",
            ]
        );
    }

    #[test]
    fn test_single_phase_has_one_unlabeled_phase() {
        let set = PhaseSet::from_phase_type(&PhaseType::SinglePhase);
        assert_eq!(set.len(), 1);
        assert_eq!(set.slot_keys(3).len(), 3);
    }
}
