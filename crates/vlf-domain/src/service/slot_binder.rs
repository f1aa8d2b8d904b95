//! Binds uploaded photos and the voltage table image to template placeholders

use std::collections::{BTreeMap, HashMap};

use vlf_types::{PhaseType, Result, TestVoltage};

use crate::model::{
    InlineImage, PhaseSet, SlotBinding, SlotBindings, SlotKey, REFERENCE_IMAGE_WIDTH_CM,
    SEGMENT_IMAGE_WIDTH_CM,
};
use crate::repository::ReferenceImageRepository;

/// Uploaded image bytes keyed by slot key; `None` marks an empty upload field
pub type Uploads = HashMap<String, Option<Vec<u8>>>;

/// Slot keys the template for this structure expects
pub fn expected_slots(phase_type: &PhaseType, segment_count: u32) -> Vec<SlotKey> {
    PhaseSet::from_phase_type(phase_type).slot_keys(segment_count)
}

/// One binding per expected slot: the upload when present, empty otherwise.
///
/// Uploads for keys outside the expected set are dropped.
pub fn bind_slots(
    phase_type: &PhaseType,
    segment_count: u32,
    mut uploads: Uploads,
) -> BTreeMap<SlotKey, SlotBinding> {
    let mut bindings = BTreeMap::new();

    for key in expected_slots(phase_type, segment_count) {
        let binding = match uploads.remove(key.as_str()).flatten() {
            Some(bytes) if !bytes.is_empty() => {
                SlotBinding::Image(InlineImage::new(bytes, SEGMENT_IMAGE_WIDTH_CM))
            }
            _ => SlotBinding::Empty,
        };
        tracing::debug!(slot = %key, image = binding.is_image(), "Bound slot");
        bindings.insert(key, binding);
    }

    for key in uploads.keys() {
        tracing::debug!(slot = %key, "Ignoring upload for slot the template does not use");
    }

    bindings
}

/// Voltage table image for the category, skipped when unknown or missing
pub fn bind_reference<R: ReferenceImageRepository + ?Sized>(
    voltage: &TestVoltage,
    images: &R,
) -> Result<Option<InlineImage>> {
    let Some(file_name) = voltage.reference_image_name() else {
        tracing::debug!(?voltage, "No reference image for test voltage category");
        return Ok(None);
    };

    match images.load(file_name)? {
        Some(bytes) => Ok(Some(InlineImage::new(bytes, REFERENCE_IMAGE_WIDTH_CM))),
        None => {
            tracing::warn!("Reference image {} not found; omitting voltage table", file_name);
            Ok(None)
        }
    }
}

/// Segment slots plus the reference image
pub fn bind_all<R: ReferenceImageRepository + ?Sized>(
    phase_type: &PhaseType,
    segment_count: u32,
    voltage: &TestVoltage,
    uploads: Uploads,
    images: &R,
) -> Result<SlotBindings> {
    Ok(SlotBindings {
        slots: bind_slots(phase_type, segment_count, uploads),
        reference: bind_reference(voltage, images)?,
    })
}
