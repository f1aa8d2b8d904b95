//! Domain model types

pub mod coordinates;
pub mod payload;
pub mod slot;
pub mod template;

pub use coordinates::Coordinates;
pub use payload::{FieldValue, FieldVisitor, ReportPayload, Scalar, Uppercase};
pub use slot::{
    InlineImage, PhaseSet, SlotBinding, SlotBindings, SlotKey, MAP_IMAGE_KEY,
    MAP_IMAGE_WIDTH_CM, REFERENCE_IMAGE_KEY, REFERENCE_IMAGE_WIDTH_CM, SEGMENT_IMAGE_WIDTH_CM,
};
pub use template::{PhaseCode, TemplateKey};
