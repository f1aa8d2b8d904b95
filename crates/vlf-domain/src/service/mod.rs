//! Domain services

pub mod normalizer;
pub mod slot_binder;
pub mod template_selector;

pub use normalizer::{normalize, NormalizeOptions, NormalizedReport};
pub use slot_binder::{bind_all, bind_reference, bind_slots, expected_slots, Uploads};
pub use template_selector::{locate_template, select_template};
