//! Persistence implementations
//!
//! File-based implementations of the repository traits.

mod file_reference_image_repo;
mod file_template_repo;

pub use file_reference_image_repo::FileReferenceImageRepository;
pub use file_template_repo::FileTemplateRepository;
