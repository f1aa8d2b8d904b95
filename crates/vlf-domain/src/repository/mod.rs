//! Repository trait definitions for external resources

use std::path::PathBuf;

use crate::model::TemplateKey;
use vlf_types::{Error, MapError};

/// Report templates on disk
pub trait TemplateRepository {
    /// Path of the template for a key, `TemplateNotFound` when it does not exist
    fn resolve(&self, key: &TemplateKey) -> Result<PathBuf, Error>;

    /// Every supported (code, count) combination, sorted
    fn available(&self) -> Vec<TemplateKey>;
}

/// Fixed images shipped next to the templates
pub trait ReferenceImageRepository {
    /// Raw bytes of an image file, `None` when it does not exist
    fn load(&self, file_name: &str) -> Result<Option<Vec<u8>>, Error>;
}

/// Slippy-map tile provider (XYZ scheme)
pub trait TileSource {
    /// Encoded tile image (PNG or JPEG)
    fn fetch_tile(&self, z: u8, x: u32, y: u32) -> Result<Vec<u8>, MapError>;

    /// Short provider name for logs
    fn name(&self) -> &str;
}
