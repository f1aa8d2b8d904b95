//! File-based implementation of ReferenceImageRepository

use std::io::ErrorKind;
use std::path::PathBuf;

use vlf_domain::repository::ReferenceImageRepository;
use vlf_types::Error;

/// Reference images (voltage tables) stored as plain files in a directory
pub struct FileReferenceImageRepository {
    dir: PathBuf,
}

impl FileReferenceImageRepository {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl ReferenceImageRepository for FileReferenceImageRepository {
    fn load(&self, file_name: &str) -> Result<Option<Vec<u8>>, Error> {
        let path = self.dir.join(file_name);
        match std::fs::read(&path) {
            Ok(bytes) => {
                tracing::debug!("Loaded reference image {}", path.display());
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }
}
