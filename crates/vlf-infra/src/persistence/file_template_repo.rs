//! File-based implementation of TemplateRepository

use std::collections::BTreeMap;
use std::path::PathBuf;

use vlf_domain::model::TemplateKey;
use vlf_domain::repository::TemplateRepository;
use vlf_types::{ConfigError, Error};
use walkdir::WalkDir;

/// Templates found in a flat directory, indexed by their file names
pub struct FileTemplateRepository {
    dir: PathBuf,
    templates: BTreeMap<TemplateKey, PathBuf>,
}

impl FileTemplateRepository {
    /// Scan `dir` for `templateVLF{code}{count}TR.docx` files
    pub fn open(dir: PathBuf) -> Result<Self, Error> {
        if !dir.is_dir() {
            return Err(ConfigError::TemplatesDirMissing(dir.display().to_string()).into());
        }

        let mut templates = BTreeMap::new();
        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            if let Some(key) = TemplateKey::parse_file_name(name) {
                templates.insert(key, entry.path().to_path_buf());
            }
        }

        tracing::debug!("Found {} templates in {}", templates.len(), dir.display());
        Ok(Self { dir, templates })
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateRepository for FileTemplateRepository {
    fn resolve(&self, key: &TemplateKey) -> Result<PathBuf, Error> {
        match self.templates.get(key) {
            // removed after the scan
            Some(path) if path.is_file() => Ok(path.clone()),
            _ => Err(Error::TemplateNotFound {
                filename: key.file_name(),
            }),
        }
    }

    fn available(&self) -> Vec<TemplateKey> {
        self.templates.keys().cloned().collect()
    }
}
