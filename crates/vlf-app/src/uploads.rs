//! Collect segment photos from the command line and from a directory

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::ImageReader;
use vlf_domain::model::SlotKey;
use vlf_domain::service::Uploads;
use vlf_types::{Error, Result, ValidationError};
use walkdir::WalkDir;

/// Extensions accepted when scanning an uploads directory
const UPLOAD_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Check if a path looks like an upload file
pub fn is_upload_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| UPLOAD_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Decode the header of an uploaded image; errors name the slot
pub fn validate_upload(slot: &str, bytes: &[u8]) -> std::result::Result<(u32, u32), ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidUpload {
        slot: slot.to_string(),
        reason,
    };
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| invalid(e.to_string()))?;
    if reader.format().is_none() {
        return Err(invalid("unrecognized image format".to_string()));
    }
    reader.into_dimensions().map_err(|e| invalid(e.to_string()))
}

/// Read and validate one upload; an empty file counts as "no upload"
fn read_upload(slot: &str, path: &Path) -> Result<Option<Vec<u8>>> {
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound(path.display().to_string())
        } else {
            Error::Io(e)
        }
    })?;

    if bytes.is_empty() {
        tracing::debug!(slot, "Empty upload file {}", path.display());
        return Ok(None);
    }

    let (width, height) = validate_upload(slot, &bytes)?;
    tracing::debug!(slot, width, height, "Upload {}", path.display());
    Ok(Some(bytes))
}

/// Files named `<slotKey>.<png|jpg|jpeg>` directly inside `dir`
pub fn scan_upload_dir(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    if !dir.is_dir() {
        return Err(Error::FileNotFound(dir.display().to_string()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || !is_upload_file(path) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            files.push((stem.to_string(), path.to_path_buf()));
        }
    }

    files.sort();
    Ok(files)
}

/// Merge directory uploads and explicit `KEY=PATH` pairs; pairs win
pub fn collect_uploads(pairs: &[(String, PathBuf)], dir: Option<&Path>) -> Result<Uploads> {
    let mut uploads = Uploads::new();

    if let Some(dir) = dir {
        for (slot, path) in scan_upload_dir(dir)? {
            if !SlotKey::is_slot_name(&slot) {
                tracing::debug!(slot = %slot, "Skipping non-slot file {}", path.display());
                continue;
            }
            let bytes = read_upload(&slot, &path)?;
            uploads.insert(slot, bytes);
        }
    }

    for (slot, path) in pairs {
        let bytes = read_upload(slot, path)?;
        if uploads.insert(slot.clone(), bytes).is_some() {
            tracing::debug!(slot = %slot, "Explicit upload replaces directory file");
        }
    }

    Ok(uploads)
}
