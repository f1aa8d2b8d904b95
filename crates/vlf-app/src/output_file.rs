//! Output naming and writing of generated documents

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use vlf_domain::model::ReportPayload;
use vlf_types::Result;

/// MIME type of the generated document
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const NAME_PREFIX: &str = "reporte_vlf";

/// Keep letters, digits, `-` and `_`; everything else becomes `_`
pub fn sanitize_file_component(value: &str) -> String {
    let mapped: String = value
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    mapped.trim_matches('_').to_string()
}

/// `reporte_vlf_<value>.docx` when the configured field is present and
/// non-blank, the generic name otherwise
pub fn output_file_name(payload: &ReportPayload, field: Option<&str>, generic: &str) -> String {
    let specific = field
        .and_then(|key| payload.text(key))
        .map(|value| sanitize_file_component(&value))
        .filter(|value| !value.is_empty());

    match specific {
        Some(value) => format!("{}_{}.docx", NAME_PREFIX, value),
        None => generic.to_string(),
    }
}

/// Write through a temp file in the destination directory, renamed into
/// place once complete
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    tracing::info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn payload() -> ReportPayload {
        ReportPayload::from_value(json!({
            "codigoProyecto": "OT 2024/15",
            "vacio": "   ",
        }))
        .unwrap()
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_file_component("OT 2024/15"), "OT_2024_15");
        assert_eq!(sanitize_file_component("  ../x  "), "x");
        assert_eq!(sanitize_file_component("Subestación-Norte"), "Subestación-Norte");
    }

    #[test]
    fn test_output_file_name() {
        let p = payload();
        assert_eq!(
            output_file_name(&p, Some("codigoProyecto"), "reporte_vlf.docx"),
            "reporte_vlf_OT_2024_15.docx"
        );
        assert_eq!(output_file_name(&p, None, "reporte_vlf.docx"), "reporte_vlf.docx");
        assert_eq!(output_file_name(&p, Some("vacio"), "reporte_vlf.docx"), "reporte_vlf.docx");
        assert_eq!(output_file_name(&p, Some("falta"), "reporte_vlf.docx"), "reporte_vlf.docx");
    }

    #[test]
    fn test_write_atomic_replaces() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("reporte_vlf.docx");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");

        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
