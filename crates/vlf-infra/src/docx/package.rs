//! OPC container (zip) holding the parts of a .docx file

use std::io::{Cursor, Read, Write};
use std::path::Path;

use vlf_types::{Error, Result};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// In-memory copy of every part, in archive order
#[derive(Debug, Clone, Default)]
pub struct DocxPackage {
    parts: Vec<(String, Vec<u8>)>,
}

impl DocxPackage {
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.display().to_string())
            } else {
                Error::Io(e)
            }
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| Error::Template(format!("invalid docx archive: {}", e)))?;

        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| Error::Template(format!("failed to read archive entry: {}", e)))?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut content = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut content)?;
            parts.push((name, content));
        }

        let package = Self { parts };
        if package.get("word/document.xml").is_none() {
            return Err(Error::Template(
                "archive has no word/document.xml part".to_string(),
            ));
        }
        Ok(package)
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, content)| content.as_slice())
    }

    /// Part decoded as UTF-8 XML
    pub fn get_xml(&self, name: &str) -> Result<Option<String>> {
        match self.get(name) {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|e| Error::Template(format!("{} is not UTF-8: {}", name, e))),
            None => Ok(None),
        }
    }

    /// Replace a part, or append it when new
    pub fn set(&mut self, name: &str, content: Vec<u8>) {
        match self.parts.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = content,
            None => self.parts.push((name.to_string(), content)),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(n, _)| n.as_str())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, content) in &self.parts {
            zip.start_file(name.as_str(), options)
                .map_err(|e| Error::Template(format!("failed to write {}: {}", name, e)))?;
            zip.write_all(content)?;
        }

        let cursor = zip
            .finish()
            .map_err(|e| Error::Template(format!("failed to finish archive: {}", e)))?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> Vec<u8> {
        let mut package = DocxPackage::default();
        package.set("[Content_Types].xml", b"<Types/>".to_vec());
        package.set("word/document.xml", b"<w:document/>".to_vec());
        package.to_bytes().unwrap()
    }

    #[test]
    fn test_reopen_keeps_parts_in_order() {
        let package = DocxPackage::from_bytes(&minimal()).unwrap();
        let names: Vec<&str> = package.names().collect();
        assert_eq!(names, vec!["[Content_Types].xml", "word/document.xml"]);
        assert_eq!(package.get_xml("word/document.xml").unwrap().unwrap(), "<w:document/>");
    }

    #[test]
    fn test_set_replaces_existing() {
        let mut package = DocxPackage::from_bytes(&minimal()).unwrap();
        package.set("word/document.xml", b"<w:document>x</w:document>".to_vec());
        package.set("word/media/a.png", vec![1, 2]);
        assert_eq!(package.names().count(), 3);
        assert_eq!(package.get("word/media/a.png"), Some(&[1u8, 2][..]));
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(
            DocxPackage::from_bytes(b"plain text"),
            Err(Error::Template(_))
        ));
    }

    #[test]
    fn test_missing_main_part() {
        let mut package = DocxPackage::default();
        package.set("[Content_Types].xml", b"<Types/>".to_vec());
        let bytes = package.to_bytes().unwrap();
        assert!(DocxPackage::from_bytes(&bytes).is_err());
    }
}
