//! Template identifiers

use serde::{Deserialize, Serialize};
use vlf_types::PhaseType;

const FILE_PREFIX: &str = "templateVLF";
const FILE_SUFFIX: &str = "TR.docx";

/// Phase family encoded in the template name
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PhaseCode {
    /// `1FS` - single phase family (everything but three-phase)
    Single,
    /// `3FS` - three-phase family
    Three,
}

impl PhaseCode {
    pub fn from_phase_type(phase_type: &PhaseType) -> Self {
        match phase_type {
            PhaseType::ThreePhase => PhaseCode::Three,
            _ => PhaseCode::Single,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseCode::Single => "1FS",
            PhaseCode::Three => "3FS",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "1FS" => Some(PhaseCode::Single),
            "3FS" => Some(PhaseCode::Three),
            _ => None,
        }
    }
}

impl std::fmt::Display for PhaseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured template identifier: (phase code, segment count)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TemplateKey {
    pub code: PhaseCode,
    pub segments: u32,
}

impl TemplateKey {
    pub fn new(code: PhaseCode, segments: u32) -> Self {
        Self { code, segments }
    }

    /// `templateVLF{code}{segments}TR.docx`
    pub fn file_name(&self) -> String {
        format!("{}{}{}{}", FILE_PREFIX, self.code, self.segments, FILE_SUFFIX)
    }

    /// Inverse of [`TemplateKey::file_name`]; `None` for foreign files
    pub fn parse_file_name(name: &str) -> Option<Self> {
        let body = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
        if body.len() <= 3 || !body.is_char_boundary(3) {
            return None;
        }
        let (code, count) = body.split_at(3);
        if !count.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let segments: u32 = count.parse().ok()?;
        if segments == 0 {
            return None;
        }
        Some(Self::new(PhaseCode::parse(code)?, segments))
    }
}

impl std::fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} x {}", self.code, self.segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        assert_eq!(
            TemplateKey::new(PhaseCode::Three, 3).file_name(),
            "templateVLF3FS3TR.docx"
        );
        assert_eq!(
            TemplateKey::new(PhaseCode::Single, 10).file_name(),
            "templateVLF1FS10TR.docx"
        );
    }

    #[test]
    fn test_parse_file_name() {
        assert_eq!(
            TemplateKey::parse_file_name("templateVLF1FS12TR.docx"),
            Some(TemplateKey::new(PhaseCode::Single, 12))
        );
        assert_eq!(TemplateKey::parse_file_name("templateVLF2FS1TR.docx"), None);
        assert_eq!(TemplateKey::parse_file_name("templateVLF3FSTR.docx"), None);
        assert_eq!(TemplateKey::parse_file_name("templateVLF3FS0TR.docx"), None);
        assert_eq!(TemplateKey::parse_file_name("templateVLF3FS+1TR.docx"), None);
        assert_eq!(TemplateKey::parse_file_name("notes.docx"), None);
    }
}
