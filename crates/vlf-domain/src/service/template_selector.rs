//! Template selection from the circuit structure

use std::path::PathBuf;

use vlf_types::{PhaseType, Result};

use crate::model::{PhaseCode, TemplateKey};
use crate::repository::TemplateRepository;

/// Template key for a phase configuration and segment count
pub fn select_template(phase_type: &PhaseType, segment_count: u32) -> TemplateKey {
    TemplateKey::new(PhaseCode::from_phase_type(phase_type), segment_count)
}

/// Select and resolve in one step
pub fn locate_template<R: TemplateRepository + ?Sized>(
    repo: &R,
    phase_type: &PhaseType,
    segment_count: u32,
) -> Result<PathBuf> {
    let key = select_template(phase_type, segment_count);
    tracing::debug!(template = %key.file_name(), "Selected template");
    repo.resolve(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use vlf_types::Error;

    struct FixedTemplates(BTreeSet<TemplateKey>);

    impl TemplateRepository for FixedTemplates {
        fn resolve(&self, key: &TemplateKey) -> Result<PathBuf> {
            if self.0.contains(key) {
                Ok(PathBuf::from("templates").join(key.file_name()))
            } else {
                Err(Error::TemplateNotFound {
                    filename: key.file_name(),
                })
            }
        }

        fn available(&self) -> Vec<TemplateKey> {
            self.0.iter().copied().collect()
        }
    }

    #[test]
    fn test_naming_rule_for_all_phase_types() {
        for n in 1..=10 {
            assert_eq!(
                select_template(&PhaseType::ThreePhase, n).file_name(),
                format!("templateVLF3FS{}TR.docx", n)
            );
            assert_eq!(
                select_template(&PhaseType::TwoPhase, n).file_name(),
                format!("templateVLF1FS{}TR.docx", n)
            );
            assert_eq!(
                select_template(&PhaseType::SinglePhase, n).file_name(),
                format!("templateVLF1FS{}TR.docx", n)
            );
        }
    }

    #[test]
    fn test_unknown_phase_type_uses_single_family() {
        let key = select_template(&PhaseType::Other("Otro".into()), 2);
        assert_eq!(key.code, PhaseCode::Single);
    }

    #[test]
    fn test_locate_missing_template_names_file() {
        let repo = FixedTemplates([TemplateKey::new(PhaseCode::Single, 2)].into_iter().collect());
        let found = locate_template(&repo, &PhaseType::SinglePhase, 2).unwrap();
        assert!(found.ends_with("templateVLF1FS2TR.docx"));

        match locate_template(&repo, &PhaseType::SinglePhase, 11) {
            Err(Error::TemplateNotFound { filename }) => {
                assert_eq!(filename, "templateVLF1FS11TR.docx")
            }
            other => panic!("expected TemplateNotFound, got {:?}", other),
        }
    }
}
