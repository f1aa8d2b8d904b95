//! Shared enums for VLF reports

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Phase configuration of the tested circuit (`tipoTramos`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseType {
    /// Trifásicos - phases A, B and C
    ThreePhase,
    /// Bifásicos - phases A and B
    TwoPhase,
    /// Monofásicos - one unlabeled phase
    SinglePhase,
    /// Anything else the form sent
    Other(String),
}

impl PhaseType {
    /// Parse the payload value; unknown values are kept verbatim
    pub fn parse(value: &str) -> Self {
        match value {
            "Trifásicos" => PhaseType::ThreePhase,
            "Bifásicos" => PhaseType::TwoPhase,
            "Monofásicos" => PhaseType::SinglePhase,
            other => PhaseType::Other(other.to_string()),
        }
    }

    /// Label as written in the report payload
    pub fn label(&self) -> &str {
        match self {
            PhaseType::ThreePhase => "Trifásicos",
            PhaseType::TwoPhase => "Bifásicos",
            PhaseType::SinglePhase => "Monofásicos",
            PhaseType::Other(s) => s,
        }
    }

    /// Phase labels tested per segment
    pub fn phase_labels(&self) -> &'static [&'static str] {
        match self {
            PhaseType::ThreePhase => &["A", "B", "C"],
            PhaseType::TwoPhase => &["A", "B"],
            PhaseType::SinglePhase | PhaseType::Other(_) => &[""],
        }
    }
}

impl std::fmt::Display for PhaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Test voltage category (`tensionPrueba`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestVoltage {
    /// Aceptación - acceptance test
    Acceptance,
    /// Mantenimiento - maintenance test
    Maintenance,
    Other(String),
}

impl TestVoltage {
    pub fn parse(value: &str) -> Self {
        match value {
            "Aceptación" => TestVoltage::Acceptance,
            "Mantenimiento" => TestVoltage::Maintenance,
            other => TestVoltage::Other(other.to_string()),
        }
    }

    /// Numeric value written to `valTensionPrueba`
    pub fn test_value(&self) -> Option<u32> {
        match self {
            TestVoltage::Acceptance => Some(21),
            TestVoltage::Maintenance => Some(16),
            TestVoltage::Other(_) => None,
        }
    }

    /// File name of the voltage table image under the images directory
    pub fn reference_image_name(&self) -> Option<&'static str> {
        match self {
            TestVoltage::Acceptance => Some("imgAceptacion.png"),
            TestVoltage::Maintenance => Some("imgMantenimiento.png"),
            TestVoltage::Other(_) => None,
        }
    }
}

/// Site environment chosen by the user; decides how the map is drawn
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
pub enum Environment {
    /// Street map with a marker
    #[default]
    #[value(name = "urbano")]
    Urbano,
    /// Satellite imagery around a metric bounding box
    #[value(name = "rural")]
    Rural,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Urbano => write!(f, "Urbano"),
            Environment::Rural => write!(f, "Rural"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_labels() {
        assert_eq!(PhaseType::parse("Trifásicos").phase_labels(), &["A", "B", "C"]);
        assert_eq!(PhaseType::parse("Bifásicos").phase_labels(), &["A", "B"]);
        assert_eq!(PhaseType::parse("Monofásicos").phase_labels(), &[""]);
        assert_eq!(PhaseType::parse("Hexafásicos").phase_labels(), &[""]);
    }

    #[test]
    fn test_unknown_phase_type_keeps_label() {
        let phase = PhaseType::parse("Otro");
        assert_eq!(phase, PhaseType::Other("Otro".to_string()));
        assert_eq!(phase.label(), "Otro");
    }

    #[test]
    fn test_voltage_values() {
        assert_eq!(TestVoltage::parse("Aceptación").test_value(), Some(21));
        assert_eq!(TestVoltage::parse("Mantenimiento").test_value(), Some(16));
        assert_eq!(TestVoltage::parse("Otra").test_value(), None);
        assert_eq!(TestVoltage::parse("Otra").reference_image_name(), None);
    }
}
