//! Field normalization: derived fields, date parts, upper-casing

use chrono::{Datelike, NaiveDate};
use vlf_types::{PhaseType, TestVoltage, ValidationError};

use crate::model::{Coordinates, ReportPayload};

/// Month names used in the report date, indexed by month - 1
pub const MONTHS_ES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    /// Upper-case every text value (formal report convention)
    pub uppercase: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self { uppercase: true }
    }
}

/// Payload after normalization plus the typed fields the pipeline branches on.
///
/// The typed fields are read before upper-casing, so they always reflect the
/// values as the form sent them.
#[derive(Debug, Clone)]
pub struct NormalizedReport {
    pub payload: ReportPayload,
    pub test_voltage: TestVoltage,
    pub phase_type: PhaseType,
    pub segment_count: u32,
    pub coordinates: Coordinates,
}

/// Normalize a payload for the given processing date
pub fn normalize(
    mut payload: ReportPayload,
    options: NormalizeOptions,
    today: NaiveDate,
) -> Result<NormalizedReport, ValidationError> {
    let coordinates = Coordinates::from_payload(&payload)?;
    let segment_count = parse_segment_count(&payload)?;
    let phase_type = PhaseType::parse(&payload.text("tipoTramos").unwrap_or_default());

    let test_voltage = apply_test_voltage(&mut payload);
    apply_date(&mut payload, today);

    if options.uppercase {
        payload = payload.to_uppercase();
    }

    tracing::debug!(
        phase_type = %phase_type,
        segment_count,
        uppercase = options.uppercase,
        "Normalized report payload"
    );

    Ok(NormalizedReport {
        payload,
        test_voltage,
        phase_type,
        segment_count,
        coordinates,
    })
}

/// Set `valTensionPrueba` from `tensionPrueba`; unknown categories leave it unset
pub fn apply_test_voltage(payload: &mut ReportPayload) -> TestVoltage {
    let voltage = TestVoltage::parse(&payload.text("tensionPrueba").unwrap_or_default());
    if let Some(value) = voltage.test_value() {
        payload.insert("valTensionPrueba", value);
    }
    voltage
}

/// Write `dia`, `mes` and `anio`
pub fn apply_date(payload: &mut ReportPayload, date: NaiveDate) {
    payload.insert("dia", date.day());
    payload.insert("mes", month_name(date.month()));
    payload.insert("anio", date.year());
}

/// Spanish month name for a 1-based month number
pub fn month_name(month: u32) -> &'static str {
    let index = month.clamp(1, 12) as usize - 1;
    MONTHS_ES[index]
}

/// `cantidadTramos` as a positive integer (JSON number or numeric string)
pub fn parse_segment_count(payload: &ReportPayload) -> Result<u32, ValidationError> {
    let raw = payload
        .text("cantidadTramos")
        .ok_or_else(|| ValidationError::MissingField("cantidadTramos".to_string()))?;
    let trimmed = raw.trim();
    let count = trimmed.parse::<u32>().ok().or_else(|| {
        // integral floats such as 2.0
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|n| n.fract() == 0.0 && *n >= 0.0 && *n <= f64::from(u32::MAX))
            .map(|n| n as u32)
    });
    match count {
        Some(count) if count > 0 => Ok(count),
        _ => Err(ValidationError::InvalidSegmentCount(raw)),
    }
}
