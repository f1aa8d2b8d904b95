//! Site coordinates

use serde::{Deserialize, Serialize};
use vlf_types::ValidationError;

use super::payload::ReportPayload;

/// Test site location in WGS84 degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Parse a latitude/longitude pair as typed in the form
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, ValidationError> {
        if latitude.trim().is_empty() || longitude.trim().is_empty() {
            return Err(ValidationError::MissingCoordinates);
        }
        Ok(Self {
            latitude: parse_coordinate("latitud", latitude)?,
            longitude: parse_coordinate("longitud", longitude)?,
        })
    }

    /// Read `latitud` / `longitud` from the payload
    pub fn from_payload(payload: &ReportPayload) -> Result<Self, ValidationError> {
        match (payload.text("latitud"), payload.text("longitud")) {
            (Some(lat), Some(lon)) => Self::parse(&lat, &lon),
            _ => Err(ValidationError::MissingCoordinates),
        }
    }

    /// (x, y) order expected by tile and marker math
    pub fn lon_lat(&self) -> (f64, f64) {
        (self.longitude, self.latitude)
    }
}

/// Accepts both `.` and `,` as decimal separator
pub fn parse_coordinate(field: &str, raw: &str) -> Result<f64, ValidationError> {
    let normalized = raw.trim().replace(',', ".");
    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ValidationError::InvalidCoordinate {
            field: field.to_string(),
            value: raw.to_string(),
        })
}
