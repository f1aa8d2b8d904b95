//! Error types for the VLF report generator

use thiserror::Error;

/// Problems with the report payload or the uploads that come with it
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Please provide both latitude (latitud) and longitude (longitud)")]
    MissingCoordinates,

    #[error("Coordinates must be valid numbers: {field} = {value:?}")]
    InvalidCoordinate { field: String, value: String },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Segment count (cantidadTramos) must be a positive integer, got {0:?}")]
    InvalidSegmentCount(String),

    #[error("Report payload must be a JSON object")]
    NotAnObject,

    #[error("Invalid JSON payload: {0}")]
    InvalidJson(String),

    #[error("Upload for slot {slot} is not a readable image: {reason}")]
    InvalidUpload { slot: String, reason: String },
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Templates directory does not exist: {0}")]
    TemplatesDirMissing(String),
}

/// Failures while producing the location map
#[derive(Debug, Error)]
pub enum MapError {
    #[error("coordinate ({lat}, {lon}) is outside the Web Mercator range")]
    OutOfRange { lat: f64, lon: f64 },

    #[error("failed to fetch tile {z}/{x}/{y}: {reason}")]
    TileFetch { z: u8, x: u32, y: u32, reason: String },

    #[error("failed to decode tile {z}/{x}/{y}: {reason}")]
    TileDecode { z: u8, x: u32, y: u32, reason: String },

    #[error("invalid map settings: {0}")]
    Settings(String),

    #[error("failed to encode map image: {0}")]
    Encode(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Template not found: {filename}")]
    TemplateNotFound { filename: String },

    #[error("Invalid coordinates for map: {0}")]
    Map(#[from] MapError),

    #[error("Template package error: {0}")]
    Template(String),

    #[error("Render failed: {0}")]
    Render(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
