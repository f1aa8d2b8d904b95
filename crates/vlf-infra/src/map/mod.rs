//! Site location map rendering
//!
//! Two pipelines share the tile stitching code:
//! - urban: street tiles at a fixed zoom with a marker in the middle of a
//!   fixed pixel canvas
//! - rural: aerial imagery clipped to a square of real-world metres around
//!   the site, scaled into a fixed figure

pub mod marker;
pub mod projection;
pub mod rural;
pub mod stitch;
pub mod urban;

use std::io::Cursor;

use image::RgbaImage;
use vlf_domain::model::Coordinates;
use vlf_domain::repository::TileSource;
use vlf_types::{Environment, MapError};

pub use rural::RuralSettings;
pub use urban::UrbanSettings;

/// Highest zoom level the tile servers in use publish
pub const MAX_ZOOM: u8 = 19;

#[derive(Debug, Clone, Default)]
pub struct MapSettings {
    pub urban: UrbanSettings,
    pub rural: RuralSettings,
}

impl MapSettings {
    pub fn validate(&self) -> Result<(), MapError> {
        self.urban.validate()?;
        self.rural.validate()
    }
}

/// Renders the map PNG for a site, picking the pipeline by environment
pub struct MapRenderer {
    street: Box<dyn TileSource>,
    satellite: Box<dyn TileSource>,
    settings: MapSettings,
}

impl MapRenderer {
    pub fn new(
        street: Box<dyn TileSource>,
        satellite: Box<dyn TileSource>,
        settings: MapSettings,
    ) -> Result<Self, MapError> {
        settings.validate()?;
        Ok(Self {
            street,
            satellite,
            settings,
        })
    }

    /// PNG bytes of the location map
    pub fn render(&self, coords: &Coordinates, environment: Environment) -> Result<Vec<u8>, MapError> {
        projection::check_range(coords)?;

        tracing::info!(
            "Rendering {} map for ({}, {})",
            environment,
            coords.latitude,
            coords.longitude
        );

        let image = match environment {
            Environment::Urbano => urban::render(self.street.as_ref(), coords, &self.settings.urban)?,
            Environment::Rural => rural::render(self.satellite.as_ref(), coords, &self.settings.rural)?,
        };

        encode_png(&image)
    }
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, MapError> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, image::ImageFormat::Png)
        .map_err(|e| MapError::Encode(e.to_string()))?;
    Ok(buf.into_inner())
}

fn check_zoom(zoom: u8) -> Result<(), MapError> {
    if zoom > MAX_ZOOM {
        return Err(MapError::Settings(format!(
            "zoom {} is above the maximum of {}",
            zoom, MAX_ZOOM
        )));
    }
    Ok(())
}
