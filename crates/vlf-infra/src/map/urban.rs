//! Street map with a single marker

use image::RgbaImage;
use vlf_domain::model::Coordinates;
use vlf_domain::repository::TileSource;
use vlf_types::MapError;

use super::marker::{CircleMarker, RED};
use super::projection::lonlat_to_pixel;
use super::stitch::{stitch, PixelWindow};

#[derive(Debug, Clone)]
pub struct UrbanSettings {
    pub zoom: u8,
    pub width: u32,
    pub height: u32,
    /// Marker radius in pixels
    pub marker_radius: f64,
}

impl Default for UrbanSettings {
    fn default() -> Self {
        Self {
            zoom: 17,
            width: 600,
            height: 400,
            marker_radius: 6.0,
        }
    }
}

impl UrbanSettings {
    pub fn validate(&self) -> Result<(), MapError> {
        super::check_zoom(self.zoom)?;
        if self.width == 0 || self.height == 0 {
            return Err(MapError::Settings("urban canvas must not be empty".to_string()));
        }
        if self.marker_radius <= 0.0 {
            return Err(MapError::Settings("marker radius must be positive".to_string()));
        }
        Ok(())
    }
}

pub fn render<S: TileSource + ?Sized>(
    source: &S,
    coords: &Coordinates,
    settings: &UrbanSettings,
) -> Result<RgbaImage, MapError> {
    let (lon, lat) = coords.lon_lat();
    let (cx, cy) = lonlat_to_pixel(lon, lat, settings.zoom);
    let window = PixelWindow::centred(settings.zoom, cx, cy, settings.width, settings.height);

    let mut canvas = stitch(source, &window)?;

    // the window origin is rounded when tiles are pasted
    let marker_x = cx - window.left.round();
    let marker_y = cy - window.top.round();
    CircleMarker::new(settings.marker_radius, RED).draw(&mut canvas, marker_x, marker_y);

    Ok(canvas)
}
