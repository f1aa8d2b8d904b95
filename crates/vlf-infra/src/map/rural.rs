//! Aerial imagery around a metric bounding box

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use vlf_domain::model::Coordinates;
use vlf_domain::repository::TileSource;
use vlf_types::MapError;

use super::marker::{CircleMarker, RED, WHITE};
use super::projection::{mercator_to_pixel, to_web_mercator};
use super::stitch::{stitch, PixelWindow};

const FIGURE_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Debug, Clone)]
pub struct RuralSettings {
    pub zoom: u8,
    /// Half side of the bounding square, in metres
    pub radius_m: f64,
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
    pub marker_radius: f64,
}

impl Default for RuralSettings {
    fn default() -> Self {
        Self {
            zoom: 17,
            radius_m: 300.0,
            width_in: 9.0,
            height_in: 7.0,
            dpi: 100,
            marker_radius: 8.0,
        }
    }
}

impl RuralSettings {
    pub fn validate(&self) -> Result<(), MapError> {
        super::check_zoom(self.zoom)?;
        if !self.radius_m.is_finite() || self.radius_m <= 0.0 {
            return Err(MapError::Settings("rural radius must be positive".to_string()));
        }
        let (w, h) = self.figure_px();
        if w == 0 || h == 0 {
            return Err(MapError::Settings("rural figure must not be empty".to_string()));
        }
        if self.marker_radius <= 0.0 {
            return Err(MapError::Settings("marker radius must be positive".to_string()));
        }
        Ok(())
    }

    /// Output size in pixels (figure inches x DPI)
    pub fn figure_px(&self) -> (u32, u32) {
        let dpi = f64::from(self.dpi);
        (
            (self.width_in * dpi).round().max(0.0) as u32,
            (self.height_in * dpi).round().max(0.0) as u32,
        )
    }
}

/// Square bounding box in Web Mercator metres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn around(coords: &Coordinates, radius_m: f64) -> Self {
        let (lon, lat) = coords.lon_lat();
        let (x, y) = to_web_mercator(lon, lat);
        Self {
            min_x: x - radius_m,
            min_y: y - radius_m,
            max_x: x + radius_m,
            max_y: y + radius_m,
        }
    }

    /// Global pixel window covering the box at a zoom level
    pub fn pixel_window(&self, zoom: u8) -> PixelWindow {
        let (left, top) = mercator_to_pixel(self.min_x, self.max_y, zoom);
        let (right, bottom) = mercator_to_pixel(self.max_x, self.min_y, zoom);
        PixelWindow {
            zoom,
            left,
            top,
            width: ((right - left).round() as u32).max(1),
            height: ((bottom - top).round() as u32).max(1),
        }
    }
}

pub fn render<S: TileSource + ?Sized>(
    source: &S,
    coords: &Coordinates,
    settings: &RuralSettings,
) -> Result<RgbaImage, MapError> {
    let bbox = BoundingBox::around(coords, settings.radius_m);
    let window = bbox.pixel_window(settings.zoom);
    tracing::debug!(?bbox, "Rural bounding box ({} m)", settings.radius_m);

    let clip = stitch(source, &window)?;

    // equal aspect: the square clip fills the shorter side of the figure
    let (fig_w, fig_h) = settings.figure_px();
    let side = fig_w.min(fig_h);
    let scaled = imageops::resize(&clip, side, side, FilterType::Triangle);

    let mut figure = RgbaImage::from_pixel(fig_w, fig_h, FIGURE_BACKGROUND);
    let offset_x = (fig_w - side) / 2;
    let offset_y = (fig_h - side) / 2;
    imageops::overlay(&mut figure, &scaled, i64::from(offset_x), i64::from(offset_y));

    let centre_x = f64::from(offset_x) + f64::from(side) / 2.0;
    let centre_y = f64::from(offset_y) + f64::from(side) / 2.0;
    CircleMarker::new(settings.marker_radius, RED)
        .with_outline(WHITE, 2.0)
        .draw(&mut figure, centre_x, centre_y);

    Ok(figure)
}
