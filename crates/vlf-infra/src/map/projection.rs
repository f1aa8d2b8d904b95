//! Web Mercator (EPSG:3857) math

use std::f64::consts::PI;

use vlf_domain::model::Coordinates;
use vlf_types::MapError;

pub const EARTH_RADIUS_M: f64 = 6_378_137.0;
pub const TILE_SIZE: u32 = 256;
/// Latitude where Web Mercator becomes square
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Half the projected world width in metres
const ORIGIN_SHIFT: f64 = PI * EARTH_RADIUS_M;

pub fn check_range(coords: &Coordinates) -> Result<(), MapError> {
    let (lon, lat) = coords.lon_lat();
    if lat.abs() > MAX_LATITUDE || lon.abs() > 180.0 {
        return Err(MapError::OutOfRange { lat, lon });
    }
    Ok(())
}

/// Degrees to projected metres
pub fn to_web_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let x = EARTH_RADIUS_M * lon.to_radians();
    let y = EARTH_RADIUS_M * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

/// Width of the whole world in pixels at a zoom level
pub fn world_size_px(zoom: u8) -> f64 {
    f64::from(TILE_SIZE) * 2f64.powi(i32::from(zoom))
}

/// Number of tiles per axis at a zoom level
pub fn tiles_per_axis(zoom: u8) -> u32 {
    1u32 << zoom
}

/// Degrees to global pixel position at a zoom level
pub fn lonlat_to_pixel(lon: f64, lat: f64, zoom: u8) -> (f64, f64) {
    let (mx, my) = to_web_mercator(lon, lat);
    mercator_to_pixel(mx, my, zoom)
}

/// Projected metres to global pixel position (origin top-left)
pub fn mercator_to_pixel(mx: f64, my: f64, zoom: u8) -> (f64, f64) {
    let world = world_size_px(zoom);
    let px = (mx + ORIGIN_SHIFT) / (2.0 * ORIGIN_SHIFT) * world;
    let py = (ORIGIN_SHIFT - my) / (2.0 * ORIGIN_SHIFT) * world;
    (px, py)
}

/// Ground metres (in projected units) covered by one pixel
pub fn metres_per_pixel(zoom: u8) -> f64 {
    2.0 * ORIGIN_SHIFT / world_size_px(zoom)
}
