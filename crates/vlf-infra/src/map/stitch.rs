//! Assemble a pixel window from slippy-map tiles

use image::{imageops, Rgba, RgbaImage};
use vlf_domain::repository::TileSource;
use vlf_types::MapError;

use super::projection::{tiles_per_axis, TILE_SIZE};

/// Shown where no tile exists (beyond the poles)
const BACKGROUND: Rgba<u8> = Rgba([224, 224, 224, 255]);

/// Window of global pixel space at one zoom level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelWindow {
    pub zoom: u8,
    pub left: f64,
    pub top: f64,
    pub width: u32,
    pub height: u32,
}

impl PixelWindow {
    /// Window of the given size centred on a global pixel
    pub fn centred(zoom: u8, cx: f64, cy: f64, width: u32, height: u32) -> Self {
        Self {
            zoom,
            left: cx - f64::from(width) / 2.0,
            top: cy - f64::from(height) / 2.0,
            width,
            height,
        }
    }

    /// Tile columns and rows touched by the window (columns may be negative
    /// or past the antimeridian; they wrap when fetched)
    pub fn tile_range(&self) -> (std::ops::RangeInclusive<i64>, std::ops::RangeInclusive<i64>) {
        let size = f64::from(TILE_SIZE);
        let x0 = (self.left / size).floor() as i64;
        let x1 = ((self.left + f64::from(self.width) - 1.0) / size).floor() as i64;
        let y0 = (self.top / size).floor() as i64;
        let y1 = ((self.top + f64::from(self.height) - 1.0) / size).floor() as i64;
        (x0..=x1, y0..=y1)
    }
}

/// Fetch and paste every tile covering the window
pub fn stitch<S: TileSource + ?Sized>(source: &S, window: &PixelWindow) -> Result<RgbaImage, MapError> {
    let mut canvas = RgbaImage::from_pixel(window.width, window.height, BACKGROUND);
    let n = i64::from(tiles_per_axis(window.zoom));
    let (columns, rows) = window.tile_range();
    let origin_x = window.left.round() as i64;
    let origin_y = window.top.round() as i64;
    let mut fetched = 0usize;

    for ty in rows {
        if ty < 0 || ty >= n {
            continue;
        }
        for tx in columns.clone() {
            let x = tx.rem_euclid(n) as u32;
            let y = ty as u32;
            let bytes = source.fetch_tile(window.zoom, x, y)?;
            let tile = image::load_from_memory(&bytes)
                .map_err(|e| MapError::TileDecode {
                    z: window.zoom,
                    x,
                    y,
                    reason: e.to_string(),
                })?
                .to_rgba8();

            let dest_x = tx * i64::from(TILE_SIZE) - origin_x;
            let dest_y = ty * i64::from(TILE_SIZE) - origin_y;
            imageops::overlay(&mut canvas, &tile, dest_x, dest_y);
            fetched += 1;
        }
    }

    tracing::debug!(
        "Stitched {} {} tiles at zoom {} into {}x{}",
        fetched,
        source.name(),
        window.zoom,
        window.width,
        window.height
    );
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Cursor;

    /// Solid tiles whose colour encodes the column
    struct CountingTiles {
        calls: RefCell<Vec<(u8, u32, u32)>>,
    }

    impl TileSource for CountingTiles {
        fn fetch_tile(&self, z: u8, x: u32, y: u32) -> Result<Vec<u8>, MapError> {
            self.calls.borrow_mut().push((z, x, y));
            let tile = RgbaImage::from_pixel(TILE_SIZE, TILE_SIZE, Rgba([x as u8, y as u8, 0, 255]));
            let mut buf = Cursor::new(Vec::new());
            tile.write_to(&mut buf, image::ImageFormat::Png).unwrap();
            Ok(buf.into_inner())
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    #[test]
    fn test_tile_range_of_centred_window() {
        let window = PixelWindow::centred(3, 512.0, 512.0, 600, 400);
        let (cols, rows) = window.tile_range();
        assert_eq!(cols, 0..=3);
        assert_eq!(rows, 1..=2);
    }

    #[test]
    fn test_stitch_places_tiles() {
        let source = CountingTiles { calls: RefCell::new(Vec::new()) };
        let window = PixelWindow { zoom: 2, left: 128.0, top: 256.0, width: 256, height: 256 };
        let img = stitch(&source, &window).unwrap();

        assert_eq!(img.dimensions(), (256, 256));
        // Left half comes from column 0, right half from column 1, row 1
        assert_eq!(img.get_pixel(10, 10), &Rgba([0, 1, 0, 255]));
        assert_eq!(img.get_pixel(200, 10), &Rgba([1, 1, 0, 255]));
        assert_eq!(source.calls.borrow().len(), 2);
    }

    #[test]
    fn test_stitch_wraps_columns_and_skips_rows_off_world() {
        let source = CountingTiles { calls: RefCell::new(Vec::new()) };
        let window = PixelWindow { zoom: 1, left: -128.0, top: -128.0, width: 256, height: 256 };
        let img = stitch(&source, &window).unwrap();

        let calls = source.calls.borrow();
        assert!(calls.iter().all(|&(_, _, y)| y == 0));
        assert!(calls.contains(&(1, 1, 0)));
        assert!(calls.contains(&(1, 0, 0)));
        assert_eq!(img.get_pixel(10, 10), &BACKGROUND);
    }

    #[test]
    fn test_undecodable_tile_is_an_error() {
        struct Garbage;
        impl TileSource for Garbage {
            fn fetch_tile(&self, _: u8, _: u32, _: u32) -> Result<Vec<u8>, MapError> {
                Ok(b"not an image".to_vec())
            }
            fn name(&self) -> &str {
                "garbage"
            }
        }
        let window = PixelWindow::centred(1, 256.0, 256.0, 10, 10);
        assert!(matches!(stitch(&Garbage, &window), Err(MapError::TileDecode { .. })));
    }
}
