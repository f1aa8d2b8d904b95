//! Circle markers drawn onto map images

use image::{Rgba, RgbaImage};

pub const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Filled circle with an optional ring around it
#[derive(Debug, Clone, Copy)]
pub struct CircleMarker {
    pub radius: f64,
    pub fill: Rgba<u8>,
    pub outline: Option<(Rgba<u8>, f64)>,
}

impl CircleMarker {
    pub fn new(radius: f64, fill: Rgba<u8>) -> Self {
        Self {
            radius,
            fill,
            outline: None,
        }
    }

    pub fn with_outline(mut self, color: Rgba<u8>, width: f64) -> Self {
        self.outline = Some((color, width));
        self
    }

    /// Paint the marker centred at (cx, cy); parts outside the image are clipped
    pub fn draw(&self, img: &mut RgbaImage, cx: f64, cy: f64) {
        let outer = self.radius + self.outline.map(|(_, w)| w).unwrap_or(0.0);
        let (width, height) = img.dimensions();

        let x0 = (cx - outer).floor().max(0.0) as u32;
        let y0 = (cy - outer).floor().max(0.0) as u32;
        let x1 = ((cx + outer).ceil().max(0.0) as u32).min(width);
        let y1 = ((cy + outer).ceil().max(0.0) as u32).min(height);

        for y in y0..y1 {
            for x in x0..x1 {
                // distance from the pixel centre
                let dx = f64::from(x) + 0.5 - cx;
                let dy = f64::from(y) + 0.5 - cy;
                let d = (dx * dx + dy * dy).sqrt();
                if d <= self.radius {
                    img.put_pixel(x, y, self.fill);
                } else if let Some((color, _)) = self.outline {
                    if d <= outer {
                        img.put_pixel(x, y, color);
                    }
                }
            }
        }
    }
}
