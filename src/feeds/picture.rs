use anyhow::Result;
use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl PixelColor {
    pub fn to_ratatui_color(self) -> Color {
        Color::Rgb(self.r, self.g, self.b)
    }
}

/// A picture downscaled for the terminal. Rows come in pairs: one cell shows
/// an upper and a lower pixel with a half block.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    pub pixels: Vec<Vec<PixelColor>>,
    pub width: u32,
    pub height: u32,
    pub original_width: u32,
    pub original_height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PictureState {
    None,
    Loading,
    Ready(PixelGrid),
    Failed(String),
}

impl PixelGrid {
    /// Decodes image bytes and resizes them to `target_width` pixels wide,
    /// keeping the aspect ratio. The height is rounded up to an even number
    /// of pixels.
    pub fn decode(bytes: &[u8], target_width: u32) -> Result<Self> {
        let img = image::load_from_memory(bytes)?;

        let original_width = img.width();
        let original_height = img.height();

        let width = target_width.clamp(1, original_width.max(1));
        let ratio = original_height as f64 / original_width.max(1) as f64;
        let mut height = ((width as f64 * ratio).round() as u32).max(1);
        if height % 2 == 1 {
            height += 1;
        }

        let resized = img.resize_exact(width, height, image::imageops::FilterType::Triangle);
        let rgb_img = resized.to_rgb8();

        let pixels = (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| {
                        let pixel = rgb_img.get_pixel(x, y);
                        PixelColor {
                            r: pixel[0],
                            g: pixel[1],
                            b: pixel[2],
                        }
                    })
                    .collect()
            })
            .collect();

        Ok(Self {
            pixels,
            width,
            height,
            original_width,
            original_height,
        })
    }

    /// Number of terminal rows needed to draw the grid.
    pub fn cell_rows(&self) -> u32 {
        self.height / 2
    }
}
