//! Floating point image buffer that receives rendered pixels.

use std::path::Path;

use image::{Rgb, RgbImage};
use kdtrace_core::Color;

use crate::error::OutputError;

/// Image buffer storing one linear RGB color per pixel.
///
/// Pixel (0, 0) is the top-left corner, matching the camera.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelArray {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl PixelArray {
    /// Create a new buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} image",
            self.width,
            self.height
        );
        y as usize * self.width as usize + x as usize
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        let i = self.index(x, y);
        self.pixels[i] = color;
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Clamp every channel of every pixel to `[0, 1]`.
    pub fn clamp_all_values(&mut self) {
        for color in &mut self.pixels {
            *color = color.clamp(Color::ZERO, Color::ONE);
        }
    }

    /// Convert to an 8-bit image. Channels outside `[0, 1]` saturate.
    pub fn to_rgb8(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let c = self.get_pixel(x, y);
            Rgb([to_byte(c.x), to_byte(c.y), to_byte(c.z)])
        })
    }

    /// Write the image to `path`; the format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), OutputError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| OutputError::CreateDir {
                path: path.to_path_buf(),
                source,
            })?;
        }
        self.to_rgb8().save(path).map_err(|source| OutputError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

#[inline]
fn to_byte(channel: f64) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}
