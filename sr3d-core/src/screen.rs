//! Pixel buffer and the presentation surface seam.

use nalgebra::Point3;
use thiserror::Error;

/// 8-bit RGB pixel.
pub type Rgb = [u8; 3];

#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("buffer and screen not the same size (buffer {buffer_width}x{buffer_height}, screen {screen_width}x{screen_height})")]
    DimensionMismatch {
        buffer_width: usize,
        buffer_height: usize,
        screen_width: usize,
        screen_height: usize,
    },
    #[error("screen output failed")]
    Io(#[from] std::io::Error),
}

/// Row-major RGB pixel buffer. The renderer owns one of these for the
/// duration of a render call, then hands it to a [`Screen`].
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl FrameBuffer {
    /// Buffer of `width` x `height` pixels, every pixel set to `color`.
    pub fn filled(width: usize, height: usize, color: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.pixels[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, color: Rgb) {
        self.pixels[y * self.width + x] = color;
    }
}

/// Presentation surface the renderer draws into. Implementations own the
/// pixel dimensions and the final buffer hand-off; the coordinate
/// conversions are fixed by the surface size.
pub trait Screen {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// Present a finished buffer. Fails when the buffer dimensions do not
    /// match the surface.
    fn draw(&mut self, buffer: &FrameBuffer) -> Result<(), ScreenError>;

    /// Width-to-height ratio of the surface.
    fn ratio(&self) -> f32 {
        self.width() as f32 / self.height() as f32
    }

    /// Pixel coordinate for a point with x, z coordinates in normalized
    /// screen space. May land outside the surface; callers clamp.
    fn screen_to_pixel(&self, x: f32, z: f32) -> (i32, i32) {
        (
            ((x + 1.0) * self.width() as f32 / 2.0) as i32,
            ((z + 1.0) * self.height() as f32 / 2.0) as i32,
        )
    }

    /// Normalized screen-space coordinate for the center of pixel (x, y).
    fn pixel_to_screen(&self, x: usize, y: usize) -> Point3<f32> {
        Point3::new(
            2.0 * (x as f32 + 0.5) / self.width() as f32 - 1.0,
            0.0,
            2.0 * (y as f32 + 0.5) / self.height() as f32 - 1.0,
        )
    }
}
