use image::{imageops, ImageBuffer, Rgb, RgbImage};
use std::path::PathBuf;

use crate::scroll::Window;

/// Decoded panorama, 8-bit RGB
///
/// Immutable once loaded. Frames are cropped out of it with [`SourceImage::crop`].
#[derive(Clone, Debug)]
pub struct SourceImage {
    buffer: RgbImage,
}

impl SourceImage {
    pub fn new(buffer: RgbImage) -> Self {
        Self { buffer }
    }

    /// Width in columns
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Height in rows
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Copy the full-height strip under `window` into a new frame
    pub fn crop(&self, window: &Window) -> Frame {
        let strip = imageops::crop_imm(&self.buffer, window.left, 0, window.width, self.height());
        Frame::new(strip.to_image())
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.buffer
    }
}

/// Represents a single video frame
///
/// A thin wrapper around an RGB image buffer, laid out exactly the way the
/// encoder expects raw `rgb24` input.
#[derive(Clone, Debug)]
pub struct Frame {
    buffer: RgbImage,
}

impl Frame {
    /// Create a new frame from an RGB image buffer
    pub fn new(buffer: RgbImage) -> Self {
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_fn(width, height, |_, _| {
            Rgb(color)
        });
        Self { buffer }
    }

    /// Get the width of the frame
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Get the height of the frame
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Get a pixel at the given coordinates (returns RGB array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let pixel = self.buffer.get_pixel(x, y);
        [pixel[0], pixel[1], pixel[2]]
    }

    /// Get the underlying image buffer
    pub fn as_image(&self) -> &RgbImage {
        &self.buffer
    }

    /// Raw row-major RGB bytes
    pub fn as_rgb_bytes(&self) -> &[u8] {
        self.buffer.as_raw()
    }
}

/// Everything the encoder needs to know about one output video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoOutputSpec {
    /// Output frame rate
    pub fps: u32,

    /// Frame size (width, height)
    pub size: (u32, u32),

    /// Output file path
    pub path: PathBuf,

    /// FFmpeg encoder name
    pub codec: String,

    /// Codec tag written into the container
    pub fourcc: String,
}

impl VideoOutputSpec {
    /// Byte length of one raw `rgb24` frame
    pub fn frame_bytes(&self) -> usize {
        self.size.0 as usize * self.size.1 as usize * 3
    }
}
