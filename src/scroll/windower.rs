//! Frame windowing.
//!
//! A window is a full-height strip of the panorama, `frame_width` pixels wide.
//! Window `i` starts at column `i * framejump`. Windows are produced while their
//! right edge stays strictly inside the image, so the strip touching the last
//! column is never emitted.

use crate::error::WindowError;
use crate::video::types::{Frame, SourceImage};

/// Validated windowing parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    framejump: u32,
    frame_width: u32,
}

impl WindowConfig {
    /// Rejects a zero step (the window would never move) and a zero width.
    pub fn new(framejump: u32, frame_width: u32) -> Result<Self, WindowError> {
        if framejump == 0 {
            return Err(WindowError::InvalidFramejump { value: framejump });
        }
        if frame_width == 0 {
            return Err(WindowError::InvalidFrameWidth { value: frame_width });
        }
        Ok(Self { framejump, frame_width })
    }

    pub fn framejump(&self) -> u32 {
        self.framejump
    }

    pub fn frame_width(&self) -> u32 {
        self.frame_width
    }

    /// Number of windows that fit in an image `image_width` pixels wide.
    ///
    /// Zero when the frame is at least as wide as the image.
    pub fn frame_count(&self, image_width: u32) -> usize {
        if self.frame_width >= image_width {
            return 0;
        }
        let slack = u64::from(image_width - self.frame_width);
        let step = u64::from(self.framejump);
        ((slack + step - 1) / step) as usize
    }

    /// Window geometry for an image `image_width` pixels wide
    pub fn windows(&self, image_width: u32) -> Windows {
        Windows {
            config: *self,
            image_width,
            next_index: 0,
        }
    }
}

/// Position of one frame on the panorama
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Position in scroll order
    pub index: usize,

    /// First column, inclusive
    pub left: u32,

    /// Width in columns
    pub width: u32,
}

impl Window {
    /// Last column, exclusive
    pub fn right(&self) -> u32 {
        self.left + self.width
    }
}

/// Iterator over window positions, left to right
#[derive(Debug, Clone)]
pub struct Windows {
    config: WindowConfig,
    image_width: u32,
    next_index: usize,
}

impl Iterator for Windows {
    type Item = Window;

    fn next(&mut self) -> Option<Window> {
        let left = self.next_index as u64 * u64::from(self.config.framejump);
        let right = left + u64::from(self.config.frame_width);
        if right >= u64::from(self.image_width) {
            return None;
        }

        let window = Window {
            index: self.next_index,
            left: left as u32,
            width: self.config.frame_width,
        };
        self.next_index += 1;
        Some(window)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .config
            .frame_count(self.image_width)
            .saturating_sub(self.next_index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Windows {}

/// Lazily cropped frames of a panorama, in scroll order.
///
/// A clone continues from the current position. Build a new one with
/// [`FrameWindows::new`] to replay from the first frame.
#[derive(Clone)]
pub struct FrameWindows<'a> {
    image: &'a SourceImage,
    windows: Windows,
}

impl<'a> FrameWindows<'a> {
    pub fn new(image: &'a SourceImage, config: WindowConfig) -> Self {
        Self {
            image,
            windows: config.windows(image.width()),
        }
    }
}

impl Iterator for FrameWindows<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        self.windows.next().map(|window| self.image.crop(&window))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.windows.size_hint()
    }
}

impl ExactSizeIterator for FrameWindows<'_> {}
