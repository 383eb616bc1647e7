//! # Video Module
//!
//! Panorama decoding, frame types, and the FFmpeg-backed video writer.

pub mod types;
pub mod loader;
pub mod compositor;

pub use types::{Frame, SourceImage, VideoOutputSpec};
pub use loader::PanoramaLoader;
pub use compositor::{EncodedVideo, FfmpegEncoder, FrameSink};
