//! # Scroll Module
//!
//! Decides what the output videos look like: which aspect ratios to render,
//! how wide each frame is, and where every frame window sits on the panorama.

pub mod mode;
pub mod windower;

pub use mode::{AspectMode, ModeSelection};
pub use windower::{FrameWindows, Window, WindowConfig, Windows};
