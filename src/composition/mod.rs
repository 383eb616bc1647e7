//! # Composition Module
//!
//! Drives a panorama through windowing and encoding, once per aspect mode.

pub mod engine;

pub use engine::{RenderReport, ScrollEngine};
