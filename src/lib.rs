//! # Panovid
//!
//! Turn a panorama photo into a video that scrolls across it.
//!
//! A fixed-width, full-height window is slid over the image a few pixels at a
//! time and every position becomes one video frame. The window width follows
//! from the image height and the chosen aspect ratio: 9:16 for portrait,
//! 16:9 for landscape.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use panovid::{
//!     composition::ScrollEngine,
//!     config::Config,
//!     scroll::ModeSelection,
//! };
//! use std::path::Path;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let engine = ScrollEngine::new(Config::default())?;
//! let reports = engine
//!     .run(Path::new("alps.jpg"), None, ModeSelection::Both)
//!     .await?;
//!
//! for report in reports {
//!     println!("{}: {} frames", report.mode, report.frame_count);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`scroll`] - Aspect modes, frame width and window positions
//! - [`video`] - Image decoding, frame types and the FFmpeg writer
//! - [`composition`] - Per-mode pipeline driver
//! - [`config`] - Configuration management
//!
//! ## Windowing Without Pixels
//!
//! Window geometry is available on its own, which is handy for previews:
//!
//! ```rust
//! use panovid::scroll::{AspectMode, WindowConfig};
//!
//! let frame_width = AspectMode::Portrait.frame_width(300);
//! let windows = WindowConfig::new(4, frame_width).unwrap();
//!
//! assert_eq!(frame_width, 168);
//! assert_eq!(windows.frame_count(1000), 208);
//! ```

pub mod composition;
pub mod config;
pub mod error;
pub mod scroll;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    composition::{RenderReport, ScrollEngine},
    config::Config,
    error::{PanovidError, Result},
    scroll::{AspectMode, ModeSelection, WindowConfig},
};
