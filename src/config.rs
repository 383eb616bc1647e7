use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::scroll::WindowConfig;

/// Main configuration for panovid
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scroll speed settings
    pub scroll: ScrollConfig,

    /// Encoder and processing settings
    pub video: VideoConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.scroll.validate()?;
        self.video.validate()?;
        Ok(())
    }
}

fn invalid(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// How fast the window moves across the panorama
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Frames per second of the output video
    pub fps: u32,

    /// Pixels the window advances between frames
    pub framejump: u32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            framejump: 4,
        }
    }
}

impl ScrollConfig {
    fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(invalid("scroll.fps", self.fps).into());
        }

        WindowConfig::new(self.framejump, 1)?;

        Ok(())
    }
}

/// Encoder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// FFmpeg encoder name
    pub codec: String,

    /// Codec tag written into the container
    pub fourcc: String,

    /// Container format, also used as the output file extension
    pub container: String,

    /// FFmpeg executable to spawn
    pub ffmpeg_path: String,

    /// Number of threads used to crop frames
    pub processing_threads: usize,

    /// Frames cropped per parallel batch before being written
    pub batch_size: usize,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            codec: "mpeg4".to_string(),
            fourcc: "mp4v".to_string(),
            container: "mp4".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            processing_threads: num_cpus::get(),
            batch_size: 64,
        }
    }
}

impl VideoConfig {
    fn validate(&self) -> Result<()> {
        if self.codec.trim().is_empty() {
            return Err(invalid("video.codec", &self.codec).into());
        }

        if self.fourcc.len() != 4 || !self.fourcc.is_ascii() {
            return Err(invalid("video.fourcc", &self.fourcc).into());
        }

        if self.container.trim().is_empty() {
            return Err(invalid("video.container", &self.container).into());
        }

        if self.ffmpeg_path.trim().is_empty() {
            return Err(invalid("video.ffmpeg_path", &self.ffmpeg_path).into());
        }

        if self.processing_threads == 0 {
            return Err(invalid("video.processing_threads", self.processing_threads).into());
        }

        if self.batch_size == 0 {
            return Err(invalid("video.batch_size", self.batch_size).into());
        }

        Ok(())
    }
}
