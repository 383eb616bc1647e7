use thiserror::Error;

/// Main error type for the panovid library
#[derive(Error, Debug)]
pub enum PanovidError {
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("Window configuration error: {0}")]
    Window(#[from] WindowError),

    #[error("Video encoding error: {0}")]
    Video(#[from] VideoError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Panorama loading errors
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Failed to load image file: {path} ({reason})")]
    LoadFailed { path: String, reason: String },

    #[error("Image has no pixels: {path}")]
    Empty { path: String },
}

/// Invalid windowing parameters
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WindowError {
    #[error("framejump must be a positive number of pixels, got {value}")]
    InvalidFramejump { value: u32 },

    #[error("frame width must be a positive number of pixels, got {value}")]
    InvalidFrameWidth { value: u32 },
}

/// Video emitter errors
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Video encoder not available: {program}")]
    EncoderUnavailable { program: String },

    #[error("Video encoding failed: {reason}")]
    EncodingFailed { reason: String },

    #[error("Encoder closed its input early: {reason}")]
    EncoderClosed { reason: String },

    #[error("Frame size mismatch: expected {expected_width}x{expected_height}, got {width}x{height}")]
    FrameSizeMismatch {
        expected_width: u32,
        expected_height: u32,
        width: u32,
        height: u32,
    },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using PanovidError
pub type Result<T> = std::result::Result<T, PanovidError>;

impl PanovidError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Image(ImageError::LoadFailed { path, reason }) => {
                format!("Could not load image '{}': {}. Please check the file exists and is a supported format.", path, reason)
            }
            Self::Window(WindowError::InvalidFramejump { .. }) => {
                "--framejump must be at least 1 pixel.".to_string()
            }
            Self::Video(VideoError::EncoderUnavailable { program }) => {
                format!("Could not run '{}'. Install FFmpeg: brew install ffmpeg (macOS) or sudo apt install ffmpeg (Ubuntu).", program)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
