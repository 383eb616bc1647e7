use std::path::Path;

use image::GenericImageView;
use tokio::task;
use tracing::{debug, info};

use crate::error::{ImageError, PanovidError, Result};
use crate::video::types::SourceImage;

/// Decodes panorama photos into RGB pixel grids
pub struct PanoramaLoader;

impl PanoramaLoader {
    /// Load and decode an image file.
    ///
    /// Alpha is dropped and other pixel formats are converted to 8-bit RGB.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<SourceImage> {
        let path = path.as_ref().to_path_buf();
        let path_str = path.display().to_string();

        debug!("Decoding panorama: {}", path_str);
        let decoded = task::spawn_blocking(move || image::open(&path))
            .await
            .map_err(|e| PanovidError::generic(format!("Image decoding task failed: {}", e)))?
            .map_err(|e| ImageError::LoadFailed {
                path: path_str.clone(),
                reason: e.to_string(),
            })?;

        let (width, height) = decoded.dimensions();
        if width == 0 || height == 0 {
            return Err(ImageError::Empty { path: path_str }.into());
        }

        let rgb_image = match decoded {
            image::DynamicImage::ImageRgb8(img) => img,
            other => other.to_rgb8(),
        };

        info!("Loaded panorama {}x{} from {}", width, height, path_str);
        Ok(SourceImage::new(rgb_image))
    }

    /// Check if a file extension looks like a decodable image
    pub fn is_supported<P: AsRef<Path>>(path: P) -> bool {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) => matches!(
                ext.to_lowercase().as_str(),
                "jpg" | "jpeg" | "png" | "bmp" | "tif" | "tiff" | "webp"
            ),
            None => false,
        }
    }
}
