//! Image chain: recompression plus a WebP sibling.
//!
//! Bitmap sources (png, jpeg) are decoded and re-encoded, and a lossless
//! WebP copy is written next to the original so markup can prefer the
//! next-generation format. Everything else (svg, gif, ico, existing webp)
//! is copied verbatim.

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};

use crate::error::TransformError;

/// Process one image file into `dest`. Returns every path written.
pub fn transform_image(src: &Path, dest: &Path) -> Result<Vec<PathBuf>, TransformError> {
    match ImageFormat::from_path(src).ok() {
        Some(format @ (ImageFormat::Png | ImageFormat::Jpeg)) => {
            let img = image::open(src).map_err(|e| TransformError::Image(e.to_string()))?;

            // JPEG has no alpha channel; re-encode from RGB.
            match format {
                ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8())
                    .save_with_format(dest, format)
                    .map_err(|e| TransformError::Image(e.to_string()))?,
                _ => img
                    .save_with_format(dest, format)
                    .map_err(|e| TransformError::Image(e.to_string()))?,
            }

            let webp = dest.with_extension("webp");
            DynamicImage::ImageRgba8(img.to_rgba8())
                .save_with_format(&webp, ImageFormat::WebP)
                .map_err(|e| TransformError::Image(e.to_string()))?;

            Ok(vec![dest.to_path_buf(), webp])
        }
        _ => {
            fs::copy(src, dest).map_err(|e| TransformError::Write {
                path: dest.display().to_string(),
                message: e.to_string(),
            })?;
            Ok(vec![dest.to_path_buf()])
        }
    }
}
