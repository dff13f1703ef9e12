//! Source photo decoding.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Image loading errors.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image data is empty")]
    Empty,
    #[error("Unsupported image format")]
    UnsupportedFormat,
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("IO error: {0}")]
    Io(String),
}

/// Image format of the source bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
    Bmp,
    Gif,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Gif => "image/gif",
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }

        if data.starts_with(b"BM") {
            return Some(ImageFormat::Bmp);
        }

        if data.starts_with(b"GIF8") {
            return Some(ImageFormat::Gif);
        }

        None
    }

    fn to_image_crate(self) -> image::ImageFormat {
        match self {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::WebP => image::ImageFormat::WebP,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
            ImageFormat::Gif => image::ImageFormat::Gif,
        }
    }
}

/// Decoded source photo.
///
/// Pixel data is shared: cloning a `SourceImage` is cheap and never copies pixels.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: Arc<RgbaImage>,
    format: Option<ImageFormat>,
}

impl SourceImage {
    /// Decode PNG, JPEG, WebP, BMP or GIF bytes.
    pub fn decode(data: &[u8]) -> Result<Self, ImageError> {
        if data.is_empty() {
            return Err(ImageError::Empty);
        }
        let format = ImageFormat::from_magic_bytes(data).ok_or(ImageError::UnsupportedFormat)?;
        let decoded = image::load_from_memory_with_format(data, format.to_image_crate())
            .map_err(|e| ImageError::Decode(e.to_string()))?;

        log::info!(
            "Decoded {:?} image ({}x{})",
            format,
            decoded.width(),
            decoded.height()
        );
        Ok(Self {
            pixels: Arc::new(decoded.to_rgba8()),
            format: Some(format),
        })
    }

    /// Read and decode an image file.
    pub fn open(path: &Path) -> Result<Self, ImageError> {
        let data = std::fs::read(path)
            .map_err(|e| ImageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::decode(&data)
    }

    /// Wrap already-decoded RGBA pixels.
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
            format: None,
        }
    }

    pub fn natural_width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn natural_height(&self) -> u32 {
        self.pixels.height()
    }

    /// Check for a zero-sized image.
    pub fn is_empty(&self) -> bool {
        self.natural_width() == 0 || self.natural_height() == 0
    }

    /// Pixels at natural resolution.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Shared handle to the pixels (for caches keyed by identity).
    pub fn shared_pixels(&self) -> &Arc<RgbaImage> {
        &self.pixels
    }

    /// Format the image was decoded from (`None` for raw pixel buffers).
    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageEncoder, Rgba};

    fn encoded_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 200, 30, 255]));
        let mut bytes = Vec::new();
        image::codecs::png::PngEncoder::new(&mut bytes)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
            .unwrap();
        bytes
    }

    #[test]
    fn test_magic_bytes() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D]),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(b"RIFF\0\0\0\0WEBPVP8 "),
            Some(ImageFormat::WebP)
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"nope"), None);
        assert_eq!(ImageFormat::from_magic_bytes(b"BM"), None);
    }

    #[test]
    fn test_decode_png() {
        let image = SourceImage::decode(&encoded_png(16, 9)).unwrap();
        assert_eq!(image.natural_width(), 16);
        assert_eq!(image.natural_height(), 9);
        assert_eq!(image.format(), Some(ImageFormat::Png));
        assert_eq!(image.pixels().get_pixel(3, 3), &Rgba([10, 200, 30, 255]));
    }

    #[test]
    fn test_decode_failures() {
        assert!(matches!(SourceImage::decode(&[]), Err(ImageError::Empty)));
        assert!(matches!(
            SourceImage::decode(b"definitely not an image"),
            Err(ImageError::UnsupportedFormat)
        ));

        let mut truncated = encoded_png(16, 9);
        truncated.truncate(20);
        assert!(matches!(SourceImage::decode(&truncated), Err(ImageError::Decode(_))));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = SourceImage::open(&dir.path().join("missing.png"));
        assert!(matches!(result, Err(ImageError::Io(_))));
    }

    #[test]
    fn test_clone_shares_pixels() {
        let image = SourceImage::from_rgba(RgbaImage::new(4, 4));
        let copy = image.clone();
        assert!(Arc::ptr_eq(image.shared_pixels(), copy.shared_pixels()));
        assert_eq!(copy.format(), None);
    }

    #[test]
    fn test_zero_sized_image_is_empty() {
        assert!(SourceImage::from_rgba(RgbaImage::new(0, 10)).is_empty());
        assert!(!SourceImage::from_rgba(RgbaImage::new(1, 1)).is_empty());
    }
}
