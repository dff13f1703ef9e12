//! Raster export of marked-up photos.

use crate::raster::RasterRenderer;
use crate::renderer::{RenderContext, RenderStyle, Renderer, RendererError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use fieldmark_core::{ExportSettings, MarkupSession, PhotoRecord, RasterFormat};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};
use thiserror::Error;

/// Export errors. No partial raster is ever produced.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No image loaded")]
    NotInitialized,
    #[error("Render failed: {0}")]
    Render(#[from] RendererError),
    #[error("Encoding failed: {0}")]
    Encode(String),
}

/// An encoded image ready to be written or embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRaster {
    pub format: RasterFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl EncodedRaster {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// `data:<mime>;base64,<payload>` form.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(&self.bytes))
    }
}

/// Flattens sessions into encoded rasters.
pub struct Exporter {
    renderer: RasterRenderer,
    settings: ExportSettings,
    style: RenderStyle,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(ExportSettings::default())
    }
}

impl Exporter {
    pub fn new(settings: ExportSettings) -> Self {
        Self {
            renderer: RasterRenderer::new(),
            settings,
            style: RenderStyle::default(),
        }
    }

    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }

    pub fn settings(&self) -> ExportSettings {
        self.settings
    }

    /// Render the committed annotations over the photo and encode the surface.
    ///
    /// A shape still being dragged is not part of the export.
    pub fn export(&mut self, session: &MarkupSession) -> Result<EncodedRaster, ExportError> {
        let ctx = RenderContext::from_session(session)
            .ok_or(ExportError::NotInitialized)?
            .with_candidate(None)
            .with_style(self.style);
        let surface = self.renderer.render(&ctx)?;
        let raster = encode(surface, self.settings)?;
        log::info!(
            "Exported {}x{} {} ({} bytes, {} annotations)",
            raster.width,
            raster.height,
            raster.mime_type(),
            raster.bytes.len(),
            ctx.annotations.len()
        );
        Ok(raster)
    }

    /// Encode the unmarked photo at its natural resolution.
    pub fn original_raster(&self, session: &MarkupSession) -> Result<EncodedRaster, ExportError> {
        let image = session.image().ok_or(ExportError::NotInitialized)?;
        encode(image.pixels(), self.settings)
    }

    /// Bundle both rasters and the annotation snapshot into a record.
    pub fn capture_record(
        &mut self,
        session: &MarkupSession,
        section: &str,
        caption: &str,
    ) -> Result<PhotoRecord, ExportError> {
        let marked = self.export(session)?;
        let original = self.original_raster(session)?;
        Ok(PhotoRecord::new(
            section,
            caption,
            original.to_data_url(),
            marked.to_data_url(),
            session.snapshot(),
        ))
    }
}

/// Encode RGBA pixels in the configured format.
fn encode(pixels: &RgbaImage, settings: ExportSettings) -> Result<EncodedRaster, ExportError> {
    let bytes = match settings.format {
        RasterFormat::Png => encode_png(pixels)?,
        RasterFormat::Jpeg => encode_jpeg(pixels, settings.quality)?,
    };
    Ok(EncodedRaster {
        format: settings.format,
        width: pixels.width(),
        height: pixels.height(),
        bytes,
    })
}

fn encode_png(pixels: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, pixels.width(), pixels.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| ExportError::Encode(format!("PNG header: {}", e)))?;
        writer
            .write_image_data(pixels.as_raw())
            .map_err(|e| ExportError::Encode(format!("PNG data: {}", e)))?;
        writer
            .finish()
            .map_err(|e| ExportError::Encode(format!("PNG finish: {}", e)))?;
    }
    Ok(png_data)
}

fn encode_jpeg(pixels: &RgbaImage, quality: u8) -> Result<Vec<u8>, ExportError> {
    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgba8(pixels.clone()).to_rgb8();
    let mut jpeg_data = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg_data, quality.clamp(1, 100))
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| ExportError::Encode(format!("JPEG: {}", e)))?;
    Ok(jpeg_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldmark_core::{ImageFormat, SourceImage};
    use image::Rgba;
    use kurbo::Point;

    fn session() -> MarkupSession {
        let mut session = MarkupSession::default();
        let mut pixels = RgbaImage::from_pixel(1200, 800, Rgba([70, 110, 90, 255]));
        pixels.put_pixel(3, 4, Rgba([255, 255, 255, 255]));
        session.initialize(SourceImage::from_rgba(pixels));
        session
    }

    #[test]
    fn test_export_png_surface_size() {
        let session = session();
        let raster = Exporter::default().export(&session).unwrap();
        assert_eq!((raster.width, raster.height), (900, 600));
        assert_eq!(ImageFormat::from_magic_bytes(&raster.bytes), Some(ImageFormat::Png));

        let decoded = SourceImage::decode(&raster.bytes).unwrap();
        assert_eq!(decoded.natural_width(), 900);
    }

    #[test]
    fn test_export_changes_with_annotations() {
        let mut session = session();
        let mut exporter = Exporter::default();
        let empty = exporter.export(&session).unwrap();

        session.pointer_down(Point::new(100.0, 100.0));
        let one = exporter.export(&session).unwrap();
        assert_ne!(empty.bytes, one.bytes);

        session.undo();
        assert_eq!(exporter.export(&session).unwrap(), empty);
    }

    #[test]
    fn test_original_raster_ignores_annotations() {
        let mut session = session();
        let exporter = Exporter::default();
        let before = exporter.original_raster(&session).unwrap();
        assert_eq!((before.width, before.height), (1200, 800));

        session.pointer_down(Point::new(10.0, 10.0));
        session.set_tool("rect");
        session.pointer_down(Point::new(20.0, 20.0));
        session.pointer_up(Point::new(200.0, 200.0));
        assert_eq!(exporter.original_raster(&session).unwrap(), before);

        let decoded = SourceImage::decode(&before.bytes).unwrap();
        assert_eq!(*decoded.pixels().get_pixel(3, 4), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_export_excludes_candidate() {
        let mut session = session();
        let mut exporter = Exporter::default();
        let clean = exporter.export(&session).unwrap();

        session.set_tool("circle");
        session.pointer_down(Point::new(300.0, 300.0));
        session.pointer_move(Point::new(360.0, 300.0));
        assert!(session.is_drawing());
        assert_eq!(exporter.export(&session).unwrap(), clean);
    }

    #[test]
    fn test_minimum_size_rejection_leaves_export_unchanged() {
        let mut session = session();
        let mut exporter = Exporter::default();
        let clean = exporter.export(&session).unwrap();

        session.set_tool("rect");
        session.pointer_down(Point::new(10.0, 10.0));
        session.pointer_up(Point::new(12.0, 11.0));
        assert!(session.annotations().is_empty());
        assert_eq!(exporter.export(&session).unwrap(), clean);
    }

    #[test]
    fn test_jpeg_export() {
        let session = session();
        let mut exporter = Exporter::new(ExportSettings {
            format: RasterFormat::Jpeg,
            quality: 70,
        });
        let raster = exporter.export(&session).unwrap();
        assert_eq!(raster.mime_type(), "image/jpeg");
        assert_eq!(ImageFormat::from_magic_bytes(&raster.bytes), Some(ImageFormat::Jpeg));
        assert!(raster.to_data_url().starts_with("data:image/jpeg;base64,/9j/"));
    }

    #[test]
    fn test_data_url() {
        let raster = EncodedRaster {
            format: RasterFormat::Png,
            width: 1,
            height: 1,
            bytes: vec![1, 2, 3],
        };
        assert_eq!(raster.to_data_url(), "data:image/png;base64,AQID");
    }

    #[test]
    fn test_uninitialized_export_fails() {
        let session = MarkupSession::default();
        let mut exporter = Exporter::default();
        assert!(matches!(exporter.export(&session), Err(ExportError::NotInitialized)));
        assert!(matches!(
            exporter.original_raster(&session),
            Err(ExportError::NotInitialized)
        ));
        assert!(exporter.capture_record(&session, "Roof", "").is_err());
    }

    #[test]
    fn test_capture_record() {
        let mut session = session();
        session.pointer_down(Point::new(50.0, 60.0));
        let record = Exporter::default()
            .capture_record(&session, "Kitchen", "Loose tile")
            .unwrap();
        assert_eq!(record.section, "Kitchen");
        assert_eq!(record.annotation, "Loose tile");
        assert!(record.original.starts_with("data:image/png;base64,"));
        assert!(record.marked.starts_with("data:image/png;base64,"));
        assert_eq!(record.marks, session.snapshot());
    }
}
