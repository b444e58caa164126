//! Scene export to raster image formats.
//!
//! Export always covers the full viewport. Objects outside it are clipped,
//! not reported.

use image::ImageEncoder;
use poster_core::Scene;

use crate::compositor::{pixmap_to_frame, Compositor};
use crate::error::{RenderError, RenderResult};

/// File name used for exported posters.
pub const DEFAULT_FILE_NAME: &str = "zadanie-rekrutacyjne.png";

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// PNG image.
    #[default]
    Png,
    /// JPEG image, flattened onto the configured matte.
    Jpeg,
}

impl ExportFormat {
    /// Conventional file extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    /// MIME type.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// Configuration for scene export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// JPEG quality 1-100 (default: 85).
    pub jpeg_quality: u8,
    /// Matte colour behind translucent pixels when exporting JPEG.
    pub jpeg_matte: [u8; 3],
    /// Export scenes with no objects and the default background instead of
    /// failing with [`RenderError::EmptyScene`].
    pub allow_empty: bool,
    /// File name for the exported image.
    pub file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 85,
            jpeg_matte: [255, 255, 255],
            allow_empty: false,
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }
}

/// An encoded export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Encoding used.
    pub format: ExportFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Encoded bytes.
    pub bytes: Vec<u8>,
    /// Suggested file name.
    pub file_name: String,
}

/// Exports a [`Scene`] to raster image formats.
pub struct SceneExporter {
    compositor: Compositor,
    config: ExportConfig,
}

impl SceneExporter {
    /// Create a new exporter.
    #[must_use]
    pub fn new(compositor: Compositor, config: ExportConfig) -> Self {
        Self { compositor, config }
    }

    /// Create an exporter with default compositor and export settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the compositor cannot be created.
    pub fn with_defaults() -> RenderResult<Self> {
        Ok(Self::new(Compositor::with_defaults()?, ExportConfig::default()))
    }

    /// The compositor used for rendering.
    #[must_use]
    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Get the export configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export a scene to the specified format.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::EmptyScene`] if there is nothing to export,
    /// or an error if the scene cannot be rendered or encoded.
    pub fn export(&self, scene: &Scene, format: ExportFormat) -> RenderResult<EncodedImage> {
        if scene.is_blank() && !self.config.allow_empty {
            tracing::debug!("Skipping export of blank scene");
            return Err(RenderError::EmptyScene);
        }

        let pixmap = self.compositor.render_pixmap(scene)?;
        let (width, height) = (pixmap.width(), pixmap.height());

        let bytes = match format {
            ExportFormat::Png => pixmap
                .encode_png()
                .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}")))?,
            ExportFormat::Jpeg => self.encode_jpeg(&pixmap)?,
        };

        tracing::info!(
            "Exported {width}x{height} {} ({} bytes)",
            format.extension(),
            bytes.len()
        );

        Ok(EncodedImage {
            format,
            width,
            height,
            bytes,
            file_name: self.file_name_for(format),
        })
    }

    fn encode_jpeg(&self, pixmap: &tiny_skia::Pixmap) -> RenderResult<Vec<u8>> {
        let frame = pixmap_to_frame(pixmap);
        let matte = self.config.jpeg_matte;

        let mut rgb = Vec::with_capacity(frame.as_raw().len() / 4 * 3);
        for pixel in frame.pixels() {
            let alpha = u16::from(pixel.0[3]);
            let inv = 255 - alpha;
            for channel in 0..3 {
                let src = u16::from(pixel.0[channel]);
                let bg = u16::from(matte[channel]);
                let blended = (src * alpha + bg * inv + 127) / 255;
                #[allow(clippy::cast_possible_truncation)]
                rgb.push(blended as u8);
            }
        }

        let mut buf = std::io::Cursor::new(Vec::new());
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, self.config.jpeg_quality)
            .write_image(&rgb, frame.width(), frame.height(), image::ExtendedColorType::Rgb8)
            .map_err(|e| RenderError::Encode(format!("JPEG encoding failed: {e}")))?;

        Ok(buf.into_inner())
    }

    /// The configured file name with its extension matched to `format`.
    fn file_name_for(&self, format: ExportFormat) -> String {
        let name = &self.config.file_name;
        let stem = name.rsplit_once('.').map_or(name.as_str(), |(stem, _)| stem);
        format!("{stem}.{}", format.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poster_core::{Bitmap, TextStyle};

    const PNG_MAGIC: [u8; 4] = [137, 80, 78, 71];

    fn exporter(config: ExportConfig) -> SceneExporter {
        SceneExporter::new(Compositor::with_defaults().expect("compositor"), config)
    }

    #[test]
    fn test_blank_scene_is_rejected() {
        let scene = Scene::default();
        let err = exporter(ExportConfig::default())
            .export(&scene, ExportFormat::Png)
            .expect_err("blank scene");
        assert!(matches!(err, RenderError::EmptyScene));
    }

    #[test]
    fn test_allow_empty_exports_blank_scene() {
        let scene = Scene::new(40, 40);
        let config = ExportConfig {
            allow_empty: true,
            ..Default::default()
        };
        let encoded = exporter(config).export(&scene, ExportFormat::Png).expect("png");
        assert_eq!(&encoded.bytes[0..4], &PNG_MAGIC);
        assert_eq!((encoded.width, encoded.height), (40, 40));
    }

    #[test]
    fn test_custom_background_alone_is_exportable() {
        let mut scene = Scene::new(40, 40);
        scene.set_background_bitmap(Bitmap::solid(8, 8, [0, 0, 0, 255]).expect("bitmap"));
        let encoded = exporter(ExportConfig::default())
            .export(&scene, ExportFormat::Png)
            .expect("png");
        assert_eq!(encoded.file_name, DEFAULT_FILE_NAME);
    }

    #[test]
    fn test_jpeg_export_produces_valid_bytes() {
        let mut scene = Scene::new(100, 100);
        scene.add_text("Test", TextStyle::default());

        let encoded = exporter(ExportConfig::default())
            .export(&scene, ExportFormat::Jpeg)
            .expect("jpeg");
        assert_eq!(encoded.bytes[0], 0xFF);
        assert_eq!(encoded.bytes[1], 0xD8);
        assert_eq!(encoded.file_name, "zadanie-rekrutacyjne.jpg");
    }

    #[test]
    fn test_file_name_extension_follows_format() {
        let exporter = exporter(ExportConfig {
            file_name: "poster".to_string(),
            ..Default::default()
        });
        assert_eq!(exporter.file_name_for(ExportFormat::Png), "poster.png");
        assert_eq!(exporter.file_name_for(ExportFormat::Jpeg), "poster.jpg");
    }

    #[test]
    fn test_format_metadata() {
        assert_eq!(ExportFormat::default(), ExportFormat::Png);
        assert_eq!(ExportFormat::Png.mime(), "image/png");
        assert_eq!(ExportFormat::Jpeg.extension(), "jpg");
    }
}
