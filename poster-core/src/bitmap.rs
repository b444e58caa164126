//! Decoded pixel sources for image objects and the background layer.
//!
//! Supports decoding raw file bytes in any format the `image` crate knows and
//! base64-encoded data URIs.

use std::fmt;
use std::sync::Arc;

use base64::Engine;

use crate::{SceneError, SceneResult};

/// Container format detected from the leading bytes of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// GIF (first frame only).
    Gif,
    /// WebP (alpha support).
    WebP,
    /// BMP.
    Bmp,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }

        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }
        if data.starts_with(b"GIF8") {
            return Self::Gif;
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }
        if data.starts_with(b"BM") {
            return Self::Bmp;
        }

        Self::Unknown
    }

    /// Detect format from MIME type.
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        match mime.to_ascii_lowercase().as_str() {
            "image/png" => Self::Png,
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/gif" => Self::Gif,
            "image/webp" => Self::WebP,
            "image/bmp" => Self::Bmp,
            _ => Self::Unknown,
        }
    }
}

/// A decoded RGBA8 (straight alpha) bitmap.
///
/// Pixel storage is reference counted, so cloning a bitmap or the objects
/// holding one never copies pixels. The buffer is released when the last
/// holder is dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
    format: ImageFormat,
}

impl Bitmap {
    /// Wrap raw RGBA8 pixels.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero or the buffer length does
    /// not match `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> SceneResult<Self> {
        if width == 0 || height == 0 {
            return Err(SceneError::Decode(format!(
                "image has empty dimensions {width}x{height}"
            )));
        }
        let expected = u64::from(width) * u64::from(height) * 4;
        if pixels.len() as u64 != expected {
            return Err(SceneError::Decode(format!(
                "expected {expected} bytes of RGBA data, got {}",
                pixels.len()
            )));
        }

        Ok(Self {
            width,
            height,
            pixels: pixels.into(),
            format: ImageFormat::Unknown,
        })
    }

    /// Create a bitmap filled with a single colour.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> SceneResult<Self> {
        let pixel_count = u64::from(width) * u64::from(height);
        #[allow(clippy::cast_possible_truncation)]
        let pixels = rgba.repeat(pixel_count as usize);
        Self::from_rgba(width, height, pixels)
    }

    /// Decode an image from raw file bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Decode`] if the bytes are not a supported image.
    pub fn decode(data: &[u8]) -> SceneResult<Self> {
        let format = ImageFormat::from_magic_bytes(data);

        let img = image::load_from_memory(data)
            .map_err(|e| SceneError::Decode(e.to_string()))?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut bitmap = Self::from_rgba(width, height, rgba.into_raw())?;
        bitmap.format = format;

        tracing::trace!("Decoded {format:?} image {width}x{height}");
        Ok(bitmap)
    }

    /// Decode an image from a data URI.
    ///
    /// Supports URIs like `data:image/png;base64,iVBORw0KGgo...`.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Decode`] if the URI is malformed, is not base64
    /// encoded, or the payload is not a supported image.
    pub fn from_data_uri(uri: &str) -> SceneResult<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| SceneError::Decode("not a data URI".to_string()))?;

        let (metadata, encoded) = rest
            .split_once(',')
            .ok_or_else(|| SceneError::Decode("invalid data URI: missing comma".to_string()))?;

        let Some(mime) = metadata.strip_suffix(";base64") else {
            return Err(SceneError::Decode(
                "only base64 data URIs are supported".to_string(),
            ));
        };

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| SceneError::Decode(format!("invalid base64 payload: {e}")))?;

        let declared = ImageFormat::from_mime(mime);
        let detected = ImageFormat::from_magic_bytes(&bytes);
        if declared != ImageFormat::Unknown && declared != detected {
            tracing::debug!("Data URI declares {declared:?} but payload looks like {detected:?}");
        }

        Self::decode(&bytes)
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Dimensions as floats, for placement arithmetic.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn size(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }

    /// RGBA8 pixel data, row-major, 4 bytes per pixel.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Format the bitmap was decoded from.
    #[must_use]
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Whether two bitmaps share the same pixel buffer.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}
