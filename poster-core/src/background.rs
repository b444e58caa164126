//! The background layer and how it is fitted to the viewport.

use serde::{Deserialize, Serialize};

use crate::{Bitmap, ObjectId, Point, Scale};

/// Fixed canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Create a viewport. Zero dimensions are clamped to one pixel.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Dimensions as floats.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn size(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(500, 650)
    }
}

/// How a background image is fitted to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundFit {
    /// Scale each axis independently to fill the viewport exactly.
    #[default]
    Stretch,
    /// Uniform scale so the whole image is visible, centred.
    Contain,
    /// Uniform scale so the image covers the viewport, centred and cropped.
    Cover,
}

impl BackgroundFit {
    /// Compute the placement of an image of `image_size` in `viewport`.
    #[must_use]
    pub fn place(self, image_size: (f32, f32), viewport: Viewport) -> (Point, Scale) {
        let (vw, vh) = viewport.size();
        let (iw, ih) = image_size;
        let sx = vw / iw;
        let sy = vh / ih;

        let uniform = match self {
            Self::Stretch => return (Point::default(), Scale::new(sx, sy)),
            Self::Contain => sx.min(sy),
            Self::Cover => sx.max(sy),
        };

        let offset = Point::new(
            (vw - iw * uniform) / 2.0,
            (vh - ih * uniform) / 2.0,
        );
        (offset, Scale::uniform(uniform))
    }
}

/// The single background image layer.
///
/// Backgrounds are never selectable or movable and never appear in the
/// scene's object list.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundLayer {
    /// Identity of this layer, used to tell the session default apart.
    pub id: ObjectId,
    /// Decoded pixels.
    pub source: Bitmap,
    /// Top-left offset.
    pub position: Point,
    /// Scale factors.
    pub scale: Scale,
}

impl BackgroundLayer {
    /// Fit a bitmap to the viewport.
    #[must_use]
    pub fn fitted(source: Bitmap, viewport: Viewport, fit: BackgroundFit) -> Self {
        let (position, scale) = fit.place(source.size(), viewport);
        Self {
            id: ObjectId::new(),
            source,
            position,
            scale,
        }
    }

    /// Rendered width and height in canvas pixels.
    #[must_use]
    pub fn rendered_size(&self) -> (f32, f32) {
        let (w, h) = self.source.size();
        (w * self.scale.x, h * self.scale.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_stretch_is_non_uniform() {
        let (pos, scale) = BackgroundFit::Stretch.place((1000.0, 1000.0), Viewport::default());
        assert_eq!(pos, Point::default());
        assert!(approx(scale.x, 0.5));
        assert!(approx(scale.y, 0.65));
    }

    #[test]
    fn test_contain_letterboxes() {
        let (pos, scale) = BackgroundFit::Contain.place((1000.0, 1000.0), Viewport::default());
        assert!(approx(scale.x, 0.5) && approx(scale.y, 0.5));
        assert!(approx(pos.x, 0.0));
        assert!(approx(pos.y, 75.0));
    }

    #[test]
    fn test_cover_crops() {
        let (pos, scale) = BackgroundFit::Cover.place((1000.0, 1000.0), Viewport::default());
        assert!(approx(scale.x, 0.65) && approx(scale.y, 0.65));
        assert!(approx(pos.x, -75.0));
        assert!(approx(pos.y, 0.0));
    }

    #[test]
    fn test_fitted_layer_fills_viewport() {
        let bitmap = Bitmap::solid(1000, 1000, [0, 0, 255, 255]).expect("bitmap");
        let layer = BackgroundLayer::fitted(bitmap, Viewport::default(), BackgroundFit::Stretch);
        let (w, h) = layer.rendered_size();
        assert!(approx(w, 500.0));
        assert!(approx(h, 650.0));
    }

    #[test]
    fn test_viewport_clamps_zero() {
        assert_eq!(Viewport::new(0, 0), Viewport::new(1, 1));
    }
}
