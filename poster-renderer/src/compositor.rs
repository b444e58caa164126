//! Scene rasterization.
//!
//! Builds the scene's SVG document and rasterizes it with resvg into a
//! tiny-skia pixmap sized exactly to the viewport.

use std::sync::Arc;

use image::RgbaImage;
use poster_core::Scene;
use usvg::fontdb;

use crate::error::{RenderError, RenderResult};
use crate::fonts;
use crate::svg::scene_to_svg;

/// A rendered frame: straight-alpha RGBA8, viewport sized.
pub type Frame = RgbaImage;

/// Configuration for the compositor.
#[derive(Debug, Clone)]
pub struct CompositorConfig {
    /// Font family for text without an explicit family.
    pub font_family: String,
    /// Enable anti-aliasing of text and shape edges.
    pub anti_aliasing: bool,
    /// Additional font files (raw TTF/OTF bytes) to make available.
    pub extra_fonts: Vec<Vec<u8>>,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            font_family: fonts::BUNDLED_FAMILY.to_string(),
            anti_aliasing: true,
            extra_fonts: Vec::new(),
        }
    }
}

/// Rasterizes scenes.
///
/// Rendering is a pure function of the scene: rendering the same scene
/// twice produces identical pixels.
pub struct Compositor {
    config: CompositorConfig,
    fontdb: Arc<fontdb::Database>,
}

impl Compositor {
    /// Create a new compositor with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled font cannot be loaded.
    pub fn new(config: CompositorConfig) -> RenderResult<Self> {
        let mut fontdb = fonts::bundled_database()?;
        if !config.extra_fonts.is_empty() {
            fontdb = fonts::with_extra_fonts(&fontdb, &config.extra_fonts);
        }

        Ok(Self { config, fontdb })
    }

    /// Create a compositor with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled font cannot be loaded.
    pub fn with_defaults() -> RenderResult<Self> {
        Self::new(CompositorConfig::default())
    }

    /// Get the compositor configuration.
    #[must_use]
    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Build the SVG document the rasterizer consumes.
    ///
    /// # Errors
    ///
    /// Returns an error if an image cannot be embedded.
    pub fn render_to_svg(&self, scene: &Scene) -> RenderResult<String> {
        scene_to_svg(scene, &self.config.font_family)
    }

    /// Render a scene into a pixmap.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene cannot be converted or rasterized.
    pub fn render_pixmap(&self, scene: &Scene) -> RenderResult<tiny_skia::Pixmap> {
        let svg = self.render_to_svg(scene)?;
        let viewport = scene.viewport();

        let options = self.usvg_options();
        let tree = usvg::Tree::from_str(&svg, &options)
            .map_err(|e| RenderError::Svg(e.to_string()))?;

        let mut pixmap = tiny_skia::Pixmap::new(viewport.width, viewport.height)
            .ok_or_else(|| {
                RenderError::Raster(format!(
                    "cannot allocate {}x{} pixmap",
                    viewport.width, viewport.height
                ))
            })?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        tracing::trace!(
            "Rendered {} object(s) into {}x{}",
            scene.object_count(),
            viewport.width,
            viewport.height
        );
        Ok(pixmap)
    }

    /// Render a scene into a straight-alpha RGBA frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene cannot be converted or rasterized.
    pub fn render(&self, scene: &Scene) -> RenderResult<Frame> {
        let pixmap = self.render_pixmap(scene)?;
        Ok(pixmap_to_frame(&pixmap))
    }

    fn usvg_options(&self) -> usvg::Options<'static> {
        let (shape_rendering, text_rendering) = if self.config.anti_aliasing {
            (
                usvg::ShapeRendering::GeometricPrecision,
                usvg::TextRendering::GeometricPrecision,
            )
        } else {
            (
                usvg::ShapeRendering::CrispEdges,
                usvg::TextRendering::OptimizeSpeed,
            )
        };

        usvg::Options {
            font_family: self.config.font_family.clone(),
            shape_rendering,
            text_rendering,
            fontdb: Arc::clone(&self.fontdb),
            ..usvg::Options::default()
        }
    }
}

/// Convert a premultiplied pixmap into a straight-alpha frame.
#[must_use]
pub fn pixmap_to_frame(pixmap: &tiny_skia::Pixmap) -> Frame {
    let mut frame = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in frame.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use poster_core::{Bitmap, Color, TextStyle};

    fn compositor() -> Compositor {
        Compositor::with_defaults().expect("compositor")
    }

    #[test]
    fn test_empty_scene_is_plum() {
        let scene = Scene::new(20, 30);
        let frame = compositor().render(&scene).expect("render");
        assert_eq!(frame.dimensions(), (20, 30));
        assert_eq!(frame.get_pixel(10, 10).0, [221, 160, 221, 255]);
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut scene = Scene::default();
        scene.add_text("Same every time", TextStyle::default());
        let bitmap = Bitmap::solid(40, 40, [0, 128, 255, 255]).expect("bitmap");
        scene.add_image_bitmap(bitmap);

        let compositor = compositor();
        let first = compositor.render(&scene).expect("first");
        let second = compositor.render(&scene).expect("second");
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn test_image_placement_and_scale() {
        let mut scene = Scene::default();
        let bitmap = Bitmap::solid(100, 100, [0, 255, 0, 255]).expect("bitmap");
        scene.add_image_bitmap(bitmap);

        let frame = compositor().render(&scene).expect("render");
        // 100x100 at (50, 50) scaled 0.5 covers 50..100 on both axes.
        assert_eq!(frame.get_pixel(75, 75).0, [0, 255, 0, 255]);
        assert_eq!(frame.get_pixel(120, 120).0, [221, 160, 221, 255]);
        assert_eq!(frame.get_pixel(40, 40).0, [221, 160, 221, 255]);
    }

    #[test]
    fn test_later_objects_occlude_earlier() {
        let mut scene = Scene::default();
        scene.add_image_bitmap(Bitmap::solid(100, 100, [255, 0, 0, 255]).expect("red"));
        scene.add_image_bitmap(Bitmap::solid(100, 100, [0, 0, 255, 255]).expect("blue"));

        let frame = compositor().render(&scene).expect("render");
        assert_eq!(frame.get_pixel(75, 75).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_text_renders_in_fill_color() {
        let mut scene = Scene::default();
        scene.add_text("Hello", TextStyle::default());
        scene.set_active_object_color(Color::RED);

        let frame = compositor().render(&scene).expect("render");
        let red_pixels = frame
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] > 200 && p.0[1] < 60 && p.0[2] < 60)
            .count();
        assert!(red_pixels > 50, "expected red glyph pixels, got {red_pixels}");
    }

    #[test]
    fn test_offscreen_objects_are_clipped() {
        let mut scene = Scene::new(50, 50);
        let id = scene.add_image_bitmap(Bitmap::solid(10, 10, [0, 0, 0, 255]).expect("bitmap"));
        scene
            .transform_object(
                id,
                poster_core::Point::new(500.0, 500.0),
                poster_core::Scale::IDENTITY,
            )
            .expect("move");

        let frame = compositor().render(&scene).expect("render");
        assert!(frame.pixels().all(|p| p.0 == [221, 160, 221, 255]));
    }

    #[test]
    fn test_text_with_control_characters_renders() {
        let mut scene = Scene::default();
        scene.add_text("Hello\u{1}World", TextStyle::default());
        scene.set_active_object_color(Color::RED);

        let frame = compositor().render(&scene).expect("render");
        let red_pixels = frame
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] > 200 && p.0[1] < 60 && p.0[2] < 60)
            .count();
        assert!(red_pixels > 50, "expected red glyph pixels, got {red_pixels}");
    }
}
