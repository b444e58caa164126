//! Scene to SVG conversion.
//!
//! The SVG document is the intermediate the rasterizer consumes. Layers are
//! written in paint order: canvas fill, background layer, then objects.

use std::fmt::Write;

use base64::Engine;
use image::ImageEncoder;
use poster_core::{
    Bitmap, Color, ImageObject, ObjectKind, Point, Scale, Scene, SceneObject, TextObject,
};

use crate::error::{RenderError, RenderResult};

/// Build the SVG document for a scene.
///
/// # Errors
///
/// Returns an error if an image cannot be embedded.
pub fn scene_to_svg(scene: &Scene, font_family: &str) -> RenderResult<String> {
    let viewport = scene.viewport();
    let (w, h) = (viewport.width, viewport.height);

    let mut svg = String::with_capacity(4096);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
    );

    let bg = scene.background_color();
    let _ = write!(
        svg,
        "<rect width=\"100%\" height=\"100%\" {}/>",
        fill_attrs(bg)
    );

    if let Some(layer) = scene.background() {
        write_image(&mut svg, &layer.source, layer.position, layer.scale)?;
    }

    for object in scene.objects() {
        write_object(&mut svg, object, font_family)?;
    }

    svg.push_str("</svg>");
    Ok(svg)
}

fn write_object(svg: &mut String, object: &SceneObject, font_family: &str) -> RenderResult<()> {
    match &object.kind {
        ObjectKind::Text(text) => {
            write_text(svg, text, object.position, object.scale, font_family);
            Ok(())
        }
        ObjectKind::Image(ImageObject { source }) => {
            write_image(svg, source, object.position, object.scale)
        }
    }
}

/// Text is anchored at its top-left corner; each line's baseline sits one
/// font size below the previous line's top.
fn write_text(
    svg: &mut String,
    text: &TextObject,
    position: Point,
    scale: Scale,
    font_family: &str,
) {
    let style = &text.style;
    let family = escape_xml(style.font_family.as_deref().unwrap_or(font_family));
    let font_size = style.font_size;
    let line_advance = font_size * style.line_height;

    let _ = write!(
        svg,
        "<g transform=\"{}\"><text font-family=\"{family}, sans-serif\" font-size=\"{font_size}\" {} xml:space=\"preserve\">",
        transform_attr(position, scale),
        fill_attrs(text.fill),
    );

    for (index, line) in text.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        #[allow(clippy::cast_precision_loss)]
        let baseline = font_size + line_advance * index as f32;
        let _ = write!(
            svg,
            "<tspan x=\"0\" y=\"{baseline}\">{}</tspan>",
            escape_xml(line)
        );
    }

    svg.push_str("</text></g>");
}

fn write_image(
    svg: &mut String,
    bitmap: &Bitmap,
    position: Point,
    scale: Scale,
) -> RenderResult<()> {
    let href = png_data_uri(bitmap)?;
    let _ = write!(
        svg,
        "<image x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\" transform=\"{}\" href=\"{href}\"/>",
        bitmap.width(),
        bitmap.height(),
        transform_attr(position, scale),
    );
    Ok(())
}

fn transform_attr(position: Point, scale: Scale) -> String {
    format!(
        "translate({} {}) scale({} {})",
        position.x, position.y, scale.x, scale.y
    )
}

fn fill_attrs(color: Color) -> String {
    let mut attrs = format!("fill=\"rgb({},{},{})\"", color.r, color.g, color.b);
    if !color.is_opaque() {
        let _ = write!(attrs, " fill-opacity=\"{}\"", color.opacity());
    }
    attrs
}

/// Re-encode a bitmap as a PNG data URI.
///
/// # Errors
///
/// Returns an error if PNG encoding fails.
pub fn png_data_uri(bitmap: &Bitmap) -> RenderResult<String> {
    let mut png = Vec::new();
    image::codecs::png::PngEncoder::new(&mut png)
        .write_image(
            bitmap.pixels(),
            bitmap.width(),
            bitmap.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}")))?;

    let encoded = base64::engine::general_purpose::STANDARD.encode(&png);
    Ok(format!("data:image/png;base64,{encoded}"))
}

/// Escape special XML characters and drop those XML 1.0 cannot carry.
fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if is_xml_char(c) => out.push(c),
            _ => {}
        }
    }
    out
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..
    )
}
