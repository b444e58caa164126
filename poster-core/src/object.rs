//! Placeable scene objects - the text and images a poster is built from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Bitmap, Color};

/// Font size used when a text style does not specify one.
pub const DEFAULT_FONT_SIZE: f32 = 40.0;

/// Line height multiplier for multi-line text.
pub const DEFAULT_LINE_HEIGHT: f32 = 1.16;

/// Unique identifier for a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Create a new unique object ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ObjectId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A point in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Pixels from the left edge.
    pub x: f32,
    /// Pixels from the top edge.
    pub y: f32,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Independent horizontal and vertical scale factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    /// Horizontal scale.
    pub x: f32,
    /// Vertical scale.
    pub y: f32,
}

impl Scale {
    /// No scaling.
    pub const IDENTITY: Self = Self::new(1.0, 1.0);

    /// Create a scale.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Same factor on both axes.
    #[must_use]
    pub const fn uniform(factor: f32) -> Self {
        Self::new(factor, factor)
    }

    /// Whether both factors are finite and strictly positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.x > 0.0 && self.y > 0.0
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Typography settings for a text object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font size in pixels.
    pub font_size: f32,
    /// Line height as a multiple of the font size.
    pub line_height: f32,
    /// Font family override. `None` uses the compositor's family.
    pub font_family: Option<String>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            line_height: DEFAULT_LINE_HEIGHT,
            font_family: None,
        }
    }
}

impl TextStyle {
    /// Set the font size.
    #[must_use]
    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    /// Set the font family.
    #[must_use]
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }
}

/// Text content and its fill.
#[derive(Debug, Clone, PartialEq)]
pub struct TextObject {
    /// Text content. Lines are separated by `\n`.
    pub content: String,
    /// Fill colour.
    pub fill: Color,
    /// Typography.
    pub style: TextStyle,
}

impl TextObject {
    /// Content split into lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }
}

/// A decoded image placed on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageObject {
    /// Decoded pixel source.
    pub source: Bitmap,
}

/// The type of content an object contains.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    /// A text label.
    Text(TextObject),
    /// A raster image.
    Image(ImageObject),
}

impl ObjectKind {
    /// Short name for logs and summaries.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Image(_) => "image",
        }
    }
}

/// A placeable object with content and placement.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    /// Unique identifier.
    pub id: ObjectId,
    /// Object content.
    pub kind: ObjectKind,
    /// Top-left offset in canvas coordinates.
    pub position: Point,
    /// Scale factors applied around the top-left corner.
    pub scale: Scale,
    /// Whether the object can become the active selection.
    pub selectable: bool,
    /// Whether the object can be moved and scaled.
    pub movable: bool,
}

impl SceneObject {
    /// Create a new object with the given kind.
    #[must_use]
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            id: ObjectId::new(),
            kind,
            position: Point::default(),
            scale: Scale::IDENTITY,
            selectable: true,
            movable: true,
        }
    }

    /// Create a text object.
    #[must_use]
    pub fn text(content: impl Into<String>, fill: Color, style: TextStyle) -> Self {
        Self::new(ObjectKind::Text(TextObject {
            content: content.into(),
            fill,
            style,
        }))
    }

    /// Create an image object.
    #[must_use]
    pub fn image(source: Bitmap) -> Self {
        Self::new(ObjectKind::Image(ImageObject { source }))
    }

    /// Set the position.
    #[must_use]
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Set the scale.
    #[must_use]
    pub fn with_scale(mut self, scale: Scale) -> Self {
        self.scale = scale;
        self
    }

    /// Set whether the object is interactive.
    #[must_use]
    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.selectable = interactive;
        self.movable = interactive;
        self
    }

    /// Text content, if this is a text object.
    #[must_use]
    pub fn as_text(&self) -> Option<&TextObject> {
        match &self.kind {
            ObjectKind::Text(text) => Some(text),
            ObjectKind::Image(_) => None,
        }
    }

    /// Mutable text content, if this is a text object.
    pub fn as_text_mut(&mut self) -> Option<&mut TextObject> {
        match &mut self.kind {
            ObjectKind::Text(text) => Some(text),
            ObjectKind::Image(_) => None,
        }
    }

    /// Image content, if this is an image object.
    #[must_use]
    pub fn as_image(&self) -> Option<&ImageObject> {
        match &self.kind {
            ObjectKind::Image(image) => Some(image),
            ObjectKind::Text(_) => None,
        }
    }

    /// Whether this is a text object.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self.kind, ObjectKind::Text(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_ids_are_unique() {
        assert_ne!(ObjectId::new(), ObjectId::new());
    }

    #[test]
    fn test_object_id_parses_from_display() {
        let id = ObjectId::new();
        let parsed: ObjectId = id.to_string().parse().expect("uuid");
        assert_eq!(parsed, id);
        assert!("nonexistent-id".parse::<ObjectId>().is_err());
    }

    #[test]
    fn test_text_builder() {
        let obj = SceneObject::text("Hi", Color::RED, TextStyle::default())
            .with_position(Point::new(5.0, 6.0))
            .with_scale(Scale::uniform(2.0));

        assert!(obj.is_text());
        assert!(obj.selectable && obj.movable);
        assert_eq!(obj.position, Point::new(5.0, 6.0));
        assert_eq!(obj.scale, Scale::new(2.0, 2.0));
        let text = obj.as_text().expect("text variant");
        assert_eq!(text.fill, Color::RED);
        assert!((text.style.font_size - DEFAULT_FONT_SIZE).abs() < f32::EPSILON);
    }

    #[test]
    fn test_image_variant_has_no_text() {
        let bitmap = Bitmap::solid(2, 2, [0, 0, 0, 255]).expect("bitmap");
        let mut obj = SceneObject::image(bitmap).with_interactive(false);
        assert!(obj.as_text().is_none());
        assert!(obj.as_text_mut().is_none());
        assert!(obj.as_image().is_some());
        assert!(!obj.selectable && !obj.movable);
        assert_eq!(obj.kind.name(), "image");
    }

    #[test]
    fn test_multiline_text() {
        let obj = SceneObject::text("one\ntwo", Color::BLACK, TextStyle::default());
        let lines: Vec<_> = obj.as_text().expect("text").lines().collect();
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn test_scale_validation() {
        assert!(Scale::new(0.5, 0.65).is_valid());
        assert!(!Scale::new(0.0, 1.0).is_valid());
        assert!(!Scale::new(f32::NAN, 1.0).is_valid());
    }
}
