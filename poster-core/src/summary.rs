//! Serializable snapshot of a scene for logs and tooling.
//!
//! Pixel data is never included; images are described by their dimensions.

use serde::{Deserialize, Serialize};

use crate::{Color, ObjectId, ObjectKind, Point, Scale, Scene, SceneResult, Viewport};

/// Description of one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSummary {
    /// Object ID.
    pub id: ObjectId,
    /// `"text"` or `"image"`.
    pub kind: String,
    /// Top-left position.
    pub position: Point,
    /// Scale factors.
    pub scale: Scale,
    /// Text content (text objects only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Fill colour (text objects only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,
    /// Source dimensions (image objects only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_size: Option<(u32, u32)>,
}

/// Description of a whole scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSummary {
    /// Canvas dimensions.
    pub viewport: Viewport,
    /// Canvas fill colour.
    pub background_color: Color,
    /// Background source dimensions, if a layer is set.
    pub background: Option<(u32, u32)>,
    /// Whether the background is the session default.
    pub default_background: bool,
    /// Active object ID.
    pub active: Option<ObjectId>,
    /// Current text colour preference.
    pub text_color: Color,
    /// Objects in paint order.
    pub objects: Vec<ObjectSummary>,
}

impl SceneSummary {
    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> SceneResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Scene {
    /// Snapshot the scene.
    #[must_use]
    pub fn summary(&self) -> SceneSummary {
        let objects = self
            .objects()
            .map(|object| {
                let mut summary = ObjectSummary {
                    id: object.id,
                    kind: object.kind.name().to_string(),
                    position: object.position,
                    scale: object.scale,
                    content: None,
                    fill: None,
                    source_size: None,
                };
                match &object.kind {
                    ObjectKind::Text(text) => {
                        summary.content = Some(text.content.clone());
                        summary.fill = Some(text.fill);
                    }
                    ObjectKind::Image(image) => {
                        summary.source_size = Some((image.source.width(), image.source.height()));
                    }
                }
                summary
            })
            .collect();

        SceneSummary {
            viewport: self.viewport(),
            background_color: self.background_color(),
            background: self
                .background()
                .map(|layer| (layer.source.width(), layer.source.height())),
            default_background: self.is_default_background(),
            active: self.active_id(),
            text_color: self.text_color(),
            objects,
        }
    }
}
