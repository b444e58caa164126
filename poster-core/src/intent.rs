//! Editing intents produced by the presentation layer.
//!
//! Every button or gesture in the editor maps to one [`Intent`], applied
//! synchronously to the scene that owns all state.

use crate::{Color, ObjectId, Point, Scale, Scene, SceneResult, TextStyle, ZOrder, DEFAULT_TEXT};

/// A requested change to the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Add a text object. `None` uses the default poster text.
    AddText {
        /// Text content.
        content: Option<String>,
        /// Typography.
        style: TextStyle,
    },
    /// Decode image bytes and add them as an image object.
    AddImage(Vec<u8>),
    /// Decode image bytes and make them the background.
    SetBackground(Vec<u8>),
    /// Pick a text colour; recolours the active text object.
    SetTextColor(Color),
    /// Replace the content of the active text object.
    EditText(String),
    /// Select an object.
    Select(ObjectId),
    /// Clear the selection.
    Deselect,
    /// Move and scale an object.
    Transform {
        /// Object to transform.
        id: ObjectId,
        /// New top-left position.
        position: Point,
        /// New scale.
        scale: Scale,
    },
    /// Change paint order.
    Reorder {
        /// Object to move.
        id: ObjectId,
        /// Stacking change.
        order: ZOrder,
    },
    /// Remove the active object.
    RemoveActive,
    /// Clear the poster back to its initial state.
    Reset,
}

impl Intent {
    /// Add the default poster text with the default style.
    #[must_use]
    pub fn add_default_text() -> Self {
        Self::AddText {
            content: None,
            style: TextStyle::default(),
        }
    }

    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddText { .. } => "add_text",
            Self::AddImage(_) => "add_image",
            Self::SetBackground(_) => "set_background",
            Self::SetTextColor(_) => "set_text_color",
            Self::EditText(_) => "edit_text",
            Self::Select(_) => "select",
            Self::Deselect => "deselect",
            Self::Transform { .. } => "transform",
            Self::Reorder { .. } => "reorder",
            Self::RemoveActive => "remove_active",
            Self::Reset => "reset",
        }
    }
}

/// What applying an intent did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// A new object was created.
    Added(ObjectId),
    /// An existing object or the background changed.
    Changed,
    /// The intent was valid but nothing changed.
    Unchanged,
}

impl Scene {
    /// Apply an intent.
    ///
    /// # Errors
    ///
    /// Returns the underlying operation's error; the scene is unchanged.
    pub fn apply(&mut self, intent: Intent) -> SceneResult<Applied> {
        tracing::debug!("Applying intent {}", intent.name());

        match intent {
            Intent::AddText { content, style } => {
                let content = content.unwrap_or_else(|| DEFAULT_TEXT.to_string());
                Ok(Applied::Added(self.add_text(content, style)))
            }
            Intent::AddImage(bytes) => self.add_image(&bytes).map(Applied::Added),
            Intent::SetBackground(bytes) => {
                self.set_background(&bytes)?;
                Ok(Applied::Changed)
            }
            Intent::SetTextColor(color) => Ok(changed_if(self.set_active_object_color(color))),
            Intent::EditText(content) => Ok(changed_if(self.set_active_text(content))),
            Intent::Select(id) => {
                let before = self.active_id();
                self.select(id)?;
                Ok(changed_if(before != Some(id)))
            }
            Intent::Deselect => {
                let had_selection = self.active_id().is_some();
                self.deselect();
                Ok(changed_if(had_selection))
            }
            Intent::Transform {
                id,
                position,
                scale,
            } => {
                self.transform_object(id, position, scale)?;
                Ok(Applied::Changed)
            }
            Intent::Reorder { id, order } => {
                let before = self.paint_index(id);
                let after = self.reorder(id, order)?;
                Ok(changed_if(before != Some(after)))
            }
            Intent::RemoveActive => Ok(changed_if(self.remove_active_object().is_some())),
            Intent::Reset => {
                self.clear();
                Ok(Applied::Changed)
            }
        }
    }
}

fn changed_if(changed: bool) -> Applied {
    if changed {
        Applied::Changed
    } else {
        Applied::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SceneError;

    #[test]
    fn test_default_text_intent() {
        let mut scene = Scene::default();
        let Applied::Added(id) = scene.apply(Intent::add_default_text()).expect("add") else {
            panic!("expected Added");
        };
        let text = scene.object(id).and_then(|o| o.as_text()).expect("text");
        assert_eq!(text.content, DEFAULT_TEXT);
    }

    #[test]
    fn test_recolor_intent_reports_change() {
        let mut scene = Scene::default();
        assert_eq!(
            scene.apply(Intent::SetTextColor(Color::RED)).expect("color"),
            Applied::Unchanged
        );
        scene.apply(Intent::add_default_text()).expect("add");
        assert_eq!(
            scene.apply(Intent::SetTextColor(Color::GREEN)).expect("color"),
            Applied::Changed
        );
    }

    #[test]
    fn test_bad_image_intent_leaves_scene_unchanged() {
        let mut scene = Scene::default();
        let err = scene
            .apply(Intent::AddImage(b"garbage".to_vec()))
            .expect_err("decode failure");
        assert!(matches!(err, SceneError::Decode(_)));
        assert!(scene.is_empty());

        assert!(scene.apply(Intent::SetBackground(Vec::new())).is_err());
        assert!(scene.is_default_background());
    }

    #[test]
    fn test_reset_and_remove_intents() {
        let mut scene = Scene::default();
        scene.apply(Intent::add_default_text()).expect("add");
        assert_eq!(scene.apply(Intent::RemoveActive).expect("remove"), Applied::Changed);
        assert_eq!(scene.apply(Intent::RemoveActive).expect("remove"), Applied::Unchanged);

        scene.apply(Intent::add_default_text()).expect("add");
        scene.apply(Intent::Reset).expect("reset");
        assert!(scene.is_empty());
        assert_eq!(scene.apply(Intent::Deselect).expect("deselect"), Applied::Unchanged);
    }
}
