//! The scene: everything that is on the poster.

use crate::{
    BackgroundFit, BackgroundLayer, Bitmap, Color, DecodeOutcome, DecodeTarget, DecodeTicket,
    ObjectId, Point, Scale, SceneError, SceneObject, SceneResult, TextStyle, Viewport,
};

/// Where new text and images are placed.
pub const DEFAULT_INSERT_POSITION: Point = Point::new(50.0, 50.0);

/// Scale applied to newly inserted images.
pub const DEFAULT_IMAGE_SCALE: Scale = Scale::uniform(0.5);

/// Content used when text is added without any.
pub const DEFAULT_TEXT: &str = "Create your own Poster!";

/// Session-wide settings fixed when the scene is created.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    /// Canvas dimensions.
    pub viewport: Viewport,
    /// Solid fill painted beneath the background layer.
    pub background_color: Color,
    /// Background image restored on reset.
    pub default_background: Option<Bitmap>,
    /// How background images are fitted to the viewport.
    pub background_fit: BackgroundFit,
    /// Position of newly inserted objects.
    pub insert_position: Point,
    /// Scale of newly inserted images.
    pub image_scale: Scale,
    /// Initial text colour preference.
    pub text_color: Color,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            background_color: Color::PLUM,
            default_background: None,
            background_fit: BackgroundFit::Stretch,
            insert_position: DEFAULT_INSERT_POSITION,
            image_scale: DEFAULT_IMAGE_SCALE,
            text_color: Color::BLACK,
        }
    }
}

/// Stacking changes for [`Scene::reorder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrder {
    /// Paint last.
    BringToFront,
    /// Paint first.
    SendToBack,
    /// Swap with the object painted just after.
    BringForward,
    /// Swap with the object painted just before.
    SendBackward,
}

/// A poster scene: one optional background layer plus ordered objects.
///
/// Objects are painted in the order they appear in [`Scene::objects`];
/// later objects cover earlier ones.
#[derive(Debug, Clone)]
pub struct Scene {
    config: SceneConfig,
    /// Layer restored by [`Scene::clear`]; keeps its id across resets.
    default_background: Option<BackgroundLayer>,
    background: Option<BackgroundLayer>,
    objects: Vec<SceneObject>,
    active: Option<ObjectId>,
    text_color: Color,
    /// Bumped by every `clear`.
    generation: u64,
    next_seq: u64,
    /// Newest background request; older background decodes are stale.
    background_seq: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::with_config(SceneConfig::default())
    }
}

impl Scene {
    /// Create a new empty scene with the given viewport size and defaults.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_config(SceneConfig {
            viewport: Viewport::new(width, height),
            ..SceneConfig::default()
        })
    }

    /// Create a new empty scene from a configuration.
    #[must_use]
    pub fn with_config(config: SceneConfig) -> Self {
        let default_background = config.default_background.clone().map(|bitmap| {
            BackgroundLayer::fitted(bitmap, config.viewport, config.background_fit)
        });

        Self {
            text_color: config.text_color,
            background: default_background.clone(),
            default_background,
            objects: Vec::new(),
            active: None,
            generation: 0,
            next_seq: 0,
            background_seq: 0,
            config,
        }
    }

    /// Session configuration.
    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Canvas dimensions.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.config.viewport
    }

    /// Solid fill beneath the background layer.
    #[must_use]
    pub fn background_color(&self) -> Color {
        self.config.background_color
    }

    /// Current background layer.
    #[must_use]
    pub fn background(&self) -> Option<&BackgroundLayer> {
        self.background.as_ref()
    }

    /// Whether the background is still the session default.
    #[must_use]
    pub fn is_default_background(&self) -> bool {
        self.background.as_ref().map(|b| b.id) == self.default_background.as_ref().map(|b| b.id)
    }

    /// Objects in paint order.
    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    /// Get an object by ID.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Position of an object in paint order.
    #[must_use]
    pub fn paint_index(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    /// Get the number of objects in the scene.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Check if the scene has no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Whether there is nothing worth exporting: no objects and the default
    /// background.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.is_empty() && self.is_default_background()
    }

    /// ID of the active object.
    #[must_use]
    pub fn active_id(&self) -> Option<ObjectId> {
        self.active
    }

    /// The active object.
    #[must_use]
    pub fn active_object(&self) -> Option<&SceneObject> {
        self.active.and_then(|id| self.object(id))
    }

    /// Colour used for newly added text.
    #[must_use]
    pub fn text_color(&self) -> Color {
        self.text_color
    }

    /// Decode an image and make it the background.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Decode`] if the bytes cannot be decoded; the
    /// current background is kept.
    pub fn set_background(&mut self, image_bytes: &[u8]) -> SceneResult<()> {
        let bitmap = Bitmap::decode(image_bytes)?;
        self.set_background_bitmap(bitmap);
        Ok(())
    }

    /// Make an already decoded bitmap the background.
    ///
    /// Supersedes any background decode still in flight.
    pub fn set_background_bitmap(&mut self, bitmap: Bitmap) {
        self.background_seq = self.issue_seq();
        self.install_background(bitmap);
    }

    fn install_background(&mut self, bitmap: Bitmap) {
        let layer =
            BackgroundLayer::fitted(bitmap, self.config.viewport, self.config.background_fit);
        tracing::debug!(
            "Background set: {}x{} scaled ({}, {})",
            layer.source.width(),
            layer.source.height(),
            layer.scale.x,
            layer.scale.y
        );
        self.background = Some(layer);
    }

    /// Add a text object at the insert position in the current text colour
    /// and make it active.
    pub fn add_text(&mut self, content: impl Into<String>, style: TextStyle) -> ObjectId {
        let object = SceneObject::text(content, self.text_color, style)
            .with_position(self.config.insert_position);
        let id = object.id;
        self.objects.push(object);
        self.active = Some(id);
        tracing::debug!("Text added: {id}");
        id
    }

    /// Decode an image and add it at the insert position. The active object
    /// is not changed.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Decode`] if the bytes cannot be decoded; the
    /// scene is unchanged.
    pub fn add_image(&mut self, image_bytes: &[u8]) -> SceneResult<ObjectId> {
        let bitmap = Bitmap::decode(image_bytes)?;
        Ok(self.add_image_bitmap(bitmap))
    }

    /// Add an already decoded bitmap as an image object.
    pub fn add_image_bitmap(&mut self, bitmap: Bitmap) -> ObjectId {
        let object = SceneObject::image(bitmap)
            .with_position(self.config.insert_position)
            .with_scale(self.config.image_scale);
        let id = object.id;
        self.objects.push(object);
        tracing::debug!("Image added: {id}");
        id
    }

    /// Set the text colour preference and recolour the active object if it
    /// is text.
    ///
    /// Returns `true` if an object was recoloured.
    pub fn set_active_object_color(&mut self, color: Color) -> bool {
        self.text_color = color;
        match self.active_text_mut() {
            Some(text) => {
                text.fill = color;
                true
            }
            None => false,
        }
    }

    /// Replace the content of the active object if it is text.
    ///
    /// Returns `true` if an object was edited.
    pub fn set_active_text(&mut self, content: impl Into<String>) -> bool {
        match self.active_text_mut() {
            Some(text) => {
                text.content = content.into();
                true
            }
            None => false,
        }
    }

    fn active_text_mut(&mut self) -> Option<&mut crate::TextObject> {
        let id = self.active?;
        self.objects
            .iter_mut()
            .find(|o| o.id == id)
            .and_then(SceneObject::as_text_mut)
    }

    /// Remove an object from the scene.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn remove_object(&mut self, id: ObjectId) -> SceneResult<SceneObject> {
        let index = self.paint_index(id).ok_or(SceneError::NotFound(id))?;
        if self.active == Some(id) {
            self.active = None;
        }
        tracing::debug!("Object removed: {id}");
        Ok(self.objects.remove(index))
    }

    /// Remove the active object, if any.
    pub fn remove_active_object(&mut self) -> Option<SceneObject> {
        let id = self.active?;
        self.remove_object(id).ok()
    }

    /// Remove every object, clear the selection and restore the default
    /// background. Pending decodes issued before this call become stale.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.active = None;
        self.background = self.default_background.clone();
        self.generation += 1;
        tracing::debug!("Scene cleared (generation {})", self.generation);
    }

    /// Make an object the active selection.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NotFound`] if no selectable object has this ID;
    /// the current selection is kept.
    pub fn select(&mut self, id: ObjectId) -> SceneResult<()> {
        match self.object(id) {
            Some(object) if object.selectable => {
                self.active = Some(id);
                Ok(())
            }
            _ => Err(SceneError::NotFound(id)),
        }
    }

    /// Clear the active selection.
    pub fn deselect(&mut self) {
        self.active = None;
    }

    /// Move and scale an object.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found or is not movable, if
    /// the position is not finite, or if the scale is not finite and
    /// positive.
    pub fn transform_object(
        &mut self,
        id: ObjectId,
        position: Point,
        scale: Scale,
    ) -> SceneResult<()> {
        if !position.is_finite() {
            return Err(SceneError::InvalidOperation(format!(
                "position ({}, {}) must be finite",
                position.x, position.y
            )));
        }
        if !scale.is_valid() {
            return Err(SceneError::InvalidOperation(format!(
                "scale ({}, {}) must be finite and positive",
                scale.x, scale.y
            )));
        }

        let object = self
            .objects
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(SceneError::NotFound(id))?;
        if !object.movable {
            return Err(SceneError::InvalidOperation(format!("object {id} is not movable")));
        }

        object.position = position;
        object.scale = scale;
        Ok(())
    }

    /// Change where an object sits in paint order.
    ///
    /// Returns the object's new paint index.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn reorder(&mut self, id: ObjectId, order: ZOrder) -> SceneResult<usize> {
        let index = self.paint_index(id).ok_or(SceneError::NotFound(id))?;
        let last = self.objects.len() - 1;

        let target = match order {
            ZOrder::BringToFront => last,
            ZOrder::SendToBack => 0,
            ZOrder::BringForward => (index + 1).min(last),
            ZOrder::SendBackward => index.saturating_sub(1),
        };

        let object = self.objects.remove(index);
        self.objects.insert(target, object);
        Ok(target)
    }

    fn issue_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Issue a ticket for a decode that will complete later.
    ///
    /// A background ticket supersedes every earlier background request.
    pub fn begin_decode(&mut self, target: DecodeTarget) -> DecodeTicket {
        let seq = self.issue_seq();
        if target == DecodeTarget::Background {
            self.background_seq = seq;
        }
        DecodeTicket {
            target,
            seq,
            generation: self.generation,
        }
    }

    /// Whether a completion for this ticket would still be applied.
    #[must_use]
    pub fn is_current(&self, ticket: &DecodeTicket) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        match ticket.target {
            DecodeTarget::Background => ticket.seq == self.background_seq,
            DecodeTarget::Image => true,
        }
    }

    /// Install a decoded bitmap for a ticket, unless the ticket went stale.
    pub fn finish_decode(&mut self, ticket: DecodeTicket, bitmap: Bitmap) -> DecodeOutcome {
        if !self.is_current(&ticket) {
            tracing::debug!("Discarding stale {:?} decode #{}", ticket.target, ticket.seq);
            return DecodeOutcome::Discarded;
        }

        match ticket.target {
            DecodeTarget::Background => {
                self.install_background(bitmap);
                DecodeOutcome::BackgroundSet
            }
            DecodeTarget::Image => DecodeOutcome::ImageAdded(self.add_image_bitmap(bitmap)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap(rgba: [u8; 4]) -> Bitmap {
        Bitmap::solid(10, 10, rgba).expect("bitmap")
    }

    #[test]
    fn test_scene_add_remove() {
        let mut scene = Scene::new(800, 600);
        assert!(scene.is_empty());

        let id = scene.add_text("Hello", TextStyle::default());
        assert_eq!(scene.object_count(), 1);
        assert!(scene.object(id).is_some());
        assert_eq!(scene.active_id(), Some(id));

        scene.remove_object(id).expect("should remove");
        assert!(scene.is_empty());
        assert_eq!(scene.active_id(), None);
    }

    #[test]
    fn test_text_uses_insert_position_and_text_color() {
        let mut scene = Scene::default();
        scene.set_active_object_color(Color::BLUE);
        let id = scene.add_text(DEFAULT_TEXT, TextStyle::default());

        let object = scene.object(id).expect("text");
        assert_eq!(object.position, DEFAULT_INSERT_POSITION);
        assert_eq!(object.as_text().expect("text").fill, Color::BLUE);
    }

    #[test]
    fn test_image_does_not_change_selection() {
        let mut scene = Scene::default();
        let text = scene.add_text("a", TextStyle::default());
        let image = scene.add_image_bitmap(bitmap([0, 0, 0, 255]));

        assert_eq!(scene.active_id(), Some(text));
        let object = scene.object(image).expect("image");
        assert_eq!(object.scale, DEFAULT_IMAGE_SCALE);
        assert_eq!(object.position, DEFAULT_INSERT_POSITION);
    }

    #[test]
    fn test_recolor_only_touches_text() {
        let mut scene = Scene::default();
        let image = scene.add_image_bitmap(bitmap([0, 0, 0, 255]));
        scene.select(image).expect("select image");

        assert!(!scene.set_active_object_color(Color::RED));
        assert_eq!(scene.text_color(), Color::RED);
        assert!(!scene.set_active_text("nope"));
    }

    #[test]
    fn test_select_unknown_keeps_selection() {
        let mut scene = Scene::default();
        let id = scene.add_text("a", TextStyle::default());

        let err = scene.select(ObjectId::new()).expect_err("unknown id");
        assert!(matches!(err, SceneError::NotFound(_)));
        assert_eq!(scene.active_id(), Some(id));
    }

    #[test]
    fn test_clear_restores_default_background() {
        let config = SceneConfig {
            default_background: Some(bitmap([1, 2, 3, 255])),
            ..SceneConfig::default()
        };
        let mut scene = Scene::with_config(config);
        let default_id = scene.background().map(|b| b.id);
        assert!(scene.is_default_background());

        scene.set_background_bitmap(bitmap([9, 9, 9, 255]));
        scene.add_text("a", TextStyle::default());
        assert!(!scene.is_default_background());

        scene.clear();
        assert!(scene.is_empty());
        assert_eq!(scene.active_id(), None);
        assert_eq!(scene.background().map(|b| b.id), default_id);
        assert!(scene.is_blank());
    }

    #[test]
    fn test_reorder() {
        let mut scene = Scene::default();
        let a = scene.add_text("a", TextStyle::default());
        let b = scene.add_text("b", TextStyle::default());
        let c = scene.add_text("c", TextStyle::default());

        assert_eq!(scene.reorder(a, ZOrder::BringToFront).expect("front"), 2);
        let order: Vec<_> = scene.objects().map(|o| o.id).collect();
        assert_eq!(order, vec![b, c, a]);

        assert_eq!(scene.reorder(a, ZOrder::SendBackward).expect("backward"), 1);
        assert_eq!(scene.reorder(b, ZOrder::SendBackward).expect("noop"), 0);
        assert_eq!(scene.reorder(c, ZOrder::BringForward).expect("forward"), 2);
        assert_eq!(scene.reorder(c, ZOrder::SendToBack).expect("back"), 0);
        assert!(scene.reorder(ObjectId::new(), ZOrder::SendToBack).is_err());
    }

    #[test]
    fn test_transform_rejects_bad_scale() {
        let mut scene = Scene::default();
        let id = scene.add_text("a", TextStyle::default());
        assert!(scene
            .transform_object(id, Point::new(1.0, 1.0), Scale::new(0.0, 1.0))
            .is_err());
        scene
            .transform_object(id, Point::new(10.0, 20.0), Scale::new(2.0, 3.0))
            .expect("transform");
        let object = scene.object(id).expect("object");
        assert_eq!(object.position, Point::new(10.0, 20.0));
        assert_eq!(object.scale, Scale::new(2.0, 3.0));
    }

    #[test]
    fn test_transform_rejects_non_finite_position() {
        let mut scene = Scene::default();
        let id = scene.add_text("a", TextStyle::default());

        let err = scene
            .transform_object(id, Point::new(f32::NAN, f32::INFINITY), Scale::IDENTITY)
            .expect_err("non-finite position");
        assert!(matches!(err, SceneError::InvalidOperation(_)));
        assert_eq!(
            scene.object(id).expect("object").position,
            DEFAULT_INSERT_POSITION
        );
    }

    #[test]
    fn test_stale_image_decode_discarded_after_clear() {
        let mut scene = Scene::default();
        let ticket = scene.begin_decode(DecodeTarget::Image);
        scene.clear();

        assert!(!scene.is_current(&ticket));
        let outcome = scene.finish_decode(ticket, bitmap([0, 0, 0, 255]));
        assert_eq!(outcome, DecodeOutcome::Discarded);
        assert!(scene.is_empty());
    }

    #[test]
    fn test_newer_background_request_wins() {
        let mut scene = Scene::default();
        let first = scene.begin_decode(DecodeTarget::Background);
        let second = scene.begin_decode(DecodeTarget::Background);

        assert_eq!(
            scene.finish_decode(second, bitmap([2, 2, 2, 255])),
            DecodeOutcome::BackgroundSet
        );
        assert_eq!(
            scene.finish_decode(first, bitmap([1, 1, 1, 255])),
            DecodeOutcome::Discarded
        );
        let layer = scene.background().expect("background");
        assert_eq!(&layer.source.pixels()[0..4], &[2, 2, 2, 255]);
    }

    #[test]
    fn test_sync_background_supersedes_pending() {
        let mut scene = Scene::default();
        let pending = scene.begin_decode(DecodeTarget::Background);
        scene.set_background_bitmap(bitmap([5, 5, 5, 255]));

        assert_eq!(
            scene.finish_decode(pending, bitmap([1, 1, 1, 255])),
            DecodeOutcome::Discarded
        );
    }

    #[test]
    fn test_image_tickets_survive_unrelated_edits() {
        let mut scene = Scene::default();
        let ticket = scene.begin_decode(DecodeTarget::Image);
        scene.add_text("meanwhile", TextStyle::default());
        scene.set_background_bitmap(bitmap([5, 5, 5, 255]));

        let outcome = scene.finish_decode(ticket, bitmap([0, 0, 0, 255]));
        assert!(matches!(outcome, DecodeOutcome::ImageAdded(_)));
        assert_eq!(scene.object_count(), 2);
    }
}
