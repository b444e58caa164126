//! One editing session.
//!
//! The [`Editor`] owns the scene. Intents that need an image decode get a
//! ticket from the scene and run on a blocking worker; everything else is
//! applied directly. Results are applied in dispatch order:
//!
//! ```text
//! dispatch(AddImage)  ──► ticket #1 ──► worker ─┐
//! dispatch(AddText)   ──► queued behind #1      │
//!                                               ▼
//! poll_completions / settle ──► finish_decode(#1) ──► apply(AddText)
//! ```
//!
//! Both steps come back as [`Completion`]s, so a queued intent still reports
//! the object it created or the error it hit.
//!
//! A reset while decodes are in flight makes their tickets stale; the
//! scene discards them when they arrive.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use poster_core::{
    Applied, Bitmap, DecodeOutcome, DecodeTarget, DecodeTicket, Intent, Scene, SceneConfig,
    SceneResult, SceneSummary,
};
use poster_renderer::{
    Compositor, CompositorConfig, EncodedImage, ExportFormat, Frame, SceneExporter,
};
use tokio::task::{self, JoinError, JoinSet};

use crate::error::{EditorError, EditorResult};
use crate::EditorConfig;

/// How a dispatched intent was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// Applied to the scene immediately.
    Applied(Applied),
    /// Decode started; the result is applied by a later poll.
    Pending(DecodeTicket),
    /// Waiting for earlier decodes to finish. The number identifies the
    /// intent's [`Completion::Intent`].
    Queued(u64),
}

/// A step that finished after its dispatch returned.
#[derive(Debug)]
pub enum Completion {
    /// A decode finished.
    Decode {
        /// Ticket the decode was issued under.
        ticket: DecodeTicket,
        /// What the scene did with the result, or why there was none.
        outcome: EditorResult<DecodeOutcome>,
    },
    /// A queued intent was applied.
    Intent {
        /// Number returned in [`Dispatched::Queued`].
        seq: u64,
        /// What applying the intent did.
        outcome: SceneResult<Applied>,
    },
}

impl Completion {
    /// Whether the step failed.
    #[must_use]
    pub fn is_err(&self) -> bool {
        match self {
            Self::Decode { outcome, .. } => outcome.is_err(),
            Self::Intent { outcome, .. } => outcome.is_err(),
        }
    }
}

enum Step {
    Decode {
        ticket: DecodeTicket,
        result: Option<EditorResult<Bitmap>>,
    },
    Intent { seq: u64, intent: Intent },
}

impl Step {
    fn is_waiting(&self) -> bool {
        matches!(self, Self::Decode { result: None, .. })
    }
}

/// An editing session: the scene, its pending decodes and an exporter.
///
/// Dropping the editor releases every decoded bitmap and aborts workers
/// that have not started.
pub struct Editor {
    scene: Scene,
    exporter: SceneExporter,
    workers: JoinSet<SceneResult<Bitmap>>,
    tasks: HashMap<task::Id, u64>,
    queue: VecDeque<Step>,
    next_queued: u64,
    flushed: Vec<Completion>,
}

impl Editor {
    /// Create an editor for a new scene.
    #[must_use]
    pub fn new(scene_config: SceneConfig, exporter: SceneExporter) -> Self {
        Self {
            scene: Scene::with_config(scene_config),
            exporter,
            workers: JoinSet::new(),
            tasks: HashMap::new(),
            queue: VecDeque::new(),
            next_queued: 0,
            flushed: Vec::new(),
        }
    }

    /// Create an editor from configuration, loading any extra fonts.
    ///
    /// # Errors
    ///
    /// Returns an error if a font file cannot be read or the compositor
    /// cannot be created.
    pub async fn from_config(config: &EditorConfig) -> EditorResult<Self> {
        let mut extra_fonts = Vec::with_capacity(config.fonts.len());
        for path in &config.fonts {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| EditorError::io(path, e))?;
            tracing::debug!("Loaded font {} ({} bytes)", path.display(), bytes.len());
            extra_fonts.push(bytes);
        }

        let compositor = Compositor::new(CompositorConfig {
            extra_fonts,
            ..CompositorConfig::default()
        })?;
        let exporter = SceneExporter::new(compositor, config.export_config());

        Ok(Self::new(config.scene_config(), exporter))
    }

    /// The scene as currently applied.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Snapshot of the applied scene.
    #[must_use]
    pub fn summary(&self) -> SceneSummary {
        self.scene.summary()
    }

    /// Number of decodes not yet applied.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue
            .iter()
            .filter(|step| matches!(step, Step::Decode { .. }))
            .count()
    }

    /// Dispatch an intent.
    ///
    /// Image intents start a decode and return immediately. Other intents
    /// apply at once unless decodes dispatched earlier are still pending,
    /// in which case they wait their turn. [`Intent::Reset`] never waits.
    ///
    /// Must be called within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns the scene error of an intent applied immediately; the scene
    /// is unchanged. Errors of queued intents are reported in their
    /// [`Completion::Intent`].
    pub fn dispatch(&mut self, intent: Intent) -> EditorResult<Dispatched> {
        match intent {
            Intent::AddImage(bytes) => Ok(Dispatched::Pending(
                self.spawn_decode(DecodeTarget::Image, bytes),
            )),
            Intent::SetBackground(bytes) => Ok(Dispatched::Pending(
                self.spawn_decode(DecodeTarget::Background, bytes),
            )),
            Intent::Reset => {
                self.flush_queued_intents();
                Ok(Dispatched::Applied(self.scene.apply(Intent::Reset)?))
            }
            intent if self.queue.is_empty() => {
                Ok(Dispatched::Applied(self.scene.apply(intent)?))
            }
            intent => {
                self.next_queued += 1;
                let seq = self.next_queued;
                tracing::debug!(
                    "Queued {} #{seq} behind {} pending step(s)",
                    intent.name(),
                    self.queue.len()
                );
                self.queue.push_back(Step::Intent { seq, intent });
                Ok(Dispatched::Queued(seq))
            }
        }
    }

    /// Apply whatever has finished without waiting.
    ///
    /// Intents applied early by a reset are reported by the next call.
    pub fn poll_completions(&mut self) -> Vec<Completion> {
        while let Some(joined) = self.workers.try_join_next_with_id() {
            self.record(joined);
        }
        self.drain()
    }

    /// Wait for every pending decode and apply everything queued.
    pub async fn settle(&mut self) -> Vec<Completion> {
        let mut done = self.drain();
        while !self.queue.is_empty() {
            if let Some(joined) = self.workers.join_next_with_id().await {
                self.record(joined);
            } else {
                self.fail_orphans();
            }
            done.extend(self.drain());
        }
        done
    }

    /// Render the applied scene for display.
    ///
    /// # Errors
    ///
    /// Returns an error if rasterization fails.
    pub fn preview(&self) -> EditorResult<Frame> {
        Ok(self.exporter.compositor().render(&self.scene)?)
    }

    /// Export the applied scene. Pending decodes are not waited for.
    ///
    /// # Errors
    ///
    /// Returns [`poster_renderer::RenderError::EmptyScene`] for a blank
    /// poster, or an error if rendering or encoding fails.
    pub fn export(&self, format: ExportFormat) -> EditorResult<EncodedImage> {
        Ok(self.exporter.export(&self.scene, format)?)
    }

    /// Export the applied scene into `dir` under the configured file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the export fails or the file cannot be written.
    pub async fn export_to_dir(&self, dir: &Path, format: ExportFormat) -> EditorResult<PathBuf> {
        let encoded = self.export(format)?;

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| EditorError::io(dir, e))?;
        let path = dir.join(&encoded.file_name);
        tokio::fs::write(&path, &encoded.bytes)
            .await
            .map_err(|e| EditorError::io(&path, e))?;

        tracing::info!("Wrote {} ({} bytes)", path.display(), encoded.bytes.len());
        Ok(path)
    }

    /// End the session, abandoning pending decodes.
    pub fn shutdown(mut self) {
        let abandoned = self.pending();
        self.workers.abort_all();
        tracing::info!(
            "Session closed with {} object(s), {abandoned} decode(s) abandoned",
            self.scene.object_count()
        );
    }

    fn spawn_decode(&mut self, target: DecodeTarget, bytes: Vec<u8>) -> DecodeTicket {
        let ticket = self.scene.begin_decode(target);
        let handle = self.workers.spawn_blocking(move || Bitmap::decode(&bytes));
        self.tasks.insert(handle.id(), ticket.seq);
        self.queue.push_back(Step::Decode {
            ticket,
            result: None,
        });
        tracing::debug!("Started {target:?} decode #{}", ticket.seq);
        ticket
    }

    fn record(&mut self, joined: Result<(task::Id, SceneResult<Bitmap>), JoinError>) {
        let (id, result) = match joined {
            Ok((id, result)) => (id, result.map_err(EditorError::from)),
            Err(e) => (e.id(), Err(EditorError::Task(e.to_string()))),
        };
        let Some(seq) = self.tasks.remove(&id) else {
            return;
        };

        for step in &mut self.queue {
            if let Step::Decode { ticket, result: slot } = step {
                if ticket.seq == seq {
                    *slot = Some(result);
                    return;
                }
            }
        }
    }

    fn fail_orphans(&mut self) {
        self.tasks.clear();
        for step in &mut self.queue {
            if let Step::Decode { result, .. } = step {
                if result.is_none() {
                    *result = Some(Err(EditorError::Task("worker exited".to_string())));
                }
            }
        }
    }

    /// Apply ready steps from the front of the queue until one is waiting.
    fn drain(&mut self) -> Vec<Completion> {
        let mut done = std::mem::take(&mut self.flushed);
        while self.queue.front().is_some_and(|step| !step.is_waiting()) {
            let Some(step) = self.queue.pop_front() else {
                break;
            };
            match step {
                Step::Decode {
                    ticket,
                    result: Some(result),
                } => {
                    let outcome = result.map(|bitmap| self.scene.finish_decode(ticket, bitmap));
                    if let Err(e) = &outcome {
                        tracing::warn!("Decode #{} failed, scene unchanged: {e}", ticket.seq);
                    }
                    done.push(Completion::Decode { ticket, outcome });
                }
                Step::Decode { result: None, .. } => {}
                Step::Intent { seq, intent } => done.push(self.apply_queued(seq, intent)),
            }
        }
        done
    }

    /// Apply queued intents now, leaving decodes in place.
    fn flush_queued_intents(&mut self) {
        let queued: Vec<Step> = self.queue.drain(..).collect();
        for step in queued {
            match step {
                Step::Intent { seq, intent } => {
                    let completion = self.apply_queued(seq, intent);
                    self.flushed.push(completion);
                }
                decode @ Step::Decode { .. } => self.queue.push_back(decode),
            }
        }
    }

    fn apply_queued(&mut self, seq: u64, intent: Intent) -> Completion {
        let name = intent.name();
        let outcome = self.scene.apply(intent);
        if let Err(e) = &outcome {
            tracing::warn!("Queued {name} #{seq} failed: {e}");
        }
        Completion::Intent { seq, outcome }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> Editor {
        Editor::new(
            SceneConfig::default(),
            SceneExporter::with_defaults().expect("exporter"),
        )
    }

    #[tokio::test]
    async fn test_sync_intents_apply_immediately() {
        let mut editor = editor();
        let dispatched = editor
            .dispatch(Intent::add_default_text())
            .expect("dispatch");
        assert!(matches!(dispatched, Dispatched::Applied(Applied::Added(_))));
        assert_eq!(editor.scene().object_count(), 1);
        assert_eq!(editor.pending(), 0);
    }

    #[tokio::test]
    async fn test_intents_queue_behind_decodes() {
        let mut editor = editor();
        editor
            .dispatch(Intent::AddImage(vec![0, 1, 2]))
            .expect("dispatch");
        let dispatched = editor
            .dispatch(Intent::add_default_text())
            .expect("dispatch");
        assert_eq!(dispatched, Dispatched::Queued(1));
        assert_eq!(editor.scene().object_count(), 0);

        let done = editor.settle().await;
        assert_eq!(done.len(), 2);
        assert!(matches!(done[0], Completion::Decode { outcome: Err(_), .. }));
        let Completion::Intent {
            seq,
            outcome: Ok(Applied::Added(id)),
        } = done[1]
        else {
            panic!("queued text should report its id, got {:?}", done[1]);
        };
        assert_eq!(seq, 1);
        assert_eq!(editor.scene().active_id(), Some(id));
        assert_eq!(editor.scene().object_count(), 1);
    }

    #[tokio::test]
    async fn test_reset_flushes_queued_intents() {
        let mut editor = editor();
        editor
            .dispatch(Intent::AddImage(vec![0, 1, 2]))
            .expect("dispatch");
        editor
            .dispatch(Intent::SetTextColor(poster_core::Color::BLUE))
            .expect("dispatch");
        editor.dispatch(Intent::Reset).expect("reset");

        assert_eq!(editor.scene().text_color(), poster_core::Color::BLUE);
        assert_eq!(editor.pending(), 1);
        let done = editor.settle().await;
        assert!(matches!(
            done[0],
            Completion::Intent {
                seq: 1,
                outcome: Ok(Applied::Unchanged | Applied::Changed)
            }
        ));
        assert!(editor.scene().is_blank());
    }

    #[tokio::test]
    async fn test_shutdown_with_pending_decodes() {
        let mut editor = editor();
        editor
            .dispatch(Intent::AddImage(vec![0; 16]))
            .expect("dispatch");
        editor.shutdown();
    }
}
