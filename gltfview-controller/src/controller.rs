//! Model lifecycle controller
//!
//! Sequences "dispose current, pick file, import, place and size, attach
//! manipulation, notify" as one transaction per open request, and restores a
//! placed model to its initial transform on reset.
//!
//! At most one open runs at a time. The gate is an atomic flag taken with a
//! compare-and-swap and released by a guard, so it is cleared on every exit
//! path including errors.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use gltfview_core::{Aabb, Manipulation, ModelNode, NodeId, Point3f, Rotationf, Scene, Vector3f};
use gltfview_io::{FileSelector, ImportRequest, IoError, SceneImporter};
use tracing::{debug, info, warn};

use crate::audio::{AudioCue, AudioNotifier, AudioSink};
use crate::collaborators::{Cursor, HeadPose, HeadTracker, IndicatorStyle, ProgressIndicator, SpatialAnchors};
use crate::command::VoiceCommand;
use crate::config::ControllerConfig;
use crate::error::{ControllerError, Result};

/// How an open request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Another open was in flight; this one was dropped
    Busy,
    /// The user chose no file
    Cancelled,
    /// The model was imported and placed
    Loaded(NodeId),
    /// Import failed; the failure cue was played
    Failed,
}

impl OpenOutcome {
    pub fn loaded(self) -> Option<NodeId> {
        match self {
            OpenOutcome::Loaded(node) => Some(node),
            _ => None,
        }
    }
}

/// Result of dispatching a [`VoiceCommand`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Opened(OpenOutcome),
    /// Whether there was a model to reset
    Reset(bool),
}

/// Services the controller drives, handed over once at construction
pub struct Collaborators {
    pub selector: Box<dyn FileSelector>,
    pub importer: Box<dyn SceneImporter>,
    pub progress: Box<dyn ProgressIndicator>,
    pub cursor: Box<dyn Cursor>,
    pub anchors: Box<dyn SpatialAnchors>,
    pub head: Arc<dyn HeadTracker>,
    pub audio: Option<Box<dyn AudioSink>>,
}

/// The currently placed model. Scale and look target only exist alongside a
/// model.
struct ActiveModel {
    node: NodeId,
    initial_scale: Vector3f,
    /// Live reference: reset faces wherever the viewer is at that moment
    look_target: Arc<dyn HeadTracker>,
}

pub struct ModelController {
    config: ControllerConfig,
    scene: Arc<Mutex<Scene>>,
    mount: NodeId,
    selector: Box<dyn FileSelector>,
    importer: Box<dyn SceneImporter>,
    progress: Box<dyn ProgressIndicator>,
    cursor: Box<dyn Cursor>,
    anchors: Box<dyn SpatialAnchors>,
    head: Arc<dyn HeadTracker>,
    audio: AudioNotifier,
    opening: AtomicBool,
    active: Mutex<Option<ActiveModel>>,
}

/// Clears the opening flag when dropped
struct OpeningGuard<'a>(&'a AtomicBool);

impl Drop for OpeningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ModelController {
    /// Create a controller placing models under `mount`, a root node of
    /// `scene` that only the controller moves.
    pub fn new(
        config: ControllerConfig,
        scene: Arc<Mutex<Scene>>,
        mount: NodeId,
        collaborators: Collaborators,
    ) -> Result<Self> {
        config.validate()?;
        lock(&scene).node(mount)?;

        let Collaborators {
            selector,
            importer,
            progress,
            cursor,
            anchors,
            head,
            audio,
        } = collaborators;

        Ok(Self {
            config,
            scene,
            mount,
            selector,
            importer,
            progress,
            cursor,
            anchors,
            head,
            audio: AudioNotifier::new(audio),
            opening: AtomicBool::new(false),
            active: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn mount(&self) -> NodeId {
        self.mount
    }

    /// Whether an open request is in flight
    pub fn is_opening(&self) -> bool {
        self.opening.load(Ordering::Acquire)
    }

    pub fn current_model(&self) -> Option<NodeId> {
        self.active().as_ref().map(|model| model.node)
    }

    /// Scale recorded when the current model was placed
    pub fn initial_scale(&self) -> Option<Vector3f> {
        self.active().as_ref().map(|model| model.initial_scale)
    }

    /// Open a model and report the result to `completion`.
    ///
    /// If an open is already in flight this returns at once and `completion`
    /// is never called. Otherwise `completion` receives the placed node, or
    /// `None` when the user picked nothing or the import failed. Only
    /// environment and scene errors are returned as `Err`.
    pub async fn request_open<F>(&self, completion: F) -> Result<()>
    where
        F: FnOnce(Option<NodeId>) + Send,
    {
        match self.open_model().await? {
            OpenOutcome::Busy => {}
            outcome => completion(outcome.loaded()),
        }
        Ok(())
    }

    /// Run one open sequence, or return [`OpenOutcome::Busy`] without side
    /// effects if another is in flight.
    pub async fn open_model(&self) -> Result<OpenOutcome> {
        let Some(_guard) = self.begin_open() else {
            debug!("open already in progress, dropping request");
            return Ok(OpenOutcome::Busy);
        };

        // The old model goes away even if the user then picks nothing
        self.dispose()?;

        let path = match self.selector.pick_file().await {
            Ok(Some(path)) => path,
            Ok(None) => {
                debug!("no file selected");
                return Ok(OpenOutcome::Cancelled);
            }
            Err(IoError::Unsupported { reason }) => {
                return Err(ControllerError::UnsupportedPlatform(reason));
            }
            Err(e) => return Err(ControllerError::Selector(e)),
        };

        self.cursor.set_visible(false);
        self.progress.open(IndicatorStyle::AnimatedOrbs, &self.config.loading_message);

        debug!(path = %path.display(), "importing model");
        let imported = self.importer.import_scene(ImportRequest::new(&path)).await;

        self.progress.close();
        self.cursor.set_visible(true);

        match imported {
            Ok(model) => {
                if !self.audio.play_clip_once_only(AudioCue::FirstModelOpened) {
                    self.audio.play_clip(AudioCue::Loaded);
                }
                let node = self.place(model)?;
                info!(path = %path.display(), ?node, "model opened");
                Ok(OpenOutcome::Loaded(node))
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "model import failed");
                self.audio.play_clip(AudioCue::LoadError);
                Ok(OpenOutcome::Failed)
            }
        }
    }

    /// Put the current model back to how it was placed, facing the viewer's
    /// current position. Returns `false` if there is no model.
    pub fn reset(&self) -> Result<bool> {
        let mut scene = lock(&self.scene);
        let active = self.active();
        let Some(model) = active.as_ref() else {
            return Ok(false);
        };

        self.audio.play_clip(AudioCue::Resetting);

        let transform = scene.transform_mut(model.node)?;
        transform.translation = Vector3f::zeros();
        transform.rotation = Rotationf::identity();
        transform.scale = model.initial_scale;

        let target = model.look_target.head_pose().position;
        scene.look_at(model.node, &target)?;
        debug!(node = ?model.node, "model reset");
        Ok(true)
    }

    /// Remove manipulation from the current model and destroy it. No-op
    /// without a model.
    pub fn dispose(&self) -> Result<()> {
        let mut scene = lock(&self.scene);
        let Some(model) = self.active().take() else {
            return Ok(());
        };

        if scene.contains(model.node) {
            scene.remove_manipulation(model.node)?;
            let removed = scene.destroy(model.node)?;
            debug!(node = ?model.node, removed, "model disposed");
        } else {
            warn!(node = ?model.node, "current model was already removed from the scene");
        }
        Ok(())
    }

    /// Dispatch a spoken command
    pub async fn handle_command(&self, command: VoiceCommand) -> Result<CommandOutcome> {
        debug!(%command, "voice command");
        match command {
            VoiceCommand::Open => Ok(CommandOutcome::Opened(self.open_model().await?)),
            VoiceCommand::Reset => Ok(CommandOutcome::Reset(self.reset()?)),
        }
    }

    fn begin_open(&self) -> Option<OpeningGuard<'_>> {
        self.opening
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| OpeningGuard(&self.opening))
    }

    /// Move the mount down the gaze, hang the model under it, size it, turn
    /// it towards the viewer and make it manipulable.
    fn place(&self, model: ModelNode) -> Result<NodeId> {
        let pose = self.head.head_pose();
        let mut scene = lock(&self.scene);

        self.anchors.detach(self.mount);
        let position = mount_position(&pose, self.config.start_distance);
        scene.transform_mut(self.mount)?.translation = position.coords;
        if let Err(e) = self.anchors.attach(self.mount, &position) {
            warn!(error = %e, "could not anchor model mount, continuing unanchored");
        }

        let node = scene.instantiate(Some(self.mount), model)?;
        scene.transform_mut(node)?.translation = Vector3f::zeros();

        match scene.subtree_bounds(node)? {
            Some(bounds) => match scale_to_fit(&bounds, self.config.target_size) {
                Some(factor) => scene.transform_mut(node)?.set_uniform_scale(factor),
                None => debug!(?bounds, "degenerate bounds, keeping imported scale"),
            },
            None => debug!("model has no geometry, keeping imported scale"),
        }
        let initial_scale = scene.transform(node)?.scale;

        scene.look_at(node, &pose.position)?;
        scene.set_manipulation(node, Manipulation::two_handed())?;

        *self.active() = Some(ActiveModel {
            node,
            initial_scale,
            look_target: Arc::clone(&self.head),
        });
        Ok(node)
    }

    fn active(&self) -> MutexGuard<'_, Option<ActiveModel>> {
        lock(&self.active)
    }
}

impl std::fmt::Debug for ModelController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelController")
            .field("config", &self.config)
            .field("mount", &self.mount)
            .field("opening", &self.is_opening())
            .field("current_model", &self.current_model())
            .finish_non_exhaustive()
    }
}

/// Where the mount goes: `distance` along the gaze, at eye height
pub fn mount_position(pose: &HeadPose, distance: f32) -> Point3f {
    let forward = pose.forward.try_normalize(f32::EPSILON).unwrap_or_else(|| -Vector3f::z());
    let mut position = pose.position + forward * distance;
    position.y = pose.position.y;
    position
}

/// Uniform factor making the largest edge of `bounds` equal `target_size`,
/// `None` for zero-size or non-finite bounds
pub fn scale_to_fit(bounds: &Aabb, target_size: f32) -> Option<f32> {
    let extent = bounds.max_extent();
    (extent.is_finite() && extent > 0.0).then(|| target_size / extent)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
