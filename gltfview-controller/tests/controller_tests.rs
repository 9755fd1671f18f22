//! Scenario tests for the model lifecycle controller
//!
//! Every collaborator is a fake that appends to one shared event log, so the
//! tests can check both what happened and in which order.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use approx::assert_relative_eq;
use async_trait::async_trait;
use tokio::sync::Notify;

use gltfview_controller::*;
use gltfview_core::{
    ColliderShape, Manipulation, ModelNode, NodeId, Point3f, Rotationf, Scene, Transform, TriangleMesh, Vector3f,
};
use gltfview_io::{FileSelector, ImportRequest, IoError, NodeSelection, SceneImporter};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Pick,
    Import(PathBuf),
    CursorVisible(bool),
    ProgressOpen(IndicatorStyle, String),
    ProgressClose,
    AnchorDetach(NodeId),
    AnchorAttach(NodeId, Point3f),
    Audio(AudioCue),
}

#[derive(Clone, Default)]
struct Log(Arc<Mutex<Vec<Event>>>);

impl Log {
    fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|e| predicate(e)).count()
    }

    fn audio(&self) -> Vec<AudioCue> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Audio(cue) => Some(cue),
                _ => None,
            })
            .collect()
    }
}

enum Pick {
    File(&'static str),
    Nothing,
    Unsupported,
}

struct FakeSelector {
    log: Log,
    script: Mutex<VecDeque<Pick>>,
}

#[async_trait]
impl FileSelector for FakeSelector {
    async fn pick_file(&self) -> gltfview_io::Result<Option<PathBuf>> {
        self.log.push(Event::Pick);
        match self.script.lock().unwrap().pop_front().unwrap_or(Pick::Nothing) {
            Pick::File(path) => Ok(Some(PathBuf::from(path))),
            Pick::Nothing => Ok(None),
            Pick::Unsupported => Err(IoError::Unsupported {
                reason: "test platform".to_string(),
            }),
        }
    }
}

struct Gate {
    started: Arc<Notify>,
    release: Arc<Notify>,
}

struct FakeImporter {
    log: Log,
    /// `None` entries fail the import
    script: Mutex<VecDeque<Option<ModelNode>>>,
    gate: Option<Gate>,
}

#[async_trait]
impl SceneImporter for FakeImporter {
    async fn import_scene(&self, request: ImportRequest) -> gltfview_io::Result<ModelNode> {
        assert_eq!(request.nodes, NodeSelection::All);
        assert_eq!(request.collider, ColliderShape::Box);
        self.log.push(Event::Import(request.path.clone()));

        if let Some(gate) = &self.gate {
            gate.started.notify_one();
            gate.release.notified().await;
        }

        let next = self.script.lock().unwrap().pop_front().flatten();
        next.ok_or_else(|| IoError::InvalidFormat {
            format: "corrupt test model".to_string(),
        })
    }
}

struct FakeProgress(Log);

impl ProgressIndicator for FakeProgress {
    fn open(&self, style: IndicatorStyle, message: &str) {
        self.0.push(Event::ProgressOpen(style, message.to_string()));
    }

    fn close(&self) {
        self.0.push(Event::ProgressClose);
    }
}

struct FakeCursor(Log);

impl Cursor for FakeCursor {
    fn set_visible(&self, visible: bool) {
        self.0.push(Event::CursorVisible(visible));
    }
}

struct FakeAnchors {
    log: Log,
    fail: bool,
}

impl SpatialAnchors for FakeAnchors {
    fn detach(&self, node: NodeId) {
        self.log.push(Event::AnchorDetach(node));
    }

    fn attach(&self, node: NodeId, position: &Point3f) -> std::result::Result<(), AnchorError> {
        if self.fail {
            return Err(AnchorError::Unavailable);
        }
        self.log.push(Event::AnchorAttach(node, *position));
        Ok(())
    }
}

struct FakeAudio(Log);

impl AudioSink for FakeAudio {
    fn play(&self, cue: AudioCue) {
        self.0.push(Event::Audio(cue));
    }
}

#[derive(Default)]
struct FakeHead(Mutex<HeadPose>);

impl FakeHead {
    fn set(&self, pose: HeadPose) {
        *self.0.lock().unwrap() = pose;
    }
}

impl HeadTracker for FakeHead {
    fn head_pose(&self) -> HeadPose {
        *self.0.lock().unwrap()
    }
}

struct Harness {
    controller: ModelController,
    scene: Arc<Mutex<Scene>>,
    mount: NodeId,
    head: Arc<FakeHead>,
    log: Log,
    started: Arc<Notify>,
    release: Arc<Notify>,
}

#[derive(Default)]
struct Setup {
    picks: Vec<Pick>,
    imports: Vec<Option<ModelNode>>,
    gated: bool,
    failing_anchors: bool,
    no_audio: bool,
}

fn harness(setup: Setup) -> Harness {
    let log = Log::default();
    let scene = Arc::new(Mutex::new(Scene::new()));
    let mount = scene.lock().unwrap().create_node("model mount", None).unwrap();
    let head = Arc::new(FakeHead::default());
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());

    let collaborators = Collaborators {
        selector: Box::new(FakeSelector {
            log: log.clone(),
            script: Mutex::new(setup.picks.into()),
        }),
        importer: Box::new(FakeImporter {
            log: log.clone(),
            script: Mutex::new(setup.imports.into()),
            gate: setup.gated.then(|| Gate {
                started: Arc::clone(&started),
                release: Arc::clone(&release),
            }),
        }),
        progress: Box::new(FakeProgress(log.clone())),
        cursor: Box::new(FakeCursor(log.clone())),
        anchors: Box::new(FakeAnchors {
            log: log.clone(),
            fail: setup.failing_anchors,
        }),
        head: head.clone(),
        audio: (!setup.no_audio).then(|| Box::new(FakeAudio(log.clone())) as Box<dyn AudioSink>),
    };

    let controller =
        ModelController::new(ControllerConfig::default(), Arc::clone(&scene), mount, collaborators).unwrap();

    Harness {
        controller,
        scene,
        mount,
        head,
        log,
        started,
        release,
    }
}

/// A model whose merged bounds are `x` by `y` by `z`
fn model(x: f32, y: f32, z: f32) -> ModelNode {
    let mesh = TriangleMesh::from_vertices_and_faces(
        vec![Point3f::origin(), Point3f::new(x, 0.0, 0.0), Point3f::new(0.0, y, z)],
        vec![[0, 1, 2]],
    );
    ModelNode::new("model").with_child(ModelNode::new("part").with_mesh(mesh))
}

fn forward_of(scene: &Scene, node: NodeId) -> Vector3f {
    scene.world_rotation(node).unwrap() * Vector3f::z()
}

#[tokio::test]
async fn test_empty_selection_completes_without_ui() {
    let h = harness(Setup::default());

    let mut result = None;
    h.controller.request_open(|loaded| result = Some(loaded)).await.unwrap();

    assert_eq!(result, Some(None));
    assert_eq!(h.log.events(), vec![Event::Pick]);
    assert!(!h.controller.is_opening());
    assert_eq!(h.controller.current_model(), None);
}

#[tokio::test]
async fn test_open_places_sizes_and_enables_manipulation() {
    let h = harness(Setup {
        picks: vec![Pick::File("models/duck.glb")],
        imports: vec![Some(model(2.0, 1.0, 1.0))],
        ..Default::default()
    });
    h.head.set(HeadPose::new(Point3f::new(0.0, 1.5, 0.0), Vector3f::new(1.0, -0.5, 0.0)));

    let mut result = None;
    h.controller.request_open(|loaded| result = Some(loaded)).await.unwrap();

    let node = result.flatten().expect("model should be loaded");
    assert_eq!(h.controller.current_model(), Some(node));
    assert!(!h.controller.is_opening());

    let scene = h.scene.lock().unwrap();
    // Mount three units down the horizontal gaze, at eye height
    let mount_position = scene.world_position(h.mount).unwrap();
    let expected_mount = Point3f::new(3.0 / 1.25_f32.sqrt(), 1.5, 0.0);
    assert_relative_eq!(mount_position, expected_mount, epsilon = 1e-5);

    // Model hangs centred on the mount, scaled to 0.5 / max(2, 1, 1)
    assert_eq!(scene.children(h.mount).unwrap(), &[node]);
    let transform = *scene.transform(node).unwrap();
    assert_relative_eq!(transform.translation, Vector3f::zeros());
    assert_relative_eq!(transform.scale, Vector3f::repeat(0.25), epsilon = 1e-6);
    assert_eq!(h.controller.initial_scale(), Some(transform.scale));

    // Facing back towards the viewer
    assert_relative_eq!(forward_of(&scene, node), -Vector3f::x(), epsilon = 1e-5);

    assert_eq!(scene.node(node).unwrap().manipulation, Some(Manipulation::two_handed()));

    assert_eq!(
        h.log.events(),
        vec![
            Event::Pick,
            Event::CursorVisible(false),
            Event::ProgressOpen(IndicatorStyle::AnimatedOrbs, "Loading...".to_string()),
            Event::Import(PathBuf::from("models/duck.glb")),
            Event::ProgressClose,
            Event::CursorVisible(true),
            Event::Audio(AudioCue::FirstModelOpened),
            Event::AnchorDetach(h.mount),
            Event::AnchorAttach(h.mount, mount_position),
        ]
    );
}

#[tokio::test]
async fn test_import_failure_is_recovered() {
    let h = harness(Setup {
        picks: vec![Pick::File("broken.gltf")],
        imports: vec![None],
        ..Default::default()
    });

    let mut result = None;
    h.controller.request_open(|loaded| result = Some(loaded)).await.unwrap();

    assert_eq!(result, Some(None));
    assert_eq!(h.log.audio(), vec![AudioCue::LoadError]);
    assert_eq!(h.log.count(|e| *e == Event::ProgressClose), 1);
    assert_eq!(h.log.events().last(), Some(&Event::CursorVisible(true)));
    assert!(!h.controller.is_opening());
    assert_eq!(h.controller.current_model(), None);
    assert_eq!(h.scene.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_second_open_while_importing_is_dropped() {
    let h = harness(Setup {
        picks: vec![Pick::File("a.glb"), Pick::File("b.glb")],
        imports: vec![Some(model(1.0, 1.0, 1.0)), Some(model(1.0, 1.0, 1.0))],
        gated: true,
        ..Default::default()
    });

    let mut second_completion_called = false;
    let first = h.controller.open_model();
    let second = async {
        h.started.notified().await;
        assert!(h.controller.is_opening());
        h.controller
            .request_open(|_| second_completion_called = true)
            .await
            .unwrap();
        h.release.notify_one();
    };
    let (first, ()) = tokio::join!(first, second);

    assert!(matches!(first.unwrap(), OpenOutcome::Loaded(_)));
    assert!(!second_completion_called);
    assert_eq!(h.log.count(|e| *e == Event::Pick), 1);
    assert_eq!(h.log.count(|e| matches!(e, Event::Import(_))), 1);
    assert!(!h.controller.is_opening());
}

#[tokio::test]
async fn test_busy_outcome_has_no_side_effects() {
    let h = harness(Setup {
        picks: vec![Pick::File("a.glb")],
        imports: vec![Some(model(1.0, 1.0, 1.0))],
        gated: true,
        ..Default::default()
    });

    let first = h.controller.open_model();
    let second = async {
        h.started.notified().await;
        let events_before = h.log.events();
        let outcome = h.controller.open_model().await.unwrap();
        assert_eq!(h.log.events(), events_before);
        h.release.notify_one();
        outcome
    };
    let (_, second) = tokio::join!(first, second);
    assert_eq!(second, OpenOutcome::Busy);
}

#[tokio::test]
async fn test_open_disposes_previous_model_even_when_cancelled() {
    let h = harness(Setup {
        picks: vec![Pick::File("a.glb"), Pick::Nothing],
        imports: vec![Some(model(1.0, 1.0, 1.0))],
        ..Default::default()
    });

    let first = h.controller.open_model().await.unwrap().loaded().unwrap();
    assert!(h.scene.lock().unwrap().contains(first));

    assert_eq!(h.controller.open_model().await.unwrap(), OpenOutcome::Cancelled);
    let scene = h.scene.lock().unwrap();
    assert!(!scene.contains(first));
    assert_eq!(scene.len(), 1);
    assert_eq!(h.controller.current_model(), None);
    assert_eq!(h.controller.initial_scale(), None);
}

#[tokio::test]
async fn test_at_most_one_model_after_repeated_opens() {
    let h = harness(Setup {
        picks: vec![Pick::File("a.glb"), Pick::File("b.glb"), Pick::File("c.glb")],
        imports: vec![Some(model(1.0, 1.0, 1.0)), None, Some(model(4.0, 1.0, 1.0))],
        ..Default::default()
    });

    for _ in 0..3 {
        h.controller.open_model().await.unwrap();
        assert!(!h.controller.is_opening());
        assert!(h.scene.lock().unwrap().children(h.mount).unwrap().len() <= 1);
    }
    assert_eq!(h.controller.initial_scale(), Some(Vector3f::repeat(0.125)));
}

#[tokio::test]
async fn test_first_model_cue_plays_once() {
    let h = harness(Setup {
        picks: vec![Pick::File("a.glb"), Pick::File("b.glb")],
        imports: vec![Some(model(1.0, 1.0, 1.0)), Some(model(1.0, 1.0, 1.0))],
        ..Default::default()
    });

    h.controller.open_model().await.unwrap();
    h.controller.open_model().await.unwrap();
    assert_eq!(h.log.audio(), vec![AudioCue::FirstModelOpened, AudioCue::Loaded]);
}

#[tokio::test]
async fn test_reset_restores_initial_transform_and_faces_viewer_now() {
    let h = harness(Setup {
        picks: vec![Pick::File("a.glb")],
        imports: vec![Some(model(2.0, 1.0, 1.0))],
        ..Default::default()
    });
    h.head.set(HeadPose::new(Point3f::origin(), -Vector3f::z()));
    let node = h.controller.open_model().await.unwrap().loaded().unwrap();

    {
        let mut scene = h.scene.lock().unwrap();
        let transform = scene.transform_mut(node).unwrap();
        *transform = Transform::from_translation(Vector3f::new(0.3, -1.0, 2.0));
        transform.set_uniform_scale(3.0);
    }
    // The viewer walks to the right of the model
    h.head.set(HeadPose::new(Point3f::new(5.0, 0.0, -3.0), -Vector3f::x()));

    assert!(h.controller.reset().unwrap());

    let scene = h.scene.lock().unwrap();
    let transform = scene.transform(node).unwrap();
    assert_relative_eq!(transform.translation, Vector3f::zeros());
    assert_relative_eq!(transform.scale, Vector3f::repeat(0.25), epsilon = 1e-6);
    assert_relative_eq!(forward_of(&scene, node), Vector3f::x(), epsilon = 1e-5);
    assert_eq!(h.log.audio().last(), Some(&AudioCue::Resetting));
}

#[tokio::test]
async fn test_dispose_then_reset_is_noop() {
    let h = harness(Setup {
        picks: vec![Pick::File("a.glb")],
        imports: vec![Some(model(1.0, 1.0, 1.0))],
        ..Default::default()
    });
    let node = h.controller.open_model().await.unwrap().loaded().unwrap();

    h.controller.dispose().unwrap();
    let cues_before = h.log.audio();
    assert!(!h.controller.reset().unwrap());

    assert_eq!(h.log.audio(), cues_before);
    assert!(!h.scene.lock().unwrap().contains(node));
    // Disposing twice is fine
    h.controller.dispose().unwrap();
}

#[tokio::test]
async fn test_unsupported_selector_propagates() {
    let h = harness(Setup {
        picks: vec![Pick::Unsupported],
        ..Default::default()
    });

    let mut called = false;
    let err = h.controller.request_open(|_| called = true).await.unwrap_err();

    assert!(matches!(err, ControllerError::UnsupportedPlatform(_)));
    assert!(!called);
    assert!(!h.controller.is_opening());
    assert!(h.log.audio().is_empty());
}

#[tokio::test]
async fn test_model_without_geometry_keeps_imported_scale() {
    let empty = ModelNode::new("empty").with_transform(Transform::from_parts(
        Vector3f::new(7.0, 7.0, 7.0),
        Rotationf::identity(),
        Vector3f::repeat(2.0),
    ));
    let h = harness(Setup {
        picks: vec![Pick::File("empty.gltf")],
        imports: vec![Some(empty)],
        ..Default::default()
    });

    let node = h.controller.open_model().await.unwrap().loaded().unwrap();
    let scene = h.scene.lock().unwrap();
    assert_relative_eq!(scene.transform(node).unwrap().translation, Vector3f::zeros());
    assert_eq!(h.controller.initial_scale(), Some(Vector3f::repeat(2.0)));
}

#[tokio::test]
async fn test_anchor_failure_does_not_abort_placement() {
    let h = harness(Setup {
        picks: vec![Pick::File("a.glb")],
        imports: vec![Some(model(1.0, 1.0, 1.0))],
        failing_anchors: true,
        ..Default::default()
    });

    let outcome = h.controller.open_model().await.unwrap();
    assert!(matches!(outcome, OpenOutcome::Loaded(_)));
    assert_eq!(h.log.count(|e| matches!(e, Event::AnchorAttach(..))), 0);
}

#[tokio::test]
async fn test_missing_audio_sink_is_tolerated() {
    let h = harness(Setup {
        picks: vec![Pick::File("a.glb")],
        imports: vec![Some(model(1.0, 1.0, 1.0))],
        no_audio: true,
        ..Default::default()
    });

    h.controller.open_model().await.unwrap();
    assert!(h.controller.reset().unwrap());
    assert!(h.log.audio().is_empty());
}

#[tokio::test]
async fn test_voice_commands() {
    let h = harness(Setup {
        picks: vec![Pick::File("a.glb")],
        imports: vec![Some(model(1.0, 1.0, 1.0))],
        ..Default::default()
    });

    assert_eq!(
        h.controller.handle_command("reset".parse().unwrap()).await.unwrap(),
        CommandOutcome::Reset(false)
    );
    let opened = h.controller.handle_command(VoiceCommand::Open).await.unwrap();
    assert!(matches!(opened, CommandOutcome::Opened(OpenOutcome::Loaded(_))));
    assert_eq!(
        h.controller.handle_command(VoiceCommand::Reset).await.unwrap(),
        CommandOutcome::Reset(true)
    );
}

#[test]
fn test_new_rejects_missing_mount() {
    let head = Arc::new(FakeHead::default());
    let mut scene = Scene::new();
    let stale = scene.create_node("old mount", None).unwrap();
    scene.create_node("other", None).unwrap();
    scene.destroy(stale).unwrap();
    let scene = Arc::new(Mutex::new(scene));
    let log = Log::default();
    let collaborators = Collaborators {
        selector: Box::new(FakeSelector {
            log: log.clone(),
            script: Mutex::new(VecDeque::new()),
        }),
        importer: Box::new(FakeImporter {
            log: log.clone(),
            script: Mutex::new(VecDeque::new()),
            gate: None,
        }),
        progress: Box::new(FakeProgress(log.clone())),
        cursor: Box::new(FakeCursor(log.clone())),
        anchors: Box::new(FakeAnchors { log, fail: false }),
        head,
        audio: None,
    };

    let err = ModelController::new(ControllerConfig::default(), scene, stale, collaborators).unwrap_err();
    assert!(matches!(err, ControllerError::Scene(gltfview_core::Error::NodeNotFound(id)) if id == stale));
}
