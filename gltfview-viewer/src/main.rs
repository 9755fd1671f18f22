//! `gltfview`: drive the model controller from the terminal
//!
//! Each input line is one spoken-style command: `open`, `reset`,
//! `head <x> <y> <z>` to move the viewer, or `quit`. Opens run in the
//! background so `reset` and `head` stay responsive during an import; a
//! second `open` while one is running is ignored by the controller.

mod console;
mod settings;
mod shell;

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use gltfview_controller::{
    Collaborators, CommandOutcome, ControllerError, ModelController, OpenOutcome, VoiceCommand,
};
use gltfview_core::{NodeId, Point3f, Scene, Vector3f};
use gltfview_io::{default_file_selector, FileSelector, FolderCycleSelector, GltfImporter};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::console::{ConsoleAudio, ConsoleCursor, ConsoleProgress, MemoryAnchors, SharedHead};
use crate::settings::{Cli, Settings};
use crate::shell::ShellCommand;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?.with_overrides(&cli);
    let viewer = Viewer::new(&cli, settings)?;

    if viewer.run_script(&cli.commands).await? {
        viewer.run_stdin().await?;
    }
    Ok(())
}

struct Viewer {
    controller: Arc<ModelController>,
    scene: Arc<Mutex<Scene>>,
    head: Arc<SharedHead>,
}

impl Viewer {
    fn new(cli: &Cli, settings: Settings) -> Result<Self> {
        let scene = Arc::new(Mutex::new(Scene::new()));
        let mount = scene
            .lock()
            .map_err(|_| anyhow!("scene lock poisoned"))?
            .create_node("model mount", None)?;
        let head = Arc::new(SharedHead::new(settings.head));

        let selector: Box<dyn FileSelector> = match &cli.folder {
            Some(folder) => {
                info!(folder = %folder.display(), "cycling through models in folder");
                Box::new(FolderCycleSelector::new(folder))
            }
            None => default_file_selector(&settings.controller.commit_text, cli.start_dir.as_deref()),
        };

        let collaborators = Collaborators {
            selector,
            importer: Box::new(GltfImporter::new()),
            progress: Box::new(ConsoleProgress::default()),
            cursor: Box::new(ConsoleCursor),
            anchors: Box::new(MemoryAnchors::default()),
            head: head.clone(),
            audio: Some(Box::new(ConsoleAudio)),
        };
        let controller = ModelController::new(settings.controller, Arc::clone(&scene), mount, collaborators)
            .context("Failed to set up the model controller")?;

        Ok(Self {
            controller: Arc::new(controller),
            scene,
            head,
        })
    }

    /// Run commands given with `--run`, one after another. Returns `false`
    /// if the script asked to quit.
    async fn run_script(&self, commands: &[String]) -> Result<bool> {
        for line in commands {
            let command = line.parse::<ShellCommand>()?;
            match command {
                ShellCommand::Quit => return Ok(false),
                ShellCommand::Head(position) => self.move_head(position),
                ShellCommand::Voice(voice) => {
                    match self.controller.handle_command(voice).await? {
                        CommandOutcome::Opened(outcome) => report_open(&self.scene, outcome),
                        CommandOutcome::Reset(done) => report_reset(done),
                    }
                }
            }
        }
        Ok(true)
    }

    /// Read commands from standard input until `quit`, end of input, or a
    /// fatal controller error
    async fn run_stdin(&self) -> Result<()> {
        let (fatal_tx, mut fatal_rx) = mpsc::unbounded_channel::<ControllerError>();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        info!("ready: open | reset | head <x> <y> <z> | quit");

        loop {
            tokio::select! {
                Some(err) = fatal_rx.recv() => return Err(err.into()),
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match line.parse::<ShellCommand>() {
                        Ok(ShellCommand::Quit) => break,
                        Ok(ShellCommand::Head(position)) => self.move_head(position),
                        Ok(ShellCommand::Voice(VoiceCommand::Open)) => self.spawn_open(fatal_tx.clone()),
                        Ok(ShellCommand::Voice(VoiceCommand::Reset)) => report_reset(self.controller.reset()?),
                        Err(e) => warn!("{}", e),
                    }
                }
            }
        }
        Ok(())
    }

    fn spawn_open(&self, fatal: mpsc::UnboundedSender<ControllerError>) {
        let controller = Arc::clone(&self.controller);
        let scene = Arc::clone(&self.scene);
        tokio::spawn(async move {
            match controller.open_model().await {
                Ok(outcome) => report_open(&scene, outcome),
                Err(e) => {
                    // The main loop turns this into the process exit status
                    let _ = fatal.send(e);
                }
            }
        });
    }

    fn move_head(&self, position: Point3f) {
        self.head.move_to(position);
        info!(%position, "viewer moved");
    }
}

fn report_open(scene: &Mutex<Scene>, outcome: OpenOutcome) {
    match outcome {
        OpenOutcome::Loaded(node) => describe_model(scene, node),
        OpenOutcome::Cancelled => info!("no model selected"),
        OpenOutcome::Failed => warn!("the model could not be loaded"),
        OpenOutcome::Busy => info!("already opening a model"),
    }
}

fn report_reset(done: bool) {
    if done {
        info!("model reset");
    } else {
        info!("nothing to reset");
    }
}

/// What gets logged about a freshly placed model
#[derive(Debug, Clone, PartialEq)]
struct PlacedModel {
    name: String,
    scale: Vector3f,
    position: Point3f,
    size: Option<Vector3f>,
}

impl PlacedModel {
    fn read(scene: &Scene, node: NodeId) -> Option<Self> {
        let model = scene.node(node).ok()?;
        Some(Self {
            name: model.name.clone(),
            scale: model.transform.scale,
            position: scene.world_position(node).ok()?,
            size: scene.subtree_bounds(node).ok().flatten().map(|b| b.size()),
        })
    }
}

fn describe_model(scene: &Mutex<Scene>, node: NodeId) {
    let scene = scene.lock().unwrap_or_else(|p| p.into_inner());
    let Some(placed) = PlacedModel::read(&scene, node) else {
        return;
    };
    info!(
        name = %placed.name,
        scale = ?placed.scale,
        position = %placed.position,
        size = ?placed.size,
        "model placed"
    );
}
