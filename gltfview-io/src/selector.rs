//! Model file selection
//!
//! Each target gets one [`FileSelector`] implementation, chosen at build time
//! by [`default_file_selector`]. Targets without a native picker get
//! [`UnsupportedFileSelector`], which always fails.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::{IoError, Result};

/// Extensions recognised as model files
pub const MODEL_EXTENSIONS: [&str; 2] = ["gltf", "glb"];

/// Default text shown on the picker's commit action
pub const DEFAULT_COMMIT_TEXT: &str = "Select Model";

/// Whether `path` has one of the [`MODEL_EXTENSIONS`] (case-insensitive)
pub fn is_model_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MODEL_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// Asynchronously asks the user (or the platform) for a model file.
///
/// `Ok(None)` means nothing was chosen.
#[async_trait]
pub trait FileSelector: Send + Sync {
    async fn pick_file(&self) -> Result<Option<PathBuf>>;
}

/// Native open dialog filtered to model files, with an "All files" escape hatch
#[cfg(any(target_os = "windows", target_os = "macos", target_os = "linux"))]
#[derive(Debug, Clone)]
pub struct DialogFileSelector {
    commit_text: String,
    start_dir: Option<PathBuf>,
}

#[cfg(any(target_os = "windows", target_os = "macos", target_os = "linux"))]
impl DialogFileSelector {
    pub fn new(commit_text: impl Into<String>) -> Self {
        Self {
            commit_text: commit_text.into(),
            start_dir: None,
        }
    }

    pub fn with_start_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.start_dir = Some(dir.into());
        self
    }
}

#[cfg(any(target_os = "windows", target_os = "macos", target_os = "linux"))]
impl Default for DialogFileSelector {
    fn default() -> Self {
        Self::new(DEFAULT_COMMIT_TEXT)
    }
}

#[cfg(any(target_os = "windows", target_os = "macos", target_os = "linux"))]
#[async_trait]
impl FileSelector for DialogFileSelector {
    async fn pick_file(&self) -> Result<Option<PathBuf>> {
        let mut dialog = rfd::AsyncFileDialog::new()
            .set_title(self.commit_text.as_str())
            .add_filter("glTF model", &MODEL_EXTENSIONS)
            .add_filter("All files", &["*"]);
        if let Some(dir) = &self.start_dir {
            dialog = dialog.set_directory(dir);
        }

        let picked = dialog.pick_file().await.map(|handle| handle.path().to_path_buf());
        debug!(?picked, "file dialog closed");
        Ok(picked)
    }
}

/// Hands out the model files of one folder in turn, wrapping around.
///
/// The folder is listed on first use only; files added later are not seen.
#[derive(Debug)]
pub struct FolderCycleSelector {
    folder: PathBuf,
    state: Mutex<CycleState>,
}

#[derive(Debug, Default)]
struct CycleState {
    files: Option<Vec<PathBuf>>,
    next: usize,
}

impl FolderCycleSelector {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            state: Mutex::new(CycleState::default()),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    async fn list_models(&self) -> Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.folder).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() && is_model_file(&path) {
                files.push(path);
            }
        }
        files.sort();
        debug!(folder = %self.folder.display(), count = files.len(), "listed model folder");
        Ok(files)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CycleState> {
        // The state stays consistent even if a holder panicked
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl FileSelector for FolderCycleSelector {
    async fn pick_file(&self) -> Result<Option<PathBuf>> {
        let listed = self.lock().files.is_some();
        if !listed {
            let files = self.list_models().await?;
            let mut state = self.lock();
            if state.files.is_none() {
                state.files = Some(files);
            }
        }

        let mut state = self.lock();
        let CycleState { files, next } = &mut *state;
        let files = files.as_deref().unwrap_or_default();
        if files.is_empty() {
            return Ok(None);
        }
        let picked = files[*next % files.len()].clone();
        *next = (*next + 1) % files.len();
        Ok(Some(picked))
    }
}

/// Selector for targets with no file picker; every call fails
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedFileSelector;

#[async_trait]
impl FileSelector for UnsupportedFileSelector {
    async fn pick_file(&self) -> Result<Option<PathBuf>> {
        Err(IoError::Unsupported {
            reason: "no file dialog support on this platform".to_string(),
        })
    }
}

/// The selector for the current build target. `start_dir` is where the
/// dialog opens, when the platform has one.
#[cfg(any(target_os = "windows", target_os = "macos", target_os = "linux"))]
pub fn default_file_selector(commit_text: &str, start_dir: Option<&Path>) -> Box<dyn FileSelector> {
    let selector = DialogFileSelector::new(commit_text);
    match start_dir {
        Some(dir) => Box::new(selector.with_start_dir(dir)),
        None => Box::new(selector),
    }
}

/// The selector for the current build target
#[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
pub fn default_file_selector(_commit_text: &str, _start_dir: Option<&Path>) -> Box<dyn FileSelector> {
    Box::new(UnsupportedFileSelector)
}
