//! Audible cues

use std::collections::HashSet;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// The cues the controller can play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCue {
    Resetting,
    FirstModelOpened,
    Loaded,
    LoadError,
}

/// Something that can actually make a sound
pub trait AudioSink: Send + Sync {
    fn play(&self, cue: AudioCue);
}

/// Front for an optional [`AudioSink`] that remembers once-only cues.
/// Without a sink every call is a no-op.
#[derive(Default)]
pub struct AudioNotifier {
    sink: Option<Box<dyn AudioSink>>,
    played_once: Mutex<HashSet<AudioCue>>,
}

impl AudioNotifier {
    pub fn new(sink: Option<Box<dyn AudioSink>>) -> Self {
        Self {
            sink,
            played_once: Mutex::new(HashSet::new()),
        }
    }

    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    pub fn play_clip(&self, cue: AudioCue) {
        if let Some(sink) = &self.sink {
            sink.play(cue);
        }
    }

    /// Play `cue` unless it was already played through this notifier.
    /// Returns whether this call played it.
    pub fn play_clip_once_only(&self, cue: AudioCue) -> bool {
        let first = self
            .played_once
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(cue);
        if first {
            self.play_clip(cue);
        }
        first
    }
}

impl std::fmt::Debug for AudioNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioNotifier")
            .field("has_sink", &self.has_sink())
            .finish_non_exhaustive()
    }
}
