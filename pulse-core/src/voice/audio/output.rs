//! The audio output seam.
//!
//! Playback goes through an explicitly passed `AudioOutput` rather than a
//! process-wide device, so the narration flow can run against a recording
//! fake in tests and against cpal (feature `playback`) in the CLI.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use super::pcm::DecodedAudioBuffer;

/// How a playback ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEnd {
    /// The buffer played to its last frame
    Completed,
    /// `stop()` was called, or the device gave up, before the last frame
    Interrupted,
}

/// An output device able to play decoded buffers.
///
/// `play` must start playback immediately and return without waiting for it
/// to finish. The buffer is owned by the device until the handle resolves.
pub trait AudioOutput: Send + Sync {
    fn play(&self, buffer: DecodedAudioBuffer) -> Result<PlaybackHandle>;
}

impl<T: AudioOutput + ?Sized> AudioOutput for Arc<T> {
    fn play(&self, buffer: DecodedAudioBuffer) -> Result<PlaybackHandle> {
        (**self).play(buffer)
    }
}

#[derive(Debug)]
struct Shared {
    end: Mutex<Option<PlaybackEnd>>,
    changed: Notify,
    stop_requested: AtomicBool,
}

impl Shared {
    /// First signal wins; later ones are ignored.
    fn finish(&self, end: PlaybackEnd) -> bool {
        let mut guard = self.end.lock().expect("playback state poisoned");
        if guard.is_some() {
            return false;
        }
        *guard = Some(end);
        drop(guard);
        self.changed.notify_waiters();
        true
    }

    fn end(&self) -> Option<PlaybackEnd> {
        *self.end.lock().expect("playback state poisoned")
    }
}

/// Caller side of one playback: resolves exactly once.
#[derive(Debug)]
pub struct PlaybackHandle {
    shared: Arc<Shared>,
}

/// Device side of one playback
#[derive(Debug, Clone)]
pub struct PlaybackCompletion {
    shared: Arc<Shared>,
}

/// Cloneable stop switch for a playback
#[derive(Debug, Clone)]
pub struct StopHandle {
    shared: Arc<Shared>,
}

impl PlaybackHandle {
    /// Create a linked handle/completion pair for a device implementation.
    pub fn pair() -> (PlaybackHandle, PlaybackCompletion) {
        let shared = Arc::new(Shared {
            end: Mutex::new(None),
            changed: Notify::new(),
            stop_requested: AtomicBool::new(false),
        });
        (
            PlaybackHandle {
                shared: shared.clone(),
            },
            PlaybackCompletion { shared },
        )
    }

    pub fn is_finished(&self) -> bool {
        self.shared.end().is_some()
    }

    /// Ask the device to stop; resolves the handle as `Interrupted` unless it
    /// already completed.
    pub fn stop(&self) {
        self.stop_handle().stop();
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            shared: self.shared.clone(),
        }
    }

    /// Wait for the single completion signal
    pub async fn wait(&self) -> PlaybackEnd {
        loop {
            let notified = self.shared.changed.notified();
            if let Some(end) = self.shared.end() {
                return end;
            }
            notified.await;
        }
    }
}

impl StopHandle {
    pub fn stop(&self) {
        self.shared.stop_requested.store(true, Ordering::SeqCst);
        self.shared.finish(PlaybackEnd::Interrupted);
    }
}

impl PlaybackCompletion {
    /// Signal natural completion. Returns false if the playback had already
    /// ended.
    pub fn complete(&self) -> bool {
        self.shared.finish(PlaybackEnd::Completed)
    }

    /// Signal that the device gave up early
    pub fn interrupt(&self) -> bool {
        self.shared.finish(PlaybackEnd::Interrupted)
    }

    pub fn is_stop_requested(&self) -> bool {
        self.shared.stop_requested.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.shared.end().is_some()
    }
}

/// Fake output that records every buffer it is asked to play.
///
/// In the default mode each playback completes as soon as it starts. In
/// manual mode completions are held until `complete_all` is called, which
/// lets tests observe the `Playing` state.
#[derive(Clone, Default)]
pub struct RecordingOutput {
    played: Arc<Mutex<Vec<DecodedAudioBuffer>>>,
    pending: Arc<Mutex<Vec<PlaybackCompletion>>>,
    manual: bool,
    fail: bool,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn manual() -> Self {
        Self {
            manual: true,
            ..Self::default()
        }
    }

    /// An output whose `play` always errors, as a missing device would
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn played(&self) -> Vec<DecodedAudioBuffer> {
        self.played.lock().unwrap().clone()
    }

    pub fn play_count(&self) -> usize {
        self.played.lock().unwrap().len()
    }

    /// Number of playbacks started but not yet ended
    pub fn in_flight(&self) -> usize {
        self.pending
            .lock()
            .unwrap()
            .iter()
            .filter(|c| !c.is_finished())
            .count()
    }

    pub fn complete_all(&self) {
        for completion in self.pending.lock().unwrap().drain(..) {
            completion.complete();
        }
    }
}

impl AudioOutput for RecordingOutput {
    fn play(&self, buffer: DecodedAudioBuffer) -> Result<PlaybackHandle> {
        if self.fail {
            anyhow::bail!("no output device available");
        }

        self.played.lock().unwrap().push(buffer);
        let (handle, completion) = PlaybackHandle::pair();
        if self.manual {
            self.pending.lock().unwrap().push(completion);
        } else {
            completion.complete();
        }
        Ok(handle)
    }
}
