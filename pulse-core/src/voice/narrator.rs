//! Narration: text in, audio out.
//!
//! One `speak` call walks `Idle → Requesting → Decoding → Playing → Idle`.
//! Each call takes a fresh generation number; once a newer call starts, the
//! older one may finish its network round trip but its audio is discarded
//! and it no longer touches the observable state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::audio::output::{AudioOutput, PlaybackEnd, StopHandle};
use super::audio::{decode_base64, normalize_pcm, DecodeError, DecodedAudioBuffer};
use super::tts::{SpeechPayload, TextToSpeech, Voice};
use crate::ai::AiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrationState {
    Idle,
    Requesting { request: u64 },
    Decoding { request: u64 },
    Playing { request: u64 },
}

impl NarrationState {
    /// True while a request is in flight, i.e. what a UI shows as loading
    pub fn is_busy(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

#[derive(Error, Debug)]
pub enum NarrationError {
    #[error("synthesis request failed: {0}")]
    SynthesisRequestFailed(AiError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("audio output failed: {0}")]
    Output(anyhow::Error),
}

#[derive(Debug)]
pub enum NarrationOutcome {
    /// Nothing to say; no request was made
    Skipped,
    Played {
        frames: usize,
        end: PlaybackEnd,
    },
    /// The service answered without audio
    Empty,
    /// A newer request started before this one reached the speaker
    Superseded,
    QuotaExhausted,
    Failed(NarrationError),
}

impl NarrationOutcome {
    pub fn is_played(&self) -> bool {
        matches!(self, Self::Played { .. })
    }
}

pub struct Narrator<T, O> {
    tts: T,
    output: O,
    voice: Option<Voice>,
    generation: AtomicU64,
    state: watch::Sender<NarrationState>,
    current_playback: Mutex<Option<(u64, StopHandle)>>,
}

impl<T: TextToSpeech, O: AudioOutput> Narrator<T, O> {
    pub fn new(tts: T, output: O) -> Self {
        let (state, _) = watch::channel(NarrationState::Idle);
        Self {
            tts,
            output,
            voice: None,
            generation: AtomicU64::new(0),
            state,
            current_playback: Mutex::new(None),
        }
    }

    pub fn with_voice(mut self, voice: Voice) -> Self {
        self.voice = Some(voice);
        self
    }

    pub fn state(&self) -> NarrationState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<NarrationState> {
        self.state.subscribe()
    }

    /// Synthesize `text` and play it. Never fails past this boundary: every
    /// error is logged, the state returns to `Idle`, and the outcome says
    /// what happened.
    pub async fn speak(&self, text: &str) -> NarrationOutcome {
        if text.trim().is_empty() {
            return NarrationOutcome::Skipped;
        }

        let request = self.begin_request();

        let payload = match self.tts.synthesize(text, self.voice.as_ref()).await {
            Ok(payload) => payload,
            Err(e) if e.is_quota_exhausted() => {
                warn!(request, error = %e, "speech synthesis quota exhausted");
                self.settle(request);
                return NarrationOutcome::QuotaExhausted;
            }
            Err(e) => {
                error!(request, error = %e, "speech synthesis failed");
                self.settle(request);
                return NarrationOutcome::Failed(NarrationError::SynthesisRequestFailed(e));
            }
        };

        if !self.is_current(request) {
            info!(request, "discarding superseded speech result");
            return NarrationOutcome::Superseded;
        }

        if payload.is_empty() {
            debug!(request, "speech response was empty, nothing to play");
            self.settle(request);
            return NarrationOutcome::Empty;
        }

        self.transition(request, NarrationState::Decoding { request });
        let buffer = match decode_payload(&payload) {
            Ok(buffer) => buffer,
            Err(e) => {
                error!(request, error = %e, "speech payload could not be decoded");
                self.settle(request);
                return NarrationOutcome::Failed(NarrationError::Decode(e));
            }
        };

        if !self.is_current(request) {
            info!(request, "discarding superseded speech result");
            return NarrationOutcome::Superseded;
        }

        let frames = buffer.frames();
        self.transition(request, NarrationState::Playing { request });
        let handle = match self.output.play(buffer) {
            Ok(handle) => handle,
            Err(e) => {
                error!(request, error = ?e, "audio output failed");
                self.settle(request);
                return NarrationOutcome::Failed(NarrationError::Output(e));
            }
        };

        {
            // `cancel` and newer requests bump the generation under this
            // lock, so a stale request cannot register after they ran.
            let mut current = self.current_playback.lock().unwrap();
            if !self.is_current(request) {
                info!(request, "stopping superseded playback before it is heard");
                handle.stop();
                return NarrationOutcome::Superseded;
            }
            if let Some((owner, previous)) = current.replace((request, handle.stop_handle())) {
                debug!(request, previous = owner, "stopping older playback");
                previous.stop();
            }
        }

        let end = handle.wait().await;

        {
            let mut current = self.current_playback.lock().unwrap();
            if matches!(current.as_ref(), Some((owner, _)) if *owner == request) {
                *current = None;
            }
        }

        info!(request, frames, ?end, "playback finished");
        self.settle(request);
        NarrationOutcome::Played { frames, end }
    }

    /// Discard every in-flight request and stop whatever is playing.
    pub fn cancel(&self) {
        let mut current = self.current_playback.lock().unwrap();
        self.state.send_modify(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *state = NarrationState::Idle;
        });
        if let Some((owner, stop)) = current.take() {
            debug!(request = owner, "cancelling playback");
            stop.stop();
        }
    }

    /// Take the next generation number and enter `Requesting` in one step.
    fn begin_request(&self) -> u64 {
        let _current = self.current_playback.lock().unwrap();
        let mut request = 0;
        self.state.send_modify(|state| {
            request = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = NarrationState::Requesting { request };
        });
        request
    }

    fn is_current(&self, request: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == request
    }

    /// The generation is only bumped while the state channel is locked, so
    /// comparing inside `send_if_modified` keeps stale requests out.
    fn transition(&self, request: u64, next: NarrationState) {
        self.state.send_if_modified(|state| {
            if !self.is_current(request) || *state == next {
                return false;
            }
            *state = next;
            true
        });
    }

    fn settle(&self, request: u64) {
        self.transition(request, NarrationState::Idle);
    }
}

fn decode_payload(payload: &SpeechPayload) -> Result<DecodedAudioBuffer, DecodeError> {
    let bytes = decode_base64(&payload.base64)?;
    normalize_pcm(&bytes, payload.profile)
}
