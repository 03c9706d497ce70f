//! Audio playback using cpal
//! Resamples from the buffer rate to the native device rate if needed

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample, StreamConfig, SupportedStreamConfig};
use rubato::{FftFixedIn, Resampler};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use super::output::{AudioOutput, PlaybackCompletion, PlaybackHandle};
use super::pcm::DecodedAudioBuffer;

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const RESAMPLE_CHUNK_FRAMES: usize = 1024;

/// Plays buffers on the default output device.
///
/// cpal streams are not `Send` on every platform, so each playback owns a
/// dedicated thread that builds, drives and drops its stream.
pub struct CpalOutput {
    device_name: Option<String>,
}

impl CpalOutput {
    /// Create an output bound to the default output device.
    ///
    /// Fails early when the host has no output device, so callers can report
    /// it before any synthesis request is made.
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .context("no output device available")?;
        let device_name = device.name().ok();

        tracing::debug!(device_name = ?device_name, "audio output initialized");
        Ok(Self { device_name })
    }
}

impl AudioOutput for CpalOutput {
    fn play(&self, buffer: DecodedAudioBuffer) -> Result<PlaybackHandle> {
        let (handle, completion) = PlaybackHandle::pair();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<()>>();

        tracing::info!(
            device_name = ?self.device_name,
            frames = buffer.frames(),
            sample_rate = buffer.sample_rate(),
            "starting playback"
        );

        std::thread::Builder::new()
            .name("pulse-playback".to_string())
            .spawn(move || run_playback(buffer, completion, ready_tx))
            .context("failed to spawn playback thread")?;

        // Wait until the stream is actually playing so device errors surface
        // from `play` instead of as a silent interruption.
        ready_rx
            .recv()
            .context("playback thread exited before starting")??;

        Ok(handle)
    }
}

fn run_playback(
    buffer: DecodedAudioBuffer,
    completion: PlaybackCompletion,
    ready: mpsc::Sender<Result<()>>,
) {
    let stream = match start_stream(buffer, completion.clone()) {
        Ok(stream) => {
            let _ = ready.send(Ok(()));
            stream
        }
        Err(e) => {
            completion.interrupt();
            let _ = ready.send(Err(e));
            return;
        }
    };

    while !completion.is_finished() {
        std::thread::sleep(POLL_INTERVAL);
    }

    drop(stream);
    tracing::debug!("playback stream released");
}

fn start_stream(buffer: DecodedAudioBuffer, completion: PlaybackCompletion) -> Result<cpal::Stream> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .context("no output device available")?;
    let supported_config = device
        .default_output_config()
        .context("failed to get default output config")?;

    let native_rate = supported_config.sample_rate().0;
    let native_channels = supported_config.channels() as usize;
    let sample_format = supported_config.sample_format();

    let samples = prepare_samples(buffer, native_rate, native_channels)?;
    let samples = Arc::new(samples);
    let position = Arc::new(AtomicUsize::new(0));

    let stream = match sample_format {
        SampleFormat::F32 => {
            build_stream::<f32>(&device, &supported_config, samples, position, completion)?
        }
        SampleFormat::I16 => {
            build_stream::<i16>(&device, &supported_config, samples, position, completion)?
        }
        format => anyhow::bail!("unsupported sample format: {:?}", format),
    };

    stream.play().context("failed to start playback stream")?;
    Ok(stream)
}

/// Resample every channel to the device rate and interleave for the device
/// channel count. Mono sources are copied to every device channel; extra
/// source channels beyond the device's are dropped.
fn prepare_samples(
    buffer: DecodedAudioBuffer,
    native_rate: u32,
    native_channels: usize,
) -> Result<Vec<f32>> {
    let source_rate = buffer.sample_rate();
    let channels = buffer.into_channels();

    let resampled: Vec<Vec<f32>> = channels
        .iter()
        .map(|c| resample(c, source_rate, native_rate))
        .collect::<Result<_>>()?;

    let frames = resampled.first().map(Vec::len).unwrap_or(0);
    let mut output = Vec::with_capacity(frames * native_channels);
    for i in 0..frames {
        for device_channel in 0..native_channels {
            let source = if resampled.len() == 1 {
                &resampled[0]
            } else {
                match resampled.get(device_channel) {
                    Some(channel) => channel,
                    None => {
                        output.push(0.0);
                        continue;
                    }
                }
            };
            output.push(source[i]);
        }
    }
    Ok(output)
}

fn build_stream<T>(
    device: &cpal::Device,
    supported_config: &SupportedStreamConfig,
    samples: Arc<Vec<f32>>,
    position: Arc<AtomicUsize>,
    completion: PlaybackCompletion,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32> + Default + Send + 'static,
{
    let config: StreamConfig = supported_config.clone().into();
    let err_completion = completion.clone();

    device
        .build_output_stream(
            &config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                if completion.is_stop_requested() {
                    data.fill(T::default());
                    return;
                }

                let pos = position.load(Ordering::SeqCst);
                let pending = samples.get(pos..).unwrap_or_default();
                let written = pending.len().min(data.len());
                for (out, &sample) in data.iter_mut().zip(pending) {
                    *out = T::from_sample(sample);
                }
                data[written..].fill(T::default());
                position.store(pos + written, Ordering::SeqCst);

                if written == 0 {
                    completion.complete();
                }
            },
            move |err| {
                tracing::error!(error = ?err, "playback stream error");
                err_completion.interrupt();
            },
            None,
        )
        .context("failed to build output stream")
}

/// Resample one channel. The result has exactly
/// `ceil(len * target_rate / source_rate)` frames with the filter delay
/// removed.
fn resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    if source_rate == target_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let mut resampler = FftFixedIn::<f32>::new(
        source_rate as usize,
        target_rate as usize,
        RESAMPLE_CHUNK_FRAMES,
        2,
        1,
    )
    .context("failed to create resampler")?;

    let expected = (samples.len() as u64 * target_rate as u64).div_ceil(source_rate as u64) as usize;
    let delay = resampler.output_delay();
    let mut output = Vec::with_capacity(expected + delay);

    let mut remaining = samples;
    while remaining.len() >= resampler.input_frames_next() {
        let (chunk, rest) = remaining.split_at(resampler.input_frames_next());
        let input = [chunk];
        output.extend(single_channel(resampler.process(&input[..], None))?);
        remaining = rest;
    }
    if !remaining.is_empty() {
        let input = [remaining];
        output.extend(single_channel(resampler.process_partial(Some(&input[..]), None))?);
    }
    while output.len() < expected + delay {
        output.extend(single_channel(resampler.process_partial::<&[f32]>(None, None))?);
    }

    output.drain(..delay);
    output.truncate(expected);
    Ok(output)
}

fn single_channel(result: rubato::ResampleResult<Vec<Vec<f32>>>) -> Result<Vec<f32>> {
    let mut channels = result.map_err(|e| anyhow::anyhow!("resampling failed: {e}"))?;
    Ok(channels.pop().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::audio::{normalize_pcm, AudioProfile};

    fn speech_buffer(samples: &[i16]) -> DecodedAudioBuffer {
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        normalize_pcm(&bytes, AudioProfile::SPEECH).unwrap()
    }

    #[test]
    fn test_mono_expands_to_device_channels() {
        let buffer = speech_buffer(&[16384, -16384]);
        let samples = prepare_samples(buffer, 24_000, 2).unwrap();
        assert_eq!(samples, vec![0.5, 0.5, -0.5, -0.5]);
    }

    #[test]
    fn test_resample_changes_length_by_ratio() {
        let input = vec![0.0f32; 24_000];
        let output = resample(&input, 24_000, 48_000).unwrap();
        assert_eq!(output.len(), 48_000);

        let output = resample(&input[..1_001], 24_000, 44_100).unwrap();
        assert_eq!(output.len(), 1_840);
    }
}
