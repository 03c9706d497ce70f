mod fixture;

use std::sync::Arc;
use std::time::Duration;

use fixture::*;
use pulse_core::ai::mock::MockBehavior;
use pulse_core::voice::audio::{DecodeError, PlaybackEnd, RecordingOutput};
use pulse_core::voice::{NarrationError, NarrationOutcome, NarrationState, Narrator};
use tokio::sync::watch;

async fn wait_for_state(
    rx: &mut watch::Receiver<NarrationState>,
    predicate: impl FnMut(&NarrationState) -> bool,
) {
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(predicate))
        .await
        .expect("timed out waiting for narration state")
        .expect("narrator dropped");
}

#[tokio::test]
async fn test_speech_is_decoded_and_played() {
    let fixture = NarrationFixture::new(audio_behavior(&[0, 16384, -32768, 32767]));

    let outcome = fixture.narrator.speak("Welcome to the war room").await;

    match outcome {
        NarrationOutcome::Played { frames, end } => {
            assert_eq!(frames, 4);
            assert_eq!(end, PlaybackEnd::Completed);
        }
        other => panic!("expected playback, got {other:?}"),
    }

    let played = fixture.output.played();
    assert_eq!(played.len(), 1);
    assert_eq!(played[0].sample_rate(), 24_000);
    assert_eq!(played[0].channels(), 1);
    assert_eq!(
        played[0].channel(0).unwrap(),
        &[0.0, 0.5, -1.0, 32767.0 / 32768.0]
    );
    assert_eq!(fixture.narrator.state(), NarrationState::Idle);
}

#[tokio::test]
async fn test_blank_text_makes_no_request() {
    let fixture = NarrationFixture::new(audio_behavior(&[1, 2]));

    let outcome = fixture.narrator.speak("   ").await;

    assert!(matches!(outcome, NarrationOutcome::Skipped));
    assert_eq!(fixture.provider.get_call_count(), 0);
}

#[tokio::test]
async fn test_empty_payload_never_reaches_output() {
    let fixture = NarrationFixture::new(MockBehavior::Empty);

    let outcome = fixture.narrator.speak("Hello").await;

    assert!(matches!(outcome, NarrationOutcome::Empty));
    assert_eq!(fixture.output.play_count(), 0);
    assert_eq!(fixture.narrator.state(), NarrationState::Idle);
}

#[tokio::test]
async fn test_quota_exhaustion_is_reported_and_recovers() {
    let fixture = NarrationFixture::new(MockBehavior::QuotaExhausted);

    let outcome = fixture.narrator.speak("Hello").await;

    assert!(matches!(outcome, NarrationOutcome::QuotaExhausted));
    assert_eq!(fixture.output.play_count(), 0);
    assert_eq!(fixture.narrator.state(), NarrationState::Idle);

    fixture.provider.set_behavior(audio_behavior(&[100, 200]));
    let outcome = fixture.narrator.speak("Hello again").await;
    assert!(outcome.is_played());
}

#[tokio::test]
async fn test_request_failure_is_distinct_from_quota() {
    let fixture = NarrationFixture::new(MockBehavior::AlwaysNonRetryableError);

    let outcome = fixture.narrator.speak("Hello").await;

    assert!(matches!(
        outcome,
        NarrationOutcome::Failed(NarrationError::SynthesisRequestFailed(_))
    ));
    assert_eq!(fixture.narrator.state(), NarrationState::Idle);
}

#[tokio::test]
async fn test_malformed_payload_is_decode_failure() {
    let fixture = NarrationFixture::new(MockBehavior::InlineData {
        mime_type: "audio/L16".to_string(),
        data: "not*base64".to_string(),
    });

    let outcome = fixture.narrator.speak("Hello").await;

    assert!(matches!(
        outcome,
        NarrationOutcome::Failed(NarrationError::Decode(DecodeError::InvalidBase64(_)))
    ));
    assert_eq!(fixture.output.play_count(), 0);
    assert_eq!(fixture.narrator.state(), NarrationState::Idle);
}

#[tokio::test]
async fn test_output_failure_returns_to_idle() {
    let fixture =
        NarrationFixture::with_output(audio_behavior(&[1, 2, 3]), RecordingOutput::failing());

    let outcome = fixture.narrator.speak("Hello").await;

    assert!(matches!(
        outcome,
        NarrationOutcome::Failed(NarrationError::Output(_))
    ));
    assert_eq!(fixture.narrator.state(), NarrationState::Idle);
}

#[tokio::test]
async fn test_state_is_playing_until_output_completes() {
    let fixture =
        NarrationFixture::with_output(audio_behavior(&[5, 6, 7]), RecordingOutput::manual());
    let mut states = fixture.narrator.subscribe();

    let narrator = fixture.narrator.clone();
    let task = tokio::spawn(async move { narrator.speak("Hold on").await });

    wait_for_state(&mut states, |s| matches!(s, NarrationState::Playing { .. })).await;
    assert!(fixture.narrator.state().is_busy());
    assert_eq!(fixture.output.in_flight(), 1);

    fixture.output.complete_all();
    let outcome = task.await.unwrap();

    assert!(matches!(
        outcome,
        NarrationOutcome::Played {
            frames: 3,
            end: PlaybackEnd::Completed
        }
    ));
    assert_eq!(fixture.narrator.state(), NarrationState::Idle);
}

#[tokio::test]
async fn test_superseded_request_is_never_played() {
    init_tracing();
    let tts = GatedSpeech::new();
    let output = RecordingOutput::new();
    let narrator = Arc::new(Narrator::new(tts.clone(), output.clone()));
    let mut states = narrator.subscribe();

    let first_gate = tts.gate("first");
    let second_gate = tts.gate("second");

    let first = tokio::spawn({
        let narrator = narrator.clone();
        async move { narrator.speak("first").await }
    });
    wait_for_state(&mut states, |s| {
        *s == NarrationState::Requesting { request: 1 }
    })
    .await;

    let second = tokio::spawn({
        let narrator = narrator.clone();
        async move { narrator.speak("second").await }
    });
    wait_for_state(&mut states, |s| {
        *s == NarrationState::Requesting { request: 2 }
    })
    .await;

    first_gate.send(speech_payload(&[1, 1, 1])).unwrap();
    let first_outcome = first.await.unwrap();
    assert!(matches!(first_outcome, NarrationOutcome::Superseded));
    assert_eq!(output.play_count(), 0);
    assert_eq!(
        narrator.state(),
        NarrationState::Requesting { request: 2 }
    );

    second_gate.send(speech_payload(&[2, 2])).unwrap();
    let second_outcome = second.await.unwrap();
    assert!(second_outcome.is_played());

    let played = output.played();
    assert_eq!(played.len(), 1);
    assert_eq!(played[0].frames(), 2);
    assert_eq!(narrator.state(), NarrationState::Idle);
}

#[tokio::test]
async fn test_newer_playback_interrupts_older() {
    let fixture =
        NarrationFixture::with_output(audio_behavior(&[9, 9, 9, 9]), RecordingOutput::manual());
    let mut states = fixture.narrator.subscribe();

    let first = tokio::spawn({
        let narrator = fixture.narrator.clone();
        async move { narrator.speak("first").await }
    });
    wait_for_state(&mut states, |s| {
        *s == NarrationState::Playing { request: 1 }
    })
    .await;

    let second = tokio::spawn({
        let narrator = fixture.narrator.clone();
        async move { narrator.speak("second").await }
    });
    wait_for_state(&mut states, |s| {
        *s == NarrationState::Playing { request: 2 }
    })
    .await;

    let first_outcome = first.await.unwrap();
    assert!(matches!(
        first_outcome,
        NarrationOutcome::Played {
            end: PlaybackEnd::Interrupted,
            ..
        }
    ));
    assert_eq!(
        fixture.narrator.state(),
        NarrationState::Playing { request: 2 }
    );

    fixture.output.complete_all();
    let second_outcome = second.await.unwrap();
    assert!(matches!(
        second_outcome,
        NarrationOutcome::Played {
            end: PlaybackEnd::Completed,
            ..
        }
    ));
    assert_eq!(fixture.output.play_count(), 2);
}

#[tokio::test]
async fn test_cancel_stops_playback_and_resets_state() {
    let fixture =
        NarrationFixture::with_output(audio_behavior(&[3, 3]), RecordingOutput::manual());
    let mut states = fixture.narrator.subscribe();

    let task = tokio::spawn({
        let narrator = fixture.narrator.clone();
        async move { narrator.speak("Cancel me").await }
    });
    wait_for_state(&mut states, |s| matches!(s, NarrationState::Playing { .. })).await;

    fixture.narrator.cancel();

    let outcome = task.await.unwrap();
    assert!(matches!(
        outcome,
        NarrationOutcome::Played {
            end: PlaybackEnd::Interrupted,
            ..
        }
    ));
    assert_eq!(fixture.narrator.state(), NarrationState::Idle);
    assert_eq!(fixture.output.in_flight(), 0);
}

#[tokio::test]
async fn test_cancel_while_requesting_discards_result() {
    init_tracing();
    let tts = GatedSpeech::new();
    let output = RecordingOutput::new();
    let narrator = Arc::new(Narrator::new(tts.clone(), output.clone()));
    let mut states = narrator.subscribe();
    let gate = tts.gate("late answer");

    let task = tokio::spawn({
        let narrator = narrator.clone();
        async move { narrator.speak("late answer").await }
    });
    wait_for_state(&mut states, |s| matches!(s, NarrationState::Requesting { .. })).await;

    narrator.cancel();
    assert_eq!(narrator.state(), NarrationState::Idle);

    gate.send(speech_payload(&[4, 4, 4])).unwrap();
    let outcome = task.await.unwrap();

    assert!(matches!(outcome, NarrationOutcome::Superseded));
    assert_eq!(output.play_count(), 0);
    assert_eq!(narrator.state(), NarrationState::Idle);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_while_device_opens_is_never_heard() {
    init_tracing();
    let provider = pulse_core::ai::mock::MockProvider::new(audio_behavior(&[7, 7, 7]));
    let tts = pulse_core::voice::tts::GeminiSpeech::new(
        provider,
        pulse_core::voice::tts::gemini::GeminiSpeechConfig::default(),
    );
    let output = SlowOutput::new(Duration::from_millis(300));
    let narrator = Arc::new(Narrator::new(tts, output.clone()));
    let mut states = narrator.subscribe();

    let task = tokio::spawn({
        let narrator = narrator.clone();
        async move { narrator.speak("Opening").await }
    });
    wait_for_state(&mut states, |s| matches!(s, NarrationState::Playing { .. })).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    narrator.cancel();
    assert_eq!(narrator.state(), NarrationState::Idle);

    let outcome = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("cancelled narration did not finish")
        .unwrap();
    output.inner.complete_all();

    assert!(
        matches!(outcome, NarrationOutcome::Superseded),
        "cancelled request still played: {outcome:?}"
    );
    assert_eq!(output.inner.in_flight(), 0);
    assert_eq!(narrator.state(), NarrationState::Idle);
}
