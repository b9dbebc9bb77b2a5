//! Contract tests for the remote speech client and the orchestrator's
//! fallback path against a mock voice API.

use async_trait::async_trait;
use base64::Engine;
use materna::config::TtsConfig;
use materna::error::{MaternaError, RemoteReason};
use materna::tts::{
    AFFIRMATIONS_VOICE, AudioOutput, ContentCategory, ElevenLabsClient, LocalSynthesizer,
    PlaybackHandle, RemoteSynthesizer, SpeechOptions, SpeechOrchestrator, SpeechRequest,
    SynthesisMode, TIPS_VOICE, UtteranceParams,
};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> TtsConfig {
    TtsConfig {
        api_key: Some("test-key".to_string()),
        base_url: server.uri(),
        ..TtsConfig::default()
    }
}

fn request(text: &str, category: ContentCategory) -> SpeechRequest {
    SpeechRequest {
        text: text.to_string(),
        voice_profile: None,
        category,
    }
}

#[tokio::test]
async fn synthesize_sends_category_voice_and_settings() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/v1/text-to-speech/{}", AFFIRMATIONS_VOICE)))
        .and(query_param("output_format", "mp3_44100_128"))
        .and(header("xi-api-key", "test-key"))
        .and(body_partial_json(json!({
            "text": "You are enough",
            "model_id": "eleven_multilingual_v2",
            "voice_settings": {
                "stability": 0.5,
                "similarity_boost": 0.8,
                "use_speaker_boost": true
            }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "audio/mpeg")
                .set_body_bytes(vec![0xFF, 0xFB, 0x90, 0x00]),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = ElevenLabsClient::new("test-key", &config_for(&server));
    let audio = client
        .synthesize(&request("You are enough", ContentCategory::Affirmations))
        .await
        .unwrap_or_else(|e| panic!("Expected audio, got: {e}"));
    assert_eq!(audio, vec![0xFF, 0xFB, 0x90, 0x00]);
}

#[tokio::test]
async fn tips_use_the_informative_voice() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/v1/text-to-speech/{}", TIPS_VOICE)))
        .and(body_partial_json(json!({
            "voice_settings": { "stability": 0.7, "use_speaker_boost": false }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1, 2, 3]))
        .expect(1)
        .mount(&server)
        .await;

    let client = ElevenLabsClient::new("test-key", &config_for(&server));
    let audio = client
        .synthesize(&request("Stay hydrated", ContentCategory::Tips))
        .await
        .unwrap_or_else(|e| panic!("Expected audio, got: {e}"));
    assert_eq!(audio.len(), 3);
}

#[tokio::test]
async fn json_wrapped_audio_is_decoded() {
    let server = MockServer::start().await;
    let encoded = base64::engine::general_purpose::STANDARD.encode([9u8, 8, 7]);

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "audio": encoded })))
        .mount(&server)
        .await;

    let client = ElevenLabsClient::new("test-key", &config_for(&server));
    let audio = client
        .synthesize(&request("hi", ContentCategory::Affirmations))
        .await
        .unwrap_or_else(|e| panic!("Expected audio, got: {e}"));
    assert_eq!(audio, vec![9, 8, 7]);
}

#[tokio::test]
async fn quota_error_keeps_reason_and_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "detail": { "status": "quota_exceeded", "message": "Character limit reached" }
        })))
        .mount(&server)
        .await;

    let client = ElevenLabsClient::new("test-key", &config_for(&server));
    let err = client
        .synthesize(&request("hi", ContentCategory::Tips))
        .await
        .unwrap_err();
    match err {
        MaternaError::RemoteApi { reason, message } => {
            assert_eq!(reason, RemoteReason::Quota);
            assert_eq!(message, "Character limit reached");
        }
        other => panic!("Expected RemoteApi, got: {other:?}"),
    }
}

#[tokio::test]
async fn empty_body_is_a_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "audio/mpeg"))
        .mount(&server)
        .await;

    let client = ElevenLabsClient::new("test-key", &config_for(&server));
    let err = client
        .synthesize(&request("hi", ContentCategory::Tips))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Empty audio payload"));
}

#[tokio::test]
async fn voices_are_listed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/voices"))
        .and(header("xi-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "voices": [
                { "voice_id": "a1", "name": "Bella", "category": "premade" },
                { "voice_id": "b2", "name": "Adam" }
            ]
        })))
        .mount(&server)
        .await;

    let client = ElevenLabsClient::new("test-key", &config_for(&server));
    let voices = client
        .list_voices()
        .await
        .unwrap_or_else(|e| panic!("Expected voices, got: {e}"));
    assert_eq!(voices.len(), 2);
    assert_eq!(voices[0].voice_id, "a1");
}

struct Silent;

#[async_trait]
impl PlaybackHandle for Silent {
    async fn stop(&mut self) -> materna::Result<()> {
        Ok(())
    }
    async fn pause(&mut self) -> materna::Result<()> {
        Ok(())
    }
    async fn resume(&mut self) -> materna::Result<()> {
        Ok(())
    }
    fn is_finished(&mut self) -> bool {
        false
    }
}

#[derive(Default)]
struct CountingOutput {
    plays: AtomicUsize,
}

#[async_trait]
impl AudioOutput for CountingOutput {
    async fn play(&self, _audio: Vec<u8>) -> materna::Result<Box<dyn PlaybackHandle>> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(Silent))
    }
}

#[derive(Default)]
struct CountingSpeaker {
    utterances: AtomicUsize,
}

#[async_trait]
impl LocalSynthesizer for CountingSpeaker {
    async fn speak(
        &self,
        _text: &str,
        _params: &UtteranceParams,
    ) -> materna::Result<Box<dyn PlaybackHandle>> {
        self.utterances.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(Silent))
    }
}

#[tokio::test]
async fn server_error_switches_session_to_on_device_speech() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .expect(1)
        .mount(&server)
        .await;

    let output = Arc::new(CountingOutput::default());
    let speaker = Arc::new(CountingSpeaker::default());
    let remote = Arc::new(ElevenLabsClient::new("test-key", &config_for(&server)));
    let orchestrator = SpeechOrchestrator::new(Some(remote), output.clone(), speaker.clone(), 2000);

    let options = SpeechOptions::new(ContentCategory::Tips);
    for _ in 0..3 {
        let mode = orchestrator
            .speak("Take your vitamins", &options)
            .await
            .unwrap_or_else(|e| panic!("Expected fallback speech, got: {e}"));
        assert_eq!(mode, SynthesisMode::Fallback);
    }

    assert_eq!(output.plays.load(Ordering::SeqCst), 0);
    assert_eq!(speaker.utterances.load(Ordering::SeqCst), 3);
}
