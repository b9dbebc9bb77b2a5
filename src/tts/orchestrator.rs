use super::types::{
    AudioOutput, LocalSynthesizer, PlaybackHandle, RemoteSynthesizer, SpeechOptions,
    SpeechRequest, SynthesisMode,
};
use super::voice::select_voice;
use crate::error::{MaternaError, Result};
use crate::utils::truncate_with_ellipsis;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const BOTH_BACKENDS_FAILED: &str = "Both remote and on-device speech failed";

struct ActivePlayback {
    backend: SynthesisMode,
    handle: Box<dyn PlaybackHandle>,
    paused: bool,
}

struct PlaybackState {
    mode: SynthesisMode,
    active: Option<ActivePlayback>,
}

/// Speaks text through the remote voice API, degrading to the on-device
/// engine on the first remote failure for the rest of the session.
pub struct SpeechOrchestrator {
    remote: Option<Arc<dyn RemoteSynthesizer>>,
    output: Arc<dyn AudioOutput>,
    local: Arc<dyn LocalSynthesizer>,
    max_text_len: usize,
    state: Mutex<PlaybackState>,
    generation: AtomicU64,
}

impl SpeechOrchestrator {
    pub fn new(
        remote: Option<Arc<dyn RemoteSynthesizer>>,
        output: Arc<dyn AudioOutput>,
        local: Arc<dyn LocalSynthesizer>,
        max_text_len: usize,
    ) -> Self {
        // Without a remote backend the session starts in fallback mode.
        let mode = if remote.is_some() {
            SynthesisMode::Remote
        } else {
            SynthesisMode::Fallback
        };
        Self {
            remote,
            output,
            local,
            max_text_len,
            state: Mutex::new(PlaybackState { mode, active: None }),
            generation: AtomicU64::new(0),
        }
    }

    pub async fn mode(&self) -> SynthesisMode {
        self.state.lock().await.mode
    }

    pub async fn is_playing(&self) -> bool {
        let mut state = self.state.lock().await;
        match state.active.as_mut() {
            Some(active) => !active.paused && !active.handle.is_finished(),
            None => false,
        }
    }

    /// Backend currently holding the playback handle, if any.
    pub async fn active_backend(&self) -> Option<SynthesisMode> {
        self.state.lock().await.active.as_ref().map(|a| a.backend)
    }

    /// Speaks `text`, superseding anything already playing or pending.
    /// Returns the backend that ended up producing the speech.
    pub async fn speak(&self, text: &str, options: &SpeechOptions) -> Result<SynthesisMode> {
        if text.trim().is_empty() {
            return Err(MaternaError::Validation("No text provided".to_string()));
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.release_active().await;

        let mode = self.mode().await;
        let mut remote_failed = false;

        if mode == SynthesisMode::Remote
            && let Some(remote) = &self.remote
        {
            let request = SpeechRequest {
                text: truncate_with_ellipsis(text, self.max_text_len),
                voice_profile: options.voice_profile.clone(),
                category: options.category,
            };

            match self.speak_remote(remote.as_ref(), &request, generation).await {
                Ok(()) => return Ok(SynthesisMode::Remote),
                Err(MaternaError::Cancelled) => return Err(MaternaError::Cancelled),
                Err(e) => {
                    warn!(
                        "Remote speech failed, switching to on-device synthesis: {}",
                        e
                    );
                    self.state.lock().await.mode = SynthesisMode::Fallback;
                    remote_failed = true;
                }
            }
        }

        match self.speak_local(text, options, generation).await {
            Ok(()) => Ok(SynthesisMode::Fallback),
            Err(MaternaError::Cancelled) => Err(MaternaError::Cancelled),
            Err(e) if remote_failed => {
                warn!("On-device speech failed after remote failure: {}", e);
                Err(MaternaError::Playback(BOTH_BACKENDS_FAILED.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    async fn speak_remote(
        &self,
        remote: &dyn RemoteSynthesizer,
        request: &SpeechRequest,
        generation: u64,
    ) -> Result<()> {
        let audio = remote.synthesize(request).await?;
        if audio.is_empty() {
            return Err(MaternaError::Playback("Empty audio payload".to_string()));
        }

        let mut state = self.state.lock().await;
        if self.is_superseded(generation) {
            debug!("Discarding synthesized audio for a superseded request");
            return Err(MaternaError::Cancelled);
        }
        let handle = self.output.play(audio).await?;
        state.active = Some(ActivePlayback {
            backend: SynthesisMode::Remote,
            handle,
            paused: false,
        });
        Ok(())
    }

    async fn speak_local(&self, text: &str, options: &SpeechOptions, generation: u64) -> Result<()> {
        if !self.local.is_supported() {
            return Err(MaternaError::Playback(
                "Speech synthesis not supported on this device".to_string(),
            ));
        }

        let mut params = options.category.utterance_params();
        let voices = self.local.voices().await;
        params.voice = select_voice(&voices, options.category).map(|v| v.name.clone());

        let mut state = self.state.lock().await;
        if self.is_superseded(generation) {
            return Err(MaternaError::Cancelled);
        }
        let handle = self.local.speak(text, &params).await?;
        state.active = Some(ActivePlayback {
            backend: SynthesisMode::Fallback,
            handle,
            paused: false,
        });
        Ok(())
    }

    /// Stops playback and cancels any request still waiting on the network.
    pub async fn stop(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.release_active().await;
    }

    pub async fn pause(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        let Some(active) = state.active.as_mut() else {
            return Ok(());
        };
        if active.paused || active.handle.is_finished() {
            return Ok(());
        }
        active.handle.pause().await?;
        active.paused = true;
        Ok(())
    }

    pub async fn resume(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        let Some(active) = state.active.as_mut() else {
            return Ok(());
        };
        if !active.paused || active.handle.is_finished() {
            return Ok(());
        }
        active.handle.resume().await.map_err(|e| {
            MaternaError::Playback(format!("Failed to resume playback: {}", e))
        })?;
        active.paused = false;
        Ok(())
    }

    fn is_superseded(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }

    async fn release_active(&self) {
        let active = self.state.lock().await.active.take();
        if let Some(mut active) = active {
            if let Err(e) = active.handle.stop().await {
                warn!("Failed to stop {:?} playback: {}", active.backend, e);
            } else {
                info!("Stopped {:?} playback", active.backend);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteReason;
    use crate::tts::types::{ContentCategory, UtteranceParams};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::time::Duration;

    #[derive(Default)]
    struct Tally {
        started: AtomicUsize,
        stopped: AtomicUsize,
        live: AtomicUsize,
        max_live: AtomicUsize,
    }

    impl Tally {
        fn start(self: &Arc<Self>) -> Box<dyn PlaybackHandle> {
            self.started.fetch_add(1, Ordering::SeqCst);
            let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_live.fetch_max(live, Ordering::SeqCst);
            Box::new(FakeHandle {
                tally: self.clone(),
                done: false,
            })
        }
    }

    struct FakeHandle {
        tally: Arc<Tally>,
        done: bool,
    }

    #[async_trait]
    impl PlaybackHandle for FakeHandle {
        async fn stop(&mut self) -> Result<()> {
            if !self.done {
                self.done = true;
                self.tally.stopped.fetch_add(1, Ordering::SeqCst);
                self.tally.live.fetch_sub(1, Ordering::SeqCst);
            }
            Ok(())
        }
        async fn pause(&mut self) -> Result<()> {
            Ok(())
        }
        async fn resume(&mut self) -> Result<()> {
            Ok(())
        }
        fn is_finished(&mut self) -> bool {
            self.done
        }
    }

    struct FakeRemote {
        calls: AtomicUsize,
        fail: AtomicBool,
        delay: Duration,
        texts: std::sync::Mutex<Vec<String>>,
    }

    impl FakeRemote {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail: AtomicBool::new(fail),
                delay: Duration::ZERO,
                texts: std::sync::Mutex::new(Vec::new()),
            })
        }

        fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
                delay,
                texts: std::sync::Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl RemoteSynthesizer for FakeRemote {
        async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.texts.lock().unwrap().push(request.text.clone());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(MaternaError::RemoteApi {
                    reason: RemoteReason::Quota,
                    message: "quota exceeded".to_string(),
                });
            }
            Ok(vec![0xFF, 0xFB, 0x90])
        }
    }

    struct FakeOutput {
        tally: Arc<Tally>,
    }

    #[async_trait]
    impl AudioOutput for FakeOutput {
        async fn play(&self, _audio: Vec<u8>) -> Result<Box<dyn PlaybackHandle>> {
            Ok(self.tally.start())
        }
    }

    struct FakeLocal {
        tally: Arc<Tally>,
        fail: bool,
        last_params: std::sync::Mutex<Option<UtteranceParams>>,
    }

    #[async_trait]
    impl LocalSynthesizer for FakeLocal {
        async fn speak(&self, _text: &str, params: &UtteranceParams) -> Result<Box<dyn PlaybackHandle>> {
            if self.fail {
                return Err(MaternaError::Playback("engine crashed".to_string()));
            }
            *self.last_params.lock().unwrap() = Some(params.clone());
            Ok(self.tally.start())
        }
    }

    struct Harness {
        orchestrator: Arc<SpeechOrchestrator>,
        remote: Arc<FakeRemote>,
        remote_tally: Arc<Tally>,
        local_tally: Arc<Tally>,
        local: Arc<FakeLocal>,
    }

    fn harness(remote: Option<Arc<FakeRemote>>, local_fails: bool) -> Harness {
        let remote_tally = Arc::new(Tally::default());
        let local_tally = Arc::new(Tally::default());
        let local = Arc::new(FakeLocal {
            tally: local_tally.clone(),
            fail: local_fails,
            last_params: std::sync::Mutex::new(None),
        });
        let remote_arg = remote.clone().map(|r| r as Arc<dyn RemoteSynthesizer>);
        let orchestrator = Arc::new(SpeechOrchestrator::new(
            remote_arg,
            Arc::new(FakeOutput {
                tally: remote_tally.clone(),
            }),
            local.clone(),
            40,
        ));
        Harness {
            orchestrator,
            remote: remote.unwrap_or_else(|| FakeRemote::new(false)),
            remote_tally,
            local_tally,
            local,
        }
    }

    #[tokio::test]
    async fn remote_path_used_when_healthy() {
        let h = harness(Some(FakeRemote::new(false)), false);
        let opts = SpeechOptions::new(ContentCategory::Tips);
        let mode = h.orchestrator.speak("Stay hydrated", &opts).await.unwrap();
        assert_eq!(mode, SynthesisMode::Remote);
        assert_eq!(h.remote_tally.started.load(Ordering::SeqCst), 1);
        assert_eq!(h.local_tally.started.load(Ordering::SeqCst), 0);
        assert!(h.orchestrator.is_playing().await);
    }

    #[tokio::test]
    async fn remote_failure_is_sticky_and_silent() {
        let h = harness(Some(FakeRemote::new(true)), false);
        let opts = SpeechOptions::default();

        let mode = h.orchestrator.speak("You are enough", &opts).await.unwrap();
        assert_eq!(mode, SynthesisMode::Fallback);
        assert_eq!(h.orchestrator.mode().await, SynthesisMode::Fallback);

        h.remote.fail.store(false, Ordering::SeqCst);
        for _ in 0..3 {
            let mode = h.orchestrator.speak("again", &opts).await.unwrap();
            assert_eq!(mode, SynthesisMode::Fallback);
        }
        assert_eq!(h.remote.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.local_tally.started.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn both_failing_surfaces_single_message() {
        let h = harness(Some(FakeRemote::new(true)), true);
        let err = h
            .orchestrator
            .speak("hello", &SpeechOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), format!("Playback error: {}", BOTH_BACKENDS_FAILED));
    }

    #[tokio::test]
    async fn new_speak_stops_previous_playback() {
        let h = harness(Some(FakeRemote::new(false)), false);
        let opts = SpeechOptions::default();
        h.orchestrator.speak("one", &opts).await.unwrap();
        h.orchestrator.speak("two", &opts).await.unwrap();
        h.orchestrator.speak("three", &opts).await.unwrap();

        assert_eq!(h.remote_tally.started.load(Ordering::SeqCst), 3);
        assert_eq!(h.remote_tally.stopped.load(Ordering::SeqCst), 2);
        assert_eq!(h.remote_tally.max_live.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn long_text_is_truncated_for_remote_only() {
        let h = harness(Some(FakeRemote::new(false)), false);
        let text = "a ".repeat(100);
        h.orchestrator.speak(&text, &SpeechOptions::default()).await.unwrap();
        let sent = h.remote.texts.lock().unwrap()[0].clone();
        assert!(sent.ends_with("..."));
        assert!(sent.chars().count() <= 40);
    }

    #[tokio::test]
    async fn unconfigured_remote_goes_straight_to_fallback() {
        let h = harness(None, false);
        let opts = SpeechOptions::new(ContentCategory::Affirmations);
        let mode = h.orchestrator.speak("Breathe", &opts).await.unwrap();
        assert_eq!(mode, SynthesisMode::Fallback);

        let params = h.local.last_params.lock().unwrap().clone().unwrap();
        assert_eq!(params.rate, 0.8);
        assert_eq!(params.pitch, 1.1);
    }

    #[tokio::test]
    async fn controls_are_noops_when_idle() {
        let h = harness(Some(FakeRemote::new(false)), false);
        h.orchestrator.stop().await;
        h.orchestrator.pause().await.unwrap();
        h.orchestrator.resume().await.unwrap();
        assert!(!h.orchestrator.is_playing().await);
    }

    #[tokio::test]
    async fn pause_and_resume_track_state() {
        let h = harness(Some(FakeRemote::new(false)), false);
        h.orchestrator.speak("tip", &SpeechOptions::default()).await.unwrap();
        h.orchestrator.pause().await.unwrap();
        assert!(!h.orchestrator.is_playing().await);
        h.orchestrator.resume().await.unwrap();
        assert!(h.orchestrator.is_playing().await);
        h.orchestrator.stop().await;
        assert!(h.orchestrator.active_backend().await.is_none());
    }

    #[tokio::test]
    async fn stop_during_synthesis_discards_late_audio() {
        let h = harness(Some(FakeRemote::slow(Duration::from_millis(50))), false);
        let orchestrator = h.orchestrator.clone();
        let pending = tokio::spawn(async move {
            orchestrator.speak("slow", &SpeechOptions::default()).await
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        h.orchestrator.stop().await;

        let result = pending.await.unwrap();
        assert!(matches!(result, Err(MaternaError::Cancelled)));
        assert_eq!(h.remote_tally.started.load(Ordering::SeqCst), 0);
        assert_eq!(h.orchestrator.mode().await, SynthesisMode::Remote);
    }

    #[tokio::test]
    async fn newer_speak_supersedes_one_still_synthesizing() {
        let h = harness(Some(FakeRemote::slow(Duration::from_millis(50))), false);
        let orchestrator = h.orchestrator.clone();
        let first = tokio::spawn(async move {
            orchestrator.speak("first", &SpeechOptions::default()).await
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = h.orchestrator.speak("second", &SpeechOptions::default()).await;

        assert_eq!(second.unwrap(), SynthesisMode::Remote);
        assert!(matches!(first.await.unwrap(), Err(MaternaError::Cancelled)));
        assert_eq!(h.remote.calls.load(Ordering::SeqCst), 2);
        assert_eq!(h.remote_tally.started.load(Ordering::SeqCst), 1);
        assert_eq!(h.remote_tally.max_live.load(Ordering::SeqCst), 1);
        assert_eq!(h.orchestrator.active_backend().await, Some(SynthesisMode::Remote));
        assert_eq!(h.orchestrator.mode().await, SynthesisMode::Remote);
    }
}
