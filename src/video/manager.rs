use super::retry::{JoinAction, next_join_action};
use super::state::{SessionEvent, SessionState};
use super::types::{
    CallFrame, ConversationApi, ConversationSession, MediaConstraints, MediaDevices, MediaStream,
    RoomEvent, RoomHost, SessionStatus,
};
use crate::config::VideoConfig;
use crate::error::{MaternaError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const USER_NAME: &str = "Expecting Mother";

#[derive(Default)]
struct Inner {
    state: SessionState,
    stream: Option<Arc<dyn MediaStream>>,
    frame: Option<Arc<dyn CallFrame>>,
    session: Option<ConversationSession>,
    is_muted: bool,
    is_video_enabled: bool,
}

#[derive(Default)]
struct Resources {
    stream: Option<Arc<dyn MediaStream>>,
    frame: Option<Arc<dyn CallFrame>>,
    session: Option<ConversationSession>,
}

impl Inner {
    fn apply(&mut self, event: SessionEvent) -> bool {
        match self.state.next(&event) {
            Some(next) => {
                info!("Video session {} -> {} ({:?})", self.state, next, event);
                self.state = next;
                true
            }
            None => {
                debug!("Ignoring {:?} in state {}", event, self.state);
                false
            }
        }
    }

    fn take_resources(&mut self) -> Resources {
        self.is_muted = false;
        self.is_video_enabled = true;
        Resources {
            stream: self.stream.take(),
            frame: self.frame.take(),
            session: self.session.take(),
        }
    }
}

/// Drives one avatar video call at a time: media, remote conversation,
/// embedded room and teardown.
pub struct VideoSessionManager {
    devices: Arc<dyn MediaDevices>,
    api: Arc<dyn ConversationApi>,
    host: Arc<dyn RoomHost>,
    missing_credentials: Vec<&'static str>,
    join_attempts: u32,
    join_backoff: Duration,
    end_timeout: Duration,
    inner: Mutex<Inner>,
    generation: AtomicU64,
    /// Held across every teardown so a restart never overlaps a pending one.
    lifecycle: Mutex<()>,
}

impl VideoSessionManager {
    pub fn new(
        config: &VideoConfig,
        devices: Arc<dyn MediaDevices>,
        api: Arc<dyn ConversationApi>,
        host: Arc<dyn RoomHost>,
    ) -> Self {
        Self {
            devices,
            api,
            host,
            missing_credentials: config.missing_credentials(),
            join_attempts: config.join_attempts.max(1),
            join_backoff: config.join_backoff,
            end_timeout: config.end_timeout,
            inner: Mutex::new(Inner {
                is_video_enabled: true,
                ..Inner::default()
            }),
            generation: AtomicU64::new(0),
            lifecycle: Mutex::new(()),
        }
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state.clone()
    }

    pub async fn session(&self) -> Option<ConversationSession> {
        self.inner.lock().await.session.clone()
    }

    pub async fn is_muted(&self) -> bool {
        self.inner.lock().await.is_muted
    }

    pub async fn is_video_enabled(&self) -> bool {
        self.inner.lock().await.is_video_enabled
    }

    /// Starts a new call, closing any existing one first. A start that is
    /// superseded by `close()` or a newer `start()` returns `Cancelled`.
    pub async fn start(&self) -> Result<()> {
        let generation = {
            let _lifecycle = self.lifecycle.lock().await;
            self.close_locked().await;

            let mut inner = self.inner.lock().await;
            if !inner.apply(SessionEvent::Start) {
                return Err(MaternaError::Cancelled);
            }
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        if !self.missing_credentials.is_empty() {
            let message = format!(
                "Missing or invalid API configuration: {}. Please check your configuration and ensure all video API keys are properly configured.",
                self.missing_credentials.join(", ")
            );
            return Err(self.fail(generation, MaternaError::Config(message)).await);
        }

        let stream = match self.devices.acquire(&MediaConstraints::default()).await {
            Ok(stream) => stream,
            Err(e) => return Err(self.fail(generation, e).await),
        };
        {
            let mut inner = self.inner.lock().await;
            if self.is_superseded(generation) {
                drop(inner);
                stop_stream(stream.as_ref());
                return Err(MaternaError::Cancelled);
            }
            inner.is_muted = !stream.audio_enabled().unwrap_or(false);
            inner.is_video_enabled = stream.video_enabled().unwrap_or(false);
            inner.stream = Some(stream);
        }

        let created = match self.api.create_conversation().await {
            Ok(created) => created,
            Err(e) => return Err(self.fail(generation, e).await),
        };
        let room_url = created.room_url.clone();
        {
            let mut inner = self.inner.lock().await;
            if self.is_superseded(generation) {
                drop(inner);
                self.end_conversation(&created.id).await;
                return Err(MaternaError::Cancelled);
            }
            inner.session = Some(ConversationSession {
                session_id: created.id,
                room_url: created.room_url,
                status: SessionStatus::Created,
                created_at: chrono::Utc::now(),
            });
            inner.apply(SessionEvent::SessionCreated);
        }

        let frame = match self.host.create_frame().await {
            Ok(frame) => frame,
            Err(e) => return Err(self.fail(generation, e).await),
        };
        {
            let mut inner = self.inner.lock().await;
            if self.is_superseded(generation) {
                drop(inner);
                destroy_frame(frame.as_ref()).await;
                return Err(MaternaError::Cancelled);
            }
            inner.frame = Some(frame.clone());
            if let Some(session) = inner.session.as_mut() {
                session.status = SessionStatus::Joining;
            }
        }

        self.join_with_retry(generation, frame.as_ref(), &room_url)
            .await?;

        let mut inner = self.inner.lock().await;
        if self.is_superseded(generation) {
            return Err(MaternaError::Cancelled);
        }
        inner.apply(SessionEvent::Joined);
        if let Some(session) = inner.session.as_mut() {
            session.status = SessionStatus::Active;
        }
        if let Some(audio) = frame.local_audio() {
            inner.is_muted = !audio;
        }
        if let Some(video) = frame.local_video() {
            inner.is_video_enabled = video;
        }
        Ok(())
    }

    async fn join_with_retry(
        &self,
        generation: u64,
        frame: &dyn CallFrame,
        room_url: &str,
    ) -> Result<()> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            info!(
                "Joining video room (attempt {}/{})",
                attempt, self.join_attempts
            );
            let error = match frame.join(room_url, USER_NAME).await {
                Ok(()) => return Ok(()),
                Err(e) => e,
            };
            if self.is_superseded(generation) {
                return Err(MaternaError::Cancelled);
            }
            match next_join_action(attempt, self.join_attempts, self.join_backoff) {
                JoinAction::Retry { after } => {
                    warn!("Join attempt {} failed: {}", attempt, error);
                    tokio::time::sleep(after).await;
                    if self.is_superseded(generation) {
                        return Err(MaternaError::Cancelled);
                    }
                }
                JoinAction::GiveUp => {
                    let e = MaternaError::Network(format!(
                        "Failed to join call after {} attempts: {}",
                        attempt, error
                    ));
                    return Err(self.fail(generation, e).await);
                }
            }
        }
    }

    /// Tears down whatever exists and always ends at `Idle`. Safe to call
    /// from any state and more than once. Waits for a teardown already in
    /// progress before running its own.
    pub async fn close(&self) {
        let _lifecycle = self.lifecycle.lock().await;
        self.close_locked().await;
    }

    async fn close_locked(&self) {
        let (resources, began) = {
            let mut inner = self.inner.lock().await;
            self.generation.fetch_add(1, Ordering::SeqCst);
            let began = inner.apply(SessionEvent::Close);
            (inner.take_resources(), began)
        };

        self.teardown(resources).await;

        if began {
            self.inner.lock().await.apply(SessionEvent::CleanupComplete);
        }
    }

    /// Clears an error so the user is back at `Idle`.
    pub async fn dismiss(&self) {
        self.inner.lock().await.apply(SessionEvent::Dismiss);
    }

    pub async fn handle_room_event(&self, event: RoomEvent) {
        match event {
            RoomEvent::Joined => info!("Joined video room"),
            RoomEvent::LeftMeeting => {
                let _lifecycle = self.lifecycle.lock().await;
                let resources = {
                    let mut inner = self.inner.lock().await;
                    if !inner.apply(SessionEvent::RemoteEnded) {
                        return;
                    }
                    self.generation.fetch_add(1, Ordering::SeqCst);
                    inner.take_resources()
                };
                self.teardown(resources).await;
                self.inner.lock().await.apply(SessionEvent::CleanupComplete);
            }
            RoomEvent::Error(message) => {
                warn!("Video room error: {}", message);
                self.abort(room_error_message(&message)).await;
            }
            RoomEvent::CameraError(message) => {
                warn!("Camera error: {}", message);
                self.abort(
                    "Camera access error. Please check your camera permissions.".to_string(),
                )
                .await;
            }
        }
    }

    /// Flips the microphone and returns the applied muted state.
    pub async fn toggle_mute(&self) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        if let Some(frame) = inner.frame.clone()
            && let Some(current) = frame.local_audio()
        {
            frame.set_local_audio(!current)?;
            inner.is_muted = !frame.local_audio().unwrap_or(!current);
        } else if let Some(stream) = inner.stream.clone()
            && let Some(current) = stream.audio_enabled()
        {
            stream.set_audio_enabled(!current)?;
            inner.is_muted = !stream.audio_enabled().unwrap_or(!current);
        }
        Ok(inner.is_muted)
    }

    /// Flips the camera and returns whether video is now enabled.
    pub async fn toggle_video(&self) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        if let Some(frame) = inner.frame.clone()
            && let Some(current) = frame.local_video()
        {
            frame.set_local_video(!current)?;
            inner.is_video_enabled = frame.local_video().unwrap_or(!current);
        } else if let Some(stream) = inner.stream.clone()
            && let Some(current) = stream.video_enabled()
        {
            stream.set_video_enabled(!current)?;
            inner.is_video_enabled = stream.video_enabled().unwrap_or(!current);
        }
        Ok(inner.is_video_enabled)
    }

    fn is_superseded(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }

    /// Moves a still-current start into `Error` and releases its resources.
    async fn fail(&self, generation: u64, error: MaternaError) -> MaternaError {
        let _lifecycle = self.lifecycle.lock().await;
        let resources = {
            let mut inner = self.inner.lock().await;
            if self.is_superseded(generation) {
                return MaternaError::Cancelled;
            }
            warn!("Video session failed: {}", error);
            inner.apply(SessionEvent::Fail(start_error_message(&error)));
            inner.take_resources()
        };
        self.teardown(resources).await;
        error
    }

    async fn abort(&self, message: String) {
        let _lifecycle = self.lifecycle.lock().await;
        let resources = {
            let mut inner = self.inner.lock().await;
            if !inner.state.is_busy() {
                return;
            }
            self.generation.fetch_add(1, Ordering::SeqCst);
            inner.apply(SessionEvent::Fail(message));
            inner.take_resources()
        };
        self.teardown(resources).await;
    }

    /// Each step runs regardless of how the others went. Local media is
    /// released before the remote end-call, which is bounded by a timeout.
    async fn teardown(&self, resources: Resources) {
        if let Some(frame) = resources.frame {
            destroy_frame(frame.as_ref()).await;
        }

        if let Some(stream) = resources.stream {
            stop_stream(stream.as_ref());
        }

        if let Err(e) = self.host.clear_container() {
            warn!("Failed to clear video container: {}", e);
        }

        if let Some(mut session) = resources.session {
            self.end_conversation(&session.session_id).await;
            session.status = SessionStatus::Ended;
            debug!("Conversation {} marked {:?}", session.session_id, session.status);
        }
    }

    async fn end_conversation(&self, conversation_id: &str) {
        let ending = self.api.end_conversation(conversation_id);
        match tokio::time::timeout(self.end_timeout, ending).await {
            Ok(Ok(())) => info!("Ended conversation {}", conversation_id),
            Ok(Err(e)) => warn!("Failed to end conversation {}: {}", conversation_id, e),
            Err(_) => warn!(
                "Gave up ending conversation {} after {:?}",
                conversation_id, self.end_timeout
            ),
        }
    }
}

async fn destroy_frame(frame: &dyn CallFrame) {
    if let Err(e) = frame.leave().await {
        warn!("Failed to leave video room: {}", e);
    }
    if let Err(e) = frame.destroy().await {
        warn!("Failed to destroy video frame: {}", e);
    }
}

fn stop_stream(stream: &dyn MediaStream) {
    if let Err(e) = stream.stop() {
        warn!("Failed to stop local media: {}", e);
    }
}

/// User-facing text for a failed `start()`.
pub fn start_error_message(error: &MaternaError) -> String {
    match error {
        MaternaError::PermissionDenied(_) => {
            "Camera or microphone access denied. Please allow permissions and try again."
                .to_string()
        }
        MaternaError::DeviceNotFound(_) => {
            "No camera or microphone found. Please check your devices and try again.".to_string()
        }
        MaternaError::Network(message) if message.contains("refused to connect") => {
            "Connection blocked by network or firewall. Please check your network settings or try a different connection.".to_string()
        }
        MaternaError::Config(message) => message.clone(),
        MaternaError::RemoteApi { .. } => error.to_string(),
        other => format!("Connection error: {}", other),
    }
}

/// User-facing text for an error raised by the embedded room.
pub fn room_error_message(raw: &str) -> String {
    if raw.contains("refused to connect") {
        "Unable to connect to video service. This may be due to network restrictions or firewall settings.".to_string()
    } else if raw.contains("permission") {
        "Camera or microphone permission denied. Please allow access and try again.".to_string()
    } else if raw.contains("not found") || raw.contains("invalid") {
        "Invalid video room. Please try starting a new conversation.".to_string()
    } else {
        format!("Connection error: {}", raw)
    }
}
