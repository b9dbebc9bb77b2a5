//! Process-backed audio: an external player for remote audio and an
//! external speech engine (espeak-ng style flags) for the fallback path.

use super::types::{AudioOutput, Gender, LocalSynthesizer, PlaybackHandle, UtteranceParams, VoiceInfo};
use crate::error::{MaternaError, Result};
use crate::utils::split_command;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

const BASE_WORDS_PER_MINUTE: f32 = 175.0;
const BASE_PITCH: f32 = 50.0;
const BASE_AMPLITUDE: f32 = 100.0;

pub struct ProcessHandle {
    child: Child,
    paused: bool,
}

impl ProcessHandle {
    fn new(child: Child) -> Self {
        Self {
            child,
            paused: false,
        }
    }

    async fn signal(&self, signal: &str) -> Result<()> {
        let Some(pid) = self.child.id() else {
            return Ok(());
        };
        let status = Command::new("kill")
            .arg(signal)
            .arg(pid.to_string())
            .status()
            .await
            .map_err(|e| MaternaError::Playback(format!("Failed to signal player: {}", e)))?;
        if !status.success() {
            return Err(MaternaError::Playback(format!(
                "kill {} {} exited with {}",
                signal, pid, status
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl PlaybackHandle for ProcessHandle {
    async fn stop(&mut self) -> Result<()> {
        if self.is_finished() {
            return Ok(());
        }
        if self.paused {
            let _ = self.signal("-CONT").await;
        }
        self.child
            .kill()
            .await
            .map_err(|e| MaternaError::Playback(format!("Failed to stop playback: {}", e)))
    }

    async fn pause(&mut self) -> Result<()> {
        if self.paused || self.is_finished() {
            return Ok(());
        }
        self.signal("-STOP").await?;
        self.paused = true;
        Ok(())
    }

    async fn resume(&mut self) -> Result<()> {
        if !self.paused || self.is_finished() {
            return Ok(());
        }
        self.signal("-CONT").await?;
        self.paused = false;
        Ok(())
    }

    fn is_finished(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(Some(_)) | Err(_))
    }
}

fn command_for(command_line: &str) -> Result<Command> {
    let (program, args) = split_command(command_line)
        .ok_or_else(|| MaternaError::Config("Empty audio command".to_string()))?;
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);
    Ok(cmd)
}

/// Pipes encoded audio into a player reading from stdin, e.g. `mpg123 -q -`.
pub struct CommandPlayer {
    command: String,
}

impl CommandPlayer {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
        }
    }
}

#[async_trait]
impl AudioOutput for CommandPlayer {
    async fn play(&self, audio: Vec<u8>) -> Result<Box<dyn PlaybackHandle>> {
        let mut child = command_for(&self.command)?
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| MaternaError::Playback(format!("Failed to start player: {}", e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(&audio).await {
                    debug!("Player closed its input early: {}", e);
                }
            });
        }

        Ok(Box::new(ProcessHandle::new(child)))
    }
}

/// Runs an espeak-compatible speech engine per utterance.
pub struct CommandSpeaker {
    command: String,
}

impl CommandSpeaker {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
        }
    }
}

#[async_trait]
impl LocalSynthesizer for CommandSpeaker {
    fn is_supported(&self) -> bool {
        split_command(&self.command).is_some()
    }

    async fn voices(&self) -> Vec<VoiceInfo> {
        let Ok(mut cmd) = command_for(&self.command) else {
            return Vec::new();
        };
        match cmd.arg("--voices").stdout(Stdio::piped()).output().await {
            Ok(output) if output.status.success() => {
                parse_voice_list(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                warn!("Voice listing exited with {}", output.status);
                Vec::new()
            }
            Err(e) => {
                warn!("Failed to list on-device voices: {}", e);
                Vec::new()
            }
        }
    }

    async fn speak(&self, text: &str, params: &UtteranceParams) -> Result<Box<dyn PlaybackHandle>> {
        let mut cmd = command_for(&self.command)?;
        cmd.arg("-s")
            .arg(((params.rate * BASE_WORDS_PER_MINUTE).round() as u32).to_string())
            .arg("-p")
            .arg(((params.pitch * BASE_PITCH).round() as u32).min(99).to_string())
            .arg("-a")
            .arg(((params.volume * BASE_AMPLITUDE).round() as u32).to_string());
        if let Some(voice) = &params.voice {
            cmd.arg("-v").arg(voice);
        }
        cmd.arg("--").arg(text);

        let child = cmd
            .spawn()
            .map_err(|e| MaternaError::Playback(format!("Speech synthesis failed: {}", e)))?;
        Ok(Box::new(ProcessHandle::new(child)))
    }
}

/// Parses `espeak-ng --voices` output:
/// `Pty Language Age/Gender VoiceName File Other Languages`.
fn parse_voice_list(output: &str) -> Vec<VoiceInfo> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 4 {
                return None;
            }
            let gender = match fields[2].rsplit('/').next() {
                Some("F") => Some(Gender::Female),
                Some("M") => Some(Gender::Male),
                _ => None,
            };
            Some(VoiceInfo {
                name: fields[3].to_string(),
                gender,
                is_default: false,
            })
        })
        .collect()
}
