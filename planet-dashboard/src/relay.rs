//! Spoken announcements for selected planets

use planet_common::BodyPosition;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;

use crate::config::SpeechConfig;

/// Host text-to-speech capability
pub trait AnnouncementSink: Send + Sync {
    fn speak(&self, utterance: &str) -> anyhow::Result<()>;
}

/// Only writes the utterance to the log
pub struct LogSink;

impl AnnouncementSink for LogSink {
    fn speak(&self, utterance: &str) -> anyhow::Result<()> {
        tracing::info!("Announcement: {}", utterance);
        Ok(())
    }
}

/// Hands each utterance to an external TTS program such as `espeak`.
/// The program runs in the background; its exit status is not observed.
/// `speak` must be called from within a tokio runtime.
pub struct CommandSink {
    program: String,
    args: Vec<String>,
}

impl CommandSink {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl AnnouncementSink for CommandSink {
    /// Spawns the speech program without waiting for it.
    /// Must be called from within a tokio runtime.
    fn speak(&self, utterance: &str) -> anyhow::Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(utterance)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        // Reap in the background
        tokio::spawn(async move {
            let _ = child.wait().await;
        });
        Ok(())
    }
}

pub fn sink_from_config(config: &SpeechConfig) -> Arc<dyn AnnouncementSink> {
    match &config.command {
        Some(program) => {
            tracing::info!("Announcements via `{}`", program);
            Arc::new(CommandSink::new(program.clone(), config.args.clone()))
        }
        None => Arc::new(LogSink),
    }
}

/// "<name> is at altitude <n> degrees", altitude rounded to the nearest degree
pub fn utterance(body: &BodyPosition) -> String {
    let altitude = body.altitude_degrees.round() as i64;
    format!("{} is at altitude {} degrees", body.name, altitude)
}

/// Turns a body selection into speech. Fire-and-forget.
#[derive(Clone)]
pub struct InteractionRelay {
    sink: Arc<dyn AnnouncementSink>,
}

impl InteractionRelay {
    pub fn new(sink: Arc<dyn AnnouncementSink>) -> Self {
        Self { sink }
    }

    pub fn announce(&self, body: &BodyPosition) {
        let text = utterance(body);
        if let Err(e) = self.sink.speak(&text) {
            tracing::debug!("Speech sink failed for {}: {}", body.name, e);
        }
    }
}
