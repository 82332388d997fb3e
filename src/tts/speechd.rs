//! Speechd-ng TTS backend using D-Bus
//!
//! Long results (object lists, directions) are sent one sentence at a time so
//! that stopping the synthesizer takes effect at the next sentence boundary.

use crate::tts::TtsEngine;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};
use zbus::{proxy, Connection};

#[proxy(
    interface = "org.speech.Service",
    default_service = "org.speech.Service",
    default_path = "/org/speech/Service"
)]
trait SpeechService {
    fn speak(&self, text: &str) -> zbus::Result<()>;
    fn ping(&self) -> zbus::Result<String>;
}

pub struct SpeechdEngine {
    proxy: SpeechServiceProxy<'static>,
}

impl std::fmt::Debug for SpeechdEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechdEngine").finish_non_exhaustive()
    }
}

impl SpeechdEngine {
    /// Connect on the session bus and check the service answers
    pub async fn connect() -> Result<Self> {
        let connection = Connection::session()
            .await
            .context("no D-Bus session bus")?;
        let proxy = SpeechServiceProxy::new(&connection).await?;

        let version = proxy
            .ping()
            .await
            .context("speechd-ng not responding")?;
        info!("🔊 Connected to speechd-ng: {}", version);

        Ok(Self { proxy })
    }
}

/// Split on sentence punctuation, keeping the punctuation
fn sentences(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if matches!(c, '.' | '!' | '?') {
            let end = i + c.len_utf8();
            let next_is_space = text[end..].chars().next().map_or(true, char::is_whitespace);
            if next_is_space {
                parts.push(text[start..end].trim());
                start = end;
            }
        }
    }
    parts.push(text[start..].trim());
    parts.retain(|part| !part.is_empty());
    parts
}

#[async_trait]
impl TtsEngine for SpeechdEngine {
    async fn speak(&self, text: &str) -> Result<()> {
        for sentence in sentences(text) {
            debug!("speechd-ng: '{}'", sentence);
            self.proxy.speak(sentence).await?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "speechd_ng"
    }
}
