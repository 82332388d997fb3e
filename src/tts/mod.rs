//! TTS (Text-to-Speech) Module
//!
//! Two layers:
//! - [`TtsEngine`]: an async backend that speaks one text to completion
//!   (console, system command, speechd-ng).
//! - [`Synthesizer`]: the non-blocking handle a session drives. `speak`
//!   returns immediately; progress arrives later as [`SynthesizerEvent`]s on
//!   the session's event queue.

use crate::config::Config;
use crate::session::{EventSender, SessionEvent};
use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub mod console;
pub mod speechd;
pub mod system;

/// Opaque id attached to every spoken utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtteranceId(pub u64);

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "utt-{}", self.0)
    }
}

/// Callbacks emitted by a synthesizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesizerEvent {
    Started(UtteranceId),
    Done(UtteranceId),
    Error(UtteranceId),
}

/// Trait for the per-session speech output handle
pub trait Synthesizer: Send {
    /// Start speaking; completion is reported as an event
    fn speak(&mut self, text: &str, id: UtteranceId) -> Result<()>;

    /// Cut the current utterance short
    fn stop(&mut self);

    /// Release the handle
    fn shutdown(&mut self);

    /// Whether audio is currently being emitted
    fn is_speaking(&self) -> bool;

    /// Get the engine name
    fn name(&self) -> &str;
}

/// Creates fresh synthesizer handles bound to a session's event queue
pub trait SynthesizerFactory: Send + Sync {
    fn create(&self, events: EventSender) -> Result<Box<dyn Synthesizer>>;
}

/// Trait for TTS engines
#[async_trait]
pub trait TtsEngine: Send + Sync + std::fmt::Debug {
    /// Speak the given text, returning once it has been spoken
    async fn speak(&self, text: &str) -> Result<()>;

    /// Get the engine name
    fn name(&self) -> &str;
}

/// Drives a [`TtsEngine`] on a background task and reports progress
#[derive(Debug)]
pub struct EngineSynthesizer {
    engine: Arc<dyn TtsEngine>,
    events: EventSender,
    current: Option<JoinHandle<()>>,
    shut_down: bool,
}

impl EngineSynthesizer {
    pub fn new(engine: Arc<dyn TtsEngine>, events: EventSender) -> Self {
        Self {
            engine,
            events,
            current: None,
            shut_down: false,
        }
    }
}

impl Synthesizer for EngineSynthesizer {
    fn speak(&mut self, text: &str, id: UtteranceId) -> Result<()> {
        if self.shut_down {
            return Err(anyhow::anyhow!("synthesizer has been shut down"));
        }
        self.stop();

        let engine = self.engine.clone();
        let events = self.events.clone();
        let text = text.to_string();
        self.current = Some(tokio::spawn(async move {
            let _ = events.send(SynthesizerEvent::Started(id).into());
            let event = match engine.speak(&text).await {
                Ok(()) => SynthesizerEvent::Done(id),
                Err(e) => {
                    warn!("🔇 {} failed to speak {}: {}", engine.name(), id, e);
                    SynthesizerEvent::Error(id)
                }
            };
            let _ = events.send(event.into());
        }));
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(handle) = self.current.take() {
            if !handle.is_finished() {
                debug!("Stopping speech on {}", self.engine.name());
            }
            handle.abort();
        }
    }

    fn shutdown(&mut self) {
        self.stop();
        self.shut_down = true;
    }

    fn is_speaking(&self) -> bool {
        self.current
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    fn name(&self) -> &str {
        self.engine.name()
    }
}

/// Hands out [`EngineSynthesizer`]s sharing one engine
#[derive(Debug, Clone)]
pub struct EngineFactory {
    engine: Arc<dyn TtsEngine>,
}

impl EngineFactory {
    pub fn new(engine: Arc<dyn TtsEngine>) -> Self {
        Self { engine }
    }
}

impl SynthesizerFactory for EngineFactory {
    fn create(&self, events: EventSender) -> Result<Box<dyn Synthesizer>> {
        Ok(Box::new(EngineSynthesizer::new(self.engine.clone(), events)))
    }
}

impl From<SynthesizerEvent> for SessionEvent {
    fn from(event: SynthesizerEvent) -> Self {
        SessionEvent::Synthesizer(event)
    }
}

/// Factory to create the configured TTS engine
pub async fn create_engine(config: &Config) -> Result<Arc<dyn TtsEngine>> {
    info!("🛠️ Creating TTS engine: {}", config.tts_engine);
    let engine: Arc<dyn TtsEngine> = match config.tts_engine.as_str() {
        "console" => Arc::new(console::ConsoleEngine::new(config.console_words_per_minute)),
        "speechd_ng" | "speechd" => {
            info!("  - Using Speechd TTS");
            let client = speechd::SpeechdEngine::connect().await?;
            Arc::new(client)
        }
        "system" => {
            info!("  - Using System TTS (language: {})", config.language);
            Arc::new(system::SystemEngine::new(&config.language))
        }
        _ => {
            warn!(
                "  - Unknown engine '{}', falling back to console",
                config.tts_engine
            );
            Arc::new(console::ConsoleEngine::new(config.console_words_per_minute))
        }
    };
    info!("✅ TTS engine '{}' initialized", engine.name());
    Ok(engine)
}
