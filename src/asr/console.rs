//! Console recognizer
//!
//! Treats each line typed on stdin as one recognized transcript. A blank line
//! is reported as a no-match. Lines starting with `/` are session controls
//! (`/pause`, `/resume`, `/mic on`, `/mic off`, `/quit`) and are delivered
//! even while the microphone is closed.

use super::{RecognitionErrorKind, Recognizer, RecognizerEvent, RecognizerFactory};
use crate::session::{ControlEvent, EventSender, SessionEvent};
use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct Shared {
    /// Recognizer currently capturing, with its event queue
    listening: Option<(u64, EventSender)>,
    /// Queue of the most recently bound session, for control lines
    session: Option<EventSender>,
    closed: bool,
}

/// Shared stdin reader feeding console recognizers
#[derive(Debug, Clone, Default)]
pub struct ConsoleInput {
    shared: Arc<Mutex<Shared>>,
    next_id: Arc<AtomicU64>,
}

impl ConsoleInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the stdin reader task
    pub fn spawn_reader(&self) -> tokio::task::JoinHandle<()> {
        let input = self.clone();
        tokio::spawn(async move {
            let stdin = tokio::io::stdin();
            let mut reader = BufReader::new(stdin).lines();
            while let Ok(Some(line)) = reader.next_line().await {
                input.deliver(&line);
            }
            input.close();
        })
    }

    /// Route one typed line
    pub fn deliver(&self, line: &str) {
        let line = line.trim();

        let Ok(mut shared) = self.shared.lock() else {
            warn!("Console input lock poisoned, dropping line");
            return;
        };

        if let Some(control) = line.strip_prefix('/') {
            let event = match control.trim() {
                "pause" => ControlEvent::Pause,
                "resume" => ControlEvent::Resume,
                "mic on" => ControlEvent::EnableMic,
                "mic off" => ControlEvent::DisableMic,
                "quit" | "exit" => ControlEvent::Exit,
                other => {
                    warn!("Unknown console control: /{}", other);
                    return;
                }
            };
            if let Some(session) = &shared.session {
                let _ = session.send(SessionEvent::Control(event));
            }
            return;
        }

        // One transcript per start(), as with a platform recognizer
        let Some((_, events)) = shared.listening.take() else {
            debug!("🔇 Microphone closed, dropping: '{}'", line);
            return;
        };

        let _ = events.send(RecognizerEvent::SpeechBegin.into());
        let _ = events.send(RecognizerEvent::SpeechEnd.into());
        let event = if line.is_empty() {
            RecognizerEvent::Error(RecognitionErrorKind::NoMatch)
        } else {
            RecognizerEvent::Result(line.to_string())
        };
        let _ = events.send(event.into());
    }

    /// End of input: ask the current session to exit
    pub fn close(&self) {
        if let Ok(mut shared) = self.shared.lock() {
            shared.closed = true;
            shared.listening = None;
            if let Some(session) = &shared.session {
                let _ = session.send(SessionEvent::Control(ControlEvent::Exit));
            }
        }
        info!("⌨️ Console input closed");
    }
}

impl RecognizerFactory for ConsoleInput {
    fn create(&self, events: EventSender) -> Result<Box<dyn Recognizer>> {
        let mut shared = self.shared.lock().map_err(|e| anyhow!(e.to_string()))?;
        if shared.closed {
            let _ = events.send(SessionEvent::Control(ControlEvent::Exit));
        }
        shared.session = Some(events.clone());

        Ok(Box::new(ConsoleRecognizer {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            events,
            shared: self.shared.clone(),
            destroyed: false,
        }))
    }
}

/// One single-use recognizer handle backed by [`ConsoleInput`]
#[derive(Debug)]
pub struct ConsoleRecognizer {
    id: u64,
    events: EventSender,
    shared: Arc<Mutex<Shared>>,
    destroyed: bool,
}

impl Recognizer for ConsoleRecognizer {
    fn start(&mut self, hints: &[String]) -> Result<()> {
        if self.destroyed {
            return Err(anyhow!("recognizer {} was destroyed", self.id));
        }
        let mut shared = self.shared.lock().map_err(|e| anyhow!(e.to_string()))?;
        if shared.closed {
            return Err(anyhow!("console input closed"));
        }
        shared.listening = Some((self.id, self.events.clone()));
        debug!("🎙️ Listening (hints: {})", hints.join(", "));
        let _ = self.events.send(RecognizerEvent::Ready.into());
        Ok(())
    }

    fn stop(&mut self) {
        if let Ok(mut shared) = self.shared.lock() {
            if matches!(shared.listening, Some((id, _)) if id == self.id) {
                shared.listening = None;
            }
        }
    }

    fn destroy(&mut self) {
        self.stop();
        self.destroyed = true;
    }

    fn is_capturing(&self) -> bool {
        self.shared
            .lock()
            .map(|shared| matches!(shared.listening, Some((id, _)) if id == self.id))
            .unwrap_or(false)
    }

    fn name(&self) -> &str {
        "console"
    }
}
