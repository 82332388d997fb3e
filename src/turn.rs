//! Turn Controller
//!
//! Arbitrates the microphone and the speaker of one screen session. At most
//! one of them is active: the recognizer captures only while `Listening`, the
//! synthesizer speaks only while `Speaking`. Speech requests made while
//! speaking are queued and played in order.
//!
//! The controller is driven from a single task; it never blocks and never
//! waits for a callback. Synthesizer completion re-enters through
//! [`TurnController::on_synthesizer_event`].

use crate::asr::{Recognizer, RecognizerEvent};
use crate::core::Utterance;
use crate::error::VoiceError;
use crate::tts::{Synthesizer, SynthesizerEvent, UtteranceId};
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Listening,
    Speaking,
    Suspended,
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TurnState::Idle => "idle",
            TurnState::Listening => "listening",
            TurnState::Speaking => "speaking",
            TurnState::Suspended => "suspended",
        };
        f.write_str(name)
    }
}

/// Why something is being said
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechKind {
    Welcome,
    Apology,
    Confirmation,
    Result,
    Prompt,
}

/// What happens once an utterance has been spoken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AfterSpeech {
    /// Carry on: next queued speech, or listen if the mic is enabled
    #[default]
    Resume,
    /// Hand control back to the user: disable the mic
    Release,
}

/// One queued or in-flight utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSpeech {
    pub id: UtteranceId,
    pub text: String,
    pub kind: SpeechKind,
    pub after: AfterSpeech,
}

pub struct TurnController {
    state: TurnState,
    mic_enabled: bool,
    recognizer: Option<Box<dyn Recognizer>>,
    synthesizer: Option<Box<dyn Synthesizer>>,
    hints: Vec<String>,
    current: Option<PendingSpeech>,
    pending: VecDeque<PendingSpeech>,
    next_id: u64,
    apology: String,
}

impl fmt::Debug for TurnController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurnController")
            .field("state", &self.state)
            .field("mic_enabled", &self.mic_enabled)
            .field("current", &self.current)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl TurnController {
    pub fn new(
        recognizer: Box<dyn Recognizer>,
        synthesizer: Box<dyn Synthesizer>,
        hints: Vec<String>,
        apology: impl Into<String>,
    ) -> Self {
        Self {
            state: TurnState::Idle,
            mic_enabled: false,
            recognizer: Some(recognizer),
            synthesizer: Some(synthesizer),
            hints,
            current: None,
            pending: VecDeque::new(),
            next_id: 0,
            apology: apology.into(),
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn mic_enabled(&self) -> bool {
        self.mic_enabled
    }

    /// Utterance currently being spoken
    pub fn current_speech(&self) -> Option<&PendingSpeech> {
        self.current.as_ref()
    }

    /// Utterances waiting behind the current one
    pub fn pending_speech(&self) -> impl Iterator<Item = &PendingSpeech> {
        self.pending.iter()
    }

    /// Open the microphone; takes effect after any current speech
    pub fn enable_mic(&mut self) {
        self.mic_enabled = true;
        match self.state {
            TurnState::Idle => self.start_listening(),
            TurnState::Speaking => debug!("🎙️ Mic enabled, listening after current speech"),
            TurnState::Listening | TurnState::Suspended => {}
        }
    }

    /// Close the microphone and drop queued speech. Current speech finishes.
    pub fn disable_mic(&mut self) {
        self.mic_enabled = false;
        if !self.pending.is_empty() {
            debug!("Dropping {} queued utterance(s)", self.pending.len());
            self.pending.clear();
        }
        if self.state == TurnState::Listening {
            self.stop_recognizer();
            self.state = TurnState::Idle;
        }
        info!("🔇 Microphone disabled ({})", self.state);
    }

    pub fn speak(&mut self, text: impl Into<String>, kind: SpeechKind) -> Option<UtteranceId> {
        self.speak_then(text, kind, AfterSpeech::Resume)
    }

    /// Queue speech with a follow-up. Returns `None` when the request is dropped.
    pub fn speak_then(
        &mut self,
        text: impl Into<String>,
        kind: SpeechKind,
        after: AfterSpeech,
    ) -> Option<UtteranceId> {
        let text = text.into();
        if self.state == TurnState::Suspended {
            warn!("Session suspended, not speaking: '{}'", text);
            return None;
        }
        if text.trim().is_empty() {
            debug!("Ignoring empty speech request");
            return None;
        }

        self.next_id += 1;
        let id = UtteranceId(self.next_id);
        self.pending.push_back(PendingSpeech {
            id,
            text,
            kind,
            after,
        });

        if self.state != TurnState::Speaking {
            if self.state == TurnState::Listening {
                self.stop_recognizer();
            }
            self.advance();
        }
        Some(id)
    }

    /// Feed a recognizer callback. Returns the utterance to classify, if any.
    pub fn on_recognizer_event(&mut self, event: RecognizerEvent) -> Option<Utterance> {
        match event {
            RecognizerEvent::Ready => debug!("🎙️ Recognizer ready"),
            RecognizerEvent::SpeechBegin => debug!("🎙️ Speech started"),
            RecognizerEvent::SpeechEnd => debug!("🎙️ Speech ended"),
            RecognizerEvent::Result(text) => {
                if self.state != TurnState::Listening {
                    debug!("Stale recognition result while {}: '{}'", self.state, text);
                    return None;
                }
                self.stop_recognizer();
                self.state = TurnState::Idle;
                info!("🗣️ Heard: '{}'", text);
                return Some(Utterance::new(&text));
            }
            RecognizerEvent::Error(kind) => {
                if self.state != TurnState::Listening {
                    debug!("Stale recognizer error while {}: {}", self.state, kind);
                    return None;
                }
                self.stop_recognizer();
                self.state = TurnState::Idle;
                if kind.is_recoverable() {
                    debug!("Recognition failed ({}), apologising", kind);
                    let apology = self.apology.clone();
                    self.speak(apology, SpeechKind::Apology);
                } else {
                    warn!("⚠️ {}", VoiceError::RecognitionOther(kind.to_string()));
                }
            }
        }
        None
    }

    /// Called once an utterance has been handled. Resumes listening when
    /// nothing was spoken in response.
    pub fn finish_turn(&mut self) {
        if self.state == TurnState::Idle && self.mic_enabled {
            self.start_listening();
        }
    }

    /// Feed a synthesizer callback
    pub fn on_synthesizer_event(&mut self, event: SynthesizerEvent) {
        let (id, failed) = match event {
            SynthesizerEvent::Started(id) => {
                debug!("🔊 Speaking {}", id);
                return;
            }
            SynthesizerEvent::Done(id) => (id, false),
            SynthesizerEvent::Error(id) => (id, true),
        };

        if self.current.as_ref().map(|s| s.id) != Some(id) {
            debug!("Ignoring stale completion for {}", id);
            return;
        }
        if failed {
            warn!("⚠️ {}", VoiceError::Synthesis(format!("{} was not spoken", id)));
        }
        self.complete();
    }

    /// Finish the current utterance and move on
    fn complete(&mut self) {
        if let Some(done) = self.current.take() {
            debug!("Finished {:?} speech {}", done.kind, done.id);
            self.follow_up(done.after);
        }
        self.advance();
    }

    fn follow_up(&mut self, after: AfterSpeech) {
        if after == AfterSpeech::Release {
            info!("Releasing voice control");
            self.mic_enabled = false;
            self.pending.clear();
        }
    }

    /// Start the next queued utterance, or settle into listening/idle
    fn advance(&mut self) {
        while let Some(next) = self.pending.pop_front() {
            let started = match self.synthesizer.as_mut() {
                Some(synth) => synth.speak(&next.text, next.id),
                None => Err(anyhow::anyhow!("no synthesizer bound")),
            };
            match started {
                Ok(()) => {
                    debug!("🔊 {} ({:?}): '{}'", next.id, next.kind, next.text);
                    self.state = TurnState::Speaking;
                    self.current = Some(next);
                    return;
                }
                Err(e) => {
                    // Treated as spoken so the queue keeps moving
                    warn!("⚠️ Synthesis error on {}: {}", next.id, e);
                    self.follow_up(next.after);
                }
            }
        }

        self.current = None;
        if self.mic_enabled {
            self.start_listening();
        } else {
            self.state = TurnState::Idle;
        }
    }

    /// Stop speech at once, drop the queue and go back to listening
    pub fn cancel(&mut self) {
        if self.state == TurnState::Suspended {
            return;
        }
        self.pending.clear();
        if self.current.take().is_some() {
            if let Some(synth) = self.synthesizer.as_mut() {
                synth.stop();
            }
        }
        info!("⏹️ Cancelled");
        if self.state != TurnState::Listening {
            self.advance();
        }
    }

    /// Screen paused: stop and release both handles
    pub fn suspend(&mut self) {
        if self.state == TurnState::Suspended {
            return;
        }
        self.release_handles();
        self.state = TurnState::Suspended;
        info!("⏸️ Voice session suspended");
    }

    /// Screen resumed with fresh handles
    pub fn resume(
        &mut self,
        mut recognizer: Box<dyn Recognizer>,
        mut synthesizer: Box<dyn Synthesizer>,
    ) {
        if self.state != TurnState::Suspended {
            debug!("Resume while {}, ignoring", self.state);
            recognizer.destroy();
            synthesizer.shutdown();
            return;
        }
        self.recognizer = Some(recognizer);
        self.synthesizer = Some(synthesizer);
        self.state = TurnState::Idle;
        info!("▶️ Voice session resumed");
    }

    /// Screen exit: stop and destroy both handles
    pub fn shutdown(&mut self) {
        self.release_handles();
        self.mic_enabled = false;
        self.state = TurnState::Idle;
    }

    fn release_handles(&mut self) {
        self.pending.clear();
        self.current = None;
        if let Some(mut recognizer) = self.recognizer.take() {
            recognizer.stop();
            recognizer.destroy();
        }
        if let Some(mut synth) = self.synthesizer.take() {
            synth.stop();
            synth.shutdown();
        }
    }

    fn start_listening(&mut self) {
        let Some(recognizer) = self.recognizer.as_mut() else {
            self.state = TurnState::Idle;
            return;
        };
        match recognizer.start(&self.hints) {
            Ok(()) => {
                debug!("🎙️ Listening on {}", recognizer.name());
                self.state = TurnState::Listening;
            }
            Err(e) => {
                warn!("⚠️ Could not start recognizer: {}", e);
                self.state = TurnState::Idle;
            }
        }
    }

    fn stop_recognizer(&mut self) {
        if let Some(recognizer) = self.recognizer.as_mut() {
            recognizer.stop();
        }
    }

    /// Handles agree with the state: capturing iff listening, speaking iff speaking
    pub fn handles_consistent(&self) -> bool {
        let capturing = self
            .recognizer
            .as_ref()
            .map(|r| r.is_capturing())
            .unwrap_or(false);
        let speaking = self
            .synthesizer
            .as_ref()
            .map(|s| s.is_speaking())
            .unwrap_or(false);
        capturing == (self.state == TurnState::Listening)
            && speaking == (self.state == TurnState::Speaking)
            && !(capturing && speaking)
    }
}
