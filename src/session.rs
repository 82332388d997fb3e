//! Screen Session
//!
//! One actor per visible screen. It owns the turn controller, the recognizer
//! and synthesizer handles and the screen's form state, and it is the only
//! writer of any of them: every callback, control request and collaborator
//! result arrives as a [`SessionEvent`] on a single queue.

use crate::asr::{Recognizer, RecognizerEvent, RecognizerFactory};
use crate::commands::{DetectionMode, DetectionRequest, Field, NavOption, Screen};
use crate::config::Config;
use crate::core::{Classifier, Grammar};
use crate::dispatcher::Dispatcher;
use crate::screens;
use crate::tts::{Synthesizer, SynthesizerEvent, SynthesizerFactory};
use crate::turn::{SpeechKind, TurnController, TurnState};
use anyhow::Result;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub type EventSender = mpsc::UnboundedSender<SessionEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

/// Requests from outside the voice loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    EnableMic,
    DisableMic,
    /// Screen paused (app backgrounded)
    Pause,
    Resume,
    /// Screen left
    Exit,
}

/// Result of out-of-band work, to be spoken when it re-enters the session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub speech: String,
    pub navigate: Option<Screen>,
}

impl Outcome {
    pub fn say(speech: impl Into<String>) -> Self {
        Self {
            speech: speech.into(),
            navigate: None,
        }
    }

    pub fn go_to(screen: Screen) -> Self {
        Self {
            speech: String::new(),
            navigate: Some(screen),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Recognizer(RecognizerEvent),
    Synthesizer(SynthesizerEvent),
    Control(ControlEvent),
    Completed { generation: u64, outcome: Outcome },
}

impl From<RecognizerEvent> for SessionEvent {
    fn from(event: RecognizerEvent) -> Self {
        SessionEvent::Recognizer(event)
    }
}

/// Factories for the per-session speech handles
#[derive(Clone)]
pub struct Engines {
    recognizers: Arc<dyn RecognizerFactory>,
    synthesizers: Arc<dyn SynthesizerFactory>,
}

impl Engines {
    pub fn new(
        recognizers: Arc<dyn RecognizerFactory>,
        synthesizers: Arc<dyn SynthesizerFactory>,
    ) -> Self {
        Self {
            recognizers,
            synthesizers,
        }
    }

    /// Fresh handles reporting to `events`
    pub fn bind(&self, events: &EventSender) -> Result<(Box<dyn Recognizer>, Box<dyn Synthesizer>)> {
        let recognizer = self.recognizers.create(events.clone())?;
        let synthesizer = self.synthesizers.create(events.clone())?;
        Ok((recognizer, synthesizer))
    }
}

/// How a session starts
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub mic_enabled: bool,
    pub speak_welcome: bool,
    pub apology: String,
    pub corrections: HashMap<String, String>,
}

impl SessionOptions {
    pub fn from_config(config: &Config, mic_enabled: bool) -> Self {
        Self {
            mic_enabled,
            speak_welcome: config.speak_welcome,
            apology: config.apology_text.clone(),
            corrections: config.voice_corrections.clone(),
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from_config(&Config::default(), true)
    }
}

/// Screen-local variables filled by voice
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenVars {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub emergency_email: String,
    pub destination: String,
    pub segmentation_key: String,
    pub mode: DetectionMode,
    /// Guidance style chosen on the navigation screen
    pub nav_option: Option<NavOption>,
    pub show_maps: bool,
    /// Last detection request that was started
    pub target: Option<DetectionRequest>,
    /// A yes/no question is open
    pub awaiting_answer: bool,
}

impl ScreenVars {
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::FullName => &self.full_name,
            Field::Email => &self.email,
            Field::Password => &self.password,
            Field::EmergencyEmail => &self.emergency_email,
            Field::Destination => &self.destination,
            Field::SegmentationKey => &self.segmentation_key,
        }
    }

    pub fn set_field(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::FullName => &mut self.full_name,
            Field::Email => &mut self.email,
            Field::Password => &mut self.password,
            Field::EmergencyEmail => &mut self.emergency_email,
            Field::Destination => &mut self.destination,
            Field::SegmentationKey => &mut self.segmentation_key,
        };
        *slot = value;
    }

    /// Which of `fields` are still blank
    pub fn empty_fields(&self, fields: &[Field]) -> Vec<Field> {
        fields
            .iter()
            .copied()
            .filter(|f| self.field(*f).trim().is_empty())
            .collect()
    }
}

pub struct ScreenSession {
    screen: Screen,
    grammar: Grammar,
    classifier: Classifier,
    controller: TurnController,
    pub vars: ScreenVars,
    /// Bumped whenever in-flight collaborator results become irrelevant
    generation: u64,
    events: EventSender,
    engines: Engines,
    leaving: bool,
}

impl ScreenSession {
    /// Enter a screen: bind handles, speak the welcome, open the mic
    pub fn open(
        screen: Screen,
        options: &SessionOptions,
        engines: Engines,
    ) -> Result<(Self, EventReceiver)> {
        let (events, rx) = mpsc::unbounded_channel();
        let (recognizer, synthesizer) = engines.bind(&events)?;
        let grammar = Grammar::for_screen(screen);
        let controller = TurnController::new(
            recognizer,
            synthesizer,
            grammar.hints(),
            options.apology.clone(),
        );

        let mut session = Self {
            screen,
            grammar,
            classifier: Classifier::new(options.corrections.clone()),
            controller,
            vars: ScreenVars::default(),
            generation: 0,
            events,
            engines,
            leaving: false,
        };

        info!("📱 Entered {}", screen);
        if options.speak_welcome {
            session
                .controller
                .speak(screens::welcome_message(screen), SpeechKind::Welcome);
        }
        if options.mic_enabled {
            session.controller.enable_mic();
        }
        Ok((session, rx))
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn controller(&self) -> &TurnController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut TurnController {
        &mut self.controller
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Handle for feeding events into this session
    pub fn sender(&self) -> EventSender {
        self.events.clone()
    }

    pub fn is_leaving(&self) -> bool {
        self.leaving
    }

    /// Process one event. Returns `false` once the session should end.
    pub fn handle_event(&mut self, event: SessionEvent, dispatcher: &Dispatcher) -> bool {
        match event {
            SessionEvent::Recognizer(event) => {
                if let Some(utterance) = self.controller.on_recognizer_event(event) {
                    let command = self.classifier.classify(&utterance.text, &self.grammar);
                    dispatcher.dispatch(command, self);
                    self.controller.finish_turn();
                }
            }
            SessionEvent::Synthesizer(event) => self.controller.on_synthesizer_event(event),
            SessionEvent::Control(control) => {
                debug!("Control on {}: {:?}", self.screen, control);
                match control {
                    ControlEvent::EnableMic => {
                        if !self.leaving {
                            self.controller.enable_mic();
                        }
                    }
                    ControlEvent::DisableMic => self.disable_mic(),
                    ControlEvent::Pause => self.suspend(),
                    ControlEvent::Resume => self.resume(),
                    ControlEvent::Exit => return false,
                }
            }
            SessionEvent::Completed {
                generation,
                outcome,
            } => {
                if generation != self.generation {
                    debug!(
                        "Dropping stale result (generation {} != {}): {:?}",
                        generation, self.generation, outcome
                    );
                } else {
                    dispatcher.complete(outcome, self);
                }
            }
        }
        true
    }

    /// Close the mic and forget any in-flight work
    pub fn disable_mic(&mut self) {
        self.generation += 1;
        self.controller.disable_mic();
    }

    /// Stop talking now and forget any in-flight work
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.controller.cancel();
    }

    /// Navigation requested: stop listening until the screen is replaced
    pub fn leave(&mut self) {
        self.leaving = true;
        self.disable_mic();
    }

    pub fn suspend(&mut self) {
        self.generation += 1;
        self.controller.suspend();
    }

    pub fn resume(&mut self) {
        if self.controller.state() != TurnState::Suspended {
            debug!("Resume on {} while {}, ignoring", self.screen, self.controller.state());
            return;
        }
        match self.engines.bind(&self.events) {
            Ok((recognizer, synthesizer)) => {
                self.controller.resume(recognizer, synthesizer);
                self.controller.finish_turn();
            }
            Err(e) => warn!("⚠️ Could not rebind speech handles: {}", e),
        }
    }

    /// Run collaborator work off the session task; the result re-enters as
    /// [`SessionEvent::Completed`] tagged with the current generation.
    pub fn spawn_out_of_band<F>(&self, work: F)
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        let generation = self.generation;
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = work.await;
            let _ = events.send(SessionEvent::Completed {
                generation,
                outcome,
            });
        });
    }

    /// Screen exit: release both handles
    pub fn close(&mut self) {
        self.generation += 1;
        self.controller.shutdown();
        info!("📴 Left {}", self.screen);
    }
}

/// Drive a session until it is told to exit
pub async fn run(mut session: ScreenSession, dispatcher: Arc<Dispatcher>, mut rx: EventReceiver) {
    while let Some(event) = rx.recv().await {
        if !session.handle_event(event, &dispatcher) {
            break;
        }
    }
    session.close();
}
