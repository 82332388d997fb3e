#![allow(dead_code)]

pub mod mock_asr;
pub mod mock_tts;

use async_trait::async_trait;
use himba_voice::asr::RecognizerEvent;
use himba_voice::collab::{
    Account, Detector, Navigator, ProfileStore, RegistrationForm, UserProfile,
};
use himba_voice::commands::{DetectionMode, DetectionRequest, Screen};
use himba_voice::session::{EventReceiver, SessionOptions};
use himba_voice::tts::SynthesizerEvent;
use himba_voice::{Dispatcher, Engines, ScreenSession, SessionEvent, TurnState, VoiceError, VoiceResult};
use mock_asr::MockAsr;
use mock_tts::MockTts;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records every navigation request
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    pub visited: Mutex<Vec<Screen>>,
}

impl RecordingNavigator {
    pub fn visited(&self) -> Vec<Screen> {
        self.visited.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, screen: Screen) {
        self.visited.lock().unwrap().push(screen);
    }
}

/// Profile kept in memory
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    pub profile: Mutex<UserProfile>,
}

impl ProfileStore for MemoryProfileStore {
    fn load(&self) -> VoiceResult<UserProfile> {
        Ok(self.profile.lock()?.clone())
    }

    fn store(&self, profile: &UserProfile) -> VoiceResult<()> {
        *self.profile.lock()? = profile.clone();
        Ok(())
    }
}

/// Detector answering from a fixed catalog
#[derive(Debug)]
pub struct MockDetector {
    pub catalog: Vec<String>,
    pub segmentation_online: bool,
    pub requests: Mutex<Vec<(DetectionRequest, DetectionMode)>>,
}

impl Default for MockDetector {
    fn default() -> Self {
        Self {
            catalog: ["bottle", "bottle opener", "bowl", "cup", "traffic light"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            segmentation_online: false,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Detector for MockDetector {
    fn catalog(&self, _mode: DetectionMode) -> Vec<String> {
        self.catalog.clone()
    }

    fn is_available(&self, mode: DetectionMode) -> bool {
        mode == DetectionMode::ObjectDetection || self.segmentation_online
    }

    async fn detect(&self, request: &DetectionRequest, mode: DetectionMode) -> VoiceResult<String> {
        self.requests.lock()?.push((request.clone(), mode));
        match request {
            DetectionRequest::Object { name, .. } => Ok(format!("Distance to {}: 1.50 meters, Steps: 2", name)),
            DetectionRequest::Text(text) => Ok(format!("Found text {}", text)),
            DetectionRequest::FullAnalysis => Err(VoiceError::collaborator("detector", "camera busy")),
        }
    }
}

#[derive(Debug, Default)]
pub struct MockAccount {
    pub registered: Mutex<Vec<RegistrationForm>>,
    pub log_outs: Mutex<usize>,
}

#[async_trait]
impl Account for MockAccount {
    async fn register(&self, form: &RegistrationForm) -> VoiceResult<()> {
        self.registered.lock()?.push(form.clone());
        Ok(())
    }

    async fn log_out(&self) -> VoiceResult<()> {
        *self.log_outs.lock()? += 1;
        Ok(())
    }
}

/// One screen session wired to recording mocks, driven step by step
pub struct Harness {
    pub session: ScreenSession,
    pub rx: EventReceiver,
    pub dispatcher: Dispatcher,
    pub asr: MockAsr,
    pub tts: MockTts,
    pub navigator: Arc<RecordingNavigator>,
    pub profile: Arc<MemoryProfileStore>,
    pub detector: Arc<MockDetector>,
    pub account: Arc<MockAccount>,
}

impl Harness {
    /// Open `screen` with the mic on and no welcome message
    pub fn open(screen: Screen) -> Self {
        Self::with_options(
            screen,
            SessionOptions {
                speak_welcome: false,
                ..SessionOptions::default()
            },
            MockDetector::default(),
        )
    }

    pub fn with_options(screen: Screen, options: SessionOptions, detector: MockDetector) -> Self {
        let asr = MockAsr::new();
        let tts = MockTts::new();
        let navigator = Arc::new(RecordingNavigator::default());
        let profile = Arc::new(MemoryProfileStore::default());
        let detector = Arc::new(detector);
        let account = Arc::new(MockAccount::default());

        let dispatcher = Dispatcher::new(
            navigator.clone(),
            detector.clone(),
            profile.clone(),
            account.clone(),
        );
        let engines = Engines::new(Arc::new(asr.clone()), Arc::new(tts.clone()));
        let (session, rx) =
            ScreenSession::open(screen, &options, engines).expect("Failed to open session");

        Self {
            session,
            rx,
            dispatcher,
            asr,
            tts,
            navigator,
            profile,
            detector,
            account,
        }
    }

    pub fn state(&self) -> TurnState {
        self.session.controller().state()
    }

    pub fn send(&mut self, event: SessionEvent) -> bool {
        self.session.handle_event(event, &self.dispatcher)
    }

    /// The recognizer heard `text`
    pub fn hear(&mut self, text: &str) {
        self.send(SessionEvent::Recognizer(RecognizerEvent::Result(text.to_string())));
    }

    /// The synthesizer finished the current utterance
    pub fn finish_speech(&mut self) {
        let id = self.tts.finish().expect("nothing is being spoken");
        self.send(SessionEvent::Synthesizer(SynthesizerEvent::Done(id)));
    }

    /// Let everything queued be spoken
    pub fn drain_speech(&mut self) {
        while self.tts.is_speaking() {
            self.finish_speech();
        }
    }

    /// Wait for the next out-of-band result and feed it in
    pub async fn complete_next(&mut self) {
        let event = tokio::time::timeout(Duration::from_secs(2), self.rx.recv())
            .await
            .expect("timed out waiting for a collaborator result")
            .expect("session queue closed");
        assert!(matches!(event, SessionEvent::Completed { .. }), "unexpected {:?}", event);
        self.send(event);
    }

    /// Mic and speaker agree with the turn state
    pub fn assert_consistent(&self) {
        let state = self.state();
        assert_eq!(self.asr.is_capturing(), state == TurnState::Listening, "capturing while {}", state);
        assert_eq!(self.tts.is_speaking(), state == TurnState::Speaking, "speaking while {}", state);
        assert!(self.session.controller().handles_consistent());
    }
}
