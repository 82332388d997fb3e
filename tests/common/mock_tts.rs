//! Mock Synthesizer for Testing
//!
//! Records all spoken text. Speech only ends when the test says so.

use anyhow::Result;
use himba_voice::session::EventSender;
use himba_voice::tts::{Synthesizer, SynthesizerFactory, UtteranceId};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct SpeechLog {
    pub speaking: Option<UtteranceId>,
    pub spoken: Vec<String>,
    pub stops: usize,
    /// Simulate failure on speak
    pub should_fail: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MockTts {
    pub log: Arc<Mutex<SpeechLog>>,
}

impl MockTts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all spoken phrases
    pub fn get_spoken(&self) -> Vec<String> {
        self.log.lock().unwrap().spoken.clone()
    }

    /// Check if a phrase was spoken
    pub fn was_spoken(&self, text: &str) -> bool {
        self.get_spoken().iter().any(|s| s.contains(text))
    }

    pub fn is_speaking(&self) -> bool {
        self.log.lock().unwrap().speaking.is_some()
    }

    /// End the current utterance, returning its id
    pub fn finish(&self) -> Option<UtteranceId> {
        self.log.lock().unwrap().speaking.take()
    }
}

impl SynthesizerFactory for MockTts {
    fn create(&self, _events: EventSender) -> Result<Box<dyn Synthesizer>> {
        Ok(Box::new(MockSynthesizer {
            log: self.log.clone(),
        }))
    }
}

pub struct MockSynthesizer {
    log: Arc<Mutex<SpeechLog>>,
}

impl Synthesizer for MockSynthesizer {
    fn speak(&mut self, text: &str, id: UtteranceId) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        if log.should_fail {
            return Err(anyhow::anyhow!("Mock TTS failure"));
        }
        assert!(log.speaking.is_none(), "overlapping speech");
        log.speaking = Some(id);
        log.spoken.push(text.to_string());
        Ok(())
    }

    fn stop(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.speaking = None;
        log.stops += 1;
    }

    fn shutdown(&mut self) {}

    fn is_speaking(&self) -> bool {
        self.log.lock().unwrap().speaking.is_some()
    }

    fn name(&self) -> &str {
        "mock"
    }
}
