//! Mock Recognizer for Testing
//!
//! Records how the controller drives the microphone.

use anyhow::Result;
use himba_voice::asr::{Recognizer, RecognizerFactory};
use himba_voice::session::EventSender;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct RecognizerLog {
    pub capturing: bool,
    pub starts: usize,
    pub created: usize,
    pub destroyed: usize,
    pub hints: Vec<String>,
}

/// Hands out recognizers that share one log
#[derive(Debug, Clone, Default)]
pub struct MockAsr {
    pub log: Arc<Mutex<RecognizerLog>>,
}

impl MockAsr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_capturing(&self) -> bool {
        self.log.lock().unwrap().capturing
    }

    pub fn starts(&self) -> usize {
        self.log.lock().unwrap().starts
    }
}

impl RecognizerFactory for MockAsr {
    fn create(&self, _events: EventSender) -> Result<Box<dyn Recognizer>> {
        self.log.lock().unwrap().created += 1;
        Ok(Box::new(MockRecognizer {
            log: self.log.clone(),
            destroyed: false,
        }))
    }
}

pub struct MockRecognizer {
    log: Arc<Mutex<RecognizerLog>>,
    destroyed: bool,
}

impl Recognizer for MockRecognizer {
    fn start(&mut self, hints: &[String]) -> Result<()> {
        if self.destroyed {
            return Err(anyhow::anyhow!("Mock recognizer destroyed"));
        }
        let mut log = self.log.lock().unwrap();
        log.capturing = true;
        log.starts += 1;
        log.hints = hints.to_vec();
        Ok(())
    }

    fn stop(&mut self) {
        self.log.lock().unwrap().capturing = false;
    }

    fn destroy(&mut self) {
        self.destroyed = true;
        let mut log = self.log.lock().unwrap();
        log.capturing = false;
        log.destroyed += 1;
    }

    fn is_capturing(&self) -> bool {
        !self.destroyed && self.log.lock().unwrap().capturing
    }

    fn name(&self) -> &str {
        "mock"
    }
}
