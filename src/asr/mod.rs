//! ASR (Automatic Speech Recognition) Module
//!
//! The recognizer seam used by a screen session. Platform recognizers are
//! single-use: a fresh handle is created for every session through a
//! [`RecognizerFactory`], and results are reported asynchronously as
//! [`RecognizerEvent`]s on the session's event queue.

pub mod console;

use crate::session::EventSender;
use anyhow::Result;
use std::fmt;

pub use console::{ConsoleInput, ConsoleRecognizer};

/// Why a recognition attempt ended without a transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionErrorKind {
    /// Speech heard but nothing matched
    NoMatch,
    /// Nothing heard before the recognizer gave up
    SpeechTimeout,
    /// Anything else (busy, audio, network, client)
    Other(String),
}

impl RecognitionErrorKind {
    /// NoMatch and timeout are recovered with an apology and a re-listen
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RecognitionErrorKind::NoMatch | RecognitionErrorKind::SpeechTimeout
        )
    }
}

impl fmt::Display for RecognitionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecognitionErrorKind::NoMatch => f.write_str("no match"),
            RecognitionErrorKind::SpeechTimeout => f.write_str("speech timeout"),
            RecognitionErrorKind::Other(reason) => write!(f, "{}", reason),
        }
    }
}

/// Callbacks emitted by a recognizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerEvent {
    Ready,
    SpeechBegin,
    SpeechEnd,
    Result(String),
    Error(RecognitionErrorKind),
}

/// Trait for speech recognizers
pub trait Recognizer: Send {
    /// Begin capturing audio, biased towards the given phrases
    fn start(&mut self, hints: &[String]) -> Result<()>;

    /// Stop capturing; a no-op when idle
    fn stop(&mut self);

    /// Release the handle. It cannot be started again.
    fn destroy(&mut self);

    /// Whether the microphone is currently being captured
    fn is_capturing(&self) -> bool;

    /// Get the engine name
    fn name(&self) -> &str;
}

/// Creates fresh recognizer handles bound to a session's event queue
pub trait RecognizerFactory: Send + Sync {
    fn create(&self, events: EventSender) -> Result<Box<dyn Recognizer>>;
}
