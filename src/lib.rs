//! HimbaVoice Library
//!
//! Voice turn-taking and command dispatch for the HimbaVision assistive
//! navigator.

pub mod app;
pub mod asr;
pub mod audit;
pub mod collab;
pub mod commands;
pub mod config;
pub mod core;
pub mod dispatcher;
pub mod error;
pub mod screens;
pub mod session;
pub mod tts;
pub mod turn;
pub mod utils;

pub use app::App;
pub use dispatcher::Dispatcher;
pub use error::{VoiceError, VoiceResult};
pub use session::{Engines, ScreenSession, SessionEvent};
pub use turn::{TurnController, TurnState};
