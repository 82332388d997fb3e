//! External collaborators
//!
//! Everything the voice layer drives but does not own: screen navigation,
//! the detection engine, profile persistence and the account backend.

pub mod account;
pub mod detection;
pub mod navigation;
pub mod profile;

use crate::commands::{DetectionMode, DetectionRequest, Screen};
use crate::error::VoiceResult;
use async_trait::async_trait;

pub use account::LocalAccount;
pub use detection::CatalogDetector;
pub use navigation::ChannelNavigator;
pub use profile::{JsonProfileStore, UserProfile};

/// Moves the application to another screen. Fire-and-forget.
pub trait Navigator: Send + Sync {
    fn navigate(&self, screen: Screen);
}

/// The object detection / segmentation / OCR engine
#[async_trait]
pub trait Detector: Send + Sync {
    /// Object names the engine can find in this mode
    fn catalog(&self, mode: DetectionMode) -> Vec<String>;

    /// Whether the mode can be used right now
    fn is_available(&self, mode: DetectionMode) -> bool;

    /// Run one detection and describe the outcome in a sentence
    async fn detect(&self, request: &DetectionRequest, mode: DetectionMode) -> VoiceResult<String>;
}

/// Persistent user profile
pub trait ProfileStore: Send + Sync {
    fn load(&self) -> VoiceResult<UserProfile>;

    fn store(&self, profile: &UserProfile) -> VoiceResult<()>;

    /// Read-modify-write of the stored profile
    fn update(&self, change: &mut dyn FnMut(&mut UserProfile)) -> VoiceResult<UserProfile> {
        let mut profile = self.load()?;
        change(&mut profile);
        self.store(&profile)?;
        Ok(profile)
    }
}

/// Details collected by the registration screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub emergency_email: String,
}

/// Authentication backend
#[async_trait]
pub trait Account: Send + Sync {
    async fn register(&self, form: &RegistrationForm) -> VoiceResult<()>;

    async fn log_out(&self) -> VoiceResult<()>;
}
