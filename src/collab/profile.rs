//! User profile persistence

use super::ProfileStore;
use crate::error::VoiceResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub fullname: String,
    pub email: String,
    pub emergency_email: String,
    /// Whether screens open with the microphone enabled
    pub voice_control: bool,
    pub last_known_location: String,
    pub segmentation_key: String,
    pub signed_in: bool,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            fullname: String::new(),
            email: String::new(),
            emergency_email: String::new(),
            voice_control: true,
            last_known_location: "Unknown".to_string(),
            segmentation_key: String::new(),
            signed_in: false,
        }
    }
}

/// Profile kept in a JSON file
#[derive(Debug)]
pub struct JsonProfileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl JsonProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> VoiceResult<UserProfile> {
        if !self.path.exists() {
            debug!("No profile at {:?}, using defaults", self.path);
            return Ok(UserProfile::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str(&content) {
            Ok(profile) => Ok(profile),
            Err(e) => {
                warn!("⚠️ Profile file corrupted or invalid, using defaults: {}", e);
                Ok(UserProfile::default())
            }
        }
    }

    fn write(&self, profile: &UserProfile) -> VoiceResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(profile)?)?;
        Ok(())
    }
}

impl ProfileStore for JsonProfileStore {
    fn load(&self) -> VoiceResult<UserProfile> {
        let _guard = self.lock.lock()?;
        self.read()
    }

    fn store(&self, profile: &UserProfile) -> VoiceResult<()> {
        let _guard = self.lock.lock()?;
        self.write(profile)
    }

    fn update(&self, change: &mut dyn FnMut(&mut UserProfile)) -> VoiceResult<UserProfile> {
        let _guard = self.lock.lock()?;
        let mut profile = self.read()?;
        change(&mut profile);
        self.write(&profile)?;
        Ok(profile)
    }
}
