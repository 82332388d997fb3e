use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Speech
    pub language: String,
    pub tts_engine: String,
    /// Pace of the console engine; 0 disables the simulated delay
    pub console_words_per_minute: u32,
    pub speak_welcome: bool,
    pub apology_text: String,

    // Meta
    pub log_level: String,
    pub start_screen: String,

    // Data
    pub voice_corrections: HashMap<String, String>,
    pub suggestion_cutoff: f64,
    pub profile_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "en-GB".to_string(),
            tts_engine: "console".to_string(),
            console_words_per_minute: 180,
            speak_welcome: true,
            apology_text: "Sorry, I didn't catch that. Please try again.".to_string(),
            log_level: "info".to_string(),
            start_screen: "welcome_screen".to_string(),
            voice_corrections: HashMap::new(),
            suggestion_cutoff: 0.5,
            profile_path: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("himba-voice/profile.json")
                .to_string_lossy()
                .to_string(),
        }
    }
}

impl Config {
    /// Load config from the default location, or create default
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load config from a file, falling back to defaults when missing or corrupt
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)?;
        match serde_json::from_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                // Keep the broken file around for inspection
                let backup_path = config_path.with_extension("json.corrupt");
                let _ = std::fs::rename(config_path, &backup_path);
                Ok(Self::default())
            }
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("himba-voice")
        .join("config.json")
}
