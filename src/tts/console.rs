//! Console TTS engine
//!
//! Prints spoken text to stdout and holds the turn for roughly as long as
//! reading it aloud would take.

use super::TtsEngine;
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

#[derive(Debug)]
pub struct ConsoleEngine {
    /// Simulated speaking rate; 0 returns immediately
    words_per_minute: u32,
}

impl ConsoleEngine {
    pub fn new(words_per_minute: u32) -> Self {
        Self { words_per_minute }
    }

    fn duration_for(&self, text: &str) -> Duration {
        if self.words_per_minute == 0 {
            return Duration::ZERO;
        }
        let words = text.split_whitespace().count() as u64;
        Duration::from_millis(words * 60_000 / u64::from(self.words_per_minute))
    }
}

#[async_trait]
impl TtsEngine for ConsoleEngine {
    async fn speak(&self, text: &str) -> Result<()> {
        println!("🔊 {}", text);
        let duration = self.duration_for(text);
        debug!("Console speaking for {:?}", duration);
        tokio::time::sleep(duration).await;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
