//! System TTS engine
//!
//! Shells out to spd-say (speech-dispatcher) or espeak-ng and waits for the
//! utterance to finish so completion can be reported.

use super::TtsEngine;
use anyhow::Result;
use async_trait::async_trait;
use std::io::ErrorKind;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug)]
pub struct SystemEngine {
    language: String,
}

impl SystemEngine {
    pub fn new(language: &str) -> Self {
        // espeak-ng and spd-say take a bare language code
        let language = language
            .split(['-', '_'])
            .next()
            .unwrap_or("en")
            .to_lowercase();
        Self { language }
    }
}

#[async_trait]
impl TtsEngine for SystemEngine {
    async fn speak(&self, text: &str) -> Result<()> {
        debug!("System speaking: {}", text);

        // -w blocks until speech-dispatcher has finished the message
        match Command::new("spd-say")
            .args(["-w", "-l", &self.language])
            .arg(text)
            .kill_on_drop(true)
            .status()
            .await
        {
            Ok(status) if status.success() => return Ok(()),
            Ok(status) => debug!("spd-say exited with {}", status),
            Err(e) if e.kind() == ErrorKind::NotFound => debug!("spd-say not installed"),
            Err(e) => return Err(e.into()),
        }

        match Command::new("espeak-ng")
            .args(["-v", &self.language])
            .arg(text)
            .kill_on_drop(true)
            .status()
            .await
        {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => Err(anyhow::anyhow!("espeak-ng exited with {}", status)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(anyhow::anyhow!(
                "No system TTS command found (tried spd-say, espeak-ng)"
            )),
            Err(e) => Err(e.into()),
        }
    }

    fn name(&self) -> &str {
        "system"
    }
}
