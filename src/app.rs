//! Application shell
//!
//! Keeps exactly one screen session alive, replacing it whenever the
//! navigator asks for another screen.

use crate::collab::ProfileStore;
use crate::commands::Screen;
use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::session::{self, ControlEvent, Engines, ScreenSession, SessionEvent, SessionOptions};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub struct App {
    config: Config,
    engines: Engines,
    dispatcher: Arc<Dispatcher>,
    profile: Arc<dyn ProfileStore>,
    navigation: mpsc::UnboundedReceiver<Screen>,
    /// Open screens with the microphone off regardless of the profile
    mic_override_off: bool,
}

impl App {
    pub fn new(
        config: Config,
        engines: Engines,
        dispatcher: Arc<Dispatcher>,
        profile: Arc<dyn ProfileStore>,
        navigation: mpsc::UnboundedReceiver<Screen>,
    ) -> Self {
        Self {
            config,
            engines,
            dispatcher,
            profile,
            navigation,
            mic_override_off: false,
        }
    }

    pub fn without_mic(mut self) -> Self {
        self.mic_override_off = true;
        self
    }

    fn mic_enabled(&self) -> bool {
        if self.mic_override_off {
            return false;
        }
        match self.profile.load() {
            Ok(profile) => profile.voice_control,
            Err(e) => {
                warn!("⚠️ Could not read profile, voice control on: {}", e);
                true
            }
        }
    }

    /// Run screens until input ends or ctrl-c
    pub async fn run(mut self, start: Screen) -> Result<()> {
        let mut screen = start;

        loop {
            let options = SessionOptions::from_config(&self.config, self.mic_enabled());
            let (session, rx) = ScreenSession::open(screen, &options, self.engines.clone())?;
            let events = session.sender();
            let mut task = tokio::spawn(session::run(session, self.dispatcher.clone(), rx));

            tokio::select! {
                result = &mut task => {
                    if let Err(e) = result {
                        warn!("⚠️ Session task failed: {}", e);
                    }
                    info!("Session on {} ended", screen);
                    break;
                }
                next = self.navigation.recv() => {
                    let _ = events.send(SessionEvent::Control(ControlEvent::Exit));
                    let _ = task.await;
                    match next {
                        Some(next) => screen = next,
                        None => break,
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("🛑 Interrupted");
                    let _ = events.send(SessionEvent::Control(ControlEvent::Exit));
                    let _ = task.await;
                    break;
                }
            }
        }

        info!("👋 Goodbye");
        Ok(())
    }
}
