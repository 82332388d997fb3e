use super::Navigator;
use crate::commands::Screen;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Forwards navigation requests to the application loop
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<Screen>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Screen>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, screen: Screen) {
        info!("🧭 Navigating to {}", screen);
        if self.tx.send(screen).is_err() {
            warn!("Navigation to {} dropped, application loop is gone", screen);
        }
    }
}
