//! himba-voice - voice interaction for the HimbaVision navigator
//!
//! Runs the screen sessions against a console recognizer: type what you
//! would say, one utterance per line.

use anyhow::Result;
use clap::Parser;
use himba_voice::asr::ConsoleInput;
use himba_voice::collab::{CatalogDetector, ChannelNavigator, JsonProfileStore, LocalAccount};
use himba_voice::commands::Screen;
use himba_voice::config::{self, Config};
use himba_voice::tts::{self, EngineFactory};
use himba_voice::{audit, App, Dispatcher, Engines};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Screen to start on (route id or name)
    #[arg(short, long)]
    screen: Option<String>,

    /// TTS engine: console, system or speechd
    #[arg(long)]
    tts: Option<String>,

    /// Start every screen with the microphone closed
    #[arg(long)]
    no_mic: bool,

    /// Config file to use instead of the default
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(config::config_path);
    let mut config = Config::load_from(&config_path)?;
    if let Some(tts) = &args.tts {
        config.tts_engine = tts.clone();
    }

    // Setup logging
    let level = if args.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("🦯 himba-voice v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Config: {:?}", config_path);

    let start_name = args.screen.as_deref().unwrap_or(&config.start_screen);
    let start = start_name.parse::<Screen>().unwrap_or_else(|_| {
        warn!("Unknown screen '{}', starting on welcome", start_name);
        Screen::Welcome
    });

    // Collaborators
    let profile = Arc::new(JsonProfileStore::new(&config.profile_path));
    let audit_path = audit::audit_path();
    let account = LocalAccount::new(profile.clone()).with_audit_log(audit_path.clone());
    let (navigator, navigation) = ChannelNavigator::new();
    let dispatcher = Dispatcher::new(
        Arc::new(navigator),
        Arc::new(CatalogDetector::default()),
        profile.clone(),
        Arc::new(account),
    )
    .with_suggestion_cutoff(config.suggestion_cutoff)
    .with_audit_log(audit_path);

    // Speech
    let input = ConsoleInput::new();
    input.spawn_reader();
    let engine = match tts::create_engine(&config).await {
        Ok(engine) => engine,
        Err(e) => {
            warn!("⚠️ TTS engine '{}' failed ({}), using console", config.tts_engine, e);
            config.tts_engine = "console".to_string();
            tts::create_engine(&config).await?
        }
    };
    let engines = Engines::new(Arc::new(input), Arc::new(EngineFactory::new(engine)));

    info!("✅ Ready - type what you would say, or /quit");

    let mut app = App::new(config, engines, Arc::new(dispatcher), profile, navigation);
    if args.no_mic {
        app = app.without_mic();
    }
    app.run(start).await
}
