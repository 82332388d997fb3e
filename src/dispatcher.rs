//! Command Dispatcher
//!
//! Executes the side effect of a classified command against the session's
//! state and the external collaborators. Anything said back goes through the
//! session's turn controller; slow collaborator calls run out of band and
//! come back as [`Outcome`]s.

use crate::audit;
use crate::collab::{Account, Detector, Navigator, ProfileStore, RegistrationForm, UserProfile};
use crate::error::VoiceError;
use crate::commands::{Command, DetectionMode, DetectionRequest, Field, NavOption, Screen};
use crate::screens::{self, UnknownPolicy};
use crate::session::{Outcome, ScreenSession};
use crate::turn::{AfterSpeech, SpeechKind};
use crate::utils::fuzzy;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

const MAX_SUGGESTIONS: usize = 5;

pub struct Dispatcher {
    navigator: Arc<dyn Navigator>,
    detector: Arc<dyn Detector>,
    profile: Arc<dyn ProfileStore>,
    account: Arc<dyn Account>,
    suggestion_cutoff: f64,
    audit_log: Option<PathBuf>,
}

impl Dispatcher {
    pub fn new(
        navigator: Arc<dyn Navigator>,
        detector: Arc<dyn Detector>,
        profile: Arc<dyn ProfileStore>,
        account: Arc<dyn Account>,
    ) -> Self {
        Self {
            navigator,
            detector,
            profile,
            account,
            suggestion_cutoff: 0.5,
            audit_log: None,
        }
    }

    /// Minimum similarity for object-name suggestions
    pub fn with_suggestion_cutoff(mut self, cutoff: f64) -> Self {
        self.suggestion_cutoff = cutoff;
        self
    }

    pub fn with_audit_log(mut self, path: PathBuf) -> Self {
        self.audit_log = Some(path);
        self
    }

    /// Execute one command on behalf of `session`
    pub fn dispatch(&self, command: Command, session: &mut ScreenSession) {
        debug!("Dispatching {} on {}", command.name(), session.screen());
        match command {
            Command::Unknown(text) => self.unknown(text, session),
            Command::Answer(yes) => self.answer(yes, session),
            Command::Navigate(screen) => self.navigate(screen, session),
            Command::SetField(field, value) => self.set_field(field, value, session),
            Command::SetMode(mode) => self.set_mode(mode, session),
            Command::SetOption(option) => self.set_option(option, session),
            Command::ToggleMic(enabled) => self.toggle_mic(enabled, session),
            Command::Cancel => session.cancel(),
            Command::LogOut => self.log_out(session),
            Command::Detect(request) => self.detect(request, session),
            Command::ListObjects => self.list_objects(session),
            Command::Submit => self.submit(session),
        }
    }

    /// Out-of-band work finished for a still-current generation
    pub fn complete(&self, outcome: Outcome, session: &mut ScreenSession) {
        if !outcome.speech.is_empty() {
            session
                .controller_mut()
                .speak(outcome.speech, SpeechKind::Result);
        }
        if let Some(screen) = outcome.navigate {
            self.navigate(screen, session);
        }
    }

    fn unknown(&self, text: String, session: &mut ScreenSession) {
        if text.is_empty() {
            return;
        }
        match screens::unknown_policy(session.screen()) {
            UnknownPolicy::Ignore => debug!("{}", VoiceError::UnrecognizedCommand(text)),
            UnknownPolicy::Clarify => {
                session.vars.awaiting_answer = true;
                session.controller_mut().speak(
                    format!(
                        "We heard {}. This is not a command, so no action will be performed. \
                         Would you like to try again?",
                        text
                    ),
                    SpeechKind::Prompt,
                );
            }
        }
    }

    fn answer(&self, yes: bool, session: &mut ScreenSession) {
        if !session.vars.awaiting_answer {
            debug!("No question open, ignoring answer");
            return;
        }
        session.vars.awaiting_answer = false;
        if yes {
            let welcome = screens::welcome_message(session.screen());
            session.controller_mut().speak(welcome, SpeechKind::Welcome);
        } else {
            session.controller_mut().speak_then(
                "Reverting back to manual mode, You're on your own now.",
                SpeechKind::Prompt,
                AfterSpeech::Release,
            );
        }
    }

    fn navigate(&self, screen: Screen, session: &mut ScreenSession) {
        info!("➡️ {} -> {}", session.screen(), screen);
        session.leave();
        self.navigator.navigate(screen);
    }

    fn set_field(&self, field: Field, value: String, session: &mut ScreenSession) {
        let confirmation = match field {
            Field::FullName => format!("Name set to {}", value),
            Field::Email => format!("Email set to {}", value),
            Field::EmergencyEmail => format!("Emergency contact email set to {}", value),
            Field::Password => "Password set".to_string(),
            Field::Destination => format!("Finding route from current location to {}", value),
            Field::SegmentationKey => "Segmentation key set. Say submit to save it.".to_string(),
        };
        session.vars.set_field(field, value);
        session
            .controller_mut()
            .speak(confirmation, SpeechKind::Confirmation);
    }

    fn set_mode(&self, mode: DetectionMode, session: &mut ScreenSession) {
        if !self.detector.is_available(mode) {
            warn!("{} unavailable", mode.display_name());
            let current = session.vars.mode;
            session.controller_mut().speak(
                format!(
                    "{} is not available right now. Staying with {}",
                    mode.display_name(),
                    current.display_name()
                ),
                SpeechKind::Confirmation,
            );
            return;
        }
        session.vars.mode = mode;
        session.controller_mut().speak(
            format!("{} activated", mode.display_name()),
            SpeechKind::Confirmation,
        );
    }

    fn set_option(&self, option: NavOption, session: &mut ScreenSession) {
        // Options change the screen silently
        match option {
            NavOption::ShowMaps => session.vars.show_maps = true,
            NavOption::HideMaps => session.vars.show_maps = false,
            other => session.vars.nav_option = Some(other),
        }
        debug!("Navigation option: {:?}", option);
    }

    fn toggle_mic(&self, enabled: bool, session: &mut ScreenSession) {
        if enabled {
            session.controller_mut().enable_mic();
        } else {
            session.disable_mic();
        }
        if let Err(e) = self.profile.update(&mut |p: &mut UserProfile| p.voice_control = enabled) {
            warn!("⚠️ Could not persist voice control flag: {}", e);
        }
    }

    fn log_out(&self, session: &mut ScreenSession) {
        let account = self.account.clone();
        session.spawn_out_of_band(async move {
            match account.log_out().await {
                Ok(()) => Outcome::go_to(Screen::Welcome),
                Err(e) => {
                    warn!("⚠️ Log out failed: {}", e);
                    Outcome::say("Log out failed. Please try again.")
                }
            }
        });
    }

    fn detect(&self, request: DetectionRequest, session: &mut ScreenSession) {
        let mode = self.effective_mode(session.vars.mode);

        let confirmation = match &request {
            DetectionRequest::Object { name, text } => {
                let catalog = self.detector.catalog(mode);
                if !catalog.iter().any(|known| known == name) {
                    let suggestions =
                        fuzzy::suggest(name, &catalog, MAX_SUGGESTIONS, self.suggestion_cutoff);
                    let message = if suggestions.is_empty() {
                        "Object does not exist.".to_string()
                    } else {
                        format!("Object does not exist. Suggestions: {}", suggestions.join(", "))
                    };
                    session.controller_mut().speak(message, SpeechKind::Result);
                    return;
                }
                match text {
                    Some(text) => {
                        format!("Performing object detection on {} with text {}", name, text)
                    }
                    None => format!("Performing object detection on {}", name),
                }
            }
            DetectionRequest::Text(text) => format!("Performing text recognition for text {}", text),
            DetectionRequest::FullAnalysis => "Performing full analysis on environment".to_string(),
        };

        session.vars.target = Some(request.clone());
        session
            .controller_mut()
            .speak(confirmation, SpeechKind::Confirmation);

        let detector = self.detector.clone();
        session.spawn_out_of_band(async move {
            match detector.detect(&request, mode).await {
                Ok(description) => Outcome::say(description),
                Err(e) => {
                    warn!("⚠️ Detection failed: {}", e);
                    Outcome::say("Sorry, detection is not available right now.")
                }
            }
        });
    }

    fn list_objects(&self, session: &mut ScreenSession) {
        let mode = self.effective_mode(session.vars.mode);
        let catalog = self.detector.catalog(mode);
        session.controller_mut().speak(
            format!(
                "I can detect {} objects with {}: {}",
                catalog.len(),
                mode.display_name(),
                catalog.join(", ")
            ),
            SpeechKind::Result,
        );
    }

    fn submit(&self, session: &mut ScreenSession) {
        let required = screens::required_fields(session.screen());
        if required.is_empty() {
            debug!("Nothing to submit on {}", session.screen());
            return;
        }

        let empty = session.vars.empty_fields(required);
        if !empty.is_empty() {
            let labels: Vec<&str> = empty.iter().map(|f| f.label()).collect();
            session.controller_mut().speak(
                format!("The following fields are empty: {}", labels.join(", ")),
                SpeechKind::Prompt,
            );
            return;
        }

        match session.screen() {
            Screen::Register => {
                let form = RegistrationForm {
                    full_name: session.vars.full_name.clone(),
                    email: session.vars.email.clone(),
                    password: session.vars.password.clone(),
                    emergency_email: session.vars.emergency_email.clone(),
                };
                let account = self.account.clone();
                session.spawn_out_of_band(async move {
                    match account.register(&form).await {
                        Ok(()) => Outcome::go_to(Screen::Home),
                        Err(e) => Outcome::say(format!("Registration failed. {}", e)),
                    }
                });
            }
            Screen::Profile => {
                let key = session.vars.segmentation_key.clone();
                match self.profile.update(&mut |p: &mut UserProfile| p.segmentation_key = key.clone()) {
                    Ok(_) => {
                        self.audit("SEGMENTATION_KEY updated");
                        session
                            .controller_mut()
                            .speak("Segmentation key saved", SpeechKind::Confirmation);
                    }
                    Err(e) => {
                        warn!("⚠️ Could not save segmentation key: {}", e);
                        session.controller_mut().speak(
                            "Could not save the segmentation key",
                            SpeechKind::Confirmation,
                        );
                    }
                }
            }
            other => debug!("Nothing to submit on {}", other),
        }
    }

    /// Segmentation falls back to on-device detection when unavailable
    fn effective_mode(&self, mode: DetectionMode) -> DetectionMode {
        if mode == DetectionMode::ImageSegmentation && !self.detector.is_available(mode) {
            warn!("Image Segmentation unavailable, using Object Detection");
            return DetectionMode::ObjectDetection;
        }
        mode
    }

    fn audit(&self, entry: &str) {
        if let Some(path) = &self.audit_log {
            if let Err(e) = audit::log(path, entry) {
                warn!("⚠️ Failed to write audit log: {}", e);
            }
        }
    }
}
