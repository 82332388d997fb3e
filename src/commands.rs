//! Command types
//!
//! The discrete commands a recognized utterance can map to, and the
//! screen-level vocabulary they refer to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Screens of the application, each with its own voice session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Screen {
    Welcome,
    SignIn,
    Register,
    Home,
    Navigation,
    Profile,
}

impl std::str::FromStr for Screen {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "welcome_screen" | "welcome" => Ok(Screen::Welcome),
            "signin_screen" | "sign in" | "signin" | "login" => Ok(Screen::SignIn),
            "register_screen" | "register" | "registration" => Ok(Screen::Register),
            "home_screen" | "home" => Ok(Screen::Home),
            "himba_screen" | "navigation" | "nav" => Ok(Screen::Navigation),
            "profile_screen" | "profile" => Ok(Screen::Profile),
            _ => Err(()),
        }
    }
}

impl Screen {
    /// Route id used by the navigation collaborator
    pub fn id(&self) -> &'static str {
        match self {
            Screen::Welcome => "welcome_screen",
            Screen::SignIn => "signIn_screen",
            Screen::Register => "register_screen",
            Screen::Home => "home_screen",
            Screen::Navigation => "himba_screen",
            Screen::Profile => "profile_screen",
        }
    }

    /// Name used in spoken feedback
    pub fn display_name(&self) -> &'static str {
        match self {
            Screen::Welcome => "welcome screen",
            Screen::SignIn => "sign in screen",
            Screen::Register => "registration page",
            Screen::Home => "home screen",
            Screen::Navigation => "navigation screen",
            Screen::Profile => "profile page",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Screen-local fields that can be filled by voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FullName,
    Email,
    Password,
    EmergencyEmail,
    Destination,
    SegmentationKey,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::FullName => "fullName",
            Field::Email => "email",
            Field::Password => "password",
            Field::EmergencyEmail => "emergencyContactEmail",
            Field::Destination => "destination",
            Field::SegmentationKey => "segmentationKey",
        }
    }
}

/// Vision pipeline used for detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DetectionMode {
    /// On-device object detection (works offline)
    #[default]
    ObjectDetection,
    /// Server-side panoptic segmentation (needs network)
    ImageSegmentation,
}

impl DetectionMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            DetectionMode::ObjectDetection => "Object Detection",
            DetectionMode::ImageSegmentation => "Image Segmentation",
        }
    }
}

/// Navigation-screen options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOption {
    MinimalNavigation,
    MaximalNavigation,
    HapticFeedback,
    ShowMaps,
    HideMaps,
}

/// What the detection engine should look for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionRequest {
    /// A named object, optionally carrying the text printed on it
    Object { name: String, text: Option<String> },
    /// Any object carrying this text
    Text(String),
    /// Describe everything in view
    FullAnalysis,
}

/// A classified voice command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Navigate(Screen),
    SetField(Field, String),
    SetMode(DetectionMode),
    SetOption(NavOption),
    ToggleMic(bool),
    Cancel,
    LogOut,
    Detect(DetectionRequest),
    ListObjects,
    Submit,
    Answer(bool),
    Unknown(String),
}

impl Command {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::Navigate(_) => "navigate",
            Command::SetField(..) => "set_field",
            Command::SetMode(_) => "set_mode",
            Command::SetOption(_) => "set_option",
            Command::ToggleMic(_) => "toggle_mic",
            Command::Cancel => "cancel",
            Command::LogOut => "log_out",
            Command::Detect(_) => "detect",
            Command::ListObjects => "list_objects",
            Command::Submit => "submit",
            Command::Answer(_) => "answer",
            Command::Unknown(_) => "unknown",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Command::Unknown(_))
    }
}
