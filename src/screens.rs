//! Per-screen voice behaviour: what is said on entry and how unrecognized
//! speech is treated.

use crate::commands::{Field, Screen};

/// What to do with an utterance no rule matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownPolicy {
    /// Drop it and keep listening
    Ignore,
    /// Read it back and ask whether to try again
    Clarify,
}

pub fn unknown_policy(screen: Screen) -> UnknownPolicy {
    match screen {
        Screen::Welcome => UnknownPolicy::Clarify,
        _ => UnknownPolicy::Ignore,
    }
}

/// Spoken on entering a screen
pub fn welcome_message(screen: Screen) -> &'static str {
    match screen {
        Screen::Welcome => {
            "Welcome to Himba Vision. Please say 'sign in' to log in, or 'register' to create an account."
        }
        Screen::SignIn => {
            "You're at the sign in page. Say 'go back' to return to the welcome screen."
        }
        Screen::Register => {
            "Welcome to the registration page. You can say 'name' followed by your full name, \
             'email' followed by your email address, 'emergency email' followed by a family or \
             friend email address, 'password' followed by your password. To disable email or \
             password say 'disable voice control'"
        }
        Screen::Home => {
            "You are currently at the home screen where you can find objects around you. To \
             navigate to the Himba navigation screen, say 'move to navigation'. To find an object \
             on this screen, say 'Find object ObjectName with text text'. To search for an object \
             alone, say 'find object object name'. To search for text, say 'find text text'. If \
             you want a full analysis of your environment, say 'full analysis'."
        }
        Screen::Navigation => {
            "Currently on the navigation screen, say 'Set destination' to set a destination. \
             Then, say 'Activate minimal, maximal, or haptic feedback' to test different \
             navigation modes"
        }
        Screen::Profile => {
            "You're at the profile page, to set your segmentation key say 'set segmentation key key' "
        }
    }
}

/// Fields that must be filled before the screen's form can be submitted
pub fn required_fields(screen: Screen) -> &'static [Field] {
    match screen {
        Screen::Register => &[
            Field::Email,
            Field::Password,
            Field::EmergencyEmail,
            Field::FullName,
        ],
        Screen::Profile => &[Field::SegmentationKey],
        _ => &[],
    }
}
